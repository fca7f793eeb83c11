use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use groove_locate::{
    collect_groove_list, evaluate_groove_bin_check_status, parse_groove_list_output,
    scan_workspace_worktrees, DiscoveryConfig, DiscoveryFlow, ListConfig, ResolveRequest,
    WorkspaceMetadata, WorkspaceResolver,
};

const LOG_FILTER_ENV: &str = "GROOVE_LOG";

#[derive(Parser)]
#[command(name = "groove-locate", version)]
#[command(about = "Find Groove workspace roots and report worktree status")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the workspace root matching a directory name
    Resolve(ResolveArgs),

    /// Resolve a workspace root, run `groove list` there and print the report
    List {
        #[command(flatten)]
        resolve: ResolveArgs,

        /// Relative directory passed through as `groove list --dir`
        #[arg(long)]
        dir: Option<String>,
    },

    /// Parse `groove list` output read from stdin
    Parse {
        /// Worktree name already known to exist (repeatable)
        #[arg(long = "known")]
        known_worktrees: Vec<String>,
    },

    /// List the worktree container of a root without running groove
    Worktrees { workspace_root: PathBuf },

    /// Report which groove binary would be used
    Doctor,
}

#[derive(Args)]
struct ResolveArgs {
    /// Directory name of the workspace root
    #[arg(long)]
    root_name: Option<String>,

    /// Worktree that must exist under the root (repeatable)
    #[arg(long = "known")]
    known_worktrees: Vec<String>,

    #[arg(long)]
    required_worktree: Option<String>,

    /// Expected `rootName` in .groove/workspace.json
    #[arg(long)]
    meta_root_name: Option<String>,

    /// Expected `version` in .groove/workspace.json
    #[arg(long)]
    meta_version: Option<i64>,

    /// Expected `createdAt` in .groove/workspace.json
    #[arg(long)]
    meta_created_at: Option<String>,

    /// Expected `updatedAt` in .groove/workspace.json
    #[arg(long)]
    meta_updated_at: Option<String>,

    /// Absolute root to use as-is, skipping the search
    #[arg(long)]
    workspace_root: Option<String>,

    /// Accept roots that have no worktree container yet
    #[arg(long)]
    create: bool,
}

impl ResolveArgs {
    fn to_request(&self) -> ResolveRequest {
        let meta = WorkspaceMetadata {
            version: self.meta_version,
            root_name: self.meta_root_name.clone(),
            created_at: self.meta_created_at.clone(),
            updated_at: self.meta_updated_at.clone(),
        };

        ResolveRequest {
            workspace_root: self.workspace_root.clone(),
            root_name: self.root_name.clone(),
            known_worktrees: self.known_worktrees.clone(),
            workspace_meta: (!meta.is_empty()).then_some(meta),
            required_worktree: self.required_worktree.clone(),
            flow: if self.create {
                DiscoveryFlow::Create
            } else {
                DiscoveryFlow::List
            },
        }
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{rendered}");
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let resolver = WorkspaceResolver::new(DiscoveryConfig::from_env());

    match cli.command {
        Commands::Resolve(args) => {
            let resolution = resolver.resolve_request(&args.to_request())?;
            tracing::info!(resolved_by = ?resolution.resolved_by, "workspace root resolved");
            println!("{}", resolution.workspace_root.display());
        }
        Commands::List { resolve, dir } => {
            let request = resolve.to_request();
            let resolution = resolver.resolve_request(&request)?;
            let report = collect_groove_list(
                &ListConfig::from_env(),
                &resolution.workspace_root,
                &request.known_worktrees,
                dir.as_deref(),
            )?;
            print_json(&report)?;
        }
        Commands::Parse { known_worktrees } => {
            let mut stdout = String::new();
            std::io::stdin()
                .read_to_string(&mut stdout)
                .context("Failed to read groove list output from stdin")?;
            print_json(&parse_groove_list_output(&stdout, &known_worktrees)?)?;
        }
        Commands::Worktrees { workspace_root } => {
            let scan = scan_workspace_worktrees(&workspace_root, resolver.config())
                .with_context(|| format!("Failed to scan {}", workspace_root.display()))?;
            print_json(&scan)?;
        }
        Commands::Doctor => {
            print_json(&evaluate_groove_bin_check_status())?;
        }
    }

    Ok(())
}
