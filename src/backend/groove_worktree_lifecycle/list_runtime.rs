use std::path::Path;
use std::process::Command;
use std::time::Instant;

use uuid::Uuid;

use crate::backend::common::dtos::GrooveListReport;
use crate::backend::common::process_command::{command_output_snippet, run_command_with_timeout};
use crate::backend::groove_worktree_lifecycle::groove_runtime::parse_groove_list_rows;
use crate::config::ListConfig;
use crate::error::{Error, Result};
use crate::workspace::{validate_known_worktrees, validate_optional_relative_path};

fn request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Runs `groove list` in `workspace_root` and parses what it printed.
pub fn collect_groove_list(
    list_config: &ListConfig,
    workspace_root: &Path,
    known_worktrees: &[String],
    dir: Option<&str>,
) -> Result<GrooveListReport> {
    let request_id = request_id();
    let known_worktrees = validate_known_worktrees(known_worktrees)?;
    let dir = validate_optional_relative_path(dir, "dir")?;

    let mut args = vec!["list".to_string()];
    if let Some(dir) = dir {
        args.push("--dir".to_string());
        args.push(dir);
    }

    let mut command = Command::new(&list_config.binary);
    command.args(&args).current_dir(workspace_root);

    let started_at = Instant::now();
    let result = run_command_with_timeout(
        command,
        list_config.timeout,
        format!("Failed to execute {}", list_config.binary.display()),
        "groove list".to_string(),
    );
    let elapsed_ms = started_at.elapsed().as_millis() as u64;

    if let Some(error) = result.error {
        tracing::warn!(
            event = "groove_list",
            request_id = %request_id,
            elapsed_ms,
            %error,
            "groove list did not complete"
        );
        return Err(Error::Command(error));
    }

    if result.exit_code != Some(0) {
        let exit = result
            .exit_code
            .map(|code| code.to_string())
            .unwrap_or_else(|| "signal".to_string());
        let message = match command_output_snippet(&result) {
            Some(snippet) => format!("groove list failed (exit {exit}): {snippet}"),
            None => format!("groove list failed (exit {exit})."),
        };
        tracing::warn!(
            event = "groove_list",
            request_id = %request_id,
            elapsed_ms,
            exit = %exit,
            "groove list exited unsuccessfully"
        );
        return Err(Error::Command(message));
    }

    let parsed = parse_groove_list_rows(&result.stdout, &known_worktrees);
    if parsed.malformed_line_count > 0 {
        tracing::warn!(
            event = "groove_list",
            request_id = %request_id,
            malformed = parsed.malformed_line_count,
            "groove list printed rows that could not be parsed"
        );
    }

    tracing::debug!(
        event = "groove_list",
        request_id = %request_id,
        workspace_root = %workspace_root.display(),
        rows = parsed.rows.len(),
        elapsed_ms,
        "groove list completed"
    );

    Ok(GrooveListReport {
        request_id,
        workspace_root: workspace_root.to_path_buf(),
        rows: parsed.rows,
        malformed_line_count: parsed.malformed_line_count,
        stdout: result.stdout,
        stderr: result.stderr,
    })
}
