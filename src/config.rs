use std::path::PathBuf;
use std::time::Duration;

use crate::backend::common::constants::{
    DISCOVERY_MAX_DEPTH_ENV, DISCOVERY_MAX_DIRECTORIES_ENV, GROOVE_DIR_NAME,
    GROOVE_LIST_COMMAND_TIMEOUT, GROOVE_LIST_TIMEOUT_ENV, MAX_DISCOVERY_DEPTH,
    MAX_DISCOVERY_DIRECTORIES, SKIPPED_DISCOVERY_DIRECTORIES, WORKSPACE_META_FILE_NAME,
    WORKTREES_DIR_NAME,
};
use crate::backend::startup_health_checks_binary_validation::binary_runtime::resolve_groove_binary;

const MAX_DEPTH_CEILING: usize = 32;
const MAX_DIRECTORIES_CEILING: usize = 1_000_000;
const MAX_TIMEOUT_SECS: u64 = 600;

/// Tunables for the bounded root discovery walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Deepest directory level (below a search base) whose entries are read.
    pub max_depth: usize,
    /// Global cap on directories examined across all search bases.
    pub max_directories: usize,
    /// Directory names that are never reported nor descended into.
    pub skipped_directories: Vec<String>,
    pub worktrees_dir_name: String,
    /// Metadata descriptor path, relative to a candidate root.
    pub metadata_file: PathBuf,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DISCOVERY_DEPTH,
            max_directories: MAX_DISCOVERY_DIRECTORIES,
            skipped_directories: SKIPPED_DISCOVERY_DIRECTORIES
                .iter()
                .map(|name| name.to_string())
                .collect(),
            worktrees_dir_name: WORKTREES_DIR_NAME.to_string(),
            metadata_file: PathBuf::from(GROOVE_DIR_NAME).join(WORKSPACE_META_FILE_NAME),
        }
    }
}

impl DiscoveryConfig {
    /// Defaults, with depth and directory caps overridable from the environment.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_depth = parse_bounded_usize(
            std::env::var(DISCOVERY_MAX_DEPTH_ENV).ok().as_deref(),
            defaults.max_depth,
            MAX_DEPTH_CEILING,
        );
        let max_directories = parse_bounded_usize(
            std::env::var(DISCOVERY_MAX_DIRECTORIES_ENV).ok().as_deref(),
            defaults.max_directories,
            MAX_DIRECTORIES_CEILING,
        );

        Self {
            max_depth,
            max_directories,
            ..defaults
        }
    }

    pub(crate) fn is_skipped(&self, name: &str) -> bool {
        self.skipped_directories
            .iter()
            .any(|skipped| skipped == name)
    }
}

/// How to invoke the external `groove list` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListConfig {
    pub binary: PathBuf,
    pub timeout: Duration,
}

impl ListConfig {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: GROOVE_LIST_COMMAND_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Binary from `GROOVE_BIN` or the usual install locations; timeout
    /// from `GROOVE_LIST_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let timeout_secs = parse_bounded_u64(
            std::env::var(GROOVE_LIST_TIMEOUT_ENV).ok().as_deref(),
            GROOVE_LIST_COMMAND_TIMEOUT.as_secs(),
            MAX_TIMEOUT_SECS,
        );

        Self::new(resolve_groove_binary().path).with_timeout(Duration::from_secs(timeout_secs))
    }
}

fn parse_bounded_usize(raw: Option<&str>, default_value: usize, ceiling: usize) -> usize {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default_value)
        .clamp(1, ceiling)
}

fn parse_bounded_u64(raw: Option<&str>, default_value: u64, ceiling: u64) -> u64 {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default_value)
        .clamp(1, ceiling)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_discovery_constants() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.max_directories, 2500);
        assert!(config.is_skipped("node_modules"));
        assert!(config.is_skipped(".git"));
        assert!(!config.is_skipped("proj"));
        assert_eq!(
            config.metadata_file,
            PathBuf::from(".groove").join("workspace.json")
        );
    }

    #[test]
    fn parse_bounded_usize_defaults_and_clamps() {
        assert_eq!(parse_bounded_usize(None, 4, 32), 4);
        assert_eq!(parse_bounded_usize(Some("  "), 4, 32), 4);
        assert_eq!(parse_bounded_usize(Some("abc"), 4, 32), 4);
        assert_eq!(parse_bounded_usize(Some(" 6 "), 4, 32), 6);
        assert_eq!(parse_bounded_usize(Some("0"), 4, 32), 1);
        assert_eq!(parse_bounded_usize(Some("999"), 4, 32), 32);
    }

    #[test]
    fn parse_bounded_u64_defaults_and_clamps() {
        assert_eq!(parse_bounded_u64(None, 15, 600), 15);
        assert_eq!(parse_bounded_u64(Some("30"), 15, 600), 30);
        assert_eq!(parse_bounded_u64(Some("-1"), 15, 600), 15);
        assert_eq!(parse_bounded_u64(Some("100000"), 15, 600), 600);
    }

    #[test]
    fn list_config_uses_default_timeout() {
        let config = ListConfig::new("groove");
        assert_eq!(config.binary, PathBuf::from("groove"));
        assert_eq!(config.timeout, Duration::from_secs(15));
    }
}
