use std::time::Duration;

pub(crate) const MAX_DISCOVERY_DEPTH: usize = 4;
pub(crate) const MAX_DISCOVERY_DIRECTORIES: usize = 2500;
pub(crate) const MAX_KNOWN_WORKTREES: usize = 128;
pub(crate) const MAX_AMBIGUITY_PREVIEW: usize = 5;
pub(crate) const MAX_SEARCH_BASE_ANCESTORS: usize = 3;

pub(crate) const WORKTREES_DIR_NAME: &str = ".worktrees";
pub(crate) const GROOVE_DIR_NAME: &str = ".groove";
pub(crate) const WORKSPACE_META_FILE_NAME: &str = "workspace.json";

pub(crate) const SKIPPED_DISCOVERY_DIRECTORIES: [&str; 9] = [
    ".git",
    ".hg",
    ".svn",
    ".next",
    ".pnpm-store",
    ".turbo",
    ".cache",
    "dist",
    "node_modules",
];

pub(crate) const GROOVE_LIST_COMMAND_TIMEOUT: Duration = Duration::from_secs(15);
pub(crate) const COMMAND_TIMEOUT_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub(crate) const GROOVE_BIN_ENV: &str = "GROOVE_BIN";
pub(crate) const GROOVE_LIST_TIMEOUT_ENV: &str = "GROOVE_LIST_TIMEOUT_SECS";
pub(crate) const DISCOVERY_MAX_DEPTH_ENV: &str = "GROOVE_DISCOVERY_MAX_DEPTH";
pub(crate) const DISCOVERY_MAX_DIRECTORIES_ENV: &str = "GROOVE_DISCOVERY_MAX_DIRECTORIES";

