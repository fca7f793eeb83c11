pub(crate) mod common;
pub(crate) mod groove_worktree_lifecycle;
pub(crate) mod runtime_cache_dedupe;
pub(crate) mod startup_health_checks_binary_validation;
pub(crate) mod workspace_discovery_context;
pub(crate) mod workspace_metadata_settings;
