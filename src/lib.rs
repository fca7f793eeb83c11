//! Locates Groove workspace roots on disk and reads worktree status from
//! `groove list`.
//!
//! Resolution starts from a bare directory name. [`WorkspaceResolver`]
//! walks a few likely bases (cwd, its ancestors, home) with hard depth and
//! directory caps, keeps the directories that look like workspace roots, and
//! uses the optional `.groove/workspace.json` identity to pick one when the
//! name alone is ambiguous.

mod backend;
mod config;
mod error;
mod workspace;

pub use backend::common::dtos::{
    ActivityState, CandidateRoot, DiscoveryFlow, GrooveBinCheckStatus, GrooveBinaryResolution,
    GrooveBinarySource, GrooveListParse, GrooveListReport, HeaderRule, LogState,
    OpencodeActivityDetail, OpencodeState, Resolution, ResolveRequest, ResolvedBy,
    WorkspaceMetadata, WorkspaceScan, WorkspaceScanRow, WorktreeRow, WorktreeScanStatus,
};
pub use backend::groove_worktree_lifecycle::groove_runtime::parse_groove_list_output;
pub use backend::groove_worktree_lifecycle::lifecycle_scope::scan_workspace_worktrees;
pub use backend::groove_worktree_lifecycle::list_runtime::collect_groove_list;
pub use backend::runtime_cache_dedupe::cache_scope::{root_cache_key, NoCache, RootCache};
pub use backend::startup_health_checks_binary_validation::binary_runtime::{
    evaluate_groove_bin_check_status, resolve_groove_binary,
};
pub use backend::workspace_discovery_context::resolve_runtime::WorkspaceResolver;
pub use config::{DiscoveryConfig, ListConfig};
pub use error::{Error, Result};
pub use workspace::SearchContext;
