use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Identity fields of `.groove/workspace.json`.
///
/// Also used as the partial descriptor a caller expects to find; absent
/// fields are not compared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl WorkspaceMetadata {
    pub fn is_empty(&self) -> bool {
        self.version.is_none()
            && self.root_name.is_none()
            && self.created_at.is_none()
            && self.updated_at.is_none()
    }
}

/// Which structural checks a candidate root must pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiscoveryFlow {
    /// Listing worktrees: the worktree container must exist.
    #[default]
    List,
    /// Creating the first worktree: the container may not exist yet.
    Create,
}

impl DiscoveryFlow {
    pub fn as_str(self) -> &'static str {
        match self {
            DiscoveryFlow::List => "list",
            DiscoveryFlow::Create => "create",
        }
    }

    pub(crate) fn requires_worktrees_dir(self) -> bool {
        matches!(self, DiscoveryFlow::List)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRoot {
    pub root_path: PathBuf,
    pub has_workspace_meta: bool,
    pub matches_workspace_meta: bool,
}

/// Raw resolution payload, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    #[serde(default)]
    pub workspace_root: Option<String>,
    #[serde(default)]
    pub root_name: Option<String>,
    #[serde(default)]
    pub known_worktrees: Vec<String>,
    #[serde(default)]
    pub workspace_meta: Option<WorkspaceMetadata>,
    #[serde(default)]
    pub required_worktree: Option<String>,
    #[serde(default)]
    pub flow: DiscoveryFlow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolvedBy {
    ExplicitRoot,
    Cache,
    SingleCandidate,
    MetadataMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub workspace_root: PathBuf,
    pub resolved_by: ResolvedBy,
}

/// Which rule decided the order of a `- <a> (<b>)` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HeaderRule {
    MatchedByKnownSet,
    MatchedByBranchShape,
    DefaultOrder,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpencodeState {
    Running,
    NotRunning,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogState {
    Latest,
    BrokenLatest,
    #[serde(rename = "none")]
    Absent,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityState {
    Thinking,
    Idle,
    Finished,
    Error,
    #[default]
    Unknown,
}

impl ActivityState {
    pub(crate) fn from_token(token: &str) -> Self {
        match token.to_lowercase().as_str() {
            "thinking" => ActivityState::Thinking,
            "idle" => ActivityState::Idle,
            "finished" => ActivityState::Finished,
            "error" => ActivityState::Error,
            _ => ActivityState::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpencodeActivityDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_s: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorktreeRow {
    pub worktree: String,
    pub branch: String,
    pub opencode_state: OpencodeState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opencode_instance_id: Option<String>,
    pub log_state: LogState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_target: Option<String>,
    pub opencode_activity_state: ActivityState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opencode_activity_detail: Option<OpencodeActivityDetail>,
    pub header_rule: HeaderRule,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrooveListParse {
    pub rows: BTreeMap<String, WorktreeRow>,
    pub malformed_line_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrooveListReport {
    pub request_id: String,
    pub workspace_root: PathBuf,
    pub rows: BTreeMap<String, WorktreeRow>,
    pub malformed_line_count: usize,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorktreeScanStatus {
    Paused,
    Corrupted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceScanRow {
    pub worktree: String,
    pub branch_guess: String,
    pub path: PathBuf,
    pub status: WorktreeScanStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceScan {
    pub has_worktrees_directory: bool,
    pub rows: Vec<WorkspaceScanRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GrooveBinarySource {
    Env,
    Bundled,
    Path,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrooveBinaryResolution {
    pub path: PathBuf,
    pub source: GrooveBinarySource,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrooveBinCheckStatus {
    pub configured_path: Option<String>,
    pub configured_path_valid: Option<bool>,
    pub has_issue: bool,
    pub issue: Option<String>,
    pub effective_binary_path: String,
    pub effective_binary_source: GrooveBinarySource,
}

#[derive(Debug, Clone)]
pub(crate) struct CommandResult {
    pub(crate) exit_code: Option<i32>,
    pub(crate) stdout: String,
    pub(crate) stderr: String,
    pub(crate) error: Option<String>,
}
