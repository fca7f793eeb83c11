use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("rootName must be a non-empty string.")]
    EmptyRootName,

    #[error("rootName contains invalid path characters.")]
    InvalidRootName,

    #[error("knownWorktrees is too large (max {max} entries).")]
    TooManyKnownWorktrees { max: usize },

    #[error("knownWorktrees entries must be non-empty strings.")]
    EmptyKnownWorktree,

    #[error("knownWorktrees contains unsafe characters or path segments.")]
    UnsafeKnownWorktree,

    #[error("worktree contains unsafe characters or path segments.")]
    UnsafeWorktree,

    #[error("workspaceRoot must be an absolute path.")]
    RelativeWorkspaceRoot,

    #[error("workspaceRoot \"{0}\" is not an existing, accessible directory.")]
    WorkspaceRootNotDirectory(String),

    #[error("{label} must be a relative path without unsafe path segments.")]
    InvalidRelativePath { label: String },

    #[error(
        "Could not auto-resolve workspace root for rootName \"{root_name}\". Rescan, or pass an explicit workspaceRoot."
    )]
    NoMatch { root_name: String },

    #[error(
        "Could not auto-resolve workspace root: found {count} matches ({preview}). Pass an explicit workspaceRoot or workspace metadata to disambiguate."
    )]
    Ambiguous { count: usize, preview: String },

    #[error("Failed to read {path}: {message}")]
    ReadDirectory { path: String, message: String },

    #[error("{0}")]
    Command(String),
}
