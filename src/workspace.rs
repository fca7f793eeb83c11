use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use crate::backend::common::constants::MAX_KNOWN_WORKTREES;
use crate::backend::common::dtos::{DiscoveryFlow, WorkspaceMetadata};
use crate::error::{Error, Result};

fn is_safe_segment(segment: &str) -> bool {
    !matches!(segment, "" | "." | "..")
        && segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}

/// `[A-Za-z0-9._-]+` segments joined by `/`, with no `.` or `..` segment.
pub(crate) fn is_safe_path_token(value: &str) -> bool {
    !value.is_empty() && value.split('/').all(is_safe_segment)
}

pub(crate) fn is_valid_root_name(value: &str) -> bool {
    !value.is_empty()
        && !value.contains('/')
        && !value.contains('\\')
        && value != "."
        && value != ".."
}

pub(crate) fn validate_root_name(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyRootName);
    }
    if !is_valid_root_name(trimmed) {
        return Err(Error::InvalidRootName);
    }
    Ok(trimmed.to_string())
}

/// Trims, checks and dedupes caller-supplied worktree names. Output is sorted.
pub(crate) fn validate_known_worktrees(known_worktrees: &[String]) -> Result<Vec<String>> {
    if known_worktrees.len() > MAX_KNOWN_WORKTREES {
        return Err(Error::TooManyKnownWorktrees {
            max: MAX_KNOWN_WORKTREES,
        });
    }

    let mut set = BTreeSet::new();
    for entry in known_worktrees {
        let trimmed = entry.trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyKnownWorktree);
        }

        if !is_safe_path_token(trimmed) {
            return Err(Error::UnsafeKnownWorktree);
        }

        set.insert(trimmed.to_string());
    }

    Ok(set.into_iter().collect())
}

pub(crate) fn validate_worktree_name(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if !is_safe_path_token(trimmed) {
        return Err(Error::UnsafeWorktree);
    }
    Ok(trimmed.to_string())
}

/// An explicit root override must be absolute and an existing directory.
pub(crate) fn validate_workspace_root_path(workspace_root: &str) -> Result<PathBuf> {
    let root = PathBuf::from(workspace_root.trim());
    if !root.is_absolute() {
        return Err(Error::RelativeWorkspaceRoot);
    }

    if !root.is_dir() {
        return Err(Error::WorkspaceRootNotDirectory(root.display().to_string()));
    }

    Ok(root)
}

pub(crate) fn validate_optional_relative_path(
    value: Option<&str>,
    label: &str,
) -> Result<Option<String>> {
    let Some(raw) = value else {
        return Ok(None);
    };

    let invalid = || Error::InvalidRelativePath {
        label: label.to_string(),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let path = Path::new(trimmed);
    if path.is_absolute() {
        return Err(invalid());
    }

    for component in path.components() {
        if !matches!(component, Component::Normal(_)) {
            return Err(invalid());
        }
    }

    Ok(Some(trimmed.to_string()))
}

/// A validated name-based lookup.
///
/// Building one is the only way into the discovery walk, so every search
/// runs on checked input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchContext {
    target_name: String,
    known_worktrees: Vec<String>,
    expected_metadata: Option<WorkspaceMetadata>,
    required_worktree: Option<String>,
    flow: DiscoveryFlow,
}

impl SearchContext {
    pub fn new(
        target_name: &str,
        known_worktrees: &[String],
        expected_metadata: Option<WorkspaceMetadata>,
    ) -> Result<Self> {
        Ok(Self {
            target_name: validate_root_name(target_name)?,
            known_worktrees: validate_known_worktrees(known_worktrees)?,
            expected_metadata: expected_metadata.filter(|meta| !meta.is_empty()),
            required_worktree: None,
            flow: DiscoveryFlow::List,
        })
    }

    pub fn with_required_worktree(mut self, worktree: &str) -> Result<Self> {
        self.required_worktree = Some(validate_worktree_name(worktree)?);
        Ok(self)
    }

    pub fn with_flow(mut self, flow: DiscoveryFlow) -> Self {
        self.flow = flow;
        self
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn known_worktrees(&self) -> &[String] {
        &self.known_worktrees
    }

    pub fn expected_metadata(&self) -> Option<&WorkspaceMetadata> {
        self.expected_metadata.as_ref()
    }

    pub fn required_worktree(&self) -> Option<&str> {
        self.required_worktree.as_deref()
    }

    pub fn flow(&self) -> DiscoveryFlow {
        self.flow
    }
}
