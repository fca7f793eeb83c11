use std::fs;
use std::path::Path;

use crate::backend::common::constants::GROOVE_DIR_NAME;
use crate::backend::common::dtos::{WorkspaceScan, WorkspaceScanRow, WorktreeScanStatus};
use crate::config::DiscoveryConfig;
use crate::error::{Error, Result};

pub(crate) fn branch_guess_from_name(worktree: &str) -> String {
    worktree.replace('_', "/")
}

fn read_directory_error(path: &Path, error: std::io::Error) -> Error {
    Error::ReadDirectory {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

/// Lists the worktree container of `workspace_root` without running `groove`.
///
/// A worktree with its own `.groove/` directory is `paused`; anything else
/// in the container is reported as `corrupted`.
pub fn scan_workspace_worktrees(
    workspace_root: &Path,
    config: &DiscoveryConfig,
) -> Result<WorkspaceScan> {
    let worktrees_dir = workspace_root.join(&config.worktrees_dir_name);
    if !worktrees_dir.is_dir() {
        return Ok(WorkspaceScan {
            has_worktrees_directory: false,
            rows: Vec::new(),
        });
    }

    let entries =
        fs::read_dir(&worktrees_dir).map_err(|error| read_directory_error(&worktrees_dir, error))?;

    let mut rows = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|error| read_directory_error(&worktrees_dir, error))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let worktree = entry.file_name().to_string_lossy().to_string();
        let status = if path.join(GROOVE_DIR_NAME).is_dir() {
            WorktreeScanStatus::Paused
        } else {
            WorktreeScanStatus::Corrupted
        };

        rows.push(WorkspaceScanRow {
            branch_guess: branch_guess_from_name(&worktree),
            path,
            status,
            worktree,
        });
    }

    rows.sort_by(|left, right| left.worktree.cmp(&right.worktree));

    Ok(WorkspaceScan {
        has_worktrees_directory: true,
        rows,
    })
}
