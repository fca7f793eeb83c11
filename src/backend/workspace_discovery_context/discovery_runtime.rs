use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::backend::common::dtos::CandidateRoot;
use crate::backend::workspace_discovery_context::walk_runtime::walk_for_directory_name;
use crate::backend::workspace_metadata_settings::settings_runtime::{
    read_workspace_meta, workspace_meta_matches,
};
use crate::config::DiscoveryConfig;
use crate::workspace::SearchContext;

/// Checks that `root_path` has the shape of a workspace root for `context`.
///
/// The list flow needs the worktree container; the create flow does not,
/// but both need every required and known worktree to exist inside it.
pub(crate) fn inspect_candidate_root(
    root_path: &Path,
    context: &SearchContext,
    config: &DiscoveryConfig,
) -> Option<CandidateRoot> {
    if !root_path.is_dir() {
        return None;
    }

    let worktrees_dir = root_path.join(&config.worktrees_dir_name);
    if context.flow().requires_worktrees_dir() && !worktrees_dir.is_dir() {
        return None;
    }

    if let Some(worktree) = context.required_worktree() {
        if !worktrees_dir.join(worktree).is_dir() {
            return None;
        }
    }

    for known in context.known_worktrees() {
        if !worktrees_dir.join(known).is_dir() {
            return None;
        }
    }

    let observed = read_workspace_meta(&root_path.join(&config.metadata_file));

    Some(CandidateRoot {
        root_path: root_path
            .canonicalize()
            .unwrap_or_else(|_| root_path.to_path_buf()),
        has_workspace_meta: observed.is_some(),
        matches_workspace_meta: workspace_meta_matches(
            observed.as_ref(),
            context.expected_metadata(),
        ),
    })
}

/// Walks `bases` and returns every valid candidate, unique by canonical
/// path and sorted by path.
pub(crate) fn discover_workspace_root_candidates(
    bases: &[PathBuf],
    context: &SearchContext,
    config: &DiscoveryConfig,
) -> Vec<CandidateRoot> {
    let started_at = Instant::now();
    let walk = walk_for_directory_name(bases, context.target_name(), config);

    let mut candidates = BTreeMap::<PathBuf, CandidateRoot>::new();
    for path in &walk.matches {
        if let Some(candidate) = inspect_candidate_root(path, context, config) {
            candidates.insert(candidate.root_path.clone(), candidate);
        }
    }

    tracing::debug!(
        event = "discover_workspace_root_candidates",
        root_name = context.target_name(),
        flow = context.flow().as_str(),
        bases = bases.len(),
        scanned = walk.scanned,
        name_matches = walk.matches.len(),
        candidates = candidates.len(),
        cap_reached = walk.cap_reached,
        elapsed_ms = started_at.elapsed().as_millis() as u64,
        "collected workspace root candidates"
    );

    candidates.into_values().collect()
}
