use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::config::DiscoveryConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct WalkOutcome {
    /// Directories named like the target, in walk order.
    pub(crate) matches: Vec<PathBuf>,
    /// Directories examined across all bases.
    pub(crate) scanned: usize,
    pub(crate) cap_reached: bool,
}

fn canonical_or_raw(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn should_descend(
    entry: &DirEntry,
    config: &DiscoveryConfig,
    visited: &mut HashSet<PathBuf>,
) -> bool {
    if entry.depth() == 0 {
        return true;
    }

    if entry.path_is_symlink() || !entry.file_type().is_dir() {
        return false;
    }

    if config.is_skipped(&entry.file_name().to_string_lossy()) {
        return false;
    }

    visited.insert(canonical_or_raw(entry.path()))
}

/// Depth-first search of every base for directories named `target_name`.
///
/// Symlinks and block-listed names are pruned without being read, each
/// canonical directory is visited at most once across all bases, and the
/// walk stops for good once `config.max_directories` directories have been
/// examined. Unreadable directories are treated as empty.
pub(crate) fn walk_for_directory_name(
    bases: &[PathBuf],
    target_name: &str,
    config: &DiscoveryConfig,
) -> WalkOutcome {
    let mut visited = HashSet::<PathBuf>::new();
    let mut outcome = WalkOutcome::default();

    'bases: for base in bases {
        if outcome.scanned >= config.max_directories {
            outcome.cap_reached = true;
            break;
        }

        if !base.is_dir() || !visited.insert(canonical_or_raw(base)) {
            continue;
        }

        let walker = WalkDir::new(base)
            .follow_links(false)
            .max_depth(config.max_depth + 1)
            .into_iter()
            .filter_entry(|entry| should_descend(entry, config, &mut visited));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    tracing::trace!(
                        base = %base.display(),
                        %error,
                        "skipping unreadable directory"
                    );
                    continue;
                }
            };

            outcome.scanned += 1;

            if entry.file_name().to_string_lossy() == target_name {
                outcome.matches.push(entry.path().to_path_buf());
            }

            if outcome.scanned >= config.max_directories {
                outcome.cap_reached = true;
                break 'bases;
            }
        }
    }

    if outcome.cap_reached {
        tracing::debug!(
            event = "discovery_walk",
            scanned = outcome.scanned,
            cap = config.max_directories,
            "directory scan cap reached; results may be partial"
        );
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn mkdirs(root: &Path, relative: &[&str]) {
        for path in relative {
            fs::create_dir_all(root.join(path)).unwrap();
        }
    }

    fn small_config(max_depth: usize, max_directories: usize) -> DiscoveryConfig {
        DiscoveryConfig {
            max_depth,
            max_directories,
            ..DiscoveryConfig::default()
        }
    }

    fn sorted(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
        paths.sort();
        paths
    }

    #[test]
    fn finds_every_directory_with_the_target_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        mkdirs(&root, &["a/proj", "b/c/proj", "b/project", "proj"]);
        fs::write(root.join("b/proj"), "not a directory").unwrap();

        let outcome = walk_for_directory_name(
            &[root.clone()],
            "proj",
            &DiscoveryConfig::default(),
        );

        assert_eq!(
            sorted(outcome.matches),
            vec![root.join("a/proj"), root.join("b/c/proj"), root.join("proj")]
        );
        assert!(!outcome.cap_reached);
    }

    #[test]
    fn never_enters_block_listed_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        mkdirs(
            &root,
            &["node_modules/proj", ".git/proj", "dist/deep/proj", "src/proj"],
        );

        let outcome =
            walk_for_directory_name(&[root.clone()], "proj", &DiscoveryConfig::default());
        assert_eq!(outcome.matches, vec![root.join("src/proj")]);
    }

    #[test]
    fn block_list_applies_even_when_name_is_the_target() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        mkdirs(&root, &["work/dist/.worktrees"]);

        let outcome =
            walk_for_directory_name(&[root.clone()], "dist", &DiscoveryConfig::default());
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn respects_directory_cap() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        for index in 0..20 {
            mkdirs(&root, &[&format!("d{index}/proj")]);
        }

        let outcome = walk_for_directory_name(&[root.clone()], "proj", &small_config(4, 7));
        assert_eq!(outcome.scanned, 7);
        assert!(outcome.cap_reached);
        assert!(outcome.matches.len() < 20);
    }

    #[test]
    fn reads_no_deeper_than_max_depth() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        mkdirs(&root, &["l1/proj", "l1/l2/proj", "l1/l2/l3/proj"]);

        let outcome = walk_for_directory_name(&[root.clone()], "proj", &small_config(1, 100));
        assert_eq!(sorted(outcome.matches), vec![root.join("l1/proj")]);

        let outcome = walk_for_directory_name(&[root.clone()], "proj", &small_config(2, 100));
        assert_eq!(
            sorted(outcome.matches),
            vec![root.join("l1/l2/proj"), root.join("l1/proj")]
        );
    }

    #[test]
    fn overlapping_bases_are_walked_once() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        mkdirs(&root, &["inner/proj", "other"]);

        let bases = vec![root.join("inner"), root.clone(), root.join("inner")];
        let outcome = walk_for_directory_name(&bases, "proj", &DiscoveryConfig::default());
        assert_eq!(outcome.matches, vec![root.join("inner/proj")]);
        // inner, inner/proj, root, other
        assert_eq!(outcome.scanned, 4);
    }

    #[test]
    fn missing_bases_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = walk_for_directory_name(
            &[dir.path().join("missing")],
            "proj",
            &DiscoveryConfig::default(),
        );
        assert_eq!(outcome, WalkOutcome::default());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_never_followed_or_reported() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        mkdirs(&root, &["real/proj", "outside/proj"]);
        std::os::unix::fs::symlink(root.join("outside"), root.join("real/link")).unwrap();
        std::os::unix::fs::symlink(root.join("real/proj"), root.join("real/linked-proj"))
            .unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("real/proj-loop")).unwrap();

        let outcome = walk_for_directory_name(
            &[root.join("real")],
            "proj",
            &DiscoveryConfig::default(),
        );
        assert_eq!(outcome.matches, vec![root.join("real/proj")]);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directories_count_as_empty() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        mkdirs(&root, &["a/locked/proj", "a/proj", "b/proj/proj", "c/proj"]);

        let locked = [root.join("a/locked"), root.join("b/proj")];
        for path in &locked {
            fs::set_permissions(path, fs::Permissions::from_mode(0o000)).unwrap();
        }
        // Privileged users read mode-0 directories anyway.
        let privileged = fs::read_dir(&locked[0]).is_ok();

        let outcome =
            walk_for_directory_name(&[root.clone()], "proj", &DiscoveryConfig::default());

        for path in &locked {
            fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
        }
        if privileged {
            return;
        }

        assert_eq!(
            sorted(outcome.matches),
            vec![root.join("a/proj"), root.join("b/proj"), root.join("c/proj")]
        );
        assert!(!outcome.cap_reached);
    }
}
