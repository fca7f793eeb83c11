use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::backend::common::constants::MAX_SEARCH_BASE_ANCESTORS;

/// Directories most likely to contain a workspace root, nearest first:
/// the cwd, up to three of its ancestors, then the home directory.
pub(crate) fn build_likely_search_bases() -> Vec<PathBuf> {
    let home = home_dir_from(std::env::var_os("HOME"), std::env::var_os("USERPROFILE"));
    search_bases_from(std::env::current_dir().ok(), home)
}

/// Only absolute paths are kept, each once.
pub(crate) fn search_bases_from(cwd: Option<PathBuf>, home: Option<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let ancestors = cwd.iter().flat_map(|cwd| {
        cwd.ancestors()
            .take(MAX_SEARCH_BASE_ANCESTORS + 1)
            .map(Path::to_path_buf)
    });

    ancestors
        .chain(home)
        .filter(|base| base.is_absolute())
        .filter(|base| seen.insert(base.clone()))
        .collect()
}

fn absolute_dir(value: Option<OsString>) -> Option<PathBuf> {
    value.map(PathBuf::from).filter(|path| path.is_absolute())
}

/// `HOME`, else `USERPROFILE`; empty or relative values are skipped.
fn home_dir_from(home: Option<OsString>, user_profile: Option<OsString>) -> Option<PathBuf> {
    absolute_dir(home).or_else(|| absolute_dir(user_profile))
}
