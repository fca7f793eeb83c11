use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::common::constants::GROOVE_BIN_ENV;
use crate::backend::common::dtos::{
    GrooveBinCheckStatus, GrooveBinaryResolution, GrooveBinarySource,
};

fn configured_groove_bin_path() -> Option<String> {
    std::env::var(GROOVE_BIN_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn is_attempt_ready_executable(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        if let Ok(metadata) = fs::metadata(path) {
            return metadata.permissions().mode() & 0o111 != 0;
        }

        false
    }

    #[cfg(not(unix))]
    {
        true
    }
}

fn groove_binary_names() -> Vec<String> {
    let mut names = vec!["groove".to_string()];
    #[cfg(target_os = "linux")]
    {
        names.push("groove-x86_64-unknown-linux-gnu".to_string());
        names.push("groove-aarch64-unknown-linux-gnu".to_string());
    }
    #[cfg(target_os = "macos")]
    {
        names.push("groove-aarch64-apple-darwin".to_string());
        names.push("groove-x86_64-apple-darwin".to_string());
    }
    #[cfg(target_os = "windows")]
    {
        names.push("groove-x86_64-pc-windows-msvc.exe".to_string());
        names.push("groove-aarch64-pc-windows-msvc.exe".to_string());
        names.push("groove.exe".to_string());
    }
    names
}

fn bundled_search_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            roots.push(parent.to_path_buf());
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    roots
}

pub(crate) fn resolve_groove_binary_from(
    configured: Option<String>,
    roots: &[PathBuf],
) -> GrooveBinaryResolution {
    if let Some(from_env) = configured {
        return GrooveBinaryResolution {
            path: PathBuf::from(from_env.trim()),
            source: GrooveBinarySource::Env,
        };
    }

    let names = groove_binary_names();
    for root in roots {
        for name in &names {
            for candidate in [root.join(name), root.join("binaries").join(name)] {
                if candidate.is_file() {
                    return GrooveBinaryResolution {
                        path: candidate,
                        source: GrooveBinarySource::Bundled,
                    };
                }
            }
        }
    }

    GrooveBinaryResolution {
        path: PathBuf::from("groove"),
        source: GrooveBinarySource::Path,
    }
}

/// `GROOVE_BIN`, then a `groove` binary next to this executable or in the
/// cwd (optionally under `binaries/`), then plain `groove` from `PATH`.
pub fn resolve_groove_binary() -> GrooveBinaryResolution {
    resolve_groove_binary_from(configured_groove_bin_path(), &bundled_search_roots())
}

pub fn evaluate_groove_bin_check_status() -> GrooveBinCheckStatus {
    let configured_path = configured_groove_bin_path();
    let configured_path_valid = configured_path
        .as_ref()
        .map(|path| is_attempt_ready_executable(Path::new(path.trim())));
    let has_issue = matches!(configured_path_valid, Some(false));

    let issue = has_issue.then(|| {
        format!(
            "{GROOVE_BIN_ENV} is set but does not point to an executable file. Clear {GROOVE_BIN_ENV} to use bundled/PATH resolution."
        )
    });

    let resolved = resolve_groove_binary();

    GrooveBinCheckStatus {
        configured_path,
        configured_path_valid,
        has_issue,
        issue,
        effective_binary_path: resolved.path.display().to_string(),
        effective_binary_source: resolved.source,
    }
}
