use std::path::{Path, PathBuf};

use crate::workspace::SearchContext;

/// Lookup seam for callers that resolve the same workspace repeatedly.
///
/// Resolution never trusts a cached root blindly: a hit is re-inspected
/// against the request before it is returned, and a stale hit falls through
/// to a full search.
pub trait RootCache {
    fn lookup(&self, key: &str) -> Option<PathBuf>;
    fn store(&self, key: &str, workspace_root: &Path);
}

/// Per-request isolation: nothing is remembered between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl RootCache for NoCache {
    fn lookup(&self, _key: &str) -> Option<PathBuf> {
        None
    }

    fn store(&self, _key: &str, _workspace_root: &Path) {}
}

impl<C: RootCache + ?Sized> RootCache for &C {
    fn lookup(&self, key: &str) -> Option<PathBuf> {
        (**self).lookup(key)
    }

    fn store(&self, key: &str, workspace_root: &Path) {
        (**self).store(key, workspace_root)
    }
}

/// Stable key covering every input that influences the resolved root.
pub fn root_cache_key(context: &SearchContext) -> String {
    let meta_key = context
        .expected_metadata()
        .map(|meta| {
            format!(
                "{}:{}:{}:{}",
                meta.version.map(|v| v.to_string()).unwrap_or_default(),
                meta.root_name.as_deref().unwrap_or_default(),
                meta.created_at.as_deref().unwrap_or_default(),
                meta.updated_at.as_deref().unwrap_or_default(),
            )
        })
        .unwrap_or_default();

    format!(
        "name={}\nknown={}\nrequired={}\nflow={}\nmeta={}",
        context.target_name(),
        context.known_worktrees().join("|"),
        context.required_worktree().unwrap_or_default(),
        context.flow().as_str(),
        meta_key,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::common::dtos::{DiscoveryFlow, WorkspaceMetadata};

    #[test]
    fn key_is_order_insensitive_for_known_worktrees() {
        let first = SearchContext::new("proj", &["b".to_string(), "a".to_string()], None).unwrap();
        let second = SearchContext::new("proj", &["a".to_string(), "b".to_string()], None).unwrap();
        assert_eq!(root_cache_key(&first), root_cache_key(&second));
    }

    #[test]
    fn key_separates_flows_and_metadata() {
        let list = SearchContext::new("proj", &[], None).unwrap();
        let create = list.clone().with_flow(DiscoveryFlow::Create);
        assert_ne!(root_cache_key(&list), root_cache_key(&create));

        let meta = WorkspaceMetadata {
            version: Some(2),
            ..WorkspaceMetadata::default()
        };
        let with_meta = SearchContext::new("proj", &[], Some(meta)).unwrap();
        assert_ne!(root_cache_key(&list), root_cache_key(&with_meta));
    }

    #[test]
    fn no_cache_never_hits() {
        let cache = NoCache;
        cache.store("key", Path::new("/tmp"));
        assert_eq!(cache.lookup("key"), None);
    }
}
