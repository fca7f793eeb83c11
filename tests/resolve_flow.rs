use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use groove_locate::{
    parse_groove_list_output, scan_workspace_worktrees, DiscoveryConfig, DiscoveryFlow, Error,
    ResolveRequest, ResolvedBy, RootCache, WorkspaceMetadata, WorkspaceResolver,
    WorktreeScanStatus,
};

fn workspace(root: &Path, worktrees: &[&str], meta: Option<&str>) {
    fs::create_dir_all(root.join(".worktrees")).unwrap();
    for worktree in worktrees {
        fs::create_dir_all(root.join(".worktrees").join(worktree).join(".groove")).unwrap();
    }
    if let Some(raw) = meta {
        fs::create_dir_all(root.join(".groove")).unwrap();
        fs::write(root.join(".groove/workspace.json"), raw).unwrap();
    }
}

fn resolver(base: &Path) -> WorkspaceResolver {
    WorkspaceResolver::new(DiscoveryConfig::default()).with_search_bases(vec![base.to_path_buf()])
}

fn request(root_name: &str) -> ResolveRequest {
    ResolveRequest {
        root_name: Some(root_name.to_string()),
        ..ResolveRequest::default()
    }
}

#[derive(Default)]
struct MapCache {
    entries: RefCell<HashMap<String, PathBuf>>,
}

impl RootCache for MapCache {
    fn lookup(&self, key: &str) -> Option<PathBuf> {
        self.entries.borrow().get(key).cloned()
    }

    fn store(&self, key: &str, workspace_root: &Path) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), workspace_root.to_path_buf());
    }
}

#[test]
fn resolves_then_lists_a_workspace() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().canonicalize().unwrap();
    let root = base.join("code/proj");
    workspace(&root, &["wt-login", "feature_x"], None);

    let mut request = request("proj");
    request.known_worktrees = vec!["wt-login".to_string()];
    let resolution = resolver(&base).resolve_request(&request).unwrap();
    assert_eq!(resolution.workspace_root, root);
    assert_eq!(resolution.resolved_by, ResolvedBy::SingleCandidate);

    let scan = scan_workspace_worktrees(&resolution.workspace_root, &DiscoveryConfig::default())
        .unwrap();
    let names = scan
        .rows
        .iter()
        .map(|row| (row.worktree.as_str(), row.branch_guess.as_str(), row.status.clone()))
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec![
            ("feature_x", "feature/x", WorktreeScanStatus::Paused),
            ("wt-login", "wt-login", WorktreeScanStatus::Paused),
        ]
    );

    let parsed = parse_groove_list_output(
        "- wt-login (main) | opencode: not running | log: none\n",
        &request.known_worktrees,
    )
    .unwrap();
    assert_eq!(parsed.rows["wt-login"].branch, "main");
}

#[test]
fn metadata_picks_between_same_named_roots() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().canonicalize().unwrap();
    workspace(
        &base.join("a/proj"),
        &[],
        Some(r#"{"version":1,"rootName":"proj","createdAt":"2024-01-01T00:00:00Z"}"#),
    );
    workspace(
        &base.join("b/proj"),
        &[],
        Some(r#"{"version":1,"rootName":"proj","createdAt":"2025-06-01T00:00:00Z"}"#),
    );

    let error = resolver(&base).resolve_request(&request("proj")).unwrap_err();
    assert!(matches!(error, Error::Ambiguous { count: 2, .. }));

    let mut request = request("proj");
    request.workspace_meta = Some(WorkspaceMetadata {
        created_at: Some("2025-06-01T00:00:00Z".to_string()),
        ..WorkspaceMetadata::default()
    });
    let resolution = resolver(&base).resolve_request(&request).unwrap();
    assert_eq!(resolution.workspace_root, base.join("b/proj"));
    assert_eq!(resolution.resolved_by, ResolvedBy::MetadataMatch);
}

#[test]
fn differing_updated_at_is_not_a_metadata_match() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().canonicalize().unwrap();
    workspace(
        &base.join("a/proj"),
        &[],
        Some(r#"{"rootName":"proj","updatedAt":"2024-01-01"}"#),
    );
    workspace(&base.join("b/proj"), &[], None);

    let mut stale = request("proj");
    stale.workspace_meta = Some(WorkspaceMetadata {
        root_name: Some("proj".to_string()),
        updated_at: Some("2099-12-31".to_string()),
        ..WorkspaceMetadata::default()
    });
    let error = resolver(&base).resolve_request(&stale).unwrap_err();
    assert_eq!(
        error,
        Error::Ambiguous {
            count: 2,
            preview: base.join("a/proj").display().to_string(),
        }
    );

    let mut current = stale.clone();
    current.workspace_meta = Some(WorkspaceMetadata {
        root_name: Some("proj".to_string()),
        updated_at: Some("2024-01-01".to_string()),
        ..WorkspaceMetadata::default()
    });
    let resolution = resolver(&base).resolve_request(&current).unwrap();
    assert_eq!(resolution.workspace_root, base.join("a/proj"));
    assert_eq!(resolution.resolved_by, ResolvedBy::MetadataMatch);
}

#[test]
fn create_flow_accepts_roots_without_container() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().canonicalize().unwrap();
    fs::create_dir_all(base.join("fresh/src")).unwrap();

    let error = resolver(&base).resolve_request(&request("fresh")).unwrap_err();
    assert_eq!(
        error,
        Error::NoMatch {
            root_name: "fresh".to_string()
        }
    );

    let mut create = request("fresh");
    create.flow = DiscoveryFlow::Create;
    let resolution = resolver(&base).resolve_request(&create).unwrap();
    assert_eq!(resolution.workspace_root, base.join("fresh"));
}

#[test]
fn cached_roots_are_rechecked() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().canonicalize().unwrap();
    let root = base.join("proj");
    workspace(&root, &[], None);

    let cache = MapCache::default();
    let resolver = resolver(&base).with_cache(&cache);

    let first = resolver.resolve_request(&request("proj")).unwrap();
    assert_eq!(first.resolved_by, ResolvedBy::SingleCandidate);
    let second = resolver.resolve_request(&request("proj")).unwrap();
    assert_eq!(second.resolved_by, ResolvedBy::Cache);

    fs::remove_dir_all(root.join(".worktrees")).unwrap();
    let error = resolver.resolve_request(&request("proj")).unwrap_err();
    assert!(matches!(error, Error::NoMatch { .. }));
}
