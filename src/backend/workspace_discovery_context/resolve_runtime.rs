use std::path::PathBuf;
use std::time::Instant;

use crate::backend::common::constants::MAX_AMBIGUITY_PREVIEW;
use crate::backend::common::dtos::{CandidateRoot, Resolution, ResolveRequest, ResolvedBy};
use crate::backend::runtime_cache_dedupe::cache_scope::{root_cache_key, NoCache, RootCache};
use crate::backend::workspace_discovery_context::discovery_runtime::{
    discover_workspace_root_candidates, inspect_candidate_root,
};
use crate::backend::workspace_discovery_context::discovery_scope::build_likely_search_bases;
use crate::config::DiscoveryConfig;
use crate::error::{Error, Result};
use crate::workspace::{validate_known_worktrees, validate_workspace_root_path, SearchContext};

/// Narrows validated candidates down to a single root.
///
/// A unique metadata match beats any number of other candidates. When
/// that fails, the preview lists the strongest evidence available: plural
/// metadata matches, then candidates with any metadata, then everything.
pub(crate) fn disambiguate(
    root_name: &str,
    candidates: &[CandidateRoot],
) -> Result<(PathBuf, ResolvedBy)> {
    if candidates.is_empty() {
        return Err(Error::NoMatch {
            root_name: root_name.to_string(),
        });
    }

    if candidates.len() == 1 {
        return Ok((candidates[0].root_path.clone(), ResolvedBy::SingleCandidate));
    }

    let metadata_matches = candidates
        .iter()
        .filter(|candidate| candidate.matches_workspace_meta)
        .collect::<Vec<_>>();
    if metadata_matches.len() == 1 {
        return Ok((metadata_matches[0].root_path.clone(), ResolvedBy::MetadataMatch));
    }

    let candidates_with_meta = candidates
        .iter()
        .filter(|candidate| candidate.has_workspace_meta)
        .collect::<Vec<_>>();
    let mut diagnostics = if metadata_matches.len() > 1 {
        metadata_matches
    } else if !candidates_with_meta.is_empty() {
        candidates_with_meta
    } else {
        candidates.iter().collect::<Vec<_>>()
    };
    diagnostics.sort_by(|a, b| a.root_path.cmp(&b.root_path));

    let preview = diagnostics
        .iter()
        .take(MAX_AMBIGUITY_PREVIEW)
        .map(|candidate| candidate.root_path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");

    Err(Error::Ambiguous {
        count: candidates.len(),
        preview,
    })
}

/// Resolves workspace roots by name with a bounded filesystem search.
pub struct WorkspaceResolver<C = NoCache> {
    config: DiscoveryConfig,
    search_bases: Option<Vec<PathBuf>>,
    cache: C,
}

impl WorkspaceResolver<NoCache> {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self {
            config,
            search_bases: None,
            cache: NoCache,
        }
    }
}

impl Default for WorkspaceResolver<NoCache> {
    fn default() -> Self {
        Self::new(DiscoveryConfig::from_env())
    }
}

impl<C: RootCache> WorkspaceResolver<C> {
    pub fn with_cache<D: RootCache>(self, cache: D) -> WorkspaceResolver<D> {
        WorkspaceResolver {
            config: self.config,
            search_bases: self.search_bases,
            cache,
        }
    }

    /// Replaces the cwd/ancestors/home bases with a fixed list.
    pub fn with_search_bases(mut self, bases: Vec<PathBuf>) -> Self {
        self.search_bases = Some(bases);
        self
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    fn search_bases(&self) -> Vec<PathBuf> {
        self.search_bases
            .clone()
            .unwrap_or_else(build_likely_search_bases)
    }

    /// Every candidate root for `context`, sorted by path.
    pub fn candidates(&self, context: &SearchContext) -> Vec<CandidateRoot> {
        discover_workspace_root_candidates(&self.search_bases(), context, &self.config)
    }

    /// Validates a raw request, then resolves it.
    ///
    /// An explicit `workspaceRoot` skips the search entirely and is only
    /// checked for being an absolute, existing directory.
    pub fn resolve_request(&self, request: &ResolveRequest) -> Result<Resolution> {
        let known_worktrees = validate_known_worktrees(&request.known_worktrees)?;

        if let Some(explicit) = request
            .workspace_root
            .as_deref()
            .filter(|value| !value.trim().is_empty())
        {
            return Ok(Resolution {
                workspace_root: validate_workspace_root_path(explicit)?,
                resolved_by: ResolvedBy::ExplicitRoot,
            });
        }

        let mut context = SearchContext::new(
            request.root_name.as_deref().unwrap_or_default(),
            &known_worktrees,
            request.workspace_meta.clone(),
        )?
        .with_flow(request.flow);
        if let Some(worktree) = request.required_worktree.as_deref() {
            context = context.with_required_worktree(worktree)?;
        }

        self.resolve(&context)
    }

    pub fn resolve(&self, context: &SearchContext) -> Result<Resolution> {
        let started_at = Instant::now();
        let cache_key = root_cache_key(context);

        if let Some(cached) = self.cache.lookup(&cache_key) {
            if inspect_candidate_root(&cached, context, &self.config).is_some() {
                tracing::debug!(
                    event = "resolve_workspace_root",
                    root_name = context.target_name(),
                    cache_hit = true,
                    "resolved workspace root from cache"
                );
                return Ok(Resolution {
                    workspace_root: cached,
                    resolved_by: ResolvedBy::Cache,
                });
            }
        }

        let candidates = self.candidates(context);
        let outcome = disambiguate(context.target_name(), &candidates);

        match &outcome {
            Ok((workspace_root, resolved_by)) => {
                self.cache.store(&cache_key, workspace_root);
                tracing::debug!(
                    event = "resolve_workspace_root",
                    root_name = context.target_name(),
                    candidates = candidates.len(),
                    resolved_by = ?resolved_by,
                    elapsed_ms = started_at.elapsed().as_millis() as u64,
                    "resolved workspace root"
                );
            }
            Err(error) => {
                tracing::info!(
                    event = "resolve_workspace_root",
                    root_name = context.target_name(),
                    candidates = candidates.len(),
                    elapsed_ms = started_at.elapsed().as_millis() as u64,
                    %error,
                    "workspace root resolution failed"
                );
            }
        }

        outcome.map(|(workspace_root, resolved_by)| Resolution {
            workspace_root,
            resolved_by,
        })
    }
}
