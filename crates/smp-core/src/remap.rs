use std::sync::Arc;

use futures::future::try_join_all;
use smp_domain::{classify_debug_path, DebugPath, RepoInfo, RepoRef};
use tracing::{debug, info};

use crate::cache::InflightCache;
use crate::effects::RemoteEffects;
use crate::{Config, RemapError};

/// One remap run: the remote seam, configuration and the run-scoped caches.
///
/// Caches live exactly as long as the `Remapper`; separate instances never
/// share lookups.
pub struct Remapper<E> {
    pub(crate) effects: E,
    pub(crate) config: Config,
    pub(crate) crates: InflightCache<String, RepoRef>,
    pub(crate) repos: InflightCache<(RepoRef, String), Arc<RepoInfo>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemapSummary {
    pub entries: usize,
    pub remapped: usize,
    pub unchanged: usize,
}

impl<E: RemoteEffects> Remapper<E> {
    pub fn new(effects: E, config: Config) -> Self {
        Self {
            effects,
            config,
            crates: InflightCache::new(),
            repos: InflightCache::new(),
        }
    }

    #[must_use]
    pub fn effects(&self) -> &E {
        &self.effects
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve one source-map entry.
    ///
    /// Toolchain and registry paths become raw-content urls, build-root paths
    /// become relative, anything else is returned as given.
    pub async fn remap_debug_path(&self, path: &str) -> Result<String, RemapError> {
        let classified = classify_debug_path(path, self.config.build_root());
        debug!(path, kind = classified.kind(), "classified");
        match classified {
            DebugPath::Toolchain {
                revision,
                path: inner,
            } => {
                self.resolve_repo_path(&self.config.toolchain_repo, revision, &inner)
                    .await
            }
            DebugPath::Registry {
                krate,
                version,
                path: inner,
            } => {
                let repo = self.resolve_crate(krate).await?;
                let revision = self.crate_revision(krate, version, &repo).await?;
                self.resolve_repo_path(&repo, &revision, &inner).await
            }
            DebugPath::BuildRoot { relative } => Ok(relative.to_string()),
            DebugPath::Unrecognized => Ok(path.to_string()),
        }
    }

    /// Resolve every entry concurrently, keeping input order.
    ///
    /// `None` entries pass through. The first failure fails the whole batch.
    pub async fn remap_sources(
        &self,
        sources: &[Option<String>],
    ) -> Result<(Vec<Option<String>>, RemapSummary), RemapError> {
        let resolved = try_join_all(sources.iter().map(|source| async move {
            match source {
                Some(path) => self.remap_debug_path(path).await.map(Some),
                None => Ok(None),
            }
        }))
        .await?;
        let unchanged = sources
            .iter()
            .zip(&resolved)
            .filter(|(before, after)| before == after)
            .count();
        let summary = RemapSummary {
            entries: sources.len(),
            remapped: sources.len() - unchanged,
            unchanged,
        };
        info!(
            entries = summary.entries,
            remapped = summary.remapped,
            unchanged = summary.unchanged,
            crates = self.crates.len(),
            trees = self.repos.len(),
            "remapped sources"
        );
        Ok((resolved, summary))
    }
}
