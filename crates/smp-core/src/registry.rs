use smp_domain::{parse_repository_url, RepoRef};
use tracing::debug;

use crate::effects::RemoteEffects;
use crate::{RemapError, Remapper};

impl<E: RemoteEffects> Remapper<E> {
    /// Repository hosting the source of registry package `krate`.
    ///
    /// One registry lookup per crate per run, shared by concurrent callers.
    pub async fn resolve_crate(&self, krate: &str) -> Result<RepoRef, RemapError> {
        self.crates
            .get_or_fetch(krate.to_string(), move || async move {
                let declared = self.effects.crate_repository(krate).await?;
                let Some(url) = declared else {
                    return Err(RemapError::MissingRepository {
                        krate: krate.to_string(),
                    });
                };
                let repo = parse_repository_url(&url).map_err(|source| {
                    RemapError::InvalidRepositoryUrl {
                        krate: krate.to_string(),
                        source,
                    }
                })?;
                debug!(krate, %repo, "resolved crate repository");
                Ok(repo)
            })
            .await
    }

    /// Revision in `repo` holding the published `version` of `krate`.
    ///
    /// Releases are expected to be tagged with the bare version or a `v`
    /// prefixed one; the first candidate whose tree exists wins.
    pub(crate) async fn crate_revision(
        &self,
        krate: &str,
        version: &str,
        repo: &RepoRef,
    ) -> Result<String, RemapError> {
        let candidates = [version.to_string(), format!("v{version}")];
        for candidate in &candidates {
            match self.repo_info(repo, candidate).await {
                Ok(_) => return Ok(candidate.clone()),
                Err(RemapError::RevisionNotFound { .. }) => {
                    debug!(krate, %repo, revision = %candidate, "no such revision");
                }
                Err(err) => return Err(err),
            }
        }
        Err(RemapError::CrateRevisionNotFound {
            krate: krate.to_string(),
            version: version.to_string(),
            repo: repo.clone(),
            tried: candidates.join(", "),
        })
    }
}
