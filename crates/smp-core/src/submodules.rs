use std::collections::BTreeMap;
use std::sync::Arc;

use smp_domain::{parse_gitmodules, RepoInfo, RepoRef, SubmoduleMount};
use tracing::{debug, warn};

use crate::effects::RemoteEffects;
use crate::{RemapError, Remapper};

impl<E: RemoteEffects> Remapper<E> {
    /// Submodule mounts of `repo` at `revision`, fetched at most once per run.
    pub async fn repo_info(
        &self,
        repo: &RepoRef,
        revision: &str,
    ) -> Result<Arc<RepoInfo>, RemapError> {
        let key = (repo.clone(), revision.to_string());
        self.repos
            .get_or_fetch(key, move || async move {
                let text = self.effects.gitmodules(repo, revision).await?;
                let commits = self.effects.submodule_commits(repo, revision).await?;
                let info = join_mounts(repo, revision, text.as_deref(), &commits);
                debug!(%repo, revision, mounts = info.mounts().len(), "loaded submodules");
                Ok(Arc::new(info))
            })
            .await
    }
}

/// Pair each declared submodule with the commit its tree pins it at.
///
/// Declarations the parser rejects, and declarations with no gitlink in the
/// tree, are dropped; paths under them resolve against `repo` itself.
fn join_mounts(
    repo: &RepoRef,
    revision: &str,
    gitmodules: Option<&str>,
    commits: &BTreeMap<String, String>,
) -> RepoInfo {
    let Some(text) = gitmodules else {
        return RepoInfo::default();
    };
    let parsed = parse_gitmodules(text);
    for skipped in &parsed.skipped {
        debug!(
            %repo,
            revision,
            submodule = skipped.name.as_deref().unwrap_or("?"),
            reason = ?skipped.reason,
            "skipping submodule declaration"
        );
    }
    let mounts = parsed
        .declared
        .into_iter()
        .filter_map(|decl| match commits.get(&decl.path) {
            Some(commit) => Some(SubmoduleMount {
                mount_path: decl.path,
                target: decl.repo,
                pinned_revision: commit.clone(),
            }),
            None => {
                warn!(
                    %repo,
                    revision,
                    path = %decl.path,
                    "declared submodule has no pinned commit in the tree; ignoring it"
                );
                None
            }
        })
        .collect();
    RepoInfo::new(mounts)
}
