use smp_domain::{raw_content_url, RepoRef};
use tracing::trace;

use crate::effects::RemoteEffects;
use crate::{RemapError, Remapper};

impl<E: RemoteEffects> Remapper<E> {
    /// Raw-content url for `path` (leading slash) inside `repo` at `revision`.
    ///
    /// A chain of submodules is walked like a chain of mounts: when the first
    /// mount containing `path` is found, resolution restarts inside the
    /// mounted repository at its pinned commit with the mount prefix removed.
    /// Each step strictly shortens `path`, so the walk always ends.
    pub async fn resolve_repo_path(
        &self,
        repo: &RepoRef,
        revision: &str,
        path: &str,
    ) -> Result<String, RemapError> {
        let info = self.repo_info(repo, revision).await?;
        let Some((mount, inner)) = info.find_mount(path) else {
            return Ok(raw_content_url(
                &self.config.endpoints().raw_host,
                repo,
                revision,
                path,
            ));
        };
        trace!(%repo, revision, mount = %mount.mount_path, target = %mount.target, "descending");
        Box::pin(self.resolve_repo_path(&mount.target, &mount.pinned_revision, inner)).await
    }
}
