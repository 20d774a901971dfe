use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use smp_domain::RepoRef;

use crate::effects::RemoteEffects;
use crate::RemapError;

/// Contents of one repository revision.
#[derive(Clone, Default)]
pub(crate) struct Fixture {
    gitmodules: Option<String>,
    commits: BTreeMap<String, String>,
}

impl Fixture {
    pub(crate) fn gitmodules(mut self, text: &str) -> Self {
        self.gitmodules = Some(text.to_string());
        self
    }

    pub(crate) fn commit(mut self, path: &str, sha: &str) -> Self {
        self.commits.insert(path.to_string(), sha.to_string());
        self
    }
}

#[derive(Default)]
struct Calls {
    crates: HashMap<String, usize>,
    gitmodules: HashMap<(RepoRef, String), usize>,
    trees: HashMap<(RepoRef, String), usize>,
}

/// In-memory registry and repository host that counts every call.
///
/// Unknown crates have no repository; unknown revisions do not exist.
#[derive(Default)]
pub(crate) struct FakeRemote {
    crates: HashMap<String, Option<String>>,
    trees: HashMap<(RepoRef, String), Fixture>,
    calls: Mutex<Calls>,
}

impl FakeRemote {
    pub(crate) fn with_crate(mut self, krate: &str, repository: Option<&str>) -> Self {
        self.crates
            .insert(krate.to_string(), repository.map(ToOwned::to_owned));
        self
    }

    pub(crate) fn with_tree(mut self, repo: &RepoRef, revision: &str, fixture: Fixture) -> Self {
        self.trees
            .insert((repo.clone(), revision.to_string()), fixture);
        self
    }

    pub(crate) fn crate_calls(&self, krate: &str) -> usize {
        let calls = self.calls.lock().unwrap();
        calls.crates.get(krate).copied().unwrap_or(0)
    }

    pub(crate) fn gitmodules_calls(&self, repo: &RepoRef, revision: &str) -> usize {
        let calls = self.calls.lock().unwrap();
        let key = (repo.clone(), revision.to_string());
        calls.gitmodules.get(&key).copied().unwrap_or(0)
    }

    pub(crate) fn tree_calls(&self, repo: &RepoRef, revision: &str) -> usize {
        let calls = self.calls.lock().unwrap();
        let key = (repo.clone(), revision.to_string());
        calls.trees.get(&key).copied().unwrap_or(0)
    }

    pub(crate) fn total_crate_calls(&self) -> usize {
        self.calls.lock().unwrap().crates.values().sum()
    }

    pub(crate) fn total_calls(&self) -> usize {
        let calls = self.calls.lock().unwrap();
        calls.crates.values().sum::<usize>()
            + calls.gitmodules.values().sum::<usize>()
            + calls.trees.values().sum::<usize>()
    }
}

impl RemoteEffects for FakeRemote {
    async fn crate_repository(&self, krate: &str) -> Result<Option<String>, RemapError> {
        *self
            .calls
            .lock()
            .unwrap()
            .crates
            .entry(krate.to_string())
            .or_default() += 1;
        tokio::task::yield_now().await;
        Ok(self.crates.get(krate).cloned().flatten())
    }

    async fn gitmodules(
        &self,
        repo: &RepoRef,
        revision: &str,
    ) -> Result<Option<String>, RemapError> {
        let key = (repo.clone(), revision.to_string());
        *self
            .calls
            .lock()
            .unwrap()
            .gitmodules
            .entry(key.clone())
            .or_default() += 1;
        tokio::task::yield_now().await;
        Ok(self
            .trees
            .get(&key)
            .and_then(|fixture| fixture.gitmodules.clone()))
    }

    async fn submodule_commits(
        &self,
        repo: &RepoRef,
        revision: &str,
    ) -> Result<BTreeMap<String, String>, RemapError> {
        let key = (repo.clone(), revision.to_string());
        *self.calls.lock().unwrap().trees.entry(key.clone()).or_default() += 1;
        tokio::task::yield_now().await;
        self.trees
            .get(&key)
            .map(|fixture| fixture.commits.clone())
            .ok_or_else(|| RemapError::RevisionNotFound {
                repo: repo.clone(),
                revision: revision.to_string(),
            })
    }
}
