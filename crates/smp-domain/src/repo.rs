use std::fmt;
use std::str::FromStr;

use url::Url;

const GITHUB_HOSTS: &[&str] = &["github.com", "www.github.com"];

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum RepoUrlError {
    #[error("repository url must look like 'https://github.com/<owner>/<name>' (got '{url}')")]
    NotGithub { url: String },
    #[error("repository must be written as '<owner>/<name>' (got '{slug}')")]
    InvalidSlug { slug: String },
}

/// A hosting repository, identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoRef {
    type Err = RepoUrlError;

    fn from_str(slug: &str) -> Result<Self, Self::Err> {
        let invalid = || RepoUrlError::InvalidSlug {
            slug: slug.to_string(),
        };
        let (owner, name) = slug.trim().split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        Ok(Self::new(owner, name))
    }
}

/// Extract `owner/name` from a `https://github.com/<owner>/<name>[.git]` url.
///
/// Anything after the second path segment (`/tree/main/crates/foo`) is ignored,
/// as are trailing slashes.
pub fn parse_repository_url(raw: &str) -> Result<RepoRef, RepoUrlError> {
    let trimmed = raw.trim();
    let not_github = || RepoUrlError::NotGithub {
        url: trimmed.to_string(),
    };
    let url = Url::parse(trimmed).map_err(|_| not_github())?;
    if !matches!(url.scheme(), "https" | "http") {
        return Err(not_github());
    }
    let host = url.host_str().unwrap_or_default();
    if !GITHUB_HOSTS
        .iter()
        .any(|known| host.eq_ignore_ascii_case(known))
    {
        return Err(not_github());
    }
    let mut segments = url
        .path_segments()
        .into_iter()
        .flatten()
        .filter(|segment| !segment.is_empty());
    let owner = segments.next().ok_or_else(not_github)?;
    let name = segments.next().ok_or_else(not_github)?;
    let name = name.strip_suffix(".git").unwrap_or(name);
    if name.is_empty() {
        return Err(not_github());
    }
    Ok(RepoRef::new(owner, name))
}

/// Raw-content url for a file at `path` (leading slash) in `repo` at `revision`.
pub fn raw_content_url(base: &str, repo: &RepoRef, revision: &str, path: &str) -> String {
    format!(
        "{}/{}/{}/{}{}",
        base.trim_end_matches('/'),
        repo.owner,
        repo.name,
        revision,
        path
    )
}

/// A pinned sub-repository mounted inside a parent tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmoduleMount {
    /// Relative to the parent tree root, no leading or trailing slash.
    pub mount_path: String,
    pub target: RepoRef,
    pub pinned_revision: String,
}

impl SubmoduleMount {
    /// If `path` lives under `/<mount_path>/`, return the remainder inside the
    /// submodule, keeping its leading slash.
    pub fn strip_mount<'a>(&self, path: &'a str) -> Option<&'a str> {
        let inner = path
            .strip_prefix('/')?
            .strip_prefix(self.mount_path.as_str())?;
        inner.starts_with('/').then_some(inner)
    }
}

/// Submodule mounts of one repository revision, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoInfo {
    mounts: Vec<SubmoduleMount>,
}

impl RepoInfo {
    pub fn new(mounts: Vec<SubmoduleMount>) -> Self {
        Self { mounts }
    }

    pub fn mounts(&self) -> &[SubmoduleMount] {
        &self.mounts
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }

    /// First mount, in declaration order, containing `path`, together with the
    /// path relative to that mount. Nested mounts are reached by recursing into
    /// the submodule, never by scanning this list further.
    pub fn find_mount<'a>(&self, path: &'a str) -> Option<(&SubmoduleMount, &'a str)> {
        self.mounts
            .iter()
            .find_map(|mount| mount.strip_mount(path).map(|inner| (mount, inner)))
    }
}
