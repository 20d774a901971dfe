use smp_domain::{RepoRef, RepoUrlError};

/// Unrecovered failures of a remap run.
///
/// `Clone` so one memoized failure can be handed to every caller waiting on
/// the same lookup; transport errors are carried as rendered messages.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RemapError {
    #[error("crate '{krate}' is not published on the registry")]
    UnknownCrate { krate: String },
    #[error("crate '{krate}' does not declare a repository on the registry")]
    MissingRepository { krate: String },
    #[error("repository of crate '{krate}' cannot be remapped: {source}")]
    InvalidRepositoryUrl {
        krate: String,
        #[source]
        source: RepoUrlError,
    },
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("unexpected response from {url}: {message}")]
    MalformedResponse { url: String, message: String },
    #[error("revision '{revision}' does not exist in {repo}")]
    RevisionNotFound { repo: RepoRef, revision: String },
    #[error("crate '{krate}' {version} has no matching revision in {repo} (tried {tried})")]
    CrateRevisionNotFound {
        krate: String,
        version: String,
        repo: RepoRef,
        tried: String,
    },
    #[error("invalid source map: {0}")]
    SourceMap(String),
}

impl RemapError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownCrate { .. }
            | Self::MissingRepository { .. }
            | Self::InvalidRepositoryUrl { .. } => "SMP101",
            Self::Request { .. } | Self::Status { .. } => "SMP201",
            Self::MalformedResponse { .. } => "SMP202",
            Self::RevisionNotFound { .. } | Self::CrateRevisionNotFound { .. } => "SMP301",
            Self::SourceMap(_) => "SMP401",
        }
    }

    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::UnknownCrate { .. } => {
                Some("Vendored or path dependencies cannot be looked up on the registry.")
            }
            Self::MissingRepository { .. } | Self::InvalidRepositoryUrl { .. } => {
                Some("Only crates hosted on GitHub can be remapped to raw-content urls.")
            }
            Self::Request { .. } => {
                Some("Check network access, or raise SMP_HTTP_TIMEOUT for slow links.")
            }
            Self::Status { status: 403 | 429, .. } => {
                Some("The API rate limit may be exhausted; set GITHUB_TOKEN to raise it.")
            }
            Self::CrateRevisionNotFound { .. } => {
                Some("The crate's repository has no tag named after the published version.")
            }
            Self::SourceMap(_) => Some("The input must be a JSON object with a `sources` array."),
            Self::Status { .. } | Self::MalformedResponse { .. } | Self::RevisionNotFound { .. } => {
                None
            }
        }
    }
}
