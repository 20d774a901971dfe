use std::collections::BTreeMap;
use std::sync::Arc;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use smp_domain::RepoRef;
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use url::Url;

use crate::config::{Config, EndpointConfig};
use crate::remote::{ContentsResponse, CrateResponse, TreeResponse, SUBMODULE_ENTRY};
use crate::{net, RemapError};

const GITMODULES_PATH: &str = ".gitmodules";

/// The three remote lookups a remap run depends on.
///
/// Every call is a suspension point; nothing else in a run awaits.
#[allow(async_fn_in_trait)]
pub trait RemoteEffects {
    /// The `repository` field the package registry holds for `krate`.
    async fn crate_repository(&self, krate: &str) -> Result<Option<String>, RemapError>;

    /// Text of `.gitmodules` at `revision`; `None` when the file does not exist.
    async fn gitmodules(&self, repo: &RepoRef, revision: &str)
        -> Result<Option<String>, RemapError>;

    /// Every gitlink in the tree at `revision`, keyed by tree path, valued by
    /// pinned commit.
    async fn submodule_commits(
        &self,
        repo: &RepoRef,
        revision: &str,
    ) -> Result<BTreeMap<String, String>, RemapError>;
}

/// HTTP implementation against the crates.io and GitHub REST APIs.
pub struct SystemEffects {
    client: Client,
    endpoints: EndpointConfig,
    github_token: Option<String>,
    permits: Arc<Semaphore>,
}

impl SystemEffects {
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let network = config.network();
        Ok(Self {
            client: net::build_http_client(network)?,
            endpoints: config.endpoints().clone(),
            github_token: network.github_token.clone(),
            permits: Arc::new(Semaphore::new(network.max_concurrency)),
        })
    }

    fn github_request(&self, url: &Url) -> RequestBuilder {
        let request = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        match &self.github_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send `request` and decode a JSON body. Statuses listed in `missing`
    /// yield `Ok(None)`.
    async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        request: RequestBuilder,
        missing: &[StatusCode],
    ) -> Result<Option<T>, RemapError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|err| request_error(url, &err))?;
        debug!(%url, "GET");
        let response = request.send().await.map_err(|err| request_error(url, &err))?;
        let status = response.status();
        if missing.contains(&status) {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(RemapError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|err| RemapError::MalformedResponse {
                url: url.to_string(),
                message: err.to_string(),
            })
    }
}

impl RemoteEffects for SystemEffects {
    async fn crate_repository(&self, krate: &str) -> Result<Option<String>, RemapError> {
        let url = endpoint(&self.endpoints.crates_api, &["api", "v1", "crates", krate])?;
        let request = self.client.get(url.clone());
        let Some(body) = self
            .fetch_json::<CrateResponse>(&url, request, &[StatusCode::NOT_FOUND])
            .await?
        else {
            return Err(RemapError::UnknownCrate {
                krate: krate.to_string(),
            });
        };
        Ok(body.krate.repository)
    }

    async fn gitmodules(
        &self,
        repo: &RepoRef,
        revision: &str,
    ) -> Result<Option<String>, RemapError> {
        let mut url = endpoint(
            &self.endpoints.github_api,
            &["repos", &repo.owner, &repo.name, "contents", GITMODULES_PATH],
        )?;
        url.query_pairs_mut().append_pair("ref", revision);
        let request = self.github_request(&url);
        let body: Option<ContentsResponse> = self
            .fetch_json(&url, request, &[StatusCode::NOT_FOUND])
            .await?;
        body.map(|body| body.decode())
            .transpose()
            .map_err(|message| RemapError::MalformedResponse {
                url: url.to_string(),
                message,
            })
    }

    async fn submodule_commits(
        &self,
        repo: &RepoRef,
        revision: &str,
    ) -> Result<BTreeMap<String, String>, RemapError> {
        let mut url = endpoint(
            &self.endpoints.github_api,
            &["repos", &repo.owner, &repo.name, "git", "trees", revision],
        )?;
        url.query_pairs_mut().append_pair("recursive", "1");
        let request = self.github_request(&url);
        let missing = [StatusCode::NOT_FOUND, StatusCode::UNPROCESSABLE_ENTITY];
        let Some(body) = self
            .fetch_json::<TreeResponse>(&url, request, &missing)
            .await?
        else {
            return Err(RemapError::RevisionNotFound {
                repo: repo.clone(),
                revision: revision.to_string(),
            });
        };
        if body.truncated {
            warn!(%repo, revision, "tree listing truncated; deep submodules may be missed");
        }
        Ok(body
            .tree
            .into_iter()
            .filter(|entry| entry.kind == SUBMODULE_ENTRY)
            .map(|entry| (entry.path, entry.sha))
            .collect())
    }
}

fn endpoint(base: &str, segments: &[&str]) -> Result<Url, RemapError> {
    let mut url = Url::parse(base).map_err(|err| RemapError::Request {
        url: base.to_string(),
        message: format!("invalid base url: {err}"),
    })?;
    url.path_segments_mut()
        .map_err(|()| RemapError::Request {
            url: base.to_string(),
            message: "base url cannot carry a path".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn request_error(url: &Url, err: &dyn std::fmt::Display) -> RemapError {
    RemapError::Request {
        url: url.to_string(),
        message: err.to_string(),
    }
}
