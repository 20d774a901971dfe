use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context};
use smp_domain::RepoRef;

use crate::net;

pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";
pub const DEFAULT_CRATES_API: &str = "https://crates.io";
pub const DEFAULT_RAW_HOST: &str = "https://raw.githubusercontent.com";
pub const DEFAULT_TOOLCHAIN_REPO: &str = "rust-lang/rust";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_CONCURRENCY: usize = 16;

#[derive(Debug, Clone)]
pub(crate) struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub(crate) fn capture() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    pub(crate) fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    fn non_empty(&self, key: &str) -> Option<&str> {
        self.var(key).map(str::trim).filter(|value| !value.is_empty())
    }

    #[cfg(test)]
    pub(crate) fn testing(pairs: &[(&str, &str)]) -> Self {
        let vars = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { vars }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) build_root: String,
    pub(crate) toolchain_repo: RepoRef,
    pub(crate) endpoints: EndpointConfig,
    pub(crate) network: NetworkConfig,
}

impl Config {
    /// Builds a configuration snapshot from the current process environment.
    ///
    /// # Errors
    /// Returns an error if the working directory cannot be read or a variable
    /// holds a value of the wrong shape.
    pub fn from_env() -> anyhow::Result<Self> {
        let snapshot = EnvSnapshot::capture();
        let cwd = env::current_dir().context("failed to read the current directory")?;
        Self::from_snapshot(&snapshot, &cwd)
    }

    pub(crate) fn from_snapshot(snapshot: &EnvSnapshot, cwd: &Path) -> anyhow::Result<Self> {
        let build_root = snapshot
            .non_empty("SMP_BUILD_ROOT")
            .map_or_else(|| cwd.to_string_lossy().into_owned(), ToOwned::to_owned);
        let toolchain_repo = snapshot
            .non_empty("SMP_TOOLCHAIN_REPO")
            .unwrap_or(DEFAULT_TOOLCHAIN_REPO)
            .parse::<RepoRef>()
            .context("SMP_TOOLCHAIN_REPO")?;
        let timeout_secs = parse_number(snapshot, "SMP_HTTP_TIMEOUT", DEFAULT_TIMEOUT_SECS)?;
        let max_concurrency =
            parse_number(snapshot, "SMP_MAX_CONCURRENCY", DEFAULT_MAX_CONCURRENCY)?;
        if max_concurrency == 0 {
            return Err(anyhow!("SMP_MAX_CONCURRENCY must be at least 1"));
        }
        Ok(Self {
            build_root: trim_build_root(&build_root),
            toolchain_repo,
            endpoints: EndpointConfig {
                github_api: snapshot
                    .non_empty("SMP_GITHUB_API")
                    .unwrap_or(DEFAULT_GITHUB_API)
                    .to_string(),
                crates_api: snapshot
                    .non_empty("SMP_CRATES_API")
                    .unwrap_or(DEFAULT_CRATES_API)
                    .to_string(),
                raw_host: snapshot
                    .non_empty("SMP_RAW_HOST")
                    .unwrap_or(DEFAULT_RAW_HOST)
                    .to_string(),
            },
            network: NetworkConfig {
                timeout: Duration::from_secs(timeout_secs),
                max_concurrency,
                github_token: snapshot.non_empty("GITHUB_TOKEN").map(ToOwned::to_owned),
                keep_proxies: net::keep_proxies(snapshot),
            },
        })
    }

    /// Default endpoints and limits for a build invoked from `build_root`.
    #[must_use]
    pub fn for_build_root(build_root: impl AsRef<str>) -> Self {
        Self {
            build_root: trim_build_root(build_root.as_ref()),
            toolchain_repo: RepoRef::new("rust-lang", "rust"),
            endpoints: EndpointConfig {
                github_api: DEFAULT_GITHUB_API.to_string(),
                crates_api: DEFAULT_CRATES_API.to_string(),
                raw_host: DEFAULT_RAW_HOST.to_string(),
            },
            network: NetworkConfig {
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                max_concurrency: DEFAULT_MAX_CONCURRENCY,
                github_token: None,
                keep_proxies: false,
            },
        }
    }

    #[must_use]
    pub fn build_root(&self) -> &str {
        &self.build_root
    }

    #[must_use]
    pub fn toolchain_repo(&self) -> &RepoRef {
        &self.toolchain_repo
    }

    #[must_use]
    pub fn endpoints(&self) -> &EndpointConfig {
        &self.endpoints
    }

    #[must_use]
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }
}

#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub github_api: String,
    pub crates_api: String,
    pub raw_host: String,
}

#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub timeout: Duration,
    pub max_concurrency: usize,
    pub github_token: Option<String>,
    pub keep_proxies: bool,
}

fn parse_number<T>(snapshot: &EnvSnapshot, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
{
    match snapshot.non_empty(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| anyhow!("{key} must be a non-negative integer (got '{raw}')")),
        None => Ok(default),
    }
}

// "/" collapses to "" so that no absolute path is mistaken for a build-root path.
fn trim_build_root(root: &str) -> String {
    root.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn defaults_apply_without_overrides() {
        let snapshot = EnvSnapshot::testing(&[]);
        let config = Config::from_snapshot(&snapshot, Path::new("/work/app/")).unwrap();
        assert_eq!(config.build_root(), "/work/app");
        assert_eq!(config.toolchain_repo(), &RepoRef::new("rust-lang", "rust"));
        assert_eq!(config.endpoints().github_api, DEFAULT_GITHUB_API);
        assert_eq!(config.endpoints().crates_api, DEFAULT_CRATES_API);
        assert_eq!(config.endpoints().raw_host, DEFAULT_RAW_HOST);
        assert_eq!(config.network().timeout, Duration::from_secs(30));
        assert_eq!(config.network().max_concurrency, 16);
        assert!(config.network().github_token.is_none());
    }

    #[test]
    fn overrides_are_read_from_the_snapshot() {
        let snapshot = EnvSnapshot::testing(&[
            ("SMP_BUILD_ROOT", "/srv/build"),
            ("SMP_TOOLCHAIN_REPO", "acme/toolchain"),
            ("SMP_GITHUB_API", "http://127.0.0.1:9000"),
            ("SMP_HTTP_TIMEOUT", "5"),
            ("SMP_MAX_CONCURRENCY", "2"),
            ("GITHUB_TOKEN", "ghp_example"),
        ]);
        let config = Config::from_snapshot(&snapshot, Path::new("/ignored")).unwrap();
        assert_eq!(config.build_root(), "/srv/build");
        assert_eq!(config.toolchain_repo(), &RepoRef::new("acme", "toolchain"));
        assert_eq!(config.endpoints().github_api, "http://127.0.0.1:9000");
        assert_eq!(config.network().timeout, Duration::from_secs(5));
        assert_eq!(config.network().max_concurrency, 2);
        assert_eq!(
            config.network().github_token.as_deref(),
            Some("ghp_example")
        );
    }

    #[test]
    fn rejects_malformed_numbers_and_repos() {
        for pairs in [
            [("SMP_HTTP_TIMEOUT", "soon")],
            [("SMP_MAX_CONCURRENCY", "0")],
            [("SMP_TOOLCHAIN_REPO", "rust")],
        ] {
            let snapshot = EnvSnapshot::testing(&pairs);
            assert!(
                Config::from_snapshot(&snapshot, Path::new("/w")).is_err(),
                "{pairs:?} should be rejected"
            );
        }
    }

    #[test]
    fn filesystem_root_never_matches_as_build_root() {
        let snapshot = EnvSnapshot::testing(&[]);
        let config = Config::from_snapshot(&snapshot, Path::new("/")).unwrap();
        assert_eq!(config.build_root(), "");
    }

    #[test]
    #[serial]
    fn from_env_reads_process_environment() {
        let previous = env::var("SMP_BUILD_ROOT").ok();
        env::set_var("SMP_BUILD_ROOT", "/from/env");
        let config = Config::from_env();
        match previous {
            Some(value) => env::set_var("SMP_BUILD_ROOT", value),
            None => env::remove_var("SMP_BUILD_ROOT"),
        }
        assert_eq!(config.unwrap().build_root(), "/from/env");
    }
}
