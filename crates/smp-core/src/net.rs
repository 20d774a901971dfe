use anyhow::{Context, Result};
use reqwest::Client;

use crate::config::{EnvSnapshot, NetworkConfig};

const PROXY_KEYS: &[&str] = &[
    "HTTP_PROXY",
    "http_proxy",
    "HTTPS_PROXY",
    "https_proxy",
    "ALL_PROXY",
    "all_proxy",
    "NO_PROXY",
    "no_proxy",
];

/// Decide whether outbound requests should honor standard proxy environment
/// variables.
///
/// Behavior:
/// - `SMP_KEEP_PROXIES=1/true/yes/on` forces proxies on.
/// - `SMP_KEEP_PROXIES=0/false/no/off/""` forces proxies off.
/// - If unset, proxies are enabled only when at least one proxy env var is set.
pub(crate) fn keep_proxies(snapshot: &EnvSnapshot) -> bool {
    match snapshot.var("SMP_KEEP_PROXIES") {
        Some(raw) => {
            let value = raw.trim().to_ascii_lowercase();
            !matches!(value.as_str(), "" | "0" | "false" | "no" | "off")
        }
        None => PROXY_KEYS.iter().any(|key| {
            snapshot
                .var(key)
                .is_some_and(|value| !value.trim().is_empty())
        }),
    }
}

pub(crate) fn build_http_client(network: &NetworkConfig) -> Result<Client> {
    let mut builder = Client::builder()
        .user_agent(format!("smp/{}", env!("CARGO_PKG_VERSION")))
        .timeout(network.timeout);
    if !network.keep_proxies {
        builder = builder.no_proxy();
    }
    builder.build().context("failed to build HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keep_proxies_defaults_to_enabled_when_proxy_env_is_set() {
        let snapshot = EnvSnapshot::testing(&[("HTTPS_PROXY", "http://proxy.example")]);
        assert!(keep_proxies(&snapshot));
    }

    #[test]
    fn keep_proxies_defaults_to_disabled_without_proxy_env() {
        let snapshot = EnvSnapshot::testing(&[("NO_PROXY", "  ")]);
        assert!(!keep_proxies(&snapshot));
    }

    #[test]
    fn keep_proxies_env_var_forces_enabled() {
        let snapshot = EnvSnapshot::testing(&[("SMP_KEEP_PROXIES", "yes")]);
        assert!(keep_proxies(&snapshot));
    }

    #[test]
    fn keep_proxies_env_var_forces_disabled() {
        let snapshot = EnvSnapshot::testing(&[
            ("SMP_KEEP_PROXIES", "off"),
            ("HTTP_PROXY", "http://proxy.example"),
        ]);
        assert!(!keep_proxies(&snapshot));
    }
}
