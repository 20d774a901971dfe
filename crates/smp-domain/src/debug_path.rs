//! Recognise which toolchain convention produced a source-map path.

use semver::Version;

use crate::path::normalize_path;

/// Sysroot prefix rustc substitutes for its own source tree.
pub const TOOLCHAIN_PREFIX: &str = "/rustc/";
/// Where cargo unpacks registry dependencies once `$CARGO_HOME` is remapped.
pub const REGISTRY_SRC_PREFIX: &str = "/cargo/registry/src/";
const REGISTRY_INDEX_DIRS: &[&str] = &["github.com-", "index.crates.io-"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugPath<'a> {
    /// `/rustc/<hex-revision>/<rest>`; `path` is `/<rest>` normalized.
    Toolchain { revision: &'a str, path: String },
    /// `/cargo/registry/src/<index>-<hash>/<crate>-<version><rest>`.
    Registry {
        krate: &'a str,
        version: &'a str,
        path: String,
    },
    /// Inside the build root; `relative` has no leading slash.
    BuildRoot { relative: &'a str },
    Unrecognized,
}

impl DebugPath<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Toolchain { .. } => "toolchain",
            Self::Registry { .. } => "registry",
            Self::BuildRoot { .. } => "build-root",
            Self::Unrecognized => "unrecognized",
        }
    }
}

/// Classify `path`; the first matching convention wins, in the order
/// toolchain, registry, build root.
pub fn classify_debug_path<'a>(path: &'a str, build_root: &str) -> DebugPath<'a> {
    if let Some(toolchain) = toolchain_path(path) {
        return toolchain;
    }
    if let Some(registry) = registry_path(path) {
        return registry;
    }
    if !build_root.is_empty() {
        if let Some(relative) = path
            .strip_prefix(build_root)
            .and_then(|rest| rest.strip_prefix('/'))
        {
            return DebugPath::BuildRoot { relative };
        }
    }
    DebugPath::Unrecognized
}

fn toolchain_path(path: &str) -> Option<DebugPath<'_>> {
    let rest = path.strip_prefix(TOOLCHAIN_PREFIX)?;
    let (revision, tail) = rest.split_once('/')?;
    if revision.is_empty() || !revision.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    let tail = tail.trim_start_matches('/');
    Some(DebugPath::Toolchain {
        revision,
        path: normalize_path(&format!("/{tail}")).into_owned(),
    })
}

fn registry_path(path: &str) -> Option<DebugPath<'_>> {
    let rest = path.strip_prefix(REGISTRY_SRC_PREFIX)?;
    let (index_dir, rest) = rest.split_once('/')?;
    let known_index = REGISTRY_INDEX_DIRS.iter().any(|prefix| {
        index_dir
            .strip_prefix(prefix)
            .is_some_and(|hash| !hash.is_empty())
    });
    if !known_index {
        return None;
    }
    let (package_dir, tail) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };
    let (krate, version) = split_package_dir(package_dir)?;
    Some(DebugPath::Registry {
        krate,
        version,
        path: normalize_path(tail).into_owned(),
    })
}

/// Split `<crate>-<version>` at the first `-` whose remainder is a semver
/// version. Crate names may contain `-<digit>` (`sha-1`), and so may build
/// metadata (`0.14.2+wasi-0.2.4`).
fn split_package_dir(dir: &str) -> Option<(&str, &str)> {
    dir.match_indices('-')
        .map(|(idx, _)| (&dir[..idx], &dir[idx + 1..]))
        .find(|(krate, version)| !krate.is_empty() && Version::parse(version).is_ok())
}
