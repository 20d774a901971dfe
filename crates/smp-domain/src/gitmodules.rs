//! Tolerant reader for `.gitmodules` declaration files.
//!
//! Only the two fields needed for remapping are extracted from each
//! `[submodule "<name>"]` section: `path` and `url`. A section missing either
//! field, or whose url is not a GitHub repository url, is reported in
//! [`ParsedGitmodules::skipped`] instead of failing the whole file.

use crate::repo::{parse_repository_url, RepoRef};

/// A submodule section with both required fields present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmoduleDecl {
    pub name: Option<String>,
    /// Relative to the repository root, without leading or trailing slash.
    pub path: String,
    pub repo: RepoRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingPath,
    MissingUrl,
    UnsupportedUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDecl {
    pub name: Option<String>,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedGitmodules {
    /// Declaration order.
    pub declared: Vec<SubmoduleDecl>,
    pub skipped: Vec<SkippedDecl>,
}

#[derive(Default)]
struct Section {
    name: Option<String>,
    path: Option<String>,
    url: Option<String>,
}

impl Section {
    fn finish(self, parsed: &mut ParsedGitmodules) {
        let name = self.name;
        let Some(path) = self.path.filter(|path| !path.is_empty()) else {
            parsed.skipped.push(SkippedDecl {
                name,
                reason: SkipReason::MissingPath,
            });
            return;
        };
        let Some(url) = self.url.filter(|url| !url.is_empty()) else {
            parsed.skipped.push(SkippedDecl {
                name,
                reason: SkipReason::MissingUrl,
            });
            return;
        };
        match parse_repository_url(&url) {
            Ok(repo) => parsed.declared.push(SubmoduleDecl { name, path, repo }),
            Err(_) => parsed.skipped.push(SkippedDecl {
                name,
                reason: SkipReason::UnsupportedUrl(url),
            }),
        }
    }
}

pub fn parse_gitmodules(text: &str) -> ParsedGitmodules {
    let mut parsed = ParsedGitmodules::default();
    let mut current: Option<Section> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(header) = line.strip_prefix('[') {
            if let Some(section) = current.take() {
                section.finish(&mut parsed);
            }
            current = submodule_header(header).map(|name| Section {
                name,
                ..Section::default()
            });
            continue;
        }
        let Some(section) = current.as_mut() else {
            continue;
        };
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = unquote(value.trim());
        match key.trim().to_ascii_lowercase().as_str() {
            "path" if section.path.is_none() => {
                section.path = Some(value.trim_matches('/').to_string());
            }
            "url" if section.url.is_none() => section.url = Some(value.to_string()),
            _ => {}
        }
    }
    if let Some(section) = current {
        section.finish(&mut parsed);
    }
    parsed
}

/// `Some(name)` for a `[submodule ...]` header body, `None` for any other
/// section kind.
fn submodule_header(header: &str) -> Option<Option<String>> {
    let body = header.trim_end().strip_suffix(']').unwrap_or(header).trim();
    let rest = body.strip_prefix("submodule")?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) && !rest.starts_with('"') {
        return None;
    }
    let name = unquote(rest.trim());
    Some((!name.is_empty()).then(|| name.to_string()))
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}
