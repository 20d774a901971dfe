//! Wire shapes of the package registry and repository host APIs.

use base64::Engine as _;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct CrateResponse {
    #[serde(rename = "crate")]
    pub krate: CrateMetadata,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CrateMetadata {
    pub repository: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentsResponse {
    pub content: String,
    pub encoding: Option<String>,
}

impl ContentsResponse {
    /// Decoded file text; the host wraps base64 payloads across lines.
    pub(crate) fn decode(&self) -> Result<String, String> {
        if let Some(encoding) = self.encoding.as_deref() {
            if encoding != "base64" {
                return Err(format!("unsupported content encoding '{encoding}'"));
            }
        }
        let compact: Vec<u8> = self
            .content
            .bytes()
            .filter(|byte| !byte.is_ascii_whitespace())
            .collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(compact)
            .map_err(|err| format!("invalid base64 content: {err}"))?;
        String::from_utf8(bytes).map_err(|err| format!("content is not UTF-8: {err}"))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TreeResponse {
    pub tree: Vec<TreeEntry>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
}

/// Tree entry type of a pinned sub-repository (a gitlink).
pub(crate) const SUBMODULE_ENTRY: &str = "commit";
