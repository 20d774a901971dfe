use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Context};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::effects::{RemoteEffects, SystemEffects};
use crate::{Config, RemapError, RemapSummary, Remapper};

const SOURCES_KEY: &str = "sources";

/// A source map document. Every field other than `sources` is carried
/// through untouched and in the order it was read.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMap {
    fields: Map<String, Value>,
    sources: Vec<Option<String>>,
}

impl SourceMap {
    pub fn parse(text: &str) -> Result<Self, RemapError> {
        let value: Value =
            serde_json::from_str(text).map_err(|err| RemapError::SourceMap(err.to_string()))?;
        let Value::Object(fields) = value else {
            return Err(RemapError::SourceMap(
                "top-level value is not an object".to_string(),
            ));
        };
        let sources = match fields.get(SOURCES_KEY) {
            Some(Value::Array(entries)) => entries
                .iter()
                .enumerate()
                .map(|(index, entry)| match entry {
                    Value::String(path) => Ok(Some(path.clone())),
                    Value::Null => Ok(None),
                    other => Err(RemapError::SourceMap(format!(
                        "`sources[{index}]` is not a string: {other}"
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(RemapError::SourceMap(
                    "`sources` is not an array".to_string(),
                ))
            }
            None => return Err(RemapError::SourceMap("missing `sources`".to_string())),
        };
        Ok(Self { fields, sources })
    }

    #[must_use]
    pub fn sources(&self) -> &[Option<String>] {
        &self.sources
    }

    pub fn set_sources(&mut self, sources: Vec<Option<String>>) {
        let entries = sources
            .iter()
            .map(|entry| entry.clone().map_or(Value::Null, Value::String))
            .collect();
        self.fields
            .insert(SOURCES_KEY.to_string(), Value::Array(entries));
        self.sources = sources;
    }

    #[must_use]
    pub fn to_json(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }
}

/// Rewrite every entry of `map.sources` in place.
///
/// `map` is left untouched when any entry fails.
pub async fn remap_source_map<E: RemoteEffects>(
    remapper: &Remapper<E>,
    map: &mut SourceMap,
) -> Result<RemapSummary, RemapError> {
    let (resolved, summary) = remapper.remap_sources(map.sources()).await?;
    map.set_sources(resolved);
    Ok(summary)
}

/// Read the map at `input`, resolve it against the live services and write
/// the result to `output`.
///
/// Nothing is written unless every entry resolved.
///
/// # Errors
/// Returns an error if either file cannot be accessed, the input is not a
/// source map, or any entry fails to resolve.
pub fn remap_source_map_file(
    input: &Path,
    output: &Path,
    config: Config,
) -> anyhow::Result<RemapSummary> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let mut map = SourceMap::parse(&text)?;
    debug!(path = %input.display(), entries = map.sources().len(), "loaded source map");

    let effects = SystemEffects::new(&config)?;
    let remapper = Remapper::new(effects, config);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let summary = runtime.block_on(remap_source_map(&remapper, &mut map))?;

    write_atomically(output, &map.to_json())?;
    info!(path = %output.display(), "wrote source map");
    Ok(summary)
}

fn write_atomically(dest: &Path, contents: &str) -> anyhow::Result<()> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create a temporary file in {}", dir.display()))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write {}", tmp.path().display()))?;
    tmp.persist(dest)
        .map_err(|err| anyhow!("unable to persist {}: {}", dest.display(), err.error))?;
    Ok(())
}
