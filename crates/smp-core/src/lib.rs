#![deny(clippy::all, warnings)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

mod cache;
mod config;
mod effects;
mod error;
mod net;
mod registry;
mod remap;
mod remote;
mod resolve;
mod source_map;
mod submodules;
#[cfg(test)]
mod test_support;

pub use crate::config::{Config, EndpointConfig, NetworkConfig};
pub use crate::effects::{RemoteEffects, SystemEffects};
pub use crate::error::RemapError;
pub use crate::remap::{RemapSummary, Remapper};
pub use crate::source_map::{remap_source_map, remap_source_map_file, SourceMap};
