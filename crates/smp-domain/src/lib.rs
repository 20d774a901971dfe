#![deny(clippy::all, warnings)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod debug_path;
pub mod gitmodules;
pub mod path;
pub mod repo;

pub use debug_path::{classify_debug_path, DebugPath, REGISTRY_SRC_PREFIX, TOOLCHAIN_PREFIX};
pub use gitmodules::{parse_gitmodules, ParsedGitmodules, SkipReason, SkippedDecl, SubmoduleDecl};
pub use path::normalize_path;
pub use repo::{
    parse_repository_url, raw_content_url, RepoInfo, RepoRef, RepoUrlError, SubmoduleMount,
};
