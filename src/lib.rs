//! Extract version strings from project metadata files
//!
//! Project types are described by [`config::ProjectDescriptor`]s; the
//! [`extractor::VersionExtractor`] walks them in priority order and falls back to
//! the latest Git tag for projects whose version is computed at build time.

pub mod config;
pub mod extractor;
pub mod fs;
pub mod git;
pub mod logging;
pub mod output;
pub mod version;

pub use config::{Config, ConfigError, ProjectDescriptor};
pub use extractor::{ExtractionResult, VersionExtractor, VersionSource};
pub use version::error::ExtractError;
