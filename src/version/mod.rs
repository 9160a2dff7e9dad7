//! Version matching layer
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   Matchers   │────▶│ PatternCache │◀────│   Dynamic    │
//! │ (static ver) │     │   (regex)    │     │  (detector)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │    semver    │
//! │(clean/check) │
//! └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: compiled regex cache shared across matchers
//! - [`dynamic`]: dynamic versioning indicators
//! - [`matcher`]: matching trait and strategy selection
//! - [`matchers`]: generic regex and `pyproject.toml` strategies
//! - [`error`]: extraction error type
//! - [`semver`]: version cleaning and validation

pub mod cache;
pub mod dynamic;
pub mod error;
pub mod matcher;
pub mod matchers;
pub mod semver;
