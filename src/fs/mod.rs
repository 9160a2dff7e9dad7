//! File-system access for the extraction pipeline
//!
//! - [`reader`]: size-bounded whole-file and line-by-line reads
//! - [`walker`]: project file discovery with directory skipping

pub mod reader;
pub mod walker;

pub use reader::FileReader;
pub use walker::{FilePattern, ProjectFileFinder};
