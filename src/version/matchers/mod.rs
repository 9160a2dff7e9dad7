//! Version matching strategies

pub mod pattern;
pub mod pyproject;

pub use pattern::PatternMatcher;
pub use pyproject::PyprojectMatcher;
