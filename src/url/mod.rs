//! URL handling module for the grabber
//!
//! This module resolves extracted matches against the page they came from and
//! derives download file names from URLs.

mod filename;
mod resolve;

// Re-export main functions
pub use filename::file_name_for;
pub use resolve::resolve_match;
