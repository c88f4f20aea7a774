//! Configuration module for the grabber
//!
//! This module handles loading, parsing, and validating rule files, and holds
//! the run options set from the command line.
//!
//! # Example
//!
//! ```no_run
//! use grabber::config::load_rules;
//! use std::path::Path;
//!
//! let targets = load_rules(Path::new("rules.json")).unwrap();
//! for target in &targets {
//!     println!("{} -> {}", target.name, target.url);
//! }
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Action, ActionKind, GrabberConfig, Mode, Target, DEFAULT_WORKERS};

// Re-export parser functions
pub use parser::{
    compute_rules_hash, load_rules, load_rules_with_hash, parse_json_rules, parse_toml_rules,
};
pub use validation::{validate, validate_grabber_config, MAX_WORKERS};
