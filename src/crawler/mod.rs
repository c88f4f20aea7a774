//! Crawler module for rule interpretation
//!
//! This module contains the core grabbing logic, including:
//! - HTTP fetching of pages and files
//! - HTML parsing and query evaluation
//! - Action dispatching (print, log, download)
//! - Recursive interpretation of action trees
//! - Overall run coordination

mod context;
mod coordinator;
mod dispatcher;
mod fetcher;
mod interpreter;
mod parser;

pub use context::{GrabContext, TargetScope};
pub use coordinator::{run_targets, Coordinator, RunReport};
pub use dispatcher::Dispatcher;
pub use fetcher::{build_http_client, fetch_page, fetch_to_file};
pub use interpreter::{Interpreter, ProcessFuture};
pub use parser::{query_page, Document, Extract, Query};
