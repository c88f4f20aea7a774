//! State shared between the interpreter and the download workers
//!
//! # Components
//!
//! - `BailCounter`: per-target count of already downloaded items, used for bail-out

mod bail_counter;

pub use bail_counter::BailCounter;
