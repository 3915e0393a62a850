//! Error handling for the cache engine and its storage adapters
//!
//! Every variant carries the context needed to decide between retrying and
//! abandoning (key, operation, path or endpoint) plus a recovery hint.

mod conversions;
mod display;
mod recovery;
mod types;

pub use types::*;
