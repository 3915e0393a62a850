//! The cache engine
//!
//! [`CacheEngine`] owns the capacity and TTL invariants. The entry map and
//! running totals sit behind one mutex that is never held across an
//! `.await`; adapter I/O happens outside the critical section.

mod builder;
mod cleanup;
mod operations;
mod optimize;
mod types;

pub use builder::CacheEngineBuilder;
pub use optimize::OptimizeReport;
pub use types::CacheEngine;

#[cfg(test)]
mod tests;
