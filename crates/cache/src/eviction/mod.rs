//! Eviction policies for cache capacity management
//!
//! Policies are pure: they rank candidate entries and pick victims, and
//! never touch the entry map or the storage adapter themselves.

mod factory;
mod policies;
mod traits;

// Re-export public API
pub use factory::create_eviction_policy;
pub use policies::{LfuPolicy, LruPolicy};
pub use traits::{EvictionCandidate, EvictionPolicy};
