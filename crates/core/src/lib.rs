//! Core types shared by the imgcache crates.
//!
//! ## Key Components
//!
//! - **`errors`**: the `Error` enum and `Result` alias for network and
//!   format failures that cross crate boundaries.
//! - **`format`**: the `ImageFormat` enum understood by both the cache and
//!   the optimization pipeline.
//! - **`clock`**: a `Clock` seam so expiry can be tested without sleeping.
//! - **`fetch`**: the narrow adapter through which remote images are pulled.

pub mod clock;
pub mod constants;
pub mod errors;
pub mod fetch;
pub mod format;

pub use self::{
    clock::{Clock, ManualClock, SharedClock, SystemClock},
    constants::*,
    errors::{Error, Result},
    fetch::{fetch_with_timeout, FetchedImage, HttpFetcher, ImageFetcher},
    format::ImageFormat,
};
