//! `derrick-client` — presentation-layer data fetching.
//!
//! Wraps the Derrick HTTP API with the fetch discipline the dashboard needs:
//!
//! - bounded retry with exponential backoff, for transient failures only;
//! - per-resource cancellation: a new fetch for the same logical resource
//!   aborts the in-flight one, so the last request *started* wins, not the
//!   last one that happens to finish;
//! - a three-way failure classification (sign in / complete setup / retry)
//!   that is never collapsed into one generic error.

pub mod error;
pub mod fetch;

pub use error::{FetchError, UserAction};
pub use fetch::{Fetcher, RetryPolicy};
