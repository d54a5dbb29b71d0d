//! Remote API access.
//!
//! This module provides:
//! - The HTTP client used for page fetches, post lookups and binary payloads
//! - Response envelope definitions
//! - The explicit retry/timeout policy applied to remote calls

pub mod client;
pub mod types;

pub use client::{ApiClient, PostInfoSource, RetryPolicy, PAGE_SIZE};
pub use types::{MediaConnection, PageInfo, ProfileInfo};
