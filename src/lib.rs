//! instalooter-rs - media discovery and download for paginated feeds.
//!
//! This library discovers content items exposed through a paginated remote
//! feed (a profile, a tag, or a single post) and downloads the matching
//! items with a bounded pool of concurrent workers.
//!
//! # Pipeline
//!
//! A [`pages::PageSource`] produces pages lazily; a [`media::MediaFlattener`]
//! turns them into an ordered record sequence; the fill engine filters,
//! refetches and deduplicates records into a work queue; and a
//! [`download::WorkerPool`] drains the queue concurrently.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use instalooter::{ApiClient, DownloadRequest, Looter, LooterOptions, RetryPolicy};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = Arc::new(ApiClient::new(
//!         "instalooter-rs/0.1",
//!         Duration::from_secs(30),
//!         RetryPolicy::default(),
//!     )?);
//!
//!     let mut looter = Looter::profile(api, "someuser", LooterOptions::default())?;
//!     let queued = looter.download("./downloads", DownloadRequest::default()).await?;
//!     println!("queued {} posts", queued);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod looter;
pub mod media;
pub mod output;
pub mod pages;

// Re-exports for convenience
pub use api::{ApiClient, RetryPolicy};
pub use error::{Error, Result};
pub use looter::{DownloadRequest, Looter, LooterOptions, MediaFilter, Target};
pub use media::{MediaFlattener, MediaKind, MediaRecord, TimeWindow};
pub use pages::{Page, PageSource};
