//! Paginated feed sources.
//!
//! A `PageSource` produces a lazy, forward-only sequence of pages from one
//! remote collection. Every source owns its cursor chain and is bound to a
//! single pass; abandoning it mid-sequence is the only way back.

pub mod post;
pub mod profile;
pub mod tag;

pub use post::PostPages;
pub use profile::ProfilePages;
pub use tag::TagPages;

use async_trait::async_trait;

use crate::error::Result;
use crate::media::MediaRecord;

/// One batch of paginated results plus continuation state.
///
/// Immutable after creation; `end_cursor` is consumed at most once, by the
/// source that produced the page.
#[derive(Debug)]
pub struct Page {
    /// Media records in feed order.
    pub items: Vec<MediaRecord>,

    /// Whether the remote collection has further pages.
    pub has_next: bool,

    /// Opaque continuation token for the next page, if any.
    pub end_cursor: Option<String>,
}

/// Produces an ordered sequence of pages from a remote collection.
///
/// Stateful and single-pass: `next_page` advances the cursor chain and
/// `Ok(None)` marks the end of the sequence. A page fetch failure surfaces
/// as [`crate::Error::SourceUnavailable`] and is fatal to this source
/// instance; retries, if any, belong to the transport layer.
#[async_trait]
pub trait PageSource: Send {
    async fn next_page(&mut self) -> Result<Option<Page>>;
}

#[async_trait]
impl PageSource for Box<dyn PageSource> {
    async fn next_page(&mut self) -> Result<Option<Page>> {
        (**self).next_page().await
    }
}
