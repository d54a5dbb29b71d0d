//! Single-post source.

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::{ApiClient, PostInfoSource};
use crate::error::Result;
use crate::pages::{Page, PageSource};

/// Degenerate page source for a single post.
///
/// Yields exactly one page holding the post's detailed record, then ends.
pub struct PostPages {
    api: Arc<ApiClient>,
    shortcode: String,
    done: bool,
}

impl PostPages {
    pub fn new(api: Arc<ApiClient>, shortcode: String) -> Self {
        Self {
            api,
            shortcode,
            done: false,
        }
    }
}

#[async_trait]
impl PageSource for PostPages {
    async fn next_page(&mut self) -> Result<Option<Page>> {
        if self.done {
            return Ok(None);
        }
        self.done = true;

        let record = self.api.get_post_info(&self.shortcode).await?;
        Ok(Some(Page {
            items: vec![record],
            has_next: false,
            end_cursor: None,
        }))
    }
}
