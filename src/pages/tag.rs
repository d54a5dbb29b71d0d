//! Tag feed pagination.

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::ApiClient;
use crate::error::Result;
use crate::pages::{Page, PageSource};

/// Pages over the feed of posts carrying a given tag.
pub struct TagPages {
    api: Arc<ApiClient>,
    tag: String,
    cursor: Option<String>,
    exhausted: bool,
}

impl TagPages {
    pub fn new(api: Arc<ApiClient>, tag: String) -> Self {
        Self {
            api,
            tag,
            cursor: None,
            exhausted: false,
        }
    }
}

#[async_trait]
impl PageSource for TagPages {
    async fn next_page(&mut self) -> Result<Option<Page>> {
        if self.exhausted {
            return Ok(None);
        }

        let page = self.api.tag_page(&self.tag, self.cursor.as_deref()).await?;

        self.exhausted = !page.has_next || page.end_cursor.is_none();
        self.cursor = page.end_cursor.clone();

        Ok(Some(page))
    }
}
