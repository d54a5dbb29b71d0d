//! Profile feed pagination.

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::ApiClient;
use crate::error::Result;
use crate::pages::{Page, PageSource};

/// Pages over the timeline of a single profile.
pub struct ProfilePages {
    api: Arc<ApiClient>,
    owner_id: String,
    cursor: Option<String>,
    exhausted: bool,
}

impl ProfilePages {
    /// Create a source for an already-resolved owner ID.
    pub fn new(api: Arc<ApiClient>, owner_id: String) -> Self {
        Self {
            api,
            owner_id,
            cursor: None,
            exhausted: false,
        }
    }

    /// Resolve a username to its owner ID and create a source for it.
    pub async fn resolve(api: Arc<ApiClient>, username: &str) -> Result<Self> {
        let profile = api.resolve_profile(username).await?;
        Ok(Self::new(api, profile.id))
    }

    /// The owner ID this source paginates over.
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

#[async_trait]
impl PageSource for ProfilePages {
    async fn next_page(&mut self) -> Result<Option<Page>> {
        if self.exhausted {
            return Ok(None);
        }

        let page = self
            .api
            .profile_page(&self.owner_id, self.cursor.as_deref())
            .await?;

        self.exhausted = !page.has_next || page.end_cursor.is_none();
        self.cursor = page.end_cursor.clone();

        Ok(Some(page))
    }
}
