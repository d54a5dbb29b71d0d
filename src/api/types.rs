//! API response type definitions.

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::media::{parse_media_node, MediaRecord};
use crate::pages::Page;

/// Pagination state attached to a media connection.
#[derive(Debug, Clone, Deserialize)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// A paginated batch of media nodes.
#[derive(Debug, Deserialize)]
pub struct MediaConnection {
    #[serde(default)]
    pub count: Option<u64>,
    pub page_info: PageInfo,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// A single edge wrapping a raw media node.
#[derive(Debug, Deserialize)]
pub struct Edge {
    pub node: Value,
}

impl MediaConnection {
    /// Convert this connection into a `Page` of summary records.
    ///
    /// Nodes that fail to parse are dropped with a warning rather than
    /// failing the whole page.
    pub fn into_page(self) -> Page {
        let mut items = Vec::with_capacity(self.edges.len());
        for edge in self.edges {
            match parse_media_node(&edge.node, false) {
                Ok(record) => items.push(record),
                Err(e) => tracing::warn!("Skipping unparseable media node: {}", e),
            }
        }
        Page {
            items,
            has_next: self.page_info.has_next_page,
            end_cursor: self.page_info.end_cursor,
        }
    }
}

/// Profile feed page envelope.
#[derive(Debug, Deserialize)]
pub struct ProfilePageResponse {
    pub data: ProfilePageData,
}

#[derive(Debug, Deserialize)]
pub struct ProfilePageData {
    pub user: ProfileMediaHolder,
}

#[derive(Debug, Deserialize)]
pub struct ProfileMediaHolder {
    pub edge_owner_to_timeline_media: MediaConnection,
}

/// Tag feed page envelope.
#[derive(Debug, Deserialize)]
pub struct TagPageResponse {
    pub data: TagPageData,
}

#[derive(Debug, Deserialize)]
pub struct TagPageData {
    pub hashtag: TagMediaHolder,
}

#[derive(Debug, Deserialize)]
pub struct TagMediaHolder {
    pub edge_hashtag_to_media: MediaConnection,
}

/// Single post envelope, as returned by the post info endpoint.
#[derive(Debug, Deserialize)]
pub struct PostResponse {
    pub graphql: PostGraphql,
}

#[derive(Debug, Deserialize)]
pub struct PostGraphql {
    pub shortcode_media: Value,
}

impl PostResponse {
    /// Parse the wrapped node into a detailed media record.
    pub fn into_record(self) -> Result<MediaRecord> {
        parse_media_node(&self.graphql.shortcode_media, true)
    }
}

/// Profile lookup envelope, used by the resolve step.
#[derive(Debug, Deserialize)]
pub struct ProfileResponse {
    pub graphql: ProfileGraphql,
}

#[derive(Debug, Deserialize)]
pub struct ProfileGraphql {
    pub user: ProfileInfo,
}

/// Owner identity resolved before profile pagination begins.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileInfo {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub is_private: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_connection_into_page_drops_bad_nodes() {
        let conn: MediaConnection = serde_json::from_value(json!({
            "count": 3,
            "page_info": {"has_next_page": true, "end_cursor": "XYZ"},
            "edges": [
                {"node": {"id": "1", "shortcode": "a", "is_video": false}},
                {"node": {"shortcode": "broken"}},
                {"node": {"id": "2", "shortcode": "b", "is_video": true}},
            ]
        }))
        .unwrap();

        let page = conn.into_page();
        assert_eq!(page.items.len(), 2);
        assert!(page.has_next);
        assert_eq!(page.end_cursor.as_deref(), Some("XYZ"));
    }

    #[test]
    fn test_post_response_parses_detailed_record() {
        let resp: PostResponse = serde_json::from_value(json!({
            "graphql": {"shortcode_media": {
                "id": "7", "shortcode": "code7", "__typename": "GraphVideo",
                "video_url": "https://example.com/v.mp4"
            }}
        }))
        .unwrap();

        let rec = resp.into_record().unwrap();
        assert!(rec.full);
        assert!(rec.is_video());
    }
}
