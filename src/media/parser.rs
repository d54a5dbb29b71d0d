//! Parsing of raw feed nodes into media records.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::media::record::{MediaKind, MediaRecord};

/// Parse a raw media node into a `MediaRecord`.
///
/// `full` marks whether the node came from a detailed post fetch rather
/// than a feed page; feed summaries lack sidecar children and video URLs.
pub fn parse_media_node(node: &Value, full: bool) -> Result<MediaRecord> {
    let id = required_str(node, "id")?;
    let shortcode = required_str(node, "shortcode")?;
    let kind = parse_kind(node)?;

    let children = match node
        .get("edge_sidecar_to_children")
        .and_then(|e| e.get("edges"))
        .and_then(Value::as_array)
    {
        Some(edges) if kind == MediaKind::Sidecar => edges
            .iter()
            .filter_map(|edge| edge.get("node"))
            .map(|child| parse_media_node(child, full))
            .collect::<Result<Vec<_>>>()?,
        _ => Vec::new(),
    };

    Ok(MediaRecord {
        id,
        shortcode,
        kind,
        taken_at: parse_taken_at(node),
        display_url: optional_str(node, "display_url"),
        video_url: optional_str(node, "video_url"),
        children,
        full,
        raw: node.clone(),
    })
}

/// Determine the media kind from the type discriminator, falling back to
/// the `is_video` flag for summaries that omit it.
fn parse_kind(node: &Value) -> Result<MediaKind> {
    if let Some(typename) = node.get("__typename").and_then(Value::as_str) {
        return MediaKind::from_typename(typename)
            .ok_or_else(|| Error::Media(format!("unknown media type '{}'", typename)));
    }

    match node.get("is_video").and_then(Value::as_bool) {
        Some(true) => Ok(MediaKind::Video),
        Some(false) => Ok(MediaKind::Image),
        None => Err(Error::Media("media node has no type discriminator".into())),
    }
}

fn parse_taken_at(node: &Value) -> Option<DateTime<Utc>> {
    let ts = node.get("taken_at_timestamp").and_then(Value::as_i64)?;
    DateTime::<Utc>::from_timestamp(ts, 0)
}

fn required_str(node: &Value, key: &str) -> Result<String> {
    node.get(key)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| Error::Media(format!("media node missing '{}'", key)))
}

fn optional_str(node: &Value, key: &str) -> Option<String> {
    node.get(key).and_then(Value::as_str).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_image_summary() {
        let node = json!({
            "id": "1234",
            "shortcode": "AbCd",
            "is_video": false,
            "taken_at_timestamp": 1_500_000_000,
            "display_url": "https://example.com/p.jpg",
        });

        let rec = parse_media_node(&node, false).unwrap();
        assert_eq!(rec.id, "1234");
        assert_eq!(rec.shortcode, "AbCd");
        assert_eq!(rec.kind, MediaKind::Image);
        assert!(!rec.full);
        assert!(rec.children.is_empty());
        assert_eq!(rec.taken_at_timestamp(), Some(1_500_000_000));
    }

    #[test]
    fn test_parse_sidecar_with_children() {
        let node = json!({
            "id": "9",
            "shortcode": "Side",
            "__typename": "GraphSidecar",
            "edge_sidecar_to_children": {
                "edges": [
                    {"node": {"id": "9a", "shortcode": "Side", "__typename": "GraphImage",
                              "display_url": "https://example.com/a.jpg"}},
                    {"node": {"id": "9b", "shortcode": "Side", "__typename": "GraphVideo",
                              "video_url": "https://example.com/b.mp4"}},
                ]
            }
        });

        let rec = parse_media_node(&node, true).unwrap();
        assert_eq!(rec.kind, MediaKind::Sidecar);
        assert_eq!(rec.children.len(), 2);
        assert_eq!(rec.children[0].kind, MediaKind::Image);
        assert_eq!(rec.children[1].kind, MediaKind::Video);
        assert!(rec.full);
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        assert!(parse_media_node(&json!({"shortcode": "x"}), false).is_err());
        assert!(parse_media_node(&json!({"id": "1", "shortcode": "x"}), false).is_err());
        assert!(parse_media_node(
            &json!({"id": "1", "shortcode": "x", "__typename": "GraphStory"}),
            false
        )
        .is_err());
    }
}
