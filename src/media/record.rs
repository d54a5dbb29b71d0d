//! Media record representation.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Kind of media content, mapped from the feed's type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    /// A carousel post carrying multiple child records.
    Sidecar,
}

impl MediaKind {
    /// Map the wire discriminator to a kind.
    pub fn from_typename(typename: &str) -> Option<Self> {
        match typename {
            "GraphImage" => Some(MediaKind::Image),
            "GraphVideo" => Some(MediaKind::Video),
            "GraphSidecar" => Some(MediaKind::Sidecar),
            _ => None,
        }
    }

    /// The wire discriminator for this kind.
    pub fn typename(&self) -> &'static str {
        match self {
            MediaKind::Image => "GraphImage",
            MediaKind::Video => "GraphVideo",
            MediaKind::Sidecar => "GraphSidecar",
        }
    }
}

/// One discoverable content item.
///
/// Records arrive from feed pages in a lightweight summary form; the
/// detailed form (fetched on demand through `get_post_info`) carries the
/// full field set, including sidecar children. `raw` keeps the original
/// JSON node so metadata dumps and naming templates can reach fields the
/// typed representation does not model.
#[derive(Debug, Clone)]
pub struct MediaRecord {
    /// Unique media ID.
    pub id: String,

    /// URL shortcode identifying the post.
    pub shortcode: String,

    /// Media kind (image, video, carousel).
    pub kind: MediaKind,

    /// Capture timestamp, when the feed provides one.
    pub taken_at: Option<DateTime<Utc>>,

    /// URL of the still image payload (or poster frame for videos).
    pub display_url: Option<String>,

    /// URL of the video payload, for video records.
    pub video_url: Option<String>,

    /// Child records; non-empty only for sidecars, one level deep.
    pub children: Vec<MediaRecord>,

    /// Whether this is the detailed form rather than a feed summary.
    pub full: bool,

    /// The raw JSON node this record was parsed from.
    pub raw: Value,
}

impl MediaRecord {
    /// Whether this record is a video.
    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }

    /// Whether this record is a carousel.
    pub fn is_sidecar(&self) -> bool {
        self.kind == MediaKind::Sidecar
    }

    /// The URL of the binary payload to download for this record.
    ///
    /// Videos prefer `video_url`; everything else uses `display_url`.
    /// Sidecar parents have no payload of their own.
    pub fn payload_url(&self) -> Option<&str> {
        if self.is_video() {
            self.video_url.as_deref().or(self.display_url.as_deref())
        } else {
            self.display_url.as_deref()
        }
    }

    /// Capture timestamp as epoch seconds, if known.
    pub fn taken_at_timestamp(&self) -> Option<i64> {
        self.taken_at.map(|dt| dt.timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn record(kind: MediaKind) -> MediaRecord {
        MediaRecord {
            id: "1".into(),
            shortcode: "abc".into(),
            kind,
            taken_at: Some(Utc.timestamp_opt(1_500_000_000, 0).unwrap()),
            display_url: Some("https://example.com/a.jpg".into()),
            video_url: Some("https://example.com/a.mp4".into()),
            children: Vec::new(),
            full: true,
            raw: json!({}),
        }
    }

    #[test]
    fn test_kind_from_typename() {
        assert_eq!(MediaKind::from_typename("GraphImage"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_typename("GraphVideo"), Some(MediaKind::Video));
        assert_eq!(
            MediaKind::from_typename("GraphSidecar"),
            Some(MediaKind::Sidecar)
        );
        assert_eq!(MediaKind::from_typename("GraphStory"), None);
    }

    #[test]
    fn test_payload_url_prefers_video_for_videos() {
        let rec = record(MediaKind::Video);
        assert_eq!(rec.payload_url(), Some("https://example.com/a.mp4"));

        let rec = record(MediaKind::Image);
        assert_eq!(rec.payload_url(), Some("https://example.com/a.jpg"));
    }

    #[test]
    fn test_payload_url_falls_back_to_display() {
        let mut rec = record(MediaKind::Video);
        rec.video_url = None;
        assert_eq!(rec.payload_url(), Some("https://example.com/a.jpg"));
    }
}
