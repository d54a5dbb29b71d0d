//! Discovery engine: filtering, refetch-on-demand and queue filling.

use std::sync::Arc;

use crate::api::client::PostInfoSource;
use crate::download::queue::{QueueItem, QueueSender};
use crate::error::Result;
use crate::fs::{Destination, NameGenerator};
use crate::media::{MediaFlattener, MediaKind, MediaRecord};
use crate::pages::PageSource;

/// Predicate deciding whether a record is wanted.
pub type MediaFilter = Arc<dyn Fn(&MediaRecord) -> bool + Send + Sync>;

/// Knobs for one fill pass.
pub struct FillOptions {
    /// Stop once this many records have been accepted.
    pub max_count: Option<u64>,

    /// Halt discovery entirely upon the first record whose artifact
    /// already exists. Assumes already-downloaded records come first.
    pub stop_on_existing: bool,

    /// The active filter. Sidecar parents that fail it still get their
    /// children considered.
    pub condition: MediaFilter,

    /// Force the detailed refetch for every record.
    pub extended: bool,
}

/// Drain the media sequence into the download queue, applying the filter,
/// refetch and early-stop policy. Returns the number of accepted records.
///
/// The count may exceed the number of files produced (a sidecar yields one
/// file per child) and may exceed the number of successful downloads
/// (workers can fail after dequeue).
pub async fn fill_media_queue<S: PageSource>(
    queue: &QueueSender,
    destination: &Destination,
    medias: &mut MediaFlattener<S>,
    fetcher: &dyn PostInfoSource,
    namegen: &dyn NameGenerator,
    opts: &FillOptions,
) -> Result<u64> {
    let mut queued = 0u64;

    while let Some(mut record) = medias.next_media().await? {
        // Sidecar parents pass through to child filtering even when the
        // filter rejects them.
        if !(opts.condition)(&record) && !record.is_sidecar() {
            continue;
        }

        // Summaries carry enough for plain images; videos and sidecars
        // need their detailed form, as does any template reaching beyond
        // the summary fields.
        let needs_detail = opts.extended
            || namegen.needs_detailed(&record)
            || (!record.full && record.kind != MediaKind::Image);
        if needs_detail {
            match fetcher.get_post_info(&record.shortcode).await {
                Ok(detailed) => record = detailed,
                Err(e) => {
                    tracing::warn!("Dropping '{}': {}", record.shortcode, e);
                    continue;
                }
            }
        }

        if record.is_sidecar() {
            let condition = &opts.condition;
            record.children.retain(|child| condition(child));
            if record.children.is_empty() {
                continue;
            }
        }

        let filename = match namegen.file(&record) {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!("Cannot name '{}', dropping it: {}", record.shortcode, e);
                continue;
            }
        };

        // FIXME: for sidecars this checks the parent's target name while
        // the surviving children may differ.
        if destination.contains(&filename) && opts.stop_on_existing {
            tracing::debug!("'{}' already downloaded, stopping discovery", filename);
            break;
        }

        if queue.send(QueueItem::Media(record)).is_err() {
            // All workers are gone; nothing will consume further records.
            tracing::warn!("Download queue closed, stopping discovery");
            break;
        }
        queued += 1;

        if opts.max_count.is_some_and(|max| queued >= max) {
            break;
        }
    }

    Ok(queued)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::queue::queue_channel;
    use crate::error::Error;
    use crate::fs::TemplateNamer;
    use crate::pages::Page;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;

    struct VecPages {
        pages: std::collections::VecDeque<Page>,
    }

    impl VecPages {
        fn single(records: Vec<MediaRecord>) -> Self {
            Self {
                pages: vec![Page {
                    items: records,
                    has_next: false,
                    end_cursor: None,
                }]
                .into(),
            }
        }
    }

    #[async_trait]
    impl PageSource for VecPages {
        async fn next_page(&mut self) -> Result<Option<Page>> {
            Ok(self.pages.pop_front())
        }
    }

    /// Stub lookup serving pre-registered detailed records.
    #[derive(Default)]
    struct StubPostInfo {
        records: HashMap<String, MediaRecord>,
    }

    #[async_trait]
    impl PostInfoSource for StubPostInfo {
        async fn get_post_info(&self, shortcode: &str) -> Result<MediaRecord> {
            self.records
                .get(shortcode)
                .cloned()
                .ok_or_else(|| Error::ItemFetchFailed {
                    shortcode: shortcode.to_string(),
                    message: "not registered".into(),
                })
        }
    }

    fn image(id: &str) -> MediaRecord {
        MediaRecord {
            id: id.into(),
            shortcode: id.into(),
            kind: MediaKind::Image,
            taken_at: None,
            display_url: Some(format!("https://example.com/{}.jpg", id)),
            video_url: None,
            children: Vec::new(),
            full: true,
            raw: json!({"id": id}),
        }
    }

    fn video(id: &str) -> MediaRecord {
        let mut rec = image(id);
        rec.kind = MediaKind::Video;
        rec.video_url = Some(format!("https://example.com/{}.mp4", id));
        rec
    }

    fn sidecar(id: &str, children: Vec<MediaRecord>) -> MediaRecord {
        let mut rec = image(id);
        rec.kind = MediaKind::Sidecar;
        rec.children = children;
        rec
    }

    fn images_only() -> MediaFilter {
        Arc::new(|m: &MediaRecord| !m.is_video())
    }

    fn everything() -> MediaFilter {
        Arc::new(|_: &MediaRecord| true)
    }

    fn opts(condition: MediaFilter) -> FillOptions {
        FillOptions {
            max_count: Some(10),
            stop_on_existing: false,
            condition,
            extended: false,
        }
    }

    fn namer() -> TemplateNamer {
        TemplateNamer::new("{id}").unwrap()
    }

    async fn run_fill(
        records: Vec<MediaRecord>,
        destination: &Destination,
        fetcher: &StubPostInfo,
        opts: &FillOptions,
    ) -> (u64, Vec<MediaRecord>) {
        let (tx, rx) = queue_channel();
        let mut medias = MediaFlattener::new(VecPages::single(records));
        let queued = fill_media_queue(&tx, destination, &mut medias, fetcher, &namer(), opts)
            .await
            .unwrap();

        let mut accepted = Vec::new();
        let mut rx = Arc::try_unwrap(rx).ok().unwrap().into_inner();
        while let Ok(item) = rx.try_recv() {
            if let QueueItem::Media(rec) = item {
                accepted.push(rec);
            }
        }
        (queued, accepted)
    }

    fn scenario() -> Vec<MediaRecord> {
        vec![
            image("img1"),
            video("vid1"),
            image("img2"),
            image("img3"),
            sidecar("sidecar1", vec![image("child_img"), video("child_vid")]),
        ]
    }

    #[tokio::test]
    async fn test_scenario_without_stop_on_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = Destination::open(tmp.path()).unwrap();
        std::fs::write(dest.path_of("img2.jpg"), b"already here").unwrap();

        let (queued, accepted) =
            run_fill(scenario(), &dest, &StubPostInfo::default(), &opts(images_only())).await;

        assert_eq!(queued, 4);
        let ids: Vec<_> = accepted.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["img1", "img2", "img3", "sidecar1"]);

        // The video child was pruned, the image child survives.
        let carousel = accepted.last().unwrap();
        assert_eq!(carousel.children.len(), 1);
        assert_eq!(carousel.children[0].id, "child_img");
    }

    #[tokio::test]
    async fn test_scenario_with_stop_on_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = Destination::open(tmp.path()).unwrap();
        std::fs::write(dest.path_of("img2.jpg"), b"already here").unwrap();

        let mut options = opts(images_only());
        options.stop_on_existing = true;

        let (queued, accepted) =
            run_fill(scenario(), &dest, &StubPostInfo::default(), &options).await;

        assert_eq!(queued, 1);
        assert_eq!(accepted[0].id, "img1");
    }

    #[tokio::test]
    async fn test_every_enqueued_record_matches_condition() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = Destination::open(tmp.path()).unwrap();

        let (_, accepted) =
            run_fill(scenario(), &dest, &StubPostInfo::default(), &opts(images_only())).await;

        for rec in &accepted {
            if rec.is_sidecar() {
                assert!(!rec.children.is_empty());
                assert!(rec.children.iter().all(|c| !c.is_video()));
            } else {
                assert!(!rec.is_video());
            }
        }
    }

    #[tokio::test]
    async fn test_sidecar_dropped_when_no_child_matches() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = Destination::open(tmp.path()).unwrap();

        let records = vec![sidecar("s", vec![video("cv1"), video("cv2")])];
        let (queued, accepted) =
            run_fill(records, &dest, &StubPostInfo::default(), &opts(images_only())).await;

        assert_eq!(queued, 0);
        assert!(accepted.is_empty());
    }

    #[tokio::test]
    async fn test_max_count_cuts_discovery() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = Destination::open(tmp.path()).unwrap();

        let records = (0..8).map(|i| image(&format!("i{}", i))).collect();
        let mut options = opts(everything());
        options.max_count = Some(3);

        let (queued, accepted) = run_fill(records, &dest, &StubPostInfo::default(), &options).await;
        assert_eq!(queued, 3);
        assert_eq!(accepted.len(), 3);
    }

    #[tokio::test]
    async fn test_summary_video_is_refetched() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = Destination::open(tmp.path()).unwrap();

        let mut summary = video("v1");
        summary.full = false;
        summary.video_url = None;

        let mut fetcher = StubPostInfo::default();
        fetcher.records.insert("v1".into(), video("v1"));

        let (queued, accepted) = run_fill(vec![summary], &dest, &fetcher, &opts(everything())).await;
        assert_eq!(queued, 1);
        assert!(accepted[0].full);
        assert!(accepted[0].video_url.is_some());
    }

    #[tokio::test]
    async fn test_summary_image_is_not_refetched() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = Destination::open(tmp.path()).unwrap();

        let mut summary = image("i1");
        summary.full = false;

        // Empty stub: a refetch attempt would drop the record.
        let (queued, accepted) =
            run_fill(vec![summary], &dest, &StubPostInfo::default(), &opts(everything())).await;
        assert_eq!(queued, 1);
        assert!(!accepted[0].full);
    }

    #[tokio::test]
    async fn test_failed_refetch_drops_item_only() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = Destination::open(tmp.path()).unwrap();

        let mut broken = video("broken");
        broken.full = false;

        let (queued, accepted) = run_fill(
            vec![image("a"), broken, image("b")],
            &dest,
            &StubPostInfo::default(),
            &opts(everything()),
        )
        .await;

        assert_eq!(queued, 2);
        let ids: Vec<_> = accepted.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[tokio::test]
    async fn test_extended_forces_refetch() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = Destination::open(tmp.path()).unwrap();

        let mut fetcher = StubPostInfo::default();
        let mut detailed = image("i1");
        detailed.raw = json!({"id": "i1", "refetched": true});
        fetcher.records.insert("i1".into(), detailed);

        let mut options = opts(everything());
        options.extended = true;

        let (_, accepted) = run_fill(vec![image("i1")], &dest, &fetcher, &options).await;
        assert_eq!(accepted[0].raw["refetched"], true);
    }
}
