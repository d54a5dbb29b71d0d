//! Looter facade: target selection, discovery and download orchestration.

pub mod fill;

pub use fill::{fill_media_queue, FillOptions, MediaFilter};

use std::path::Path;
use std::sync::Arc;

use crate::api::ApiClient;
use crate::download::{WorkerContext, WorkerPool};
use crate::error::Result;
use crate::fs::{Destination, NameGenerator, TemplateNamer};
use crate::media::{MediaFlattener, MediaRecord, TimeWindow};
use crate::output::Progress;
use crate::pages::{PageSource, PostPages, ProfilePages, TagPages};

/// What a looter raids: a profile feed, a tag feed, or a single post.
#[derive(Debug, Clone)]
pub enum Target {
    Profile {
        username: String,
        /// Owner ID, cached after the first resolve.
        owner_id: Option<String>,
    },
    Tag(String),
    Post(String),
}

/// Behavior knobs for a looter instance.
#[derive(Clone)]
pub struct LooterOptions {
    /// Also fetch videos.
    pub include_videos: bool,

    /// Only fetch videos; implies `include_videos`.
    pub videos_only: bool,

    /// Worker pool size.
    pub jobs: usize,

    /// Artifact naming template.
    pub template: String,

    /// Write a JSON metadata document next to each artifact.
    pub dump_metadata: bool,

    /// Only write metadata documents; implies `dump_metadata`.
    pub metadata_only: bool,

    /// Force the detailed refetch for every record.
    pub extended_metadata: bool,
}

impl Default for LooterOptions {
    fn default() -> Self {
        Self {
            include_videos: false,
            videos_only: false,
            jobs: 16,
            template: "{id}".into(),
            dump_metadata: false,
            metadata_only: false,
            extended_metadata: false,
        }
    }
}

/// Parameters for one download invocation.
#[derive(Default)]
pub struct DownloadRequest {
    /// Filter over records; defaults to one derived from the video options.
    pub condition: Option<MediaFilter>,

    /// Maximum number of accepted records.
    pub max_count: Option<u64>,

    /// Bound discovery by capture time.
    pub time_window: Option<TimeWindow>,

    /// Halt discovery upon the first already-downloaded record.
    pub stop_on_existing: bool,

    /// Observer advanced once per fetched page.
    pub page_progress: Option<Arc<dyn Progress>>,

    /// Observer advanced once per downloaded record.
    pub download_progress: Option<Arc<dyn Progress>>,
}

/// Discovers and downloads the media of one target.
pub struct Looter {
    api: Arc<ApiClient>,
    target: Target,
    options: LooterOptions,
    namegen: Arc<dyn NameGenerator>,
}

impl Looter {
    /// Create a looter for an arbitrary target.
    pub fn new(api: Arc<ApiClient>, target: Target, options: LooterOptions) -> Result<Self> {
        let namegen = Arc::new(TemplateNamer::new(&options.template)?);
        Ok(Self {
            api,
            target,
            options,
            namegen,
        })
    }

    /// Looter over a profile feed.
    pub fn profile(api: Arc<ApiClient>, username: &str, options: LooterOptions) -> Result<Self> {
        Self::new(
            api,
            Target::Profile {
                username: username.to_string(),
                owner_id: None,
            },
            options,
        )
    }

    /// Looter over a tag feed.
    pub fn tag(api: Arc<ApiClient>, tag: &str, options: LooterOptions) -> Result<Self> {
        Self::new(api, Target::Tag(tag.to_string()), options)
    }

    /// Looter over a single post.
    pub fn post(api: Arc<ApiClient>, shortcode: &str, options: LooterOptions) -> Result<Self> {
        Self::new(api, Target::Post(shortcode.to_string()), options)
    }

    /// Construct the page source for this looter's target.
    ///
    /// Each call starts a fresh cursor chain; the profile resolve step
    /// runs only once, its owner ID is cached on the looter.
    pub async fn pages(&mut self) -> Result<Box<dyn PageSource>> {
        match &mut self.target {
            Target::Profile { username, owner_id } => match owner_id {
                Some(id) => Ok(Box::new(ProfilePages::new(Arc::clone(&self.api), id.clone()))),
                None => {
                    let source = ProfilePages::resolve(Arc::clone(&self.api), username).await?;
                    *owner_id = Some(source.owner_id().to_string());
                    Ok(Box::new(source))
                }
            },
            Target::Tag(tag) => Ok(Box::new(TagPages::new(Arc::clone(&self.api), tag.clone()))),
            Target::Post(code) => {
                Ok(Box::new(PostPages::new(Arc::clone(&self.api), code.clone())))
            }
        }
    }

    /// Lazy sequence of this target's media records, optionally bounded
    /// by a time window.
    pub async fn medias(
        &mut self,
        window: Option<TimeWindow>,
    ) -> Result<MediaFlattener<Box<dyn PageSource>>> {
        let mut flattener = MediaFlattener::new(self.pages().await?);
        if let Some(window) = window {
            flattener = flattener.with_window(window);
        }
        Ok(flattener)
    }

    /// Discover and download all matching media into `destination`.
    ///
    /// Returns the number of accepted records, which can differ from the
    /// number of files written (sidecars fan out, workers can fail after
    /// dequeue).
    pub async fn download(
        &mut self,
        destination: impl AsRef<Path>,
        request: DownloadRequest,
    ) -> Result<u64> {
        let destination = Destination::open(destination)?;

        let mut flattener = MediaFlattener::new(self.pages().await?);
        if let Some(window) = request.time_window {
            flattener = flattener.with_window(window);
        }
        if let Some(progress) = &request.page_progress {
            flattener = flattener.with_page_progress(Arc::clone(progress));
        }

        let condition = request
            .condition
            .clone()
            .unwrap_or_else(|| self.default_condition());

        let pool = WorkerPool::start(
            self.options.jobs.max(1),
            WorkerContext {
                api: Arc::clone(&self.api),
                destination: destination.clone(),
                namegen: Arc::clone(&self.namegen),
                dump_metadata: self.options.dump_metadata || self.options.metadata_only,
                metadata_only: self.options.metadata_only,
                progress: request.download_progress.clone(),
            },
        );

        let fill_opts = FillOptions {
            max_count: request.max_count,
            stop_on_existing: request.stop_on_existing,
            condition,
            extended: self.options.extended_metadata,
        };

        let queue = pool.sender();
        let filled = fill_media_queue(
            &queue,
            &destination,
            &mut flattener,
            self.api.as_ref(),
            self.namegen.as_ref(),
            &fill_opts,
        )
        .await;

        if let Some(progress) = &request.page_progress {
            progress.finish();
        }

        let queued = match filled {
            Ok(n) => n,
            Err(e) => {
                // Discovery died; don't leave workers waiting on a queue
                // nobody fills.
                pool.shutdown_forced().await;
                return Err(e);
            }
        };

        if let Some(progress) = &request.download_progress {
            progress.set_maximum(queued);
        }
        if queued == 0 {
            tracing::warn!("No medias found.");
        }

        pool.shutdown_graceful().await;

        if let Some(progress) = &request.download_progress {
            progress.finish();
        }

        Ok(queued)
    }

    /// Shortcut for [`Looter::download`] accepting only images.
    pub async fn download_pictures(
        &mut self,
        destination: impl AsRef<Path>,
        mut request: DownloadRequest,
    ) -> Result<u64> {
        request.condition = Some(Arc::new(|m: &MediaRecord| !m.is_video()));
        self.download(destination, request).await
    }

    /// Shortcut for [`Looter::download`] accepting only videos.
    pub async fn download_videos(
        &mut self,
        destination: impl AsRef<Path>,
        mut request: DownloadRequest,
    ) -> Result<u64> {
        request.condition = Some(Arc::new(|m: &MediaRecord| m.is_video()));
        self.download(destination, request).await
    }

    fn default_condition(&self) -> MediaFilter {
        if self.options.videos_only {
            Arc::new(|m: &MediaRecord| m.is_video())
        } else if !self.options.include_videos {
            Arc::new(|m: &MediaRecord| !m.is_video())
        } else {
            Arc::new(|_: &MediaRecord| true)
        }
    }
}
