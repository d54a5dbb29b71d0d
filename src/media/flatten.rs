//! Flattening of page sequences into media record sequences.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::media::MediaRecord;
use crate::output::Progress;
use crate::pages::PageSource;

/// Inclusive time window over capture timestamps.
///
/// `start` is the more recent bound, matching the reverse-chronological
/// order feeds deliver items in.
#[derive(Debug, Clone, Copy)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Create a window; `start` must not be older than `end`.
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Result<Self> {
        if let (Some(start), Some(end)) = (start, end) {
            if start < end {
                return Err(Error::Config(
                    "time window start must be more recent than its end".into(),
                ));
            }
        }
        Ok(Self { start, end })
    }

    /// Whether a timestamp is more recent than the window.
    fn is_newer(&self, at: DateTime<Utc>) -> bool {
        self.start.map(|start| at > start).unwrap_or(false)
    }

    /// Whether a timestamp is older than the window.
    fn is_older(&self, at: DateTime<Utc>) -> bool {
        self.end.map(|end| at < end).unwrap_or(false)
    }
}

/// Lazily flattens a page source into an ordered sequence of media records.
///
/// Records are yielded in page order. With a time window attached, records
/// newer than the window are skipped and the first record older than the
/// window ends the sequence. That early stop assumes the source delivers
/// items in reverse-chronological order; the flattener does not verify it.
pub struct MediaFlattener<S> {
    source: S,
    window: Option<TimeWindow>,
    buffer: VecDeque<MediaRecord>,
    done: bool,
    pages_fetched: u64,
    page_progress: Option<Arc<dyn Progress>>,
}

impl<S: PageSource> MediaFlattener<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            window: None,
            buffer: VecDeque::new(),
            done: false,
            pages_fetched: 0,
            page_progress: None,
        }
    }

    /// Bound the sequence by a time window.
    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Attach an observer advanced once per fetched page.
    pub fn with_page_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.page_progress = Some(progress);
        self
    }

    /// Number of pages fetched so far.
    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched
    }

    /// Yield the next media record, fetching further pages as needed.
    ///
    /// `Ok(None)` marks the end of the sequence; the flattener stays
    /// exhausted afterwards.
    pub async fn next_media(&mut self) -> Result<Option<MediaRecord>> {
        loop {
            if self.done {
                return Ok(None);
            }

            while let Some(record) = self.buffer.pop_front() {
                if let (Some(window), Some(at)) = (&self.window, record.taken_at) {
                    if window.is_newer(at) {
                        continue;
                    }
                    if window.is_older(at) {
                        // Everything after this point is older still.
                        self.done = true;
                        self.buffer.clear();
                        return Ok(None);
                    }
                }
                return Ok(Some(record));
            }

            match self.source.next_page().await? {
                Some(page) => {
                    self.pages_fetched += 1;
                    if let Some(progress) = &self.page_progress {
                        progress.advance(1);
                    }
                    self.buffer.extend(page.items);
                }
                None => {
                    self.done = true;
                    return Ok(None);
                }
            }
        }
    }
}
