//! Progress observer contract and indicatif-backed implementation.

use std::sync::atomic::{AtomicU64, Ordering};

use indicatif::{ProgressBar, ProgressStyle};

/// Sink for progress counts from discovery and download.
///
/// `advance` is called concurrently from multiple workers, so
/// implementations must be internally synchronized.
pub trait Progress: Send + Sync {
    /// Set (or reset) the total number of expected steps.
    fn set_maximum(&self, total: u64);

    /// Record `n` completed steps.
    fn advance(&self, n: u64);

    /// Mark the observed operation as finished.
    fn finish(&self);
}

/// Terminal progress bar.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    /// Create a bar for item counts with the given label.
    pub fn items(message: &str) -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
                .unwrap()
                .progress_chars("#>-"),
        );
        bar.set_message(message.to_string());
        Self { bar }
    }

    /// Create a spinner for operations with no known total.
    pub fn spinner(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} ({pos})")
                .unwrap(),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { bar }
    }
}

impl Progress for BarProgress {
    fn set_maximum(&self, total: u64) {
        self.bar.set_length(total);
    }

    fn advance(&self, n: u64) {
        self.bar.inc(n);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Counting observer with no output. Used by tests and as a default sink.
#[derive(Debug, Default)]
pub struct CountingProgress {
    total: AtomicU64,
    position: AtomicU64,
    finished: std::sync::atomic::AtomicBool,
}

impl CountingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> u64 {
        self.position.load(Ordering::SeqCst)
    }

    pub fn maximum(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

impl Progress for CountingProgress {
    fn set_maximum(&self, total: u64) {
        self.total.store(total, Ordering::SeqCst);
    }

    fn advance(&self, n: u64) {
        self.position.fetch_add(n, Ordering::SeqCst);
    }

    fn finish(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_counting_progress_concurrent_advance() {
        let progress = Arc::new(CountingProgress::new());
        progress.set_maximum(40);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let p = Arc::clone(&progress);
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        p.advance(1);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(progress.position(), 40);
        assert_eq!(progress.maximum(), 40);
        progress.finish();
        assert!(progress.is_finished());
    }
}
