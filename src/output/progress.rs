//! Progress reporting.
//!
//! The pipeline reports progress as a fraction in `[0, 1]`: documents folded
//! into an output (or written off with a rejected case) over all documents
//! in the run. The fraction only ever grows, and nothing is reported for a
//! run without documents.
//!
//! Any `FnMut(f64)` closure is a [`ProgressSink`]; [`NoProgress`] discards
//! everything. The binary forwards fractions over a channel into a
//! terminal [`ProgressBar`].
//!
//! # Examples
//!
//! ```
//! use casemerge::output::progress::ProgressTracker;
//!
//! let mut seen = Vec::new();
//! let mut sink = |fraction: f64| seen.push(fraction);
//! let mut tracker = ProgressTracker::new(4, &mut sink);
//! tracker.advance(1);
//! tracker.advance(3);
//! drop(tracker);
//! assert_eq!(seen, vec![0.25, 1.0]);
//! ```

use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Receiver of progress fractions.
pub trait ProgressSink {
    /// Called with the completed fraction, in `[0, 1]`.
    fn report(&mut self, fraction: f64);
}

impl<F: FnMut(f64)> ProgressSink for F {
    fn report(&mut self, fraction: f64) {
        self(fraction)
    }
}

/// A sink that ignores progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _fraction: f64) {}
}

/// Counts processed documents and reports the fraction to a sink.
pub struct ProgressTracker<'a> {
    total: usize,
    processed: usize,
    sink: &'a mut dyn ProgressSink,
}

impl<'a> ProgressTracker<'a> {
    /// Track `total` documents.
    pub fn new(total: usize, sink: &'a mut dyn ProgressSink) -> Self {
        Self {
            total,
            processed: 0,
            sink,
        }
    }

    /// Mark `count` more documents as processed and report.
    ///
    /// Silent when the run has no documents. The count saturates at the
    /// total, so the fraction never exceeds 1.
    pub fn advance(&mut self, count: usize) {
        if self.total == 0 || count == 0 {
            return;
        }
        self.processed = (self.processed + count).min(self.total);
        self.sink.report(self.fraction());
    }

    /// Completed fraction so far.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.processed as f64 / self.total as f64
        }
    }

    /// Documents processed so far.
    pub fn processed(&self) -> usize {
        self.processed
    }
}

/// Terminal progress bar: `Merging [=====>    ] 50% 50/100 3s`.
pub struct ProgressBar {
    /// Total number of items.
    total: usize,
    /// Current progress.
    current: usize,
    /// Optional message to display.
    message: Option<String>,
    /// Start time of the operation.
    start_time: Instant,
    /// Last update time (for rate limiting).
    last_update: Instant,
    /// Minimum time between updates.
    update_interval: Duration,
    /// Whether the progress bar is enabled.
    enabled: bool,
}

impl ProgressBar {
    /// Create a progress bar over `total` steps.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            current: 0,
            message: None,
            start_time: Instant::now(),
            last_update: Instant::now(),
            update_interval: Duration::from_millis(100),
            enabled: Self::is_terminal(),
        }
    }

    /// Create a disabled progress bar (no output).
    pub fn disabled() -> Self {
        let mut pb = Self::new(0);
        pb.enabled = false;
        pb
    }

    /// Check if stdout is a terminal.
    fn is_terminal() -> bool {
        use std::io::IsTerminal;
        io::stdout().is_terminal()
    }

    /// Set the message to display with the progress bar.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Update the progress bar to a specific value.
    pub fn update(&mut self, current: usize) {
        self.current = current.min(self.total);

        // Rate limit updates
        if self.last_update.elapsed() < self.update_interval && self.current < self.total {
            return;
        }

        self.last_update = Instant::now();
        self.render();
    }

    /// Update from a completed fraction.
    pub fn update_fraction(&mut self, fraction: f64) {
        let current = (fraction.clamp(0.0, 1.0) * self.total as f64).round() as usize;
        self.update(current);
    }

    /// Mark the progress bar as finished.
    pub fn finish(&mut self) {
        self.current = self.total;
        if self.enabled {
            self.render();
            println!();
        }
    }

    /// Render the progress bar.
    fn render(&mut self) {
        if !self.enabled {
            return;
        }

        print!("\r{}", self.render_bar());
        io::stdout().flush().ok();
    }

    /// Render a progress bar.
    fn render_bar(&self) -> String {
        let width = 40;
        let percent = self.percent() as usize;

        let filled = (width * self.current) / self.total.max(1);
        let empty = width - filled;

        let bar = format!(
            "[{}{}]",
            "=".repeat(filled.saturating_sub(1)) + if filled > 0 { ">" } else { "" },
            " ".repeat(empty)
        );

        let counter = format!("{}/{}", self.current, self.total);
        let elapsed = format_duration(self.start_time.elapsed());

        let mut parts = vec![bar, format!("{percent}%"), counter, elapsed];

        if let Some(ref msg) = self.message {
            parts.insert(0, msg.clone());
        }

        parts.join(" ")
    }

    /// Get the current progress percentage.
    pub fn percent(&self) -> f64 {
        if self.total > 0 {
            (self.current as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Format a duration as a human-readable string.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
