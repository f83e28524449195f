use std::path::PathBuf;
use std::sync::Arc;

/// Why an episode was not submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A file (or in-progress marker) named like the feed title exists
    TitlePresent,
    /// The title is absent, but the file named on the detail page exists
    ResolvedNamePresent { file_name: String },
}

/// Events emitted during synchronization for progress reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A show is about to be synchronized
    ShowStarted { query: String, destination: PathBuf },

    /// The feed could not be fetched; the show is skipped this cycle
    FeedUnavailable { query: String, error: String },

    /// The feed was fetched and the start offset applied
    FeedFetched {
        query: String,
        total_episodes: usize,
        candidates: usize,
    },

    /// An episode is already on disk or downloading
    EpisodeSkipped {
        query: String,
        title: String,
        reason: SkipReason,
    },

    /// An episode was handed to the download daemon
    EpisodeSubmitted { query: String, title: String },

    /// An episode could not be handed to the download daemon
    EpisodeFailed {
        query: String,
        title: String,
        error: String,
    },

    /// A show finished synchronizing
    ShowCompleted {
        query: String,
        submitted: usize,
        skipped: usize,
        failed: usize,
    },

    /// All configured shows were processed once
    CycleCompleted {
        shows: usize,
        submitted: usize,
        skipped: usize,
        failed: usize,
    },
}

/// Trait for reporting progress events during synchronization.
///
/// Implementations can use this to render terminal output or collect
/// statistics.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {
        // Intentionally empty
    }
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}
