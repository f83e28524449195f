// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::ShowConfig;
use crate::error::SyncError;
use crate::filter::DownloadFilter;
use crate::indexer::{Episode, Indexer};
use crate::progress::{ProgressEvent, SharedProgressReporter, SkipReason};
use crate::rpc::{DEFAULT_MAX_ATTEMPTS, DownloadClient, DownloadRequest, TorrentSource};

/// How a torrent is handed to the daemon
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmissionStrategy {
    /// Send the torrent URL; the daemon fetches it
    #[default]
    Url,
    /// Fetch the `.torrent` here and send its contents inline
    Metainfo,
}

/// Options for show synchronization
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub strategy: SubmissionStrategy,
    /// Pause after each episode that reached the daemon
    pub submit_delay: Duration,
    /// Attempts per submission, including session renewals
    pub max_attempts: u32,
    /// Continue with the next episode if a submission fails
    pub continue_on_error: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            strategy: SubmissionStrategy::Url,
            submit_delay: Duration::from_secs(1),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            continue_on_error: true,
        }
    }
}

/// Result of synchronizing one show
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowReport {
    pub query: String,
    /// Number of episodes in the feed
    pub feed_episodes: usize,
    /// Number of episodes at or after the start offset
    pub candidates: usize,
    pub submitted: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Details of failed episodes (title, error message)
    pub failed_episodes: Vec<(String, String)>,
}

/// Result of one pass over all shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub shows: usize,
    pub submitted: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Shows whose synchronization was aborted (query, error message)
    pub aborted_shows: Vec<(String, String)>,
}

impl SyncSummary {
    fn record(&mut self, report: &ShowReport) {
        self.submitted += report.submitted;
        self.skipped += report.skipped;
        self.failed += report.failed;
    }
}

/// Drives indexer lookups, duplicate filtering and daemon submissions
pub struct Orchestrator<I, D, F> {
    indexer: I,
    downloader: D,
    filter: F,
    options: SyncOptions,
    reporter: SharedProgressReporter,
}

impl<I, D, F> Orchestrator<I, D, F>
where
    I: Indexer,
    D: DownloadClient,
    F: DownloadFilter,
{
    pub fn new(
        indexer: I,
        downloader: D,
        filter: F,
        options: SyncOptions,
        reporter: SharedProgressReporter,
    ) -> Self {
        Self {
            indexer,
            downloader,
            filter,
            options,
            reporter,
        }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Synchronize every show, each into `root/<folder>`
    ///
    /// A show that aborts is logged and counted; the remaining shows still run.
    pub async fn sync_all(&mut self, shows: &[ShowConfig], root: &Path) -> SyncSummary {
        let mut summary = SyncSummary {
            shows: shows.len(),
            ..Default::default()
        };

        for show in shows {
            let destination = root.join(&show.folder);
            let (report, aborted) = self.run_show(show, &destination).await;
            summary.record(&report);
            if let Some(e) = aborted {
                error!(query = %show.query, error = %e, "show synchronization aborted");
                summary
                    .aborted_shows
                    .push((show.query.clone(), e.to_string()));
            }
        }

        self.reporter.report(ProgressEvent::CycleCompleted {
            shows: summary.shows,
            submitted: summary.submitted,
            skipped: summary.skipped,
            failed: summary.failed,
        });

        summary
    }

    /// Synchronize one show into `destination`
    ///
    /// Episodes are visited oldest first starting at `start_episode`. An
    /// unavailable feed yields an empty report rather than an error.
    pub async fn sync_show(
        &mut self,
        show: &ShowConfig,
        destination: &Path,
    ) -> Result<ShowReport, SyncError> {
        match self.run_show(show, destination).await {
            (report, None) => Ok(report),
            (_, Some(e)) => Err(e),
        }
    }

    /// Like `sync_show`, but keeps the partial report when the show aborts
    async fn run_show(
        &mut self,
        show: &ShowConfig,
        destination: &Path,
    ) -> (ShowReport, Option<SyncError>) {
        let query = show.query.as_str();
        let mut report = ShowReport {
            query: query.to_string(),
            ..Default::default()
        };

        self.reporter.report(ProgressEvent::ShowStarted {
            query: query.to_string(),
            destination: destination.to_path_buf(),
        });

        let episodes = match self.indexer.search_episodes(query).await {
            Ok(episodes) => episodes,
            Err(e) => {
                error!(query, error = %e, "could not fetch feed, skipping show this cycle");
                self.reporter.report(ProgressEvent::FeedUnavailable {
                    query: query.to_string(),
                    error: e.to_string(),
                });
                return (report, None);
            }
        };

        let offset = show.start_episode.saturating_sub(1) as usize;
        let candidates = episodes.get(offset..).unwrap_or_default();

        report.feed_episodes = episodes.len();
        report.candidates = candidates.len();
        self.reporter.report(ProgressEvent::FeedFetched {
            query: query.to_string(),
            total_episodes: report.feed_episodes,
            candidates: report.candidates,
        });

        let mut aborted = None;
        for episode in candidates {
            if let Some(reason) = self.already_acquired(query, episode, destination).await {
                debug!(query, title = %episode.title, ?reason, "already acquired");
                report.skipped += 1;
                self.reporter.report(ProgressEvent::EpisodeSkipped {
                    query: query.to_string(),
                    title: episode.title.clone(),
                    reason,
                });
                continue;
            }

            let reached_daemon = match self.submit_episode(episode, destination).await {
                Ok(()) => {
                    info!(query, title = %episode.title, dir = %destination.display(), "episode submitted");
                    report.submitted += 1;
                    self.reporter.report(ProgressEvent::EpisodeSubmitted {
                        query: query.to_string(),
                        title: episode.title.clone(),
                    });
                    true
                }
                Err(e) => {
                    error!(query, title = %episode.title, error = %e, "episode submission failed");
                    report.failed += 1;
                    report
                        .failed_episodes
                        .push((episode.title.clone(), e.to_string()));
                    self.reporter.report(ProgressEvent::EpisodeFailed {
                        query: query.to_string(),
                        title: episode.title.clone(),
                        error: e.to_string(),
                    });

                    if !self.options.continue_on_error {
                        aborted = Some(e);
                        break;
                    }
                    !matches!(e, SyncError::Payload { .. })
                }
            };

            if reached_daemon {
                tokio::time::sleep(self.options.submit_delay).await;
            }
        }

        self.reporter.report(ProgressEvent::ShowCompleted {
            query: query.to_string(),
            submitted: report.submitted,
            skipped: report.skipped,
            failed: report.failed,
        });

        (report, aborted)
    }

    /// Check the feed title, then the resolved file name
    ///
    /// A detail page that cannot be read counts as "not acquired".
    async fn already_acquired(
        &self,
        query: &str,
        episode: &Episode,
        destination: &Path,
    ) -> Option<SkipReason> {
        if self.filter.exists(&target_path(destination, &episode.title)) {
            return Some(SkipReason::TitlePresent);
        }

        match self.indexer.resolve_file_name(&episode.guid).await {
            Ok(file_name) => {
                let present = file_name != episode.title
                    && self.filter.exists(&target_path(destination, &file_name));
                present.then_some(SkipReason::ResolvedNamePresent { file_name })
            }
            Err(e) => {
                warn!(query, title = %episode.title, url = %episode.guid, error = %e, "could not resolve file name");
                None
            }
        }
    }

    async fn submit_episode(
        &mut self,
        episode: &Episode,
        destination: &Path,
    ) -> Result<(), SyncError> {
        let torrent = match self.options.strategy {
            SubmissionStrategy::Url => TorrentSource::Url(episode.link.clone()),
            SubmissionStrategy::Metainfo => {
                let payload = self
                    .indexer
                    .fetch_torrent_payload(&episode.link)
                    .await
                    .map_err(|e| SyncError::Payload {
                        title: episode.title.clone(),
                        source: e,
                    })?;
                TorrentSource::Metainfo(payload)
            }
        };

        let request = DownloadRequest {
            download_dir: destination.to_path_buf(),
            torrent,
        };

        self.downloader
            .submit(&request, self.options.max_attempts)
            .await
            .map_err(|e| SyncError::Submission {
                title: episode.title.clone(),
                source: e,
            })
    }
}

/// Path a release named `name` lands at; leading separators are dropped so a
/// name can never replace the destination
fn target_path(destination: &Path, name: &str) -> PathBuf {
    destination.join(name.trim_start_matches(['/', '\\']))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use bytes::Bytes;
    use tempfile::tempdir;

    use crate::error::{IndexerError, SessionError};
    use crate::filter::PartialAwareFilter;
    use crate::progress::{NoopReporter, ProgressReporter};

    #[derive(Default)]
    struct MockIndexer {
        feeds: HashMap<String, Vec<Episode>>,
        file_names: HashMap<String, String>,
        searches: Mutex<Vec<String>>,
        payload_fetches: Mutex<Vec<String>>,
    }

    impl MockIndexer {
        fn feed(mut self, query: &str, episodes: Vec<Episode>) -> Self {
            self.feeds.insert(query.to_string(), episodes);
            self
        }

        fn file_name(mut self, guid: &str, name: &str) -> Self {
            self.file_names.insert(guid.to_string(), name.to_string());
            self
        }
    }

    #[async_trait]
    impl Indexer for MockIndexer {
        async fn search_episodes(&self, query: &str) -> Result<Vec<Episode>, IndexerError> {
            self.searches.lock().unwrap().push(query.to_string());
            self.feeds
                .get(query)
                .cloned()
                .ok_or_else(|| IndexerError::Unavailable {
                    url: format!("https://nyaa.si/?page=rss&q={query}"),
                    status: 503,
                })
        }

        async fn resolve_file_name(&self, detail_url: &str) -> Result<String, IndexerError> {
            self.file_names
                .get(detail_url)
                .cloned()
                .ok_or_else(|| IndexerError::Unavailable {
                    url: detail_url.to_string(),
                    status: 404,
                })
        }

        async fn fetch_torrent_payload(&self, torrent_url: &str) -> Result<Bytes, IndexerError> {
            self.payload_fetches
                .lock()
                .unwrap()
                .push(torrent_url.to_string());
            if torrent_url.contains("missing") {
                return Err(IndexerError::Unavailable {
                    url: torrent_url.to_string(),
                    status: 404,
                });
            }
            Ok(Bytes::from(format!("torrent:{torrent_url}")))
        }
    }

    #[derive(Default)]
    struct MockDownloader {
        submitted: Vec<DownloadRequest>,
        failing_links: HashSet<String>,
    }

    impl MockDownloader {
        fn failing(links: &[&str]) -> Self {
            Self {
                submitted: Vec::new(),
                failing_links: links.iter().map(|l| l.to_string()).collect(),
            }
        }

        fn links(&self) -> Vec<String> {
            self.submitted
                .iter()
                .map(|request| match &request.torrent {
                    TorrentSource::Url(url) => url.clone(),
                    TorrentSource::Metainfo(bytes) => String::from_utf8_lossy(bytes).to_string(),
                })
                .collect()
        }
    }

    #[async_trait]
    impl DownloadClient for MockDownloader {
        async fn establish_session(&mut self) -> Result<(), SessionError> {
            Ok(())
        }

        async fn submit(
            &mut self,
            request: &DownloadRequest,
            max_attempts: u32,
        ) -> Result<(), SessionError> {
            if let TorrentSource::Url(url) = &request.torrent
                && self.failing_links.contains(url)
            {
                return Err(SessionError::SubmissionFailed {
                    attempts: max_attempts,
                    download_dir: request.download_dir.clone(),
                    source: Box::new(SessionError::Status { status: 500 }),
                });
            }
            self.submitted.push(request.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl ProgressReporter for RecordingReporter {
        fn report(&self, event: ProgressEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn episode(n: u32) -> Episode {
        Episode {
            title: format!("Ep{n}.mkv"),
            guid: format!("https://nyaa.si/view/{n}"),
            link: format!("https://nyaa.si/download/{n}.torrent"),
        }
    }

    fn episodes(range: std::ops::RangeInclusive<u32>) -> Vec<Episode> {
        range.map(episode).collect()
    }

    fn instant() -> SyncOptions {
        SyncOptions {
            submit_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    fn orchestrator(
        indexer: MockIndexer,
        downloader: MockDownloader,
        options: SyncOptions,
    ) -> Orchestrator<MockIndexer, MockDownloader, PartialAwareFilter> {
        Orchestrator::new(
            indexer,
            downloader,
            PartialAwareFilter::default(),
            options,
            NoopReporter::shared(),
        )
    }

    #[tokio::test]
    async fn submits_from_start_episode_in_order() {
        let dir = tempdir().unwrap();
        let indexer = MockIndexer::default().feed("Example Show", episodes(1..=5));
        let mut sync = orchestrator(indexer, MockDownloader::default(), instant());

        let show = ShowConfig::new("Example Show", "example").starting_at(3);
        let report = sync.sync_show(&show, dir.path()).await.unwrap();

        assert_eq!(report.feed_episodes, 5);
        assert_eq!(report.candidates, 3);
        assert_eq!(report.submitted, 3);
        assert_eq!(
            sync.downloader.links(),
            vec![
                "https://nyaa.si/download/3.torrent",
                "https://nyaa.si/download/4.torrent",
                "https://nyaa.si/download/5.torrent",
            ]
        );
        assert!(
            sync.downloader
                .submitted
                .iter()
                .all(|r| r.download_dir == dir.path())
        );
    }

    #[tokio::test]
    async fn start_beyond_feed_is_not_an_error() {
        let dir = tempdir().unwrap();
        let indexer = MockIndexer::default().feed("Example Show", episodes(1..=2));
        let mut sync = orchestrator(indexer, MockDownloader::default(), instant());

        let show = ShowConfig::new("Example Show", "example").starting_at(10);
        let report = sync.sync_show(&show, dir.path()).await.unwrap();

        assert_eq!(report.candidates, 0);
        assert!(sync.downloader.submitted.is_empty());
    }

    #[tokio::test]
    async fn second_run_submits_nothing_once_file_exists() {
        let dir = tempdir().unwrap();
        let indexer = MockIndexer::default().feed("Example Show", episodes(1..=1));
        let mut sync = orchestrator(indexer, MockDownloader::default(), instant());
        let show = ShowConfig::new("Example Show", "example");

        let first = sync.sync_show(&show, dir.path()).await.unwrap();
        assert_eq!(first.submitted, 1);

        std::fs::write(dir.path().join("Ep1.mkv"), b"video").unwrap();

        let second = sync.sync_show(&show, dir.path()).await.unwrap();
        assert_eq!(second.submitted, 0);
        assert_eq!(second.skipped, 1);
        assert_eq!(sync.downloader.submitted.len(), 1);
    }

    #[tokio::test]
    async fn in_progress_marker_counts_as_acquired() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("EpisodeA.mkv.part"), b"").unwrap();

        let indexer = MockIndexer::default().feed(
            "Example Show",
            vec![Episode {
                title: "EpisodeA.mkv".to_string(),
                guid: "https://nyaa.si/view/1".to_string(),
                link: "https://nyaa.si/download/1.torrent".to_string(),
            }],
        );
        let mut sync = orchestrator(indexer, MockDownloader::default(), instant());

        let show = ShowConfig::new("Example Show", "example");
        let report = sync.sync_show(&show, dir.path()).await.unwrap();

        assert_eq!(report.skipped, 1);
        assert!(sync.downloader.submitted.is_empty());
    }

    #[tokio::test]
    async fn resolved_name_prevents_resubmission() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("[Group] Real Name 02.mkv"), b"video").unwrap();

        let indexer = MockIndexer::default()
            .feed("Example Show", episodes(1..=2))
            .file_name("https://nyaa.si/view/2", "[Group] Real Name 02.mkv");
        let reporter = Arc::new(RecordingReporter::default());
        let mut sync = Orchestrator::new(
            indexer,
            MockDownloader::default(),
            PartialAwareFilter::default(),
            instant(),
            reporter.clone(),
        );

        let show = ShowConfig::new("Example Show", "example");
        let report = sync.sync_show(&show, dir.path()).await.unwrap();

        assert_eq!(report.submitted, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(
            sync.downloader.links(),
            vec!["https://nyaa.si/download/1.torrent"]
        );
        assert!(reporter.events.lock().unwrap().contains(&ProgressEvent::EpisodeSkipped {
            query: "Example Show".to_string(),
            title: "Ep2.mkv".to_string(),
            reason: SkipReason::ResolvedNamePresent {
                file_name: "[Group] Real Name 02.mkv".to_string(),
            },
        }));
    }

    #[tokio::test]
    async fn unresolvable_detail_page_does_not_block_submission() {
        let dir = tempdir().unwrap();
        // no file names registered, so every resolution fails
        let indexer = MockIndexer::default().feed("Example Show", episodes(1..=2));
        let mut sync = orchestrator(indexer, MockDownloader::default(), instant());

        let show = ShowConfig::new("Example Show", "example");
        let report = sync.sync_show(&show, dir.path()).await.unwrap();

        assert_eq!(report.submitted, 2);
    }

    #[tokio::test]
    async fn unavailable_feed_yields_empty_report() {
        let dir = tempdir().unwrap();
        let reporter = Arc::new(RecordingReporter::default());
        let mut sync = Orchestrator::new(
            MockIndexer::default(),
            MockDownloader::default(),
            PartialAwareFilter::default(),
            instant(),
            reporter.clone(),
        );

        let show = ShowConfig::new("Unknown Show", "unknown");
        let report = sync.sync_show(&show, dir.path()).await.unwrap();

        assert_eq!(report.submitted, 0);
        assert_eq!(report.feed_episodes, 0);
        assert!(matches!(
            reporter.events.lock().unwrap().last(),
            Some(ProgressEvent::FeedUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn failed_episode_is_skipped_by_default() {
        let dir = tempdir().unwrap();
        let indexer = MockIndexer::default().feed("Example Show", episodes(1..=3));
        let downloader = MockDownloader::failing(&["https://nyaa.si/download/2.torrent"]);
        let mut sync = orchestrator(indexer, downloader, instant());

        let show = ShowConfig::new("Example Show", "example");
        let report = sync.sync_show(&show, dir.path()).await.unwrap();

        assert_eq!(report.submitted, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failed_episodes[0].0, "Ep2.mkv");
        assert_eq!(
            sync.downloader.links(),
            vec![
                "https://nyaa.si/download/1.torrent",
                "https://nyaa.si/download/3.torrent",
            ]
        );
    }

    #[tokio::test]
    async fn failed_episode_aborts_show_when_configured() {
        let dir = tempdir().unwrap();
        let indexer = MockIndexer::default().feed("Example Show", episodes(1..=3));
        let downloader = MockDownloader::failing(&["https://nyaa.si/download/2.torrent"]);
        let options = SyncOptions {
            continue_on_error: false,
            ..instant()
        };
        let mut sync = orchestrator(indexer, downloader, options);

        let show = ShowConfig::new("Example Show", "example");
        let result = sync.sync_show(&show, dir.path()).await;

        match result {
            Err(SyncError::Submission { title, source }) => {
                assert_eq!(title, "Ep2.mkv");
                assert!(matches!(source, SessionError::SubmissionFailed { .. }));
            }
            other => panic!("Expected Submission error, got {other:?}"),
        }
        assert_eq!(sync.downloader.submitted.len(), 1);
    }

    #[tokio::test]
    async fn metainfo_strategy_sends_fetched_payload() {
        let dir = tempdir().unwrap();
        let indexer = MockIndexer::default().feed("Example Show", episodes(1..=1));
        let options = SyncOptions {
            strategy: SubmissionStrategy::Metainfo,
            ..instant()
        };
        let mut sync = orchestrator(indexer, MockDownloader::default(), options);

        let show = ShowConfig::new("Example Show", "example");
        sync.sync_show(&show, dir.path()).await.unwrap();

        assert_eq!(
            sync.downloader.submitted[0].torrent,
            TorrentSource::Metainfo(Bytes::from("torrent:https://nyaa.si/download/1.torrent"))
        );
        assert_eq!(
            sync.indexer.payload_fetches.lock().unwrap().as_slice(),
            ["https://nyaa.si/download/1.torrent"]
        );
    }

    #[tokio::test]
    async fn payload_failure_is_an_episode_failure() {
        let dir = tempdir().unwrap();
        let mut broken = episode(1);
        broken.link = "https://nyaa.si/download/missing.torrent".to_string();
        let indexer = MockIndexer::default().feed("Example Show", vec![broken, episode(2)]);
        let options = SyncOptions {
            strategy: SubmissionStrategy::Metainfo,
            ..instant()
        };
        let mut sync = orchestrator(indexer, MockDownloader::default(), options);

        let show = ShowConfig::new("Example Show", "example");
        let report = sync.sync_show(&show, dir.path()).await.unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.submitted, 1);
    }

    #[tokio::test]
    async fn sync_all_resolves_folders_and_isolates_failures() {
        let dir = tempdir().unwrap();
        let indexer = MockIndexer::default()
            .feed("Aborting Show", episodes(1..=2))
            .feed("Healthy Show", episodes(3..=3));
        let downloader = MockDownloader::failing(&["https://nyaa.si/download/1.torrent"]);
        let options = SyncOptions {
            continue_on_error: false,
            ..instant()
        };
        let mut sync = orchestrator(indexer, downloader, options);

        let shows = vec![
            ShowConfig::new("Missing Show", "missing"),
            ShowConfig::new("Aborting Show", "aborting"),
            ShowConfig::new("Healthy Show", "healthy"),
        ];
        let summary = sync.sync_all(&shows, dir.path()).await;

        assert_eq!(summary.shows, 3);
        assert_eq!(summary.submitted, 1);
        assert_eq!(summary.aborted_shows.len(), 1);
        assert_eq!(summary.aborted_shows[0].0, "Aborting Show");
        assert_eq!(
            sync.indexer.searches.lock().unwrap().as_slice(),
            ["Missing Show", "Aborting Show", "Healthy Show"]
        );
        assert_eq!(
            sync.downloader.submitted[0].download_dir,
            dir.path().join("healthy")
        );
    }

    #[tokio::test]
    async fn aborted_show_keeps_earlier_submissions_in_summary() {
        let dir = tempdir().unwrap();
        let indexer = MockIndexer::default().feed("Aborting Show", episodes(1..=3));
        let downloader = MockDownloader::failing(&["https://nyaa.si/download/2.torrent"]);
        let options = SyncOptions {
            continue_on_error: false,
            ..instant()
        };
        let reporter = Arc::new(RecordingReporter::default());
        let mut sync = Orchestrator::new(
            indexer,
            downloader,
            PartialAwareFilter::default(),
            options,
            reporter.clone(),
        );

        let shows = vec![ShowConfig::new("Aborting Show", "aborting")];
        let summary = sync.sync_all(&shows, dir.path()).await;

        assert_eq!(sync.downloader.submitted.len(), 1);
        assert_eq!(summary.submitted, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.aborted_shows.len(), 1);

        let events = reporter.events.lock().unwrap();
        assert!(events.contains(&ProgressEvent::ShowCompleted {
            query: "Aborting Show".to_string(),
            submitted: 1,
            skipped: 0,
            failed: 1,
        }));
        assert!(events.contains(&ProgressEvent::CycleCompleted {
            shows: 1,
            submitted: 1,
            skipped: 0,
            failed: 1,
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn payload_failure_does_not_delay() {
        let dir = tempdir().unwrap();
        let mut broken = episode(1);
        broken.link = "https://nyaa.si/download/missing.torrent".to_string();
        let indexer = MockIndexer::default().feed("Example Show", vec![broken]);
        let options = SyncOptions {
            strategy: SubmissionStrategy::Metainfo,
            ..Default::default()
        };
        let mut sync = orchestrator(indexer, MockDownloader::default(), options);

        let start = tokio::time::Instant::now();
        let show = ShowConfig::new("Example Show", "example");
        let report = sync.sync_show(&show, dir.path()).await.unwrap();

        assert_eq!(report.failed, 1);
        assert!(sync.downloader.submitted.is_empty());
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_follows_each_submission_only() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("Ep1.mkv"), b"video").unwrap();
        let indexer = MockIndexer::default().feed("Example Show", episodes(1..=4));
        let mut sync = orchestrator(indexer, MockDownloader::default(), SyncOptions::default());

        let start = tokio::time::Instant::now();
        let show = ShowConfig::new("Example Show", "example");
        let report = sync.sync_show(&show, dir.path()).await.unwrap();

        assert_eq!(report.submitted, 3);
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[test]
    fn target_path_stays_inside_destination() {
        let destination = Path::new("/media/example");
        assert_eq!(
            target_path(destination, "/etc/passwd"),
            PathBuf::from("/media/example/etc/passwd")
        );
        assert_eq!(
            target_path(destination, "Ep1.mkv"),
            PathBuf::from("/media/example/Ep1.mkv")
        );
    }
}
