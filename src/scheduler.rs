use std::time::Duration;

use tracing::{info, warn};

use crate::config::Library;
use crate::error::ConfigError;
use crate::filter::DownloadFilter;
use crate::indexer::Indexer;
use crate::rpc::DownloadClient;
use crate::sync::Orchestrator;

/// Default pause between cycles in periodic mode
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// When to run synchronization passes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// A single pass, then return
    Once,
    /// A pass, then sleep the interval, forever
    Every(Duration),
}

/// Run synchronization passes according to `schedule`
///
/// `load` is called before every pass so edits to the library (`root` and
/// `shows`) take effect on the next cycle. Client and sync settings live in
/// the orchestrator and are not reloaded. Only a failure of the very first
/// load is returned; later failures keep the previous library.
pub async fn run<I, D, F, L>(
    orchestrator: &mut Orchestrator<I, D, F>,
    mut load: L,
    schedule: Schedule,
) -> Result<(), ConfigError>
where
    I: Indexer,
    D: DownloadClient,
    F: DownloadFilter,
    L: FnMut() -> Result<Library, ConfigError>,
{
    let mut library = load()?;
    let mut cycle: u64 = 1;

    loop {
        info!(cycle, shows = library.shows.len(), root = %library.root.display(), "starting sync cycle");
        let summary = orchestrator.sync_all(&library.shows, &library.root).await;
        info!(
            cycle,
            submitted = summary.submitted,
            skipped = summary.skipped,
            failed = summary.failed,
            "sync cycle finished"
        );

        let Schedule::Every(interval) = schedule else {
            return Ok(());
        };

        info!(next_in_secs = interval.as_secs(), "waiting for next cycle");
        tokio::time::sleep(interval).await;
        cycle += 1;

        match load() {
            Ok(next) => library = next,
            Err(e) => warn!(error = %e, "could not reload configuration, keeping previous"),
        }
    }
}
