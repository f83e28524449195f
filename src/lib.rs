pub mod config;
pub mod error;
pub mod filter;
pub mod http;
pub mod indexer;
pub mod progress;
pub mod rpc;
pub mod scheduler;
pub mod sync;

// Re-export main types for convenience
pub use config::{Config, Library, ShowConfig};
pub use error::{ConfigError, IndexerError, SessionError, SyncError};
pub use filter::{DownloadFilter, PartialAwareFilter};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use indexer::{Episode, Indexer, NyaaIndexer};
pub use progress::{
    NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter, SkipReason,
};
pub use rpc::{DownloadClient, DownloadRequest, RpcProtocol, TorrentSource, TransmissionClient};
pub use scheduler::{Schedule, run};
pub use sync::{Orchestrator, ShowReport, SubmissionStrategy, SyncOptions, SyncSummary};
