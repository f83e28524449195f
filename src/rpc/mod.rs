mod client;
mod request;

pub use client::{
    DEFAULT_DAEMON_URL, DEFAULT_MAX_ATTEMPTS, DownloadClient, SESSION_EXPIRED_STATUS,
    SESSION_HEADER, TransmissionClient,
};
pub use request::{DownloadRequest, RpcProtocol, TorrentSource};
