use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::SessionError;

/// What the daemon should download
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TorrentSource {
    /// A URL the daemon fetches itself
    Url(String),
    /// Raw `.torrent` contents, sent inline
    Metainfo(Bytes),
}

/// A single add-torrent call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub download_dir: PathBuf,
    pub torrent: TorrentSource,
}

/// Wire dialect spoken by the daemon
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RpcProtocol {
    /// `torrent-add` with an `arguments` object and a `result` string reply
    #[default]
    Legacy,
    /// JSON-RPC 2.0 `torrent_add` with `params`, used by Transmission 4.1+
    JsonRpc,
}

impl RpcProtocol {
    pub(crate) fn handshake_body(self) -> Value {
        match self {
            RpcProtocol::Legacy => json!({ "method": "session-get" }),
            RpcProtocol::JsonRpc => json!({ "jsonrpc": "2.0", "method": "session_get" }),
        }
    }

    pub(crate) fn add_body(self, request: &DownloadRequest, session_id: &str) -> Value {
        let download_dir = request.download_dir.to_string_lossy();
        let (key, value) = match &request.torrent {
            TorrentSource::Url(url) => ("filename", url.clone()),
            TorrentSource::Metainfo(bytes) => ("metainfo", STANDARD.encode(bytes)),
        };

        match self {
            RpcProtocol::Legacy => json!({
                "method": "torrent-add",
                "arguments": {
                    "download-dir": download_dir,
                    key: value,
                },
            }),
            RpcProtocol::JsonRpc => json!({
                "jsonrpc": "2.0",
                "method": "torrent_add",
                "params": {
                    "download_dir": download_dir,
                    key: value,
                },
                "id": session_id,
            }),
        }
    }

    /// Inspect a 2xx reply body for an RPC-level failure
    pub(crate) fn check_reply(self, body: &[u8]) -> Result<(), SessionError> {
        let reply: Value = serde_json::from_slice(body).map_err(|e| SessionError::Rejected {
            reason: format!("unreadable reply: {e}"),
        })?;

        match self {
            RpcProtocol::Legacy => match reply.get("result").and_then(Value::as_str) {
                Some("success") => Ok(()),
                Some(other) => Err(SessionError::Rejected {
                    reason: other.to_string(),
                }),
                None => Err(SessionError::Rejected {
                    reason: "reply has no result".to_string(),
                }),
            },
            RpcProtocol::JsonRpc => match reply.get("error") {
                None | Some(Value::Null) => Ok(()),
                Some(error) => Err(SessionError::Rejected {
                    reason: error
                        .get("message")
                        .and_then(Value::as_str)
                        .map(String::from)
                        .unwrap_or_else(|| error.to_string()),
                }),
            },
        }
    }
}
