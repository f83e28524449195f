use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::http::{HttpClient, HttpResponse};

use super::request::{DownloadRequest, RpcProtocol};

/// Default Transmission RPC endpoint
pub const DEFAULT_DAEMON_URL: &str = "http://localhost:9091/transmission/rpc";

/// Header carrying the session credential in both directions
pub const SESSION_HEADER: &str = "X-Transmission-Session-Id";

/// Status the daemon answers with when the session id is missing or stale
pub const SESSION_EXPIRED_STATUS: u16 = 409;

/// Default number of attempts for a single submission
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Write access to a download daemon
#[async_trait]
pub trait DownloadClient: Send {
    /// Perform the handshake and remember the session credential
    async fn establish_session(&mut self) -> Result<(), SessionError>;

    /// Ask the daemon to start downloading, renewing the session as needed
    async fn submit(
        &mut self,
        request: &DownloadRequest,
        max_attempts: u32,
    ) -> Result<(), SessionError>;
}

/// Transmission RPC client
///
/// `session_id` is `None` while unauthenticated. Any failed add call drops it,
/// so the following attempt starts with a fresh handshake.
pub struct TransmissionClient<C> {
    client: C,
    url: String,
    protocol: RpcProtocol,
    session_id: Option<HeaderValue>,
}

impl<C: HttpClient> TransmissionClient<C> {
    pub fn new(client: C, url: impl Into<String>, protocol: RpcProtocol) -> Self {
        Self {
            client,
            url: url.into(),
            protocol,
            session_id: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session_id.is_some()
    }

    async fn post(
        &self,
        body: &Value,
        session_id: Option<&HeaderValue>,
    ) -> Result<HttpResponse, SessionError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(id) = session_id {
            headers.insert(SESSION_HEADER, id.clone());
        }

        self.client
            .post(&self.url, headers, serde_json::to_vec(body)?)
            .await
            .map_err(|e| SessionError::Request {
                url: self.url.clone(),
                source: e,
            })
    }

    async fn handshake(&mut self) -> Result<HeaderValue, SessionError> {
        self.session_id = None;

        let response = self.post(&self.protocol.handshake_body(), None).await?;
        let id = response
            .headers
            .get(SESSION_HEADER)
            .cloned()
            .ok_or(SessionError::MissingSessionId {
                status: response.status,
            })?;

        debug!(url = %self.url, "session established");
        self.session_id = Some(id.clone());
        Ok(id)
    }

    async fn try_submit(&mut self, request: &DownloadRequest) -> Result<(), SessionError> {
        let session_id = match self.session_id.clone() {
            Some(id) => id,
            None => self.handshake().await?,
        };

        let body = self
            .protocol
            .add_body(request, session_id.to_str().unwrap_or_default());
        let response = self.post(&body, Some(&session_id)).await?;

        match response.status {
            SESSION_EXPIRED_STATUS => Err(SessionError::SessionExpired),
            _ if !response.is_success() => Err(SessionError::Status {
                status: response.status,
            }),
            _ => self.protocol.check_reply(&response.body),
        }
    }
}

#[async_trait]
impl<C: HttpClient> DownloadClient for TransmissionClient<C> {
    async fn establish_session(&mut self) -> Result<(), SessionError> {
        self.handshake().await.map(|_| ())
    }

    async fn submit(
        &mut self,
        request: &DownloadRequest,
        max_attempts: u32,
    ) -> Result<(), SessionError> {
        let attempts = max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let error = match self.try_submit(request).await {
                Ok(()) => return Ok(()),
                Err(e) => e,
            };

            self.session_id = None;

            if attempt >= attempts {
                return Err(SessionError::SubmissionFailed {
                    attempts,
                    download_dir: request.download_dir.clone(),
                    source: Box::new(error),
                });
            }

            warn!(
                attempt,
                max_attempts = attempts,
                dir = %request.download_dir.display(),
                error = %error,
                "submission failed, renewing session"
            );
            attempt += 1;
        }
    }
}
