// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;
use url::Url;

use crate::error::IndexerError;
use crate::http::HttpClient;

use super::detail::parse_file_name;
use super::feed::{Episode, parse_feed};

/// Default indexer location
pub const DEFAULT_INDEXER_URL: &str = "https://nyaa.si";

/// Read access to a torrent indexer
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Search the feed and return matching episodes, oldest first
    async fn search_episodes(&self, query: &str) -> Result<Vec<Episode>, IndexerError>;

    /// Fetch an episode's detail page and return the name of its first file
    async fn resolve_file_name(&self, detail_url: &str) -> Result<String, IndexerError>;

    /// Download the raw `.torrent` descriptor
    async fn fetch_torrent_payload(&self, torrent_url: &str) -> Result<Bytes, IndexerError>;
}

/// Indexer client for nyaa-style sites
#[derive(Clone)]
pub struct NyaaIndexer<C> {
    client: C,
    base_url: Url,
}

impl<C: HttpClient> NyaaIndexer<C> {
    /// Create a client for the indexer at `base_url`
    pub fn new(client: C, base_url: &str) -> Result<Self, IndexerError> {
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    /// Build the RSS search URL for a query
    pub fn feed_url(&self, query: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("page", "rss")
            .append_pair("q", query);
        url
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, IndexerError> {
        let response = self
            .client
            .get(url)
            .await
            .map_err(|e| IndexerError::Request {
                url: url.to_string(),
                source: e,
            })?;

        if !response.is_success() {
            return Err(IndexerError::Unavailable {
                url: url.to_string(),
                status: response.status,
            });
        }

        Ok(response.body)
    }
}

#[async_trait]
impl<C: HttpClient> Indexer for NyaaIndexer<C> {
    async fn search_episodes(&self, query: &str) -> Result<Vec<Episode>, IndexerError> {
        let url = self.feed_url(query).to_string();
        let bytes = self.fetch_bytes(&url).await?;

        let episodes =
            parse_feed(&bytes).map_err(|e| IndexerError::InvalidFeed { url, source: e })?;
        debug!(query, count = episodes.len(), "feed parsed");

        Ok(episodes)
    }

    async fn resolve_file_name(&self, detail_url: &str) -> Result<String, IndexerError> {
        let bytes = self.fetch_bytes(detail_url).await?;
        let html = String::from_utf8_lossy(&bytes);

        parse_file_name(&html).ok_or_else(|| IndexerError::FileListMissing {
            url: detail_url.to_string(),
        })
    }

    async fn fetch_torrent_payload(&self, torrent_url: &str) -> Result<Bytes, IndexerError> {
        self.fetch_bytes(torrent_url).await
    }
}
