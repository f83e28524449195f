mod client;
mod detail;
mod feed;

pub use client::{DEFAULT_INDEXER_URL, Indexer, NyaaIndexer};
pub use detail::parse_file_name;
pub use feed::{Episode, parse_feed};
