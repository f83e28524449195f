// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use tracing::debug;

/// A single release listed in the indexer feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    /// Release title as shown in the feed
    pub title: String,
    /// Detail page URL
    pub guid: String,
    /// Torrent file URL
    pub link: String,
}

/// Parse RSS feed XML bytes into episodes, oldest first
///
/// The indexer lists the newest release first; the returned order is the
/// reverse of the document order. Items without a title, guid or link are
/// dropped.
pub fn parse_feed(xml_bytes: &[u8]) -> Result<Vec<Episode>, rss::Error> {
    let channel = rss::Channel::read_from(xml_bytes)?;

    let mut episodes: Vec<Episode> = channel.items().iter().filter_map(parse_episode).collect();
    episodes.reverse();

    Ok(episodes)
}

fn parse_episode(item: &rss::Item) -> Option<Episode> {
    let title = item.title().map(str::trim).filter(|t| !t.is_empty());
    let guid = item.guid().map(|g| g.value().trim()).filter(|g| !g.is_empty());
    let link = item.link().map(str::trim).filter(|l| !l.is_empty());

    match (title, guid, link) {
        (Some(title), Some(guid), Some(link)) => Some(Episode {
            title: title.to_string(),
            guid: guid.to_string(),
            link: link.to_string(),
        }),
        _ => {
            debug!(title = ?item.title(), "skipping incomplete feed item");
            None
        }
    }
}
