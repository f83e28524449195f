// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static FILE_LIST_ENTRY: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".torrent-file-list li").expect("valid file list selector")
});

/// Extract the first file name from a torrent detail page
///
/// Folder entries carry their name inside a link, so only direct text of a
/// list entry is considered; the first entry with any is the first file.
pub fn parse_file_name(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    document
        .select(&FILE_LIST_ENTRY)
        .map(direct_text)
        .find(|name| !name.is_empty())
}

fn direct_text(entry: ElementRef<'_>) -> String {
    let text: String = entry
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .collect();
    text.trim().to_string()
}
