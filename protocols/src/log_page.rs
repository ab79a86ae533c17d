//! Parsing of the firmware's rolling log page.
//!
//! The page is HTML with the log itself inside a `<pre>` block.

use scraper::{Html, Selector};

fn pre_blocks(body: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse("pre") else {
        return Vec::new();
    };

    Html::parse_document(body)
        .select(&selector)
        .map(|element| element.text().collect::<String>())
        .collect()
}

/// Returns the text of the first `<pre>` element of the page.
///
/// A missing closing tag yields everything after the opening tag, which is
/// what a truncated page looks like.
pub fn extract_log(body: &str) -> Option<String> {
    pre_blocks(body).into_iter().next()
}

/// True when any `<pre>` block of `body` contains `marker`.
pub fn contains_marker(body: &str, marker: &str) -> bool {
    pre_blocks(body).iter().any(|log| log.contains(marker))
}
