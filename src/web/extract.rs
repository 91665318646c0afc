//! Readable-text extraction from HTML.

use scraper::{Html, Node};

/// Elements whose text never counts as page content.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "nav", "header", "footer", "aside"];

/// Visible text of `html` with whitespace collapsed, cut to `max_chars` characters.
///
/// Text inside script, style and page-chrome elements is dropped.
pub fn extract_readable_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);
    let mut words: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let skipped = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
        });
        if !skipped {
            words.extend(text.split_whitespace());
        }
    }

    truncate_chars(&words.join(" "), max_chars)
}

/// First `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
