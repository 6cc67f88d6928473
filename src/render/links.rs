//! Link and link-text helpers exposed to templates

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except `A-Z a-z 0-9 _ . - ~` is escaped in anchors
const ANCHOR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~');

/// Page titles additionally keep their path and namespace separators
const PAGE_TITLE: &AsciiSet = &ANCHOR.remove(b'/').remove(b':');

/// Stand-in for `/` inside anchors, as MediaWiki encodes it in section ids
pub const SLASH_PLACEHOLDER: &str = ".2F";

const ZERO_WIDTH_SPACE: char = '\u{200B}';

/// Let long slash-delimited names wrap after each `/`
pub fn format_link_text(text: &str) -> String {
    text.replace('/', &format!("/{ZERO_WIDTH_SPACE}"))
}

/// In-page anchor for a heading or entity name.
///
/// Names with a `/` only have the slash replaced; everything else has
/// spaces turned into underscores and is percent-encoded.
pub fn anchor(text: &str) -> String {
    if text.contains('/') {
        return format!("#{}", text.replace('/', SLASH_PLACEHOLDER));
    }
    format!("#{}", utf8_percent_encode(&text.replace(' ', "_"), ANCHOR))
}

/// Absolute link to the wiki page titled `text`
pub fn wiki_link(text: &str, base: &str) -> String {
    let title = capitalize_first(text.trim()).replace(' ', "_");
    format!("{}{}", base, utf8_percent_encode(&title, PAGE_TITLE))
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
