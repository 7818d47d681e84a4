//! Content sanitizer.
//!
//! Two transforms: `strip_markup` for anything stored as plain text (titles, and post
//! bodies before they are persisted), and `render_markdown` which turns a stored body
//! into HTML that only contains a handful of formatting tags.
//!
//! Stored text is never HTML-escaped; escaping happens once, when a body is rendered.

use std::collections::{HashMap, HashSet};

use ammonia::Builder;
use pulldown_cmark::{Options, Parser, html};

/// Tags permitted in rendered post bodies. No attributes are permitted on any of them.
pub const ALLOWED_TAGS: [&str; 10] = ["p", "br", "ul", "ol", "li", "strong", "b", "em", "i", "h1"];

/// Elements whose contents are dropped along with the tag itself.
const DROPPED_CONTENT_TAGS: [&str; 2] = ["script", "style"];

fn builder(tags: HashSet<&'static str>) -> Builder<'static> {
    let mut builder = Builder::default();
    builder
        .tags(tags)
        .clean_content_tags(DROPPED_CONTENT_TAGS.into_iter().collect())
        .generic_attributes(HashSet::new())
        .tag_attributes(HashMap::new())
        .link_rel(None)
        .strip_comments(true);
    builder
}

/// Trims the input and removes every tag and attribute.
///
/// The result is plain text: `Q&A <b>x</b>` becomes `Q&A x`. It must be escaped by
/// whoever embeds it in HTML.
pub fn strip_markup(input: &str) -> String {
    let cleaned = builder(HashSet::new()).clean(input.trim()).to_string();
    html_escape::decode_html_entities(&cleaned).trim().to_string()
}

/// Renders Markdown source to HTML and filters the result through the tag allow-list.
///
/// Raw HTML in the source, including markup that only appears once entities are
/// decoded, goes through the same allow-list.
pub fn render_markdown(source: &str) -> String {
    let mut unsafe_html = String::new();
    html::push_html(&mut unsafe_html, Parser::new_ext(source, Options::empty()));

    builder(ALLOWED_TAGS.into_iter().collect())
        .clean(&unsafe_html)
        .to_string()
}

/// First `max_chars` characters of a stored body, for list views.
pub fn excerpt(body: &str, max_chars: usize) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head.trim_end())
    } else {
        head
    }
}
