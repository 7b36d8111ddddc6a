//! Primary-content extraction from rendered pages.
//!
//! Pulls the inner HTML of the first `<main>` region and removes the
//! autogenerated sub-sections (comments, media links, expandable
//! external links) by their exact element ids before sanitization.

use regex::Regex;
use std::sync::LazyLock;

static RE_MAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<main[^>]*>(.*?)</main>").unwrap());

static RE_COMMENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<div[^>]*id="autogenerated-post-comments"[^>]*>.*?</div>"#).unwrap()
});

static RE_MEDIA_LINKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<div[^>]*id="autogenerated-media-links"[^>]*>.*?</div>"#).unwrap()
});

static RE_EXTERNAL_LINKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<details[^>]*id="autogenerated-external-links"[^>]*>.*?</details>"#).unwrap()
});

/// Extract the primary content region of a rendered page.
///
/// Returns `None` when the page has no `<main>` region; the item is
/// then skipped for this run with its original feed values retained.
pub fn primary_content(page_html: &str) -> Option<String> {
    let captures = RE_MAIN.captures(page_html)?;
    let mut content = captures[1].to_string();

    for re in [&RE_COMMENTS, &RE_MEDIA_LINKS, &RE_EXTERNAL_LINKS] {
        content = re.replace_all(&content, "").into_owned();
    }

    Some(content)
}
