//! The sanitization policy: allow-listed tags, per-tag attributes and
//! the markers that drive structural transforms.
//!
//! The policy is immutable for the duration of a run. Output may only
//! contain tags from [`Policy::is_allowed`]; transforms that replace
//! elements (disclosure collapse, popover-to-link) stay inside the
//! allow-list by construction.

use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::LazyLock;

// ============================================================================
// Transform Markers
// ============================================================================

/// Icon images under this namespace are dropped outright.
pub const ICON_SRC_PREFIX: &str = "https://www.notion.so/icons/";

/// Alt-text marker for custom emoji placeholders; such images are dropped.
pub const EMOJI_ALT_PREFIX: &str = "custom emoji with name ";

/// Images under this site-internal path get an absolute URL.
pub const MEDIA_PATH_PREFIX: &str = "/notion/";

/// Popover targets under this prefix become real links.
pub const CONTENT_LINK_PREFIX: &str = "/posts/";

/// Screen-reader-only label class, stripped from generated link text.
pub const SR_ONLY_CLASS: &str = "sr-only";

/// Class marking an `<aside>` as the table-of-contents container.
pub const TOC_ASIDE_CLASS: &str = "toc-container";

/// Class marking a `<div>` as a table-of-contents block.
pub const TOC_DIV_CLASS: &str = "table-of-contents";

/// Attribute pair carried by inline popover markers.
pub const POPOVER_ATTR: &str = "data-popover-target";
pub const POPOVER_HREF_ATTR: &str = "data-href";

// ============================================================================
// Policy
// ============================================================================

const ALLOWED_TAGS: &[&str] = &[
    // Document sections
    "address", "article", "aside", "footer", "header", "h1", "h2", "h3", "h4", "h5", "h6",
    "hgroup", "main", "nav", "section",
    // Block text content
    "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure", "hr", "li", "ol", "p", "pre",
    "ul", "details", "summary",
    // Inline text
    "a", "abbr", "b", "bdi", "bdo", "br", "cite", "code", "data", "dfn", "em", "i", "kbd", "mark",
    "q", "rb", "rp", "rt", "rtc", "ruby", "s", "samp", "small", "span", "strong", "sub", "sup",
    "time", "u", "var", "wbr",
    // Table content
    "caption", "col", "colgroup", "table", "tbody", "td", "tfoot", "th", "thead", "tr",
    // Images
    "img",
];

const ALLOWED_ATTRS: &[(&str, &[&str])] = &[
    ("a", &["href", "title", "target"]),
    ("img", &["src", "alt", "title"]),
    ("td", &["align", "valign"]),
    ("th", &["align", "valign", "colspan", "rowspan"]),
];

pub struct Policy {
    allowed_tags: FxHashSet<&'static str>,
    allowed_attrs: FxHashMap<&'static str, &'static [&'static str]>,
}

impl Policy {
    /// Tags outside this set are discarded together with their subtree.
    pub fn is_allowed(&self, tag: &str) -> bool {
        self.allowed_tags.contains(tag)
    }

    /// Keep only the attributes allow-listed for this tag. Tags with no
    /// entry keep nothing.
    pub fn filter_attrs(&self, tag: &str, attrs: Vec<(String, String)>) -> Vec<(String, String)> {
        let Some(allowed) = self.allowed_attrs.get(tag) else {
            return Vec::new();
        };
        attrs
            .into_iter()
            .filter(|(k, _)| allowed.contains(&k.as_str()))
            .collect()
    }

    /// Elements that survive the empty-node prune with no attributes
    /// and no text.
    pub fn preserve_when_empty(&self, tag: &str) -> bool {
        matches!(tag, "br" | "hr" | "img")
    }
}

static POLICY: LazyLock<Policy> = LazyLock::new(|| Policy {
    allowed_tags: ALLOWED_TAGS.iter().copied().collect(),
    allowed_attrs: ALLOWED_ATTRS.iter().copied().collect(),
});

pub fn policy() -> &'static Policy {
    &POLICY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list_membership() {
        let policy = policy();
        assert!(policy.is_allowed("p"));
        assert!(policy.is_allowed("details"));
        assert!(policy.is_allowed("img"));
        assert!(!policy.is_allowed("script"));
        assert!(!policy.is_allowed("style"));
        assert!(!policy.is_allowed("iframe"));
        assert!(!policy.is_allowed("form"));
    }

    #[test]
    fn test_filter_attrs_per_tag() {
        let policy = policy();
        let attrs = vec![
            ("href".to_string(), "/x".to_string()),
            ("onclick".to_string(), "evil()".to_string()),
            ("title".to_string(), "t".to_string()),
        ];
        let kept = policy.filter_attrs("a", attrs);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|(k, _)| k != "onclick"));
    }

    #[test]
    fn test_filter_attrs_default_is_nothing() {
        let policy = policy();
        let attrs = vec![("class".to_string(), "fancy".to_string())];
        assert!(policy.filter_attrs("div", attrs).is_empty());
    }

    #[test]
    fn test_preserve_when_empty() {
        let policy = policy();
        assert!(policy.preserve_when_empty("br"));
        assert!(policy.preserve_when_empty("hr"));
        assert!(policy.preserve_when_empty("img"));
        assert!(!policy.preserve_when_empty("div"));
        assert!(!policy.preserve_when_empty("span"));
    }
}
