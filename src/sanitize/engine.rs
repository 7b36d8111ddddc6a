//! The sanitizer tree pass.
//!
//! Parses the extracted fragment with `tl` and re-emits it bottom-up in
//! a single traversal. Per-element rules are applied in a fixed order:
//!
//! 1. tags outside the allow-list: discarded with their subtree
//! 2. table-of-contents containers: discarded with their subtree
//! 3. images: icon/emoji drop, internal-media URL rewrite
//! 4. popover markers: dropped (in-page anchors) or converted to links
//! 5. disclosure elements: collapsed to plain `<div>`s
//! 6. attribute filtering per the policy
//! 7. empty-node prune (no attributes, no text; `br`/`hr`/`img` exempt)
//!
//! Because children are emitted before their parent is judged, a
//! subtree removal in step 1-4 feeds directly into the parent's step-7
//! emptiness check. The page's duplicated `<h1>` title is stripped at
//! the very end.

use super::policy::{self, Policy};
use crate::utils::html::{escape, escape_attr, is_void_element, strip_tags, unescape};
use regex::Regex;
use std::sync::LazyLock;

static RE_FIRST_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1[^>]*>.*?</h1>").unwrap());

/// Sanitize an HTML fragment against the policy, rewriting relative
/// content links and media paths to `base_url`-absolute ones.
///
/// `base_url` must already be normalized (no trailing slash). An
/// unparseable fragment yields an empty string; nothing outside the
/// allow-list can be emitted.
pub fn sanitize(html: &str, base_url: &str) -> String {
    let Ok(dom) = tl::parse(html, tl::ParserOptions::default()) else {
        return String::new();
    };
    let emitter = Emitter {
        policy: policy::policy(),
        base_url,
        parser: dom.parser(),
    };

    let mut out = String::with_capacity(html.len());
    for handle in dom.children() {
        emitter.emit_node(*handle, &mut out);
    }

    RE_FIRST_HEADING.replace(&out, "").into_owned()
}

struct Emitter<'a> {
    policy: &'static Policy,
    base_url: &'a str,
    parser: &'a tl::Parser<'a>,
}

impl Emitter<'_> {
    fn emit_node(&self, handle: tl::NodeHandle, out: &mut String) {
        let Some(node) = handle.get(self.parser) else {
            return;
        };
        match node {
            tl::Node::Raw(bytes) => {
                let raw = bytes.as_utf8_str();
                // normalize entities: decode once, re-encode on output
                out.push_str(&escape(&unescape(&raw)));
            }
            tl::Node::Comment(_) => {}
            tl::Node::Tag(tag) => self.emit_tag(tag, out),
        }
    }

    fn emit_tag(&self, tag: &tl::HTMLTag<'_>, out: &mut String) {
        let name = tag.name().as_utf8_str().to_lowercase();
        if !self.policy.is_allowed(&name) {
            return;
        }

        let attrs = collect_attrs(tag);
        let class = attr_value(&attrs, "class").unwrap_or("");

        // table-of-contents chrome vanishes wholesale
        if (name == "aside" && class.contains(policy::TOC_ASIDE_CLASS))
            || (name == "div" && class.contains(policy::TOC_DIV_CLASS))
        {
            return;
        }

        if name == "img" {
            self.emit_img(attrs, out);
            return;
        }

        // inline popover markers: drop in-page anchors, link post references
        if name == "span" && attr_value(&attrs, policy::POPOVER_ATTR).is_some() {
            if let Some(href) = attr_value(&attrs, policy::POPOVER_HREF_ATTR) {
                if href.starts_with('#') {
                    return;
                }
                if href.starts_with(policy::CONTENT_LINK_PREFIX) {
                    let text = self.collect_text(tag, true);
                    let text = text.trim();
                    let label = if text.is_empty() { href } else { text };
                    out.push_str(&format!(
                        "<a href=\"{}{}\">{}</a>",
                        escape_attr(self.base_url),
                        escape_attr(href),
                        escape(label)
                    ));
                    return;
                }
            }
            // other targets fall through as plain spans
        }

        // disclosure elements collapse to plain containers
        let (out_tag, kept) = if name == "details" || name == "summary" {
            ("div", Vec::new())
        } else {
            (name.as_str(), self.policy.filter_attrs(&name, attrs))
        };

        let mut inner = String::new();
        for child in tag.children().top().iter() {
            self.emit_node(*child, &mut inner);
        }

        // bottom-up emptiness prune: subtree drops above feed into this
        if !self.policy.preserve_when_empty(out_tag)
            && kept.is_empty()
            && strip_tags(&inner).trim().is_empty()
        {
            return;
        }

        out.push('<');
        out.push_str(out_tag);
        for (k, v) in &kept {
            out.push_str(&format!(" {}=\"{}\"", k, escape_attr(v)));
        }
        if is_void_element(out_tag) {
            out.push_str("/>");
        } else {
            out.push('>');
            out.push_str(&inner);
            out.push_str("</");
            out.push_str(out_tag);
            out.push('>');
        }
    }

    fn emit_img(&self, attrs: Vec<(String, String)>, out: &mut String) {
        let src = attr_value(&attrs, "src").unwrap_or("");
        let alt = attr_value(&attrs, "alt").unwrap_or("");
        if src.starts_with(policy::ICON_SRC_PREFIX) || alt.starts_with(policy::EMOJI_ALT_PREFIX) {
            return;
        }

        let mut kept = self.policy.filter_attrs("img", attrs);
        for (k, v) in &mut kept {
            if k.as_str() == "src" && v.starts_with(policy::MEDIA_PATH_PREFIX) {
                *v = format!("{}{}", self.base_url, v);
            }
        }

        out.push_str("<img");
        for (k, v) in &kept {
            out.push_str(&format!(" {}=\"{}\"", k, escape_attr(v)));
        }
        out.push_str("/>");
    }

    /// Text content of a subtree, optionally skipping
    /// screen-reader-only labels.
    fn collect_text(&self, tag: &tl::HTMLTag<'_>, skip_sr_only: bool) -> String {
        let mut text = String::new();
        for child in tag.children().top().iter() {
            self.collect_text_into(*child, skip_sr_only, &mut text);
        }
        text
    }

    fn collect_text_into(&self, handle: tl::NodeHandle, skip_sr_only: bool, out: &mut String) {
        let Some(node) = handle.get(self.parser) else {
            return;
        };
        match node {
            tl::Node::Raw(bytes) => out.push_str(&unescape(&bytes.as_utf8_str())),
            tl::Node::Comment(_) => {}
            tl::Node::Tag(tag) => {
                if skip_sr_only && tag.name().as_utf8_str().eq_ignore_ascii_case("span") {
                    let attrs = collect_attrs(tag);
                    let is_sr_only = attr_value(&attrs, "class")
                        .is_some_and(|c| c.split_whitespace().any(|c| c == policy::SR_ONLY_CLASS));
                    if is_sr_only {
                        return;
                    }
                }
                for child in tag.children().top().iter() {
                    self.collect_text_into(*child, skip_sr_only, out);
                }
            }
        }
    }
}

fn collect_attrs(tag: &tl::HTMLTag<'_>) -> Vec<(String, String)> {
    tag.attributes()
        .iter()
        .map(|(key, value)| {
            let value = value.map(|v| unescape(&v).into_owned()).unwrap_or_default();
            (key.to_string(), value)
        })
        .collect()
}

fn attr_value<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k.as_str() == name)
        .map(|(_, v)| v.as_str())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://example.com";

    #[test]
    fn test_plain_content_passes_through() {
        let html = "<p>Hello <strong>world</strong></p>";
        assert_eq!(sanitize(html, BASE), "<p>Hello <strong>world</strong></p>");
    }

    #[test]
    fn test_disallowed_tags_discarded_with_content() {
        let html = "<p>keep</p><script>alert(1)</script><style>p{}</style>";
        assert_eq!(sanitize(html, BASE), "<p>keep</p>");
    }

    #[test]
    fn test_allow_list_closure_on_adversarial_input() {
        let html = r#"<p>a<iframe src="x"><b>b</b></iframe></p><form><input></form><p <p>>c</p>"#;
        let out = sanitize(html, BASE);
        for bad in ["<script", "<iframe", "<form", "<input", "onerror"] {
            assert!(!out.contains(bad), "{bad} leaked into {out}");
        }
    }

    #[test]
    fn test_disallowed_attributes_are_dropped() {
        let html = r#"<p class="x" onclick="evil()">text</p><a href="/a" onmouseover="h()">l</a>"#;
        let out = sanitize(html, BASE);
        assert_eq!(out, r#"<p>text</p><a href="/a">l</a>"#);
    }

    #[test]
    fn test_toc_containers_removed_entirely() {
        let html = r#"<aside class="toc-container"><ul><li>One</li></ul></aside><p>body</p>"#;
        assert_eq!(sanitize(html, BASE), "<p>body</p>");

        let html = r#"<div class="table-of-contents"><p>1. One</p></div><p>body</p>"#;
        assert_eq!(sanitize(html, BASE), "<p>body</p>");
    }

    #[test]
    fn test_plain_aside_survives() {
        let html = r#"<aside><p>a note</p></aside>"#;
        assert_eq!(sanitize(html, BASE), "<aside><p>a note</p></aside>");
    }

    #[test]
    fn test_details_collapse_to_divs() {
        let html = "<details open><summary>More</summary><p>hidden</p></details>";
        assert_eq!(
            sanitize(html, BASE),
            "<div><div>More</div><p>hidden</p></div>"
        );
    }

    #[test]
    fn test_popover_anchor_target_dropped() {
        let html = r##"<p>see <span data-popover-target="p1" data-href="#section">this</span> below</p>"##;
        assert_eq!(sanitize(html, BASE), "<p>see  below</p>");
    }

    #[test]
    fn test_popover_post_target_becomes_link() {
        let html = r#"<p><span data-popover-target="p1" data-href="/posts/other">Other post<span class="sr-only">(opens preview)</span></span></p>"#;
        assert_eq!(
            sanitize(html, BASE),
            r#"<p><a href="https://example.com/posts/other">Other post</a></p>"#
        );
    }

    #[test]
    fn test_popover_link_falls_back_to_target_text() {
        let html = r#"<p><span data-popover-target="p1" data-href="/posts/x"></span></p>"#;
        assert_eq!(
            sanitize(html, BASE),
            r#"<p><a href="https://example.com/posts/x">/posts/x</a></p>"#
        );
    }

    #[test]
    fn test_empty_elements_pruned() {
        let html = r#"<p>text</p><span></span><div>  </div><em></em>"#;
        assert_eq!(sanitize(html, BASE), "<p>text</p>");
    }

    #[test]
    fn test_br_and_hr_survive_prune() {
        let html = "<p>a<br>b</p><hr>";
        assert_eq!(sanitize(html, BASE), "<p>a<br/>b</p><hr/>");
    }

    #[test]
    fn test_icon_and_emoji_images_dropped() {
        let html = r#"<p>x<img src="https://www.notion.so/icons/star.svg" alt=""/><img src="/a.png" alt="custom emoji with name wave"/></p>"#;
        assert_eq!(sanitize(html, BASE), "<p>x</p>");
    }

    #[test]
    fn test_internal_media_src_rewritten() {
        let html = r#"<p>pic <img src="/notion/img.png" alt="a pic"/></p>"#;
        assert_eq!(
            sanitize(html, BASE),
            r#"<p>pic <img src="https://example.com/notion/img.png" alt="a pic"/></p>"#
        );
    }

    #[test]
    fn test_external_images_pass_through() {
        let html = r#"<p>pic <img src="https://elsewhere.org/i.png" alt="x"/></p>"#;
        assert_eq!(
            sanitize(html, BASE),
            r#"<p>pic <img src="https://elsewhere.org/i.png" alt="x"/></p>"#
        );
    }

    #[test]
    fn test_first_heading_stripped() {
        let html = r#"<h1 class="title">Post Title</h1><p>body</p><h2>Section</h2>"#;
        assert_eq!(sanitize(html, BASE), "<p>body</p><h2>Section</h2>");
    }

    #[test]
    fn test_entities_survive_normalization() {
        let html = "<p>a &amp; b &lt;c&gt;</p>";
        assert_eq!(sanitize(html, BASE), "<p>a &amp; b &lt;c&gt;</p>");
    }

    #[test]
    fn test_sanitize_is_deterministic() {
        let html = r#"<details><summary>s</summary><p>x &amp; y</p></details><div class="table-of-contents">t</div>"#;
        let a = sanitize(html, BASE);
        let b = sanitize(html, BASE);
        assert_eq!(a, b);
    }
}
