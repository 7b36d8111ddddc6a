//! Item-to-page resolution.
//!
//! Pure path computation: the item's identifier is the URL-decoded
//! final path segment of its link, and its rendered page lives at
//! `<pages root>/<identifier>/index.html`. No I/O happens here; the
//! extractor performs the actual read.

use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};

/// Derive the item identifier from its canonical link.
///
/// Returns `None` for links without a usable path segment; the caller
/// treats that as a per-item failure, not a fatal one.
pub fn slug_for(link: &str) -> Option<String> {
    let segment = link
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())?;
    let decoded = percent_decode_str(segment).decode_utf8().ok()?;
    Some(decoded.into_owned())
}

/// Path of the rendered page for an identifier.
pub fn page_path(pages_root: &Path, slug: &str) -> PathBuf {
    pages_root.join(slug).join("index.html")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_is_final_segment() {
        assert_eq!(
            slug_for("https://example.com/posts/hello-world").as_deref(),
            Some("hello-world")
        );
    }

    #[test]
    fn test_slug_ignores_trailing_slash() {
        assert_eq!(
            slug_for("https://example.com/posts/hello-world/").as_deref(),
            Some("hello-world")
        );
    }

    #[test]
    fn test_slug_is_percent_decoded() {
        assert_eq!(
            slug_for("https://example.com/posts/caf%C3%A9%20notes").as_deref(),
            Some("café notes")
        );
    }

    #[test]
    fn test_slug_missing() {
        assert_eq!(slug_for(""), None);
        assert_eq!(slug_for("////"), None);
    }

    #[test]
    fn test_page_path_layout() {
        let path = page_path(Path::new("dist/posts"), "hello-world");
        assert_eq!(path, Path::new("dist/posts/hello-world/index.html"));
    }
}
