//! Description synthesis for items without one.
//!
//! Items whose feed already carries a description keep it untouched;
//! otherwise a plain-text preview is derived from the sanitized
//! content.

use crate::feed::FeedItem;
use crate::utils::html::{strip_tags, unescape};

const PREVIEW_CHARS: usize = 50;

/// Fill in a missing description from the item's enhanced content.
pub fn fill_description(item: &mut FeedItem) {
    let has_description = item
        .description
        .as_deref()
        .is_some_and(|d| !d.trim().is_empty());
    if has_description {
        return;
    }

    let Some(content) = item.content.as_deref() else {
        return;
    };

    let stripped = strip_tags(content);
    let text = unescape(&stripped);
    let text = text.trim();
    if text.is_empty() {
        return;
    }

    let preview: String = text.chars().take(PREVIEW_CHARS).collect();
    let description = if text.chars().count() > PREVIEW_CHARS {
        format!("{preview}...")
    } else {
        preview
    };

    item.description = Some(description);
}
