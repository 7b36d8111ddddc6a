//! Feed data model and RSS 2.0 parse/serialize.
//!
//! The pipeline owns one [`FeedDocument`] per run: the loader builds it
//! from the generated feed file, items are enhanced in place, and the
//! builder serializes it back over the original file.

pub mod builder;
pub mod loader;

use thiserror::Error;

/// Fatal feed errors. Anything here aborts the whole run before a
/// single byte of output is written; per-item trouble is handled at the
/// item boundary instead and never surfaces as a `FeedError`.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("malformed feed: {0}")]
    Malformed(String),

    #[error("feed XML parse error at byte {position}")]
    Parse {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },
}

/// Channel metadata carried over from the source feed.
///
/// `link` doubles as the default base URL for rewriting relative
/// content links, after trailing-slash normalization.
#[derive(Debug, Clone, Default)]
pub struct Channel {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: String,
    pub last_build_date: Option<String>,
    pub author: Option<String>,
}

/// One feed entry, corresponding to one rendered page.
///
/// Only `content` and `description` are mutated by the pipeline; every
/// other field is re-emitted as parsed. Date-ish fields stay raw
/// strings so the rebuilt feed is byte-faithful to its input.
#[derive(Debug, Clone, Default)]
pub struct FeedItem {
    pub title: Option<String>,
    pub link: String,
    pub description: Option<String>,
    pub pub_date: Option<String>,
    pub last_updated: Option<String>,
    pub categories: Vec<String>,
    pub content: Option<String>,
}

/// The parsed feed: channel metadata plus items in document order.
#[derive(Debug, Clone)]
pub struct FeedDocument {
    pub channel: Channel,
    pub items: Vec<FeedItem>,
}
