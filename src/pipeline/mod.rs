//! The enhancement pipeline.
//!
//! Reads the generated feed, re-derives each item's content from its
//! rendered page (or reuses the cached result), and writes the feed
//! back in place. Item failures are logged and skipped; only a
//! missing or malformed feed aborts the run.

mod describe;
mod extract;
mod resolve;


use crate::cache::{self, CacheStore, DirStore, Freshness};
use crate::config::EnhancerConfig;
use crate::feed::{self, FeedItem, loader};
use crate::sanitize;
use crate::utils::date::DateTimeUtc;
use crate::{debug, log};
use anyhow::{Context, Result, anyhow};
use std::fs;

/// What happened to one item during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// Content recomputed from the rendered page.
    Enhanced,
    /// Cached content reused verbatim.
    Reused,
    /// Item left untouched (e.g. its page has no primary content).
    Skipped,
}

pub fn run(config: &EnhancerConfig) -> Result<()> {
    let feed_path = config.feed_path();
    let xml = fs::read_to_string(&feed_path)
        .with_context(|| format!("failed to read feed {}", feed_path.display()))?;
    let mut doc = loader::parse(&xml)
        .with_context(|| format!("failed to parse feed {}", feed_path.display()))?;

    let base_url = config
        .base_url()
        .unwrap_or_else(|| doc.channel.link.trim_end_matches('/'))
        .to_string();
    let store = DirStore::open(&config.cache_dir())?;
    let marker = config.build_marker();
    if let Some(marker) = marker {
        debug!("cache"; "build marker: {}", marker.to_rfc3339());
    }

    let total = doc.items.len();
    let mut enhanced = 0usize;
    let mut reused = 0usize;
    for item in &mut doc.items {
        match enhance_item(item, &base_url, &store, marker, config) {
            Ok(Outcome::Enhanced) => enhanced += 1,
            Ok(Outcome::Reused) => reused += 1,
            Ok(Outcome::Skipped) => {}
            Err(e) => log!("error"; "skipping item {}: {e:#}", item.link),
        }
    }

    let output = feed::builder::render(&doc, config.feed_stylesheet())?;
    fs::write(&feed_path, output)
        .with_context(|| format!("failed to write feed {}", feed_path.display()))?;

    log!(
        "feed";
        "enhanced {enhanced} of {total} items ({reused} from cache) -> {}",
        feed_path.display()
    );
    Ok(())
}

/// Enhance a single item in place. Any error here is isolated to the
/// item; the feed round-trips its original values.
fn enhance_item(
    item: &mut FeedItem,
    base_url: &str,
    store: &dyn CacheStore,
    marker: Option<DateTimeUtc>,
    config: &EnhancerConfig,
) -> Result<Outcome> {
    let slug = resolve::slug_for(&item.link)
        .ok_or_else(|| anyhow!("link has no usable path segment"))?;

    let last_updated = item.last_updated.as_deref().and_then(DateTimeUtc::parse);
    let decision = cache::decide(last_updated, store.has(&slug), marker);

    if decision == Freshness::Cached {
        if let Some(cached) = store.read(&slug) {
            debug!("cache"; "hit: {slug}");
            apply(item, cached);
            return Ok(Outcome::Reused);
        }
        // entry vanished between has() and read(); recompute
    }

    let page_path = resolve::page_path(&config.pages_root(), &slug);
    let page = fs::read_to_string(&page_path)
        .with_context(|| format!("failed to read page {}", page_path.display()))?;

    let Some(content) = extract::primary_content(&page) else {
        debug!("feed"; "no <main> region in {}, leaving item as-is", page_path.display());
        return Ok(Outcome::Skipped);
    };

    let sanitized = sanitize::sanitize(&content, base_url);
    store.write(&slug, &sanitized)?;
    debug!("cache"; "stored: {slug}");

    apply(item, sanitized);
    Ok(Outcome::Enhanced)
}

fn apply(item: &mut FeedItem, content: String) {
    item.content = Some(content);
    describe::fill_description(item);
}
