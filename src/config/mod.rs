//! Configuration: `feedwright.toml` plus CLI overrides.
//!
//! Every key has a default, so a missing config file is fine; the CLI
//! flags from `enhance` win over file values. Paths in the file are
//! resolved relative to the file's own directory.

use crate::cli::{Cli, EnhanceArgs};
use crate::utils::date::DateTimeUtc;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// Base URL for rewriting relative links. Falls back to the
    /// channel's own link when absent.
    pub base_url: Option<String>,

    /// Stylesheet reference emitted into the rebuilt feed.
    pub feed_stylesheet: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            base_url: None,
            feed_stylesheet: "/rss-styles.xsl".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSection {
    /// Build output directory containing the feed and rendered pages.
    pub dist: PathBuf,

    /// Feed file name inside `dist`.
    pub feed_file: String,

    /// Directory under `dist` holding one `<slug>/index.html` per item.
    pub pages_dir: String,

    /// Sanitized-content cache directory (survives across builds).
    pub cache_dir: PathBuf,

    /// Timestamp of the last successful build; items not updated since
    /// then reuse their cache entry. No value means a full recompute.
    pub last_build_time: Option<String>,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            dist: PathBuf::from("dist"),
            feed_file: "rss.xml".to_string(),
            pages_dir: "posts".to_string(),
            cache_dir: PathBuf::from("tmp/rss-cache"),
            last_build_time: None,
        }
    }
}

// ============================================================================
// EnhancerConfig
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnhancerConfig {
    #[serde(skip)]
    root: PathBuf,

    pub site: SiteSection,
    pub build: BuildSection,
}

impl EnhancerConfig {
    /// Load the config file (if present), fold in CLI overrides and
    /// validate the result.
    pub fn load(cli: &Cli, args: Option<&EnhanceArgs>) -> Result<Self> {
        let mut config = if cli.config.is_file() {
            let raw = fs::read_to_string(&cli.config)
                .with_context(|| format!("failed to read config {}", cli.config.display()))?;
            toml::from_str::<Self>(&raw)
                .with_context(|| format!("failed to parse config {}", cli.config.display()))?
        } else {
            Self::default()
        };

        config.root = cli
            .config
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        if let Some(args) = args {
            if let Some(dist) = &args.dist {
                config.build.dist = dist.clone();
            }
            if let Some(feed_file) = &args.feed_file {
                config.build.feed_file = feed_file.clone();
            }
            if let Some(base_url) = &args.base_url {
                config.site.base_url = Some(base_url.clone());
            }
            if let Some(last_build_time) = &args.last_build_time {
                config.build.last_build_time = Some(last_build_time.clone());
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&mut self) -> Result<()> {
        if let Some(base_url) = &self.site.base_url {
            Url::parse(base_url).with_context(|| format!("invalid base_url: {base_url}"))?;
            self.site.base_url = Some(base_url.trim_end_matches('/').to_string());
        }
        if let Some(ts) = &self.build.last_build_time
            && DateTimeUtc::parse(ts).is_none()
        {
            bail!("invalid last_build_time (expected YYYY-MM-DD or RFC 3339 UTC): {ts}");
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn base_url(&self) -> Option<&str> {
        self.site.base_url.as_deref()
    }

    pub fn feed_stylesheet(&self) -> &str {
        &self.site.feed_stylesheet
    }

    pub fn feed_path(&self) -> PathBuf {
        self.root.join(&self.build.dist).join(&self.build.feed_file)
    }

    pub fn pages_root(&self) -> PathBuf {
        self.root.join(&self.build.dist).join(&self.build.pages_dir)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.join(&self.build.cache_dir)
    }

    /// The build marker the cache gate compares item timestamps against.
    /// Validation guarantees this parses whenever a value is set.
    pub fn build_marker(&self) -> Option<DateTimeUtc> {
        self.build
            .last_build_time
            .as_deref()
            .and_then(DateTimeUtc::parse)
    }
}

// ============================================================================
// Tests
// ============================================================================
