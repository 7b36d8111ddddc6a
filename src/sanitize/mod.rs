//! Allow-list HTML sanitization with structural transforms.
//!
//! Turns the extracted page content into feed-safe HTML: only tags on
//! the allow-list survive, site chrome is removed, relative links and
//! media paths become absolute, and empty leftovers are pruned. The
//! whole thing is a pure function of (HTML, base URL).

mod engine;
pub mod policy;

pub use engine::sanitize;
