//! Shared helpers: datetime parsing and HTML text utilities.

pub mod date;
pub mod html;
