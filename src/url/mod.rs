//! URL handling module for Sitewarden
//!
//! This module provides the pure URL functions the crawl engine is built
//! on: canonical normalization for deduplication and redirect comparison,
//! netloc-based same-domain classification, and the pre-navigation
//! validity gate.

mod classify;
mod normalize;

pub use classify::{is_same_domain, is_valid_url, netloc};
pub use normalize::normalize_url;
