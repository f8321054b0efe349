//! Agriculture headlines from the first responsive RSS/Atom feed.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod age;
pub mod aggregator;
pub mod types;

pub use aggregator::NewsAggregator;
pub use types::{fallback_articles, NewsArticle};
