use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    /// Relative age, e.g. "3 hours ago"
    pub time_ago: String,
    pub url: String,
}

impl NewsArticle {
    fn fixed(title: &str, time_ago: &str) -> Self {
        Self {
            title: title.to_string(),
            time_ago: time_ago.to_string(),
            url: "https://krishijagran.com".to_string(),
        }
    }
}

/// Served when no feed yields anything.
pub fn fallback_articles() -> Vec<NewsArticle> {
    vec![
        NewsArticle::fixed("New government subsidy scheme announced", "2 hours ago"),
        NewsArticle::fixed(
            "Monsoon forecast predicts good rainfall this season",
            "5 hours ago",
        ),
        NewsArticle::fixed("Organic farming workshops starting next month", "1 day ago"),
    ]
}

/// Feed fetch failures. Never leave the aggregator.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Feed returned status {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(#[from] feed_rs::parser::ParseFeedError),
}
