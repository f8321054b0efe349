//! Priority-ordered feed aggregation with a static fallback.

use std::time::Duration;

use agri_core::{NewsConfig, MAX_NEWS_ARTICLES};
use chrono::Utc;
use reqwest::Client;
use tracing::instrument;

use crate::age::time_ago;
use crate::types::{fallback_articles, FeedError, NewsArticle};

const USER_AGENT: &str = "AgriAssist/0.1 (news aggregator)";

#[derive(Debug, Clone)]
pub struct NewsAggregator {
    client: Client,
    feeds: Vec<String>,
    per_feed_limit: usize,
    max_articles: usize,
}

impl NewsAggregator {
    /// Limits outside `1..=MAX_NEWS_ARTICLES` (or a zero per-feed limit) are
    /// clamped, so the fallback and the cap hold even for unvalidated configs.
    pub fn new(config: &NewsConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            feeds: config.feeds.clone(),
            per_feed_limit: config.per_feed_limit.max(1),
            max_articles: config.max_articles.clamp(1, MAX_NEWS_ARTICLES),
        })
    }

    /// Headlines from the first feed that yields any, else the fallback set.
    ///
    /// Never fails: a broken feed just moves on to the next one.
    #[instrument(skip(self), level = "info")]
    pub async fn get(&self) -> Vec<NewsArticle> {
        for feed_url in &self.feeds {
            match self.fetch_feed(feed_url).await {
                Ok(mut found) if !found.is_empty() => {
                    tracing::info!("Loaded {} articles from {}", found.len(), feed_url);
                    found.truncate(self.max_articles);
                    return found;
                }
                Ok(_) => {
                    tracing::debug!("Feed {} had no usable entries", feed_url);
                }
                Err(e) => {
                    tracing::warn!("Error fetching from {}: {}", feed_url, e);
                }
            }
        }

        tracing::info!("All feeds failed or were empty, serving fallback news");
        fallback_articles()
    }

    async fn fetch_feed(&self, url: &str) -> Result<Vec<NewsArticle>, FeedError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let feed = feed_rs::parser::parse(body.as_ref())?;

        let now = Utc::now();
        let articles = feed
            .entries
            .into_iter()
            .take(self.per_feed_limit)
            .filter_map(|entry| {
                let title = entry.title.map(|t| t.content)?;
                let link = entry.links.into_iter().next().map(|l| l.href)?;
                Some(NewsArticle {
                    title: title.trim().to_string(),
                    time_ago: time_ago(entry.published.or(entry.updated), now),
                    url: link,
                })
            })
            .collect();

        Ok(articles)
    }
}
