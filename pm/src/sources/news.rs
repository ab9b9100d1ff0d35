//! Headlines from RSS and Atom feeds

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{SourceError, SourceResult, Transport};

/// Longest headline printed without truncation
pub const MAX_HEADLINE_CHARS: usize = 60;

/// Characters kept from a truncated headline, before the ellipsis
const TRUNCATED_CHARS: usize = 57;

const ELLIPSIS: &str = "...";

/// Entries taken from each feed per run
const ENTRIES_PER_SOURCE: usize = 2;

/// A configured news feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsSource {
    pub label: String,
    pub url: String,
}

/// A headline ready to print
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    pub headline: String,
    pub source_label: String,
}

/// Shorten headlines over 60 chars to 57 chars plus "..."
pub fn truncate_headline(title: &str) -> String {
    if title.chars().count() <= MAX_HEADLINE_CHARS {
        return title.to_string();
    }
    let mut short: String = title.chars().take(TRUNCATED_CHARS).collect();
    short.push_str(ELLIPSIS);
    short
}

/// Titles of the leading entries of a feed, whitespace collapsed
///
/// Entries without a title are skipped.
pub fn parse_headlines(body: &str) -> SourceResult<Vec<String>> {
    let feed = feed_rs::parser::parse(body.as_bytes()).map_err(|e| SourceError::Malformed(e.to_string()))?;
    debug!(entry_count = feed.entries.len(), "parse_headlines: feed parsed");

    Ok(feed
        .entries
        .into_iter()
        .take(ENTRIES_PER_SOURCE)
        .filter_map(|entry| entry.title)
        .map(|title| title.content.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|title| !title.is_empty())
        .collect())
}

/// Collects headlines across feeds up to a limit
pub struct NewsAggregator {
    transport: Arc<dyn Transport>,
}

impl NewsAggregator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Up to `max_items` headlines, at most two per feed, in feed order
    ///
    /// Stops querying feeds once the limit is reached. A failing feed is
    /// logged and skipped.
    pub async fn fetch(&self, sources: &[NewsSource], max_items: usize) -> Vec<NewsItem> {
        debug!(source_count = sources.len(), max_items, "NewsAggregator::fetch: called");
        let mut items = Vec::new();

        for source in sources {
            if items.len() >= max_items {
                break;
            }
            match self.fetch_source(source).await {
                Ok(headlines) => {
                    info!(label = %source.label, count = headlines.len(), "News feed loaded");
                    for headline in headlines {
                        items.push(NewsItem {
                            headline: truncate_headline(&headline),
                            source_label: source.label.clone(),
                        });
                        if items.len() >= max_items {
                            return items;
                        }
                    }
                }
                Err(e) => warn!(label = %source.label, error = %e, "News feed unavailable"),
            }
        }

        items
    }

    async fn fetch_source(&self, source: &NewsSource) -> SourceResult<Vec<String>> {
        let body = self.transport.get(source.url.trim()).await?;
        parse_headlines(&body)
    }
}
