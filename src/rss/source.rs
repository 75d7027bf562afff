use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::constants::USER_AGENT;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("failed to fetch feed {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("feed {url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("failed to parse feed {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: feed_rs::parser::ParseFeedError,
    },
}

/// The parts of a syndicated entry the relay consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub author: Option<String>,
    pub link: Option<String>,
    pub categories: Vec<String>,
    /// Rendered HTML body, which may embed an image.
    pub content: Option<String>,
}

impl From<feed_rs::model::Entry> for FeedEntry {
    fn from(entry: feed_rs::model::Entry) -> Self {
        let link = entry
            .links
            .iter()
            .find(|l| l.rel.as_deref().is_none_or(|rel| rel == "alternate"))
            .or_else(|| entry.links.first())
            .map(|l| l.href.clone());

        let content = entry
            .content
            .and_then(|c| c.body)
            .or_else(|| entry.summary.map(|s| s.content));

        Self {
            title: entry.title.map(|t| t.content),
            author: entry
                .authors
                .into_iter()
                .map(|a| a.name)
                .find(|name| !name.trim().is_empty()),
            link,
            categories: entry
                .categories
                .into_iter()
                .map(|c| c.term)
                .filter(|term| !term.is_empty())
                .collect(),
            content,
        }
    }
}

/// Something that can turn a feed address into entries, newest first.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch and parse the feed at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the feed cannot be retrieved or parsed.
    async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>, FeedError>;
}

/// Parse raw feed bytes (RSS, Atom or JSON Feed) into entries.
///
/// # Errors
///
/// Returns an error if the document is not a recognizable feed.
pub fn parse_entries(body: &[u8], origin: &str) -> Result<Vec<FeedEntry>, FeedError> {
    let feed = feed_rs::parser::parse(body).map_err(|e| FeedError::Parse {
        url: origin.to_string(),
        source: e,
    })?;
    Ok(feed.entries.into_iter().map(FeedEntry::from).collect())
}

/// Feed source backed by HTTP and `feed-rs`.
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    /// Create a feed source whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FeedError::Client)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>, FeedError> {
        let fetch_err = |e| FeedError::Fetch {
            url: url.to_string(),
            source: e,
        };

        let response = self.client.get(url).send().await.map_err(fetch_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(fetch_err)?;
        let entries = parse_entries(&body, url)?;
        debug!(url = %url, entries = entries.len(), "Fetched feed");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATOM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Forum</title>
  <id>https://forum.example.com/feed.php</id>
  <updated>2025-01-01T12:00:00Z</updated>
  <entry>
    <title>Deep Purple - Machine Head</title>
    <id>https://forum.example.com/viewtopic.php?t=1</id>
    <updated>2025-01-01T12:00:00Z</updated>
    <author><name>riffmaster</name></author>
    <link href="https://forum.example.com/viewtopic.php?t=1"/>
    <category term="Hard Rock" label="Hard Rock"/>
    <category term="70s" label="70s"/>
    <content type="html">&lt;p&gt;&lt;img src="https://img.example.com/cover.jpg" alt="cover"&gt;&lt;/p&gt;</content>
  </entry>
  <entry>
    <title>Untagged</title>
    <id>https://forum.example.com/viewtopic.php?t=2</id>
    <updated>2025-01-01T11:00:00Z</updated>
    <link href="https://forum.example.com/viewtopic.php?t=2"/>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_atom_entries() {
        let entries = parse_entries(ATOM.as_bytes(), "inline").unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.title.as_deref(), Some("Deep Purple - Machine Head"));
        assert_eq!(first.author.as_deref(), Some("riffmaster"));
        assert_eq!(
            first.link.as_deref(),
            Some("https://forum.example.com/viewtopic.php?t=1")
        );
        assert_eq!(first.categories, vec!["Hard Rock", "70s"]);
        assert!(first
            .content
            .as_deref()
            .unwrap()
            .contains("https://img.example.com/cover.jpg"));

        let second = &entries[1];
        assert!(second.author.is_none());
        assert!(second.categories.is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_entries(b"<html>nope</html>", "inline"),
            Err(FeedError::Parse { .. })
        ));
    }
}
