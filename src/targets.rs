//! Feed target configuration.
//!
//! Targets are read once at startup from a TOML file of the form:
//!
//! ```toml
//! [feeds.hmr]
//! rss_url = "https://heavymetalrarities.com/forum/feed.php"
//! chat_id = "-1002721068015"
//! thread_id = 35
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum TargetsError {
    #[error("failed to read feeds file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse feeds file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("feeds file {0} defines no feeds")]
    Empty(String),
}

/// One monitored feed paired with its Telegram destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedTarget {
    pub key: String,
    pub feed_url: String,
    pub chat_id: String,
    pub thread_id: i64,
}

#[derive(Debug, Deserialize)]
struct FeedsFile {
    feeds: BTreeMap<String, FeedEntryConfig>,
}

#[derive(Debug, Deserialize)]
struct FeedEntryConfig {
    rss_url: String,
    chat_id: String,
    thread_id: i64,
}

/// Targets used when no feeds file is present.
#[must_use]
pub fn default_targets() -> Vec<FeedTarget> {
    vec![FeedTarget {
        key: "hmr".to_string(),
        feed_url: "https://heavymetalrarities.com/forum/feed.php".to_string(),
        chat_id: "-1002721068015".to_string(),
        thread_id: 35,
    }]
}

/// Parse feed targets from TOML text. Targets are returned ordered by key.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or defines no feeds.
pub fn parse_targets(text: &str, origin: &str) -> Result<Vec<FeedTarget>, TargetsError> {
    let file: FeedsFile = toml::from_str(text).map_err(|e| TargetsError::Parse {
        path: origin.to_string(),
        source: e,
    })?;

    if file.feeds.is_empty() {
        return Err(TargetsError::Empty(origin.to_string()));
    }

    Ok(file
        .feeds
        .into_iter()
        .map(|(key, feed)| FeedTarget {
            key,
            feed_url: feed.rss_url,
            chat_id: feed.chat_id,
            thread_id: feed.thread_id,
        })
        .collect())
}

/// Load feed targets from `path`, falling back to [`default_targets`] when the
/// file does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_targets(path: &Path) -> Result<Vec<FeedTarget>, TargetsError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Feeds file not found, using built-in targets");
            return Ok(default_targets());
        }
        Err(e) => {
            return Err(TargetsError::Read {
                path: path.display().to_string(),
                source: e,
            })
        }
    };

    let targets = parse_targets(&text, &path.display().to_string())?;
    info!(path = %path.display(), count = targets.len(), "Loaded feed targets");
    Ok(targets)
}
