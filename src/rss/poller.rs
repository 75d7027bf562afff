use std::collections::HashSet;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::{Config, DeliveryPolicy};
use crate::dispatch::{deliver, NotificationSink};
use crate::filter::{select_entries, CategoryFilter};
use crate::history::HistoryStore;
use crate::post::build_post;
use crate::rss::FeedSource;
use crate::targets::FeedTarget;

/// Counters for one pass over all targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Entries that passed the category and raw-link checks.
    pub selected: usize,
    /// Posts handed to the sink successfully.
    pub delivered: usize,
    /// Selected entries dropped for a missing/invalid link or an already stored link.
    pub skipped: usize,
}

impl std::ops::AddAssign for PassSummary {
    fn add_assign(&mut self, other: Self) {
        self.selected += other.selected;
        self.delivered += other.delivered;
        self.skipped += other.skipped;
    }
}

/// Polls feed targets and forwards matching posts.
///
/// Targets and posts are processed strictly one after another; the history
/// store has this relay as its only writer.
pub struct Relay<F, S> {
    targets: Vec<FeedTarget>,
    source: F,
    sink: S,
    history: HistoryStore,
    filter: CategoryFilter,
    entry_window: usize,
    policy: DeliveryPolicy,
    poll_interval: Duration,
}

impl<F, S> Relay<F, S>
where
    F: FeedSource,
    S: NotificationSink,
{
    #[must_use]
    pub fn new(config: &Config, targets: Vec<FeedTarget>, source: F, sink: S) -> Self {
        Self {
            targets,
            source,
            sink,
            history: HistoryStore::new(&config.history_path)
                .with_retention(config.history_max_entries),
            filter: CategoryFilter::new(config.category_filter.clone()),
            entry_window: config.entry_window,
            policy: config.delivery_policy,
            poll_interval: config.poll_interval,
        }
    }

    #[must_use]
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Run passes forever, sleeping the poll interval between them.
    ///
    /// # Errors
    ///
    /// Returns the first pass error. Recovery is left to the process supervisor.
    pub async fn run_forever(&self) -> Result<()> {
        loop {
            let summary = self.run_pass().await?;
            info!(
                selected = summary.selected,
                delivered = summary.delivered,
                skipped = summary.skipped,
                "Pass complete"
            );

            info!(
                wait_secs = self.poll_interval.as_secs(),
                "Waiting for next poll"
            );
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Process every target once.
    ///
    /// # Errors
    ///
    /// Returns an error if a feed cannot be fetched, history cannot be read or
    /// written, or the sink fails to deliver a post.
    pub async fn run_pass(&self) -> Result<PassSummary> {
        info!(targets = self.targets.len(), "Starting pass");
        let mut summary = PassSummary::default();

        for target in &self.targets {
            summary += self
                .process_target(target)
                .await
                .with_context(|| format!("Failed to process feed '{}'", target.key))?;
        }

        Ok(summary)
    }

    async fn process_target(&self, target: &FeedTarget) -> Result<PassSummary> {
        info!(feed = %target.key, url = %target.feed_url, "Fetching posts");
        let entries = self.source.fetch(&target.feed_url).await?;

        let delivered: HashSet<String> = self.history.load().await?.into_iter().collect();
        let selected = select_entries(&entries, &delivered, &self.filter, self.entry_window);

        let mut summary = PassSummary {
            selected: selected.len(),
            ..PassSummary::default()
        };

        for entry in selected {
            let Some(post) = build_post(entry) else {
                summary.skipped += 1;
                continue;
            };

            // The raw-link check in the filter misses links that only match once normalized.
            if self.history.contains(&post.link).await? {
                debug!(link = %post.link, "Normalized link already sent, skipping");
                summary.skipped += 1;
                continue;
            }

            if self.policy == DeliveryPolicy::AtMostOnce {
                self.history.append(&post.link).await?;
            }

            info!(
                feed = %target.key,
                title = %post.title,
                image = post.image_url.as_deref().unwrap_or("none"),
                "New post"
            );

            let kind = deliver(&self.sink, &post, target)
                .await
                .with_context(|| format!("Failed to deliver {}", post.link))?;

            if self.policy == DeliveryPolicy::AtLeastOnce {
                if let Err(e) = self.history.append(&post.link).await {
                    warn!(link = %post.link, "Delivered but could not record in history");
                    return Err(e.into());
                }
            }

            debug!(link = %post.link, kind = ?kind, "Post delivered");
            summary.delivered += 1;
        }

        Ok(summary)
    }
}
