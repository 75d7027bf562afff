use std::collections::HashSet;

use tracing::{debug, info};

use crate::rss::FeedEntry;

/// Category substring match applied to entry terms.
#[derive(Debug, Clone)]
pub struct CategoryFilter {
    needle: String,
}

impl CategoryFilter {
    #[must_use]
    pub fn new(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
        }
    }

    /// True if any non-empty term contains the needle (case-sensitive).
    #[must_use]
    pub fn matches<S: AsRef<str>>(&self, terms: &[S]) -> bool {
        terms
            .iter()
            .map(AsRef::as_ref)
            .filter(|t| !t.is_empty())
            .any(|t| t.contains(self.needle.as_str()))
    }
}

impl Default for CategoryFilter {
    fn default() -> Self {
        Self::new("Hard Rock")
    }
}

/// Select the entries worth building posts for.
///
/// Only the first `window` entries are examined, in feed order. An entry is
/// skipped when its raw link is already in `delivered` or when none of its
/// categories match. Entries without a link are not skipped here.
#[must_use]
pub fn select_entries<'a>(
    entries: &'a [FeedEntry],
    delivered: &HashSet<String>,
    filter: &CategoryFilter,
    window: usize,
) -> Vec<&'a FeedEntry> {
    let mut selected = Vec::new();

    for entry in entries.iter().take(window) {
        if let Some(link) = entry.link.as_deref() {
            if delivered.contains(link) {
                info!(link = %link, "Post already sent, skipping");
                continue;
            }
        }

        if filter.matches(&entry.categories) {
            selected.push(entry);
        } else {
            debug!(
                title = entry.title.as_deref().unwrap_or_default(),
                categories = ?entry.categories,
                "Entry does not match category filter"
            );
        }
    }

    selected
}
