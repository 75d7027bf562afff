//! Turning a qualifying feed entry into a Telegram-ready payload.

use std::fmt::Write as _;

use tracing::warn;

use crate::constants::{READ_MORE_LABEL, UNKNOWN_AUTHOR, UNTITLED};
use crate::normalize::normalize_link;
use crate::rss::{extract_image_url, FeedEntry};

/// Characters Telegram MarkdownV2 treats as markup.
const MARKDOWN_V2_SPECIAL: &[char] = &[
    '\\', '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// A post ready for delivery.
///
/// `title` and `author` are already escaped for MarkdownV2; `link` is the
/// normalized URL and is what gets recorded in history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPayload {
    pub title: String,
    pub author: String,
    pub link: String,
    pub image_url: Option<String>,
}

impl PostPayload {
    /// Title and author lines, used as the photo caption and message body.
    #[must_use]
    pub fn caption(&self) -> String {
        format!("📢 *{}*\n👤 Publicado por: {}", self.title, self.author)
    }

    /// Full message text including the markdown "read more" link.
    #[must_use]
    pub fn text(&self) -> String {
        let mut text = self.caption();
        let _ = write!(
            text,
            "\n🔗 [{READ_MORE_LABEL}]({})",
            escape_markdown_v2_url(&self.link)
        );
        text
    }
}

/// Escape text so Telegram MarkdownV2 renders it literally.
#[must_use]
pub fn escape_markdown_v2(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_V2_SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Escape a URL for the `(...)` part of a MarkdownV2 inline link.
#[must_use]
pub fn escape_markdown_v2_url(url: &str) -> String {
    let mut escaped = String::with_capacity(url.len());
    for c in url.chars() {
        if c == ')' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Build the payload for a qualifying entry.
///
/// Returns `None` when the entry has no link or its link fails normalization;
/// such entries are neither delivered nor recorded.
#[must_use]
pub fn build_post(entry: &FeedEntry) -> Option<PostPayload> {
    let title = entry.title.as_deref().unwrap_or(UNTITLED);

    let Some(raw_link) = entry.link.as_deref() else {
        warn!(title = %title, "Entry has no link, skipping");
        return None;
    };

    let Some(link) = normalize_link(raw_link) else {
        warn!(title = %title, link = %raw_link, "Entry link is invalid, skipping");
        return None;
    };

    Some(PostPayload {
        title: escape_markdown_v2(title),
        author: escape_markdown_v2(entry.author.as_deref().unwrap_or(UNKNOWN_AUTHOR)),
        link,
        image_url: entry.content.as_deref().and_then(extract_image_url),
    })
}
