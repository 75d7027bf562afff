//! Delivery of built posts to a notification sink.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::constants::READ_MORE_LABEL;
use crate::image::is_valid_image;
use crate::post::PostPayload;
use crate::targets::FeedTarget;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request rejected ({code}): {description}")]
    Rejected { code: u16, description: String },
}

impl SinkError {
    /// The platform refused the request contents (bad photo URL, bad markup).
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::Rejected { code: 400, .. })
    }
}

/// Where a message goes: a chat and a thread within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub chat_id: String,
    pub thread_id: i64,
}

impl From<&FeedTarget> for Destination {
    fn from(target: &FeedTarget) -> Self {
        Self {
            chat_id: target.chat_id.clone(),
            thread_id: target.thread_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    MarkdownV2,
}

impl ParseMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MarkdownV2 => "MarkdownV2",
        }
    }
}

/// A single inline button opening a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkButton {
    pub label: String,
    pub url: String,
}

impl LinkButton {
    /// The "read more" button for a post link.
    #[must_use]
    pub fn read_more(url: &str) -> Self {
        Self {
            label: format!("🔗 {READ_MORE_LABEL}"),
            url: url.to_string(),
        }
    }
}

/// Outbound messaging channel.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Send a text message.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be delivered.
    async fn send_text(
        &self,
        destination: &Destination,
        text: &str,
        parse_mode: ParseMode,
        button: &LinkButton,
    ) -> Result<(), SinkError>;

    /// Send a photo by URL with a caption.
    ///
    /// # Errors
    ///
    /// Returns an error if the photo could not be delivered.
    async fn send_photo(
        &self,
        destination: &Destination,
        photo_url: &str,
        caption: &str,
        parse_mode: ParseMode,
        button: &LinkButton,
    ) -> Result<(), SinkError>;
}

/// How a post ended up being delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryKind {
    Photo,
    Text,
}

/// Send `post` to the target's chat thread.
///
/// Uses a photo message when the post carries a valid image URL and falls back
/// to a text message otherwise, or when the platform rejects the photo.
///
/// # Errors
///
/// Returns the sink error for any failure other than a rejected photo.
pub async fn deliver<S>(
    sink: &S,
    post: &PostPayload,
    target: &FeedTarget,
) -> Result<DeliveryKind, SinkError>
where
    S: NotificationSink + ?Sized,
{
    let destination = Destination::from(target);
    let button = LinkButton::read_more(&post.link);
    let caption = post.caption();

    if let Some(image) = post
        .image_url
        .as_deref()
        .filter(|url| is_valid_image(Some(*url)))
    {
        match sink
            .send_photo(&destination, image, &caption, ParseMode::MarkdownV2, &button)
            .await
        {
            Ok(()) => {
                info!(feed = %target.key, image = %image, link = %post.link, "Photo sent");
                return Ok(DeliveryKind::Photo);
            }
            Err(e) if e.is_bad_request() => {
                warn!(
                    feed = %target.key,
                    image = %image,
                    error = %e,
                    "Photo rejected, sending text instead"
                );
            }
            Err(e) => return Err(e),
        }
    } else {
        warn!(
            feed = %target.key,
            image = post.image_url.as_deref().unwrap_or("none"),
            "Image invalid or unavailable"
        );
    }

    sink.send_text(&destination, &caption, ParseMode::MarkdownV2, &button)
        .await?;
    info!(
        feed = %target.key,
        link = %post.link,
        text = %post.text(),
        "Message sent without image"
    );
    Ok(DeliveryKind::Text)
}
