//! Minimal Telegram Bot API client used as the notification sink.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::USER_AGENT;
use crate::dispatch::{Destination, LinkButton, NotificationSink, ParseMode, SinkError};

/// Bot API client. The token is passed in explicitly and never logged.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    api_base: String,
    token: String,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct InlineKeyboardButton<'a> {
    text: &'a str,
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct ReplyMarkup<'a> {
    inline_keyboard: [[InlineKeyboardButton<'a>; 1]; 1],
}

impl<'a> From<&'a LinkButton> for ReplyMarkup<'a> {
    fn from(button: &'a LinkButton) -> Self {
        Self {
            inline_keyboard: [[InlineKeyboardButton {
                text: &button.label,
                url: &button.url,
            }]],
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    message_thread_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    reply_markup: ReplyMarkup<'a>,
}

#[derive(Debug, Serialize)]
struct SendPhotoRequest<'a> {
    chat_id: &'a str,
    message_thread_id: i64,
    photo: &'a str,
    caption: &'a str,
    parse_mode: &'static str,
    reply_markup: ReplyMarkup<'a>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<u16>,
}

impl TelegramClient {
    /// Create a client for `token` against the Bot API at `api_base`
    /// (normally `https://api.telegram.org`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_base: &str, token: &str, timeout: Duration) -> Result<Self, SinkError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.token)
    }

    async fn call<T: Serialize + Sync>(&self, method: &str, body: &T) -> Result<(), SinkError> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        match serde_json::from_str::<ApiResponse>(&text) {
            Ok(api) if api.ok => {
                debug!(method = %method, "Telegram call succeeded");
                Ok(())
            }
            Ok(api) => Err(SinkError::Rejected {
                code: api.error_code.unwrap_or_else(|| status.as_u16()),
                description: api
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            }),
            Err(_) => Err(SinkError::Rejected {
                code: status.as_u16(),
                description: format!("unexpected response body: {}", truncate(&text, 200)),
            }),
        }
    }
}

#[async_trait]
impl NotificationSink for TelegramClient {
    async fn send_text(
        &self,
        destination: &Destination,
        text: &str,
        parse_mode: ParseMode,
        button: &LinkButton,
    ) -> Result<(), SinkError> {
        let request = SendMessageRequest {
            chat_id: &destination.chat_id,
            message_thread_id: destination.thread_id,
            text,
            parse_mode: parse_mode.as_str(),
            reply_markup: ReplyMarkup::from(button),
        };
        self.call("sendMessage", &request).await
    }

    async fn send_photo(
        &self,
        destination: &Destination,
        photo_url: &str,
        caption: &str,
        parse_mode: ParseMode,
        button: &LinkButton,
    ) -> Result<(), SinkError> {
        let request = SendPhotoRequest {
            chat_id: &destination.chat_id,
            message_thread_id: destination.thread_id,
            photo: photo_url,
            caption,
            parse_mode: parse_mode.as_str(),
            reply_markup: ReplyMarkup::from(button),
        };
        self.call("sendPhoto", &request).await
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max_chars).collect();
        cut.push_str("...");
        cut
    }
}
