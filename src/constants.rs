//! Shared constants used across the application.

/// User agent sent with feed and Telegram requests.
pub const USER_AGENT: &str = "forum-feed-relay/0.1";

/// Placeholder used when an entry has no title.
pub const UNTITLED: &str = "Sin título";

/// Placeholder used when an entry has no author.
pub const UNKNOWN_AUTHOR: &str = "Autor desconocido";

/// Label of the inline button and markdown link pointing at the post.
pub const READ_MORE_LABEL: &str = "Leer más";
