//! Forum feed relay library.
//!
//! Polls forum RSS/Atom feeds, keeps the entries whose categories match a
//! filter, and forwards each new one to a Telegram forum topic, remembering
//! delivered links in a JSON history file.

pub mod config;
pub mod constants;
pub mod dispatch;
pub mod filter;
pub mod history;
pub mod image;
pub mod normalize;
pub mod post;
pub mod rss;
pub mod targets;
pub mod telegram;
