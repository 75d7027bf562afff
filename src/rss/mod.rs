mod image_extractor;
mod poller;
mod source;

pub use image_extractor::extract_image_url;
pub use poller::{PassSummary, Relay};
pub use source::{parse_entries, FeedEntry, FeedError, FeedSource, HttpFeedSource};
