use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

/// Markdown link wrapper left behind when a link is recovered from rendered text.
const READ_MORE_PREFIX: &str = "[Leer más](";

static LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[\w\-\.]+[\w\-]+(\.[\w]+)+(/.*)?$").expect("Invalid link pattern")
});

/// Clean and validate a raw link taken from a feed entry or rendered text.
///
/// Returns `None` if the cleaned value is not an http(s) URL with a dotted host.
/// A `None` link must never be delivered or stored in history.
#[must_use]
pub fn normalize_link(raw: &str) -> Option<String> {
    let mut link = raw.trim().replace('\\', "");

    if let Some(rest) = link.strip_prefix(READ_MORE_PREFIX) {
        link = rest.strip_suffix(')').unwrap_or(rest).trim().to_string();
    }

    if LINK_PATTERN.is_match(&link) {
        Some(link)
    } else {
        warn!(raw = %raw, cleaned = %link, "Invalid link detected");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_link_passes_through() {
        assert_eq!(
            normalize_link("https://forum.example.com/post/1").as_deref(),
            Some("https://forum.example.com/post/1")
        );
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(
            normalize_link("  https://forum.example.com/viewtopic.php?t=5 \n").as_deref(),
            Some("https://forum.example.com/viewtopic.php?t=5")
        );
    }

    #[test]
    fn test_strips_backslashes() {
        assert_eq!(
            normalize_link(r"https://forum\.example\.com/post\-1").as_deref(),
            Some("https://forum.example.com/post-1")
        );
    }

    #[test]
    fn test_strips_markdown_wrapper() {
        assert_eq!(
            normalize_link(r"[Leer más](https://forum\.example\.com/post/1)").as_deref(),
            Some("https://forum.example.com/post/1")
        );
    }

    #[test]
    fn test_keeps_parenthesis_inside_path() {
        assert_eq!(
            normalize_link("https://en.example.org/wiki/Rock_(music)").as_deref(),
            Some("https://en.example.org/wiki/Rock_(music)")
        );
    }

    #[test]
    fn test_rejects_invalid_links() {
        assert_eq!(normalize_link(""), None);
        assert_eq!(normalize_link("not a url"), None);
        assert_eq!(normalize_link("ftp://forum.example.com/post/1"), None);
        assert_eq!(normalize_link("https://localhost/post/1"), None);
        assert_eq!(normalize_link("https://forum.example.com post"), None);
    }

    #[test]
    fn test_idempotent_on_valid_links() {
        let inputs = [
            "https://forum.example.com/post/1",
            " http://forum.example.com/viewtopic.php?f=3&t=9 ",
            r"[Leer más](https://forum\.example\.com/post/2)",
            "https://en.example.org/wiki/Rock_(music)",
        ];

        for input in inputs {
            let once = normalize_link(input).unwrap();
            assert_eq!(normalize_link(&once).as_deref(), Some(once.as_str()));
        }
    }
}
