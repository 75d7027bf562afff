use std::sync::LazyLock;

use regex::Regex;

static IMAGE_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://.*\.(jpg|jpeg|png|gif)$").expect("Invalid image URL pattern")
});

/// Check whether `url` can be sent as a photo: an http(s) URL ending in a
/// known image extension. Query strings and fragments disqualify it.
#[must_use]
pub fn is_valid_image(url: Option<&str>) -> bool {
    url.is_some_and(|u| IMAGE_URL_PATTERN.is_match(u))
}
