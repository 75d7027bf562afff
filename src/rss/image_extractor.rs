use scraper::{Html, Selector};

/// Extract the `src` of the first image embedded in rendered entry content.
///
/// Only the first image is considered; if its source is unusable the post is
/// sent without a photo rather than with a later image.
#[must_use]
pub fn extract_image_url(html: &str) -> Option<String> {
    let document = Html::parse_fragment(html);
    let img_selector = Selector::parse("img[src]").expect("Invalid selector");

    document
        .select(&img_selector)
        .find_map(|element| element.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_image_wins() {
        let html = r#"
            <p>Cover: <img src="https://img.example.com/front.jpg" alt="front"></p>
            <p>Back: <img src="https://img.example.com/back.jpg"></p>
        "#;

        assert_eq!(
            extract_image_url(html).as_deref(),
            Some("https://img.example.com/front.jpg")
        );
    }

    #[test]
    fn test_no_image() {
        let html = r#"<p>Just text and <a href="https://example.com">a link</a>.</p>"#;
        assert_eq!(extract_image_url(html), None);
    }

    #[test]
    fn test_unusable_first_image_is_not_skipped() {
        let html = r#"
            <img src="data:image/png;base64,AAAA">
            <img src="https://img.example.com/real.png">
        "#;

        let image = extract_image_url(html);
        assert_eq!(image.as_deref(), Some("data:image/png;base64,AAAA"));
        assert!(!crate::image::is_valid_image(image.as_deref()));
    }

    #[test]
    fn test_empty_first_source_means_no_image() {
        let html = r#"<img src=""><img src="https://img.example.com/real.png">"#;
        assert_eq!(extract_image_url(html), None);
    }

    #[test]
    fn test_image_without_src_is_ignored() {
        let html = r#"<img alt="missing"><img src="https://img.example.com/a.gif">"#;
        assert_eq!(
            extract_image_url(html).as_deref(),
            Some("https://img.example.com/a.gif")
        );
    }

    #[test]
    fn test_entities_in_src_are_decoded() {
        let html = r#"<img src="https://img.example.com/a.jpg?w=1&amp;h=2">"#;
        assert_eq!(
            extract_image_url(html).as_deref(),
            Some("https://img.example.com/a.jpg?w=1&h=2")
        );
    }
}
