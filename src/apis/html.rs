use scraper::Html;

/// Decode entities and drop markup from an HTML fragment, collapsing whitespace.
pub fn clean_html(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    let text = parsed.root_element().text().collect::<Vec<_>>().join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_entities() {
        assert_eq!(
            clean_html("Great <b>shot</b>!<br/>Love the &quot;light&quot; &amp; colours"),
            "Great shot ! Love the \"light\" & colours"
        );
    }

    #[test]
    fn links_keep_their_text() {
        assert_eq!(
            clean_html(r#"see <a href="https://flickr.com/x" rel="nofollow">my photo</a>"#),
            "see my photo"
        );
    }

    #[test]
    fn empty_fragment() {
        assert_eq!(clean_html("   "), "");
    }
}
