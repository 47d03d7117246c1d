pub mod brand;
pub mod image;
pub mod price;
pub mod slug;

pub use brand::*;
pub use image::*;
pub use price::*;
pub use slug::*;

use html_escape::decode_html_entities;

/// Clean and normalize text by removing extra whitespace and decoding HTML entities
pub fn clean_text(text: &str) -> String {
    let decoded = decode_html_entities(text);
    decoded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Join non-empty lines with the `<br>` marker used in Shopify body HTML.
pub fn lines_to_html<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .map(|line| clean_text(line.as_ref()))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("<br>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_collapses_whitespace_and_entities() {
        assert_eq!(clean_text("  Blue&nbsp;Mug \n\t 350ml  "), "Blue Mug 350ml");
        assert_eq!(clean_text("Tom &amp; Jerry"), "Tom & Jerry");
    }

    #[test]
    fn lines_to_html_skips_blank_lines() {
        assert_eq!(lines_to_html(["First", "   ", "Second  line"]), "First<br>Second line");
    }
}
