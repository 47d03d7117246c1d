use crate::models::ProductIdentifier;
use deunicode::deunicode;
use once_cell::sync::Lazy;
use regex::Regex;

static NON_SLUG_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s-]").expect("Invalid slug regex"));

static SEPARATOR_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-\s]+").expect("Invalid separator regex"));

/// URL-safe lowercase ASCII slug.
pub fn slugify(text: &str) -> String {
    let ascii = deunicode(text);
    let stripped = NON_SLUG_CHARS.replace_all(&ascii, "");
    let lowered = stripped.trim().to_lowercase();
    SEPARATOR_RUNS.replace_all(&lowered, "-").into_owned()
}

/// Shopify handle: `slug(title)-<last 4 of id>`, or the bare id without a title.
pub fn product_handle(title: &str, id: &ProductIdentifier) -> String {
    if title.trim().is_empty() {
        return id.as_str().to_string();
    }
    format!("{}-{}", slugify(title), id.tail(4))
}
