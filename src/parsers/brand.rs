use once_cell::sync::Lazy;
use regex::Regex;

static BRAND_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:brand:\s*|visit\s+the\s+|visit\s+)").expect("Invalid brand prefix regex")
});

static BRAND_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:store|brand|page)$").expect("Invalid brand suffix regex")
});

/// Strip byline noise such as "Visit the ... Store" or "Brand: ...".
pub fn clean_brand(raw: &str) -> String {
    let text = super::clean_text(raw);
    let text = BRAND_PREFIX.replace(&text, "");
    let text = BRAND_SUFFIX.replace(&text, "");
    text.trim().to_string()
}
