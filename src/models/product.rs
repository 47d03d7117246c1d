use serde::{Deserialize, Serialize};
use std::fmt;

/// ASIN-like product code, trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductIdentifier(String);

impl ProductIdentifier {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last `n` characters, or the whole code when it is shorter.
    pub fn tail(&self, n: usize) -> &str {
        let count = self.0.chars().count();
        if count <= n {
            return &self.0;
        }
        let start = self
            .0
            .char_indices()
            .nth(count - n)
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        &self.0[start..]
    }
}

impl fmt::Display for ProductIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything pulled off one product page. Empty strings mean "not found".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub title: String,
    pub price: String,
    pub short_description: String,
    pub detailed_description: String,
    pub brand: String,
    pub images: Vec<String>,
}

impl ExtractedFields {
    /// Without a title the page is treated as not extracted at all.
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    pub fn body_html(&self) -> String {
        let mut body = self.short_description.clone();
        if !self.detailed_description.is_empty() {
            body.push_str("<br><br>");
            body.push_str(&self.detailed_description);
        }
        body
    }
}
