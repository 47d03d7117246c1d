use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Size tokens Amazon embeds in thumbnail URLs. Removing them yields the
/// full-size asset.
pub const SIZE_MARKERS: [&str; 9] = [
    "_SS40_",
    "_SX40_",
    "_SY40_",
    "_AC_US40_",
    "_AC_US100_",
    "_AC_SY400_",
    "_AC_SY879_",
    "_AC_SR38,50_",
    "_CR40,40,400,400_",
];

static SPRITE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_CB\d+.*_FMpng_RI_").expect("Invalid sprite regex"));

/// Decorative sprites and placeholders, never product photos.
pub fn is_sprite(url: &str) -> bool {
    SPRITE_REGEX.is_match(url) || url.contains("sprite")
}

/// Remove every size marker. Repeats until none remain, so a second call is
/// always a no-op.
pub fn to_full_size(url: &str) -> String {
    let mut current = url.to_string();
    loop {
        let next = SIZE_MARKERS
            .iter()
            .fold(current.clone(), |acc, marker| acc.replace(marker, ""));
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Order-preserving set of full-size image URLs with an optional cap.
#[derive(Debug, Clone, Default)]
pub struct ImageSet {
    urls: Vec<String>,
    seen: HashSet<String>,
    cap: Option<usize>,
}

impl ImageSet {
    pub fn new(cap: Option<usize>) -> Self {
        Self {
            cap,
            ..Self::default()
        }
    }

    pub fn is_full(&self) -> bool {
        self.cap.map_or(false, |cap| self.urls.len() >= cap)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Normalises and adds a raw URL. Returns false for blanks, sprites,
    /// duplicates, or when the cap is reached. The sprite filter applies to
    /// every source: main image, thumbnails and the dynamic-image map.
    pub fn insert(&mut self, raw: &str) -> bool {
        let raw = raw.trim();
        if raw.is_empty() || self.is_full() || is_sprite(raw) {
            return false;
        }
        let full = to_full_size(raw);
        if self.seen.contains(&full) {
            return false;
        }
        self.seen.insert(full.clone());
        self.urls.push(full);
        true
    }

    pub fn into_vec(self) -> Vec<String> {
        self.urls
    }
}
