use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::parsers::{clean_text, lines_to_html};

/// One way of reading a field off the page. Probes fail independently: an
/// unknown selector, a missing element or an empty value all yield `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Whitespace-normalised text of the first match.
    Text(&'static str),
    /// Text of the first match with a `<br>` at each block-level boundary.
    Block(&'static str),
    /// Attribute value of the first match.
    Attr(&'static str, &'static str),
}

impl Probe {
    pub fn css(&self) -> &'static str {
        match self {
            Probe::Text(css) | Probe::Block(css) | Probe::Attr(css, _) => css,
        }
    }

    pub fn run(&self, document: &Html) -> Option<String> {
        let element = first_element(document, self.css())?;
        let value = match self {
            Probe::Text(_) => element_text(&element),
            Probe::Block(_) => element_block(&element),
            Probe::Attr(_, attr) => element.value().attr(attr).map(str::trim).unwrap_or_default().to_string(),
        };
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

/// Walk `probes` in order and return the first value `refine` accepts.
pub fn first_match<F>(document: &Html, probes: &[Probe], refine: F) -> Option<String>
where
    F: Fn(String) -> Option<String>,
{
    probes.iter().find_map(|probe| {
        let value = probe.run(document).and_then(&refine);
        if value.is_none() {
            debug!("No value from {:?}", probe);
        }
        value
    })
}

pub fn parse_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            debug!("Unsupported selector {}: {:?}", css, e);
            None
        }
    }
}

pub fn first_element<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = parse_selector(css)?;
    document.select(&selector).next()
}

pub fn element_text(element: &ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// Rendered lines of `element` joined with `<br>`. Inline markup stays on
/// its line; `br` and block-level elements start a new one.
pub fn element_block(element: &ElementRef<'_>) -> String {
    let mut lines = Vec::new();
    let mut current = String::new();
    collect_lines(element, &mut lines, &mut current);
    lines.push(current);
    lines_to_html(lines)
}

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "ol", "p",
    "pre", "section", "table", "tbody", "td", "th", "thead", "tr", "ul",
];

fn collect_lines(element: &ElementRef<'_>, lines: &mut Vec<String>, current: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            current.push_str(text);
            continue;
        }
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };
        match child.value().name() {
            "br" => lines.push(std::mem::take(current)),
            "script" | "style" | "noscript" | "template" => {}
            name if BLOCK_ELEMENTS.contains(&name) => {
                lines.push(std::mem::take(current));
                collect_lines(&child, lines, current);
                lines.push(std::mem::take(current));
            }
            _ => collect_lines(&child, lines, current),
        }
    }
}
