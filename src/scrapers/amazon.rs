use scraper::Html;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::probe::{element_block, element_text, first_element, first_match, parse_selector, Probe};
use crate::models::{ExtractedFields, ProductIdentifier};
use crate::parsers::{clean_brand, parse_price, ImageSet};

const TITLE: &[Probe] = &[Probe::Text("span#productTitle"), Probe::Text("#productTitle")];

const PRICE: &[Probe] = &[
    Probe::Text("#tp-tool-tip-subtotal-price-value"),
    Probe::Text("span.a-price > span.a-offscreen"),
    Probe::Text("#priceblock_ourprice"),
    Probe::Text("#priceblock_dealprice"),
    Probe::Text(".apexPriceToPay > span[aria-hidden='true']"),
    Probe::Text(".a-price .a-offscreen"),
    Probe::Text("#corePrice_feature_div .a-price .a-offscreen"),
    Probe::Text("#corePrice_desktop .a-price .a-offscreen"),
];

const DETAILED_DESCRIPTION: &[Probe] = &[
    Probe::Block("#productDescription"),
    Probe::Block("#aplus"),
    Probe::Block("#dpx-aplus-product-description_feature_div"),
    Probe::Block("#aplus3p_feature_div"),
    Probe::Block("#descriptionAndDetails"),
];

const BRAND: &[Probe] = &[
    Probe::Text("a#bylineInfo"),
    Probe::Text("#bylineInfo"),
    Probe::Text(r#".a-row.a-spacing-small .a-link-normal[href*="brandtextbin"]"#),
    Probe::Text("a#brand"),
    Probe::Text("#brand"),
    Probe::Text(r#"a[id*="brand"]"#),
    Probe::Text("tr.po-brand td.a-span9"),
];

const MAIN_IMAGE: &[Probe] = &[
    Probe::Attr("#landingImage", "data-old-hires"),
    Probe::Attr("#landingImage", "data-zoom-hires"),
    Probe::Attr("#landingImage", "src"),
    Probe::Attr("#imgBlkFront", "data-old-hires"),
    Probe::Attr("#imgBlkFront", "src"),
];

const FEATURE_BULLETS: &str = "#feature-bullets";

const THUMBNAILS: &[&str] = &[
    "#altImages li img",
    "li.a-spacing-small.item img",
    "li.image.item img",
    "#altImages .a-button-thumbnail img",
    "#imageBlockThumbs img",
];

const THUMBNAIL_ATTRS: &[&str] = &["data-old-hires", "data-large-image", "src"];

const DYNAMIC_IMAGE_ATTR: &str = "data-a-dynamic-image";

/// Pull every field off a loaded product page. Missing fields come back
/// empty; this never fails.
pub fn extract_fields(
    source: &str,
    id: &ProductIdentifier,
    max_images: Option<usize>,
) -> ExtractedFields {
    let document = Html::parse_document(source);

    let title = first_match(&document, TITLE, Some).unwrap_or_default();
    if title.is_empty() {
        debug!("No title found for {}", id);
        return ExtractedFields::default();
    }
    info!("Title: {}", truncate(&title, 50));

    let price = first_match(&document, PRICE, |raw| parse_price(&raw)).unwrap_or_else(|| {
        warn!("No price found for {}", id);
        String::new()
    });

    let short_description = short_description(&document).unwrap_or_else(|| {
        warn!("No bullet points found for {}", id);
        String::new()
    });

    let detailed_description = first_match(&document, DETAILED_DESCRIPTION, Some)
        .unwrap_or_else(|| {
            debug!("No detailed description found for {}", id);
            String::new()
        });

    let brand = first_match(&document, BRAND, |raw| {
        let cleaned = clean_brand(&raw);
        (!cleaned.is_empty()).then_some(cleaned)
    })
    .unwrap_or_default();

    let images = collect_images(&document, max_images);
    info!("Found {} images for {}", images.len(), id);

    ExtractedFields {
        title,
        price,
        short_description,
        detailed_description,
        brand,
        images,
    }
}

fn short_description(document: &Html) -> Option<String> {
    let strategies: [fn(&Html) -> Option<String>; 2] = [bullet_points, bullet_block];
    strategies.iter().find_map(|strategy| strategy(document))
}

/// `• text<br>` per bullet.
fn bullet_points(document: &Html) -> Option<String> {
    let container = first_element(document, FEATURE_BULLETS)?;
    let selector = parse_selector("li span.a-list-item")?;
    let html: String = container
        .select(&selector)
        .map(|item| element_text(&item))
        .filter(|text| !text.is_empty())
        .map(|text| format!("• {}<br>", text))
        .collect();
    (!html.is_empty()).then_some(html)
}

fn bullet_block(document: &Html) -> Option<String> {
    let container = first_element(document, FEATURE_BULLETS)?;
    let html = element_block(&container);
    (!html.is_empty()).then_some(html)
}

fn collect_images(document: &Html, max_images: Option<usize>) -> Vec<String> {
    let mut images = ImageSet::new(max_images);

    if let Some(main) = first_match(document, MAIN_IMAGE, Some) {
        images.insert(&main);
    }

    for css in THUMBNAILS {
        if images.is_full() {
            break;
        }
        let Some(selector) = parse_selector(css) else {
            continue;
        };
        for thumb in document.select(&selector) {
            if images.is_full() {
                break;
            }
            for attr in THUMBNAIL_ATTRS {
                if let Some(src) = thumb.value().attr(attr) {
                    if images.insert(src) {
                        break;
                    }
                }
            }
        }
        // Main image plus at least one thumbnail: this layout worked.
        if images.len() > 1 {
            break;
        }
    }

    if !images.is_full() {
        if let Some(selector) = parse_selector(&format!("[{}]", DYNAMIC_IMAGE_ATTR)) {
            for element in document.select(&selector).take(2) {
                let Some(raw) = element.value().attr(DYNAMIC_IMAGE_ATTR) else {
                    continue;
                };
                match serde_json::from_str::<Value>(&html_escape::decode_html_entities(raw)) {
                    Ok(Value::Object(map)) => {
                        for url in map.keys() {
                            images.insert(url);
                        }
                    }
                    Ok(_) => {}
                    Err(e) => debug!("Unreadable {} attribute: {}", DYNAMIC_IMAGE_ATTR, e),
                }
            }
        }
    }

    images.into_vec()
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id() -> ProductIdentifier {
        ProductIdentifier::parse("B000123456").unwrap()
    }

    fn page(body: &str) -> String {
        format!("<html><head><title>Amazon.com</title></head><body>{}</body></html>", body)
    }

    #[test]
    fn extracts_a_typical_product_page() {
        let source = page(
            r#"
            <span id="productTitle">  Blue Mug  </span>
            <a id="bylineInfo" href="/stores/Acme">Visit the Acme Store</a>
            <div id="corePrice_feature_div"><span class="a-price"><span class="a-offscreen">$1,212.99</span></span></div>
            <div id="feature-bullets"><ul>
              <li><span class="a-list-item"> Ceramic </span></li>
              <li><span class="a-list-item">Dishwasher safe</span></li>
            </ul></div>
            <div id="productDescription"><p>Holds 350ml.</p><p>Made in Portugal.</p></div>
            <img id="landingImage" src="https://m.media-amazon.com/images/I/41mug._AC_SY879_.jpg"
                 data-old-hires="https://m.media-amazon.com/images/I/41mug.jpg">
            <div id="altImages"><ul>
              <li><img src="https://m.media-amazon.com/images/I/41mug._AC_US40_.jpg"></li>
              <li><img src="https://m.media-amazon.com/images/I/51side._AC_US40_.jpg"></li>
              <li><img src="https://m.media-amazon.com/images/G/01/play-icon-overlay._CB485935036_FMpng_RI_.png"></li>
            </ul></div>
            "#,
        );

        let fields = extract_fields(&source, &id(), Some(5));
        assert_eq!(fields.title, "Blue Mug");
        assert_eq!(fields.price, "1212.99");
        assert_eq!(fields.brand, "Acme");
        assert_eq!(fields.short_description, "• Ceramic<br>• Dishwasher safe<br>");
        assert_eq!(fields.detailed_description, "Holds 350ml.<br>Made in Portugal.");
        assert_eq!(
            fields.images,
            vec![
                "https://m.media-amazon.com/images/I/41mug.jpg",
                "https://m.media-amazon.com/images/I/41mug..jpg",
                "https://m.media-amazon.com/images/I/51side..jpg",
            ]
        );
    }

    #[test]
    fn missing_title_yields_empty_fields() {
        let source = page(r#"<span class="a-price"><span class="a-offscreen">$9.99</span></span>"#);
        let fields = extract_fields(&source, &id(), None);
        assert!(!fields.has_title());
        assert_eq!(fields, ExtractedFields::default());
    }

    #[test]
    fn price_falls_through_to_the_only_present_selector() {
        let source = page(
            r#"<span id="productTitle">Mug</span>
               <span id="tp-tool-tip-subtotal-price-value"></span>
               <span id="priceblock_dealprice">$4.50</span>"#,
        );
        assert_eq!(extract_fields(&source, &id(), None).price, "4.50");
    }

    #[test]
    fn price_without_digits_does_not_mask_later_selector() {
        let source = page(
            r#"<span id="productTitle">Mug</span>
               <span id="priceblock_ourprice">Currently unavailable</span>
               <div class="a-price"><span class="a-offscreen">$7.25</span></div>"#,
        );
        assert_eq!(extract_fields(&source, &id(), None).price, "7.25");
    }

    #[test]
    fn short_description_falls_back_to_block_text() {
        let source = page(
            r#"<span id="productTitle">Mug</span>
               <div id="feature-bullets"><p>Ceramic</p><p>Blue glaze</p></div>"#,
        );
        assert_eq!(
            extract_fields(&source, &id(), None).short_description,
            "Ceramic<br>Blue glaze"
        );
    }

    #[test]
    fn inline_markup_does_not_break_description_lines() {
        let source = page(
            r#"<span id="productTitle">Mug</span>
               <div id="feature-bullets"><p>Glazed <i>blue</i> finish</p><p>Holds <b>350ml</b></p></div>
               <div id="productDescription"><p>Made in <b>Portugal</b> by hand.</p>
                 <p>See <a href="/care">care guide</a><br>for details.</p></div>"#,
        );
        let fields = extract_fields(&source, &id(), None);
        assert_eq!(fields.short_description, "Glazed blue finish<br>Holds 350ml");
        assert_eq!(
            fields.detailed_description,
            "Made in Portugal by hand.<br>See care guide<br>for details."
        );
    }

    #[test]
    fn bullet_items_keep_inline_markup_together() {
        let source = page(
            r#"<span id="productTitle">Mug</span>
               <div id="feature-bullets"><ul>
                 <li><span class="a-list-item">Glazed <i>blue</i> finish</span></li>
               </ul></div>"#,
        );
        assert_eq!(
            extract_fields(&source, &id(), None).short_description,
            "• Glazed blue finish<br>"
        );
    }

    #[test]
    fn sprite_main_image_is_dropped_like_any_other() {
        let source = page(
            r#"<span id="productTitle">Mug</span>
               <img id="landingImage" src="https://m.media-amazon.com/images/G/01/x-locale/common/grey-pixel._CB485935036_FMpng_RI_.gif">
               <div id="altImages"><ul><li><img src="https://img/side._SX40_.jpg"></li></ul></div>"#,
        );
        assert_eq!(extract_fields(&source, &id(), None).images, vec!["https://img/side..jpg"]);
    }

    #[test]
    fn brand_uses_later_selector_when_byline_missing() {
        let source = page(
            r#"<span id="productTitle">Mug</span>
               <a id="brand" href="/acme">Brand: Acme</a>"#,
        );
        assert_eq!(extract_fields(&source, &id(), None).brand, "Acme");
    }

    #[test]
    fn dynamic_image_attribute_fills_remaining_slots() {
        let source = page(
            r#"<span id="productTitle">Mug</span>
               <img id="landingImage" src="https://img/main.jpg"
                    data-a-dynamic-image='{"https://img/main.jpg":[500,500],"https://img/alt._SX40_.jpg":[40,40],"https://img/extra.jpg":[1,1]}'>"#,
        );
        assert_eq!(
            extract_fields(&source, &id(), Some(2)).images,
            vec!["https://img/main.jpg", "https://img/alt..jpg"]
        );
    }

    #[test]
    fn unbounded_images_when_no_cap() {
        let thumbs: String = (0..8)
            .map(|i| format!(r#"<li><img src="https://img/{}.jpg"></li>"#, i))
            .collect();
        let source = page(&format!(
            r#"<span id="productTitle">Mug</span><div id="altImages"><ul>{}</ul></div>"#,
            thumbs
        ));
        assert_eq!(extract_fields(&source, &id(), None).images.len(), 8);
        assert_eq!(extract_fields(&source, &id(), Some(5)).images.len(), 5);
    }
}
