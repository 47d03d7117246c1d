use super::table::SourceRow;
use crate::models::{columns, AssembledRow, ExtractedFields, TemplateRow, DEFAULT_VENDOR, IMPORT_TAG};
use crate::parsers::product_handle;

/// Template copy with the scraped columns filled in. Empty scraped values
/// keep the template default. SKU, vendor and barcode from the input row win
/// over both.
pub fn assemble_row(
    template: &TemplateRow,
    source: &SourceRow,
    fields: &ExtractedFields,
) -> AssembledRow {
    let mut row = template.instantiate();
    let id = &source.id;

    let (image_src, image_position) = match fields.images.first() {
        Some(url) => (url.clone(), "1".to_string()),
        None => (String::new(), String::new()),
    };

    let scraped = [
        (columns::HANDLE, product_handle(&fields.title, id)),
        (columns::TITLE, fields.title.clone()),
        (columns::BODY, fields.body_html()),
        (columns::BRAND, fields.brand.clone()),
        (columns::TAGS, format!("{},{}", IMPORT_TAG, id)),
        (columns::PRICE, fields.price.clone()),
        (columns::BARCODE, id.to_string()),
        (columns::IMAGE_SRC, image_src),
        (columns::IMAGE_POSITION, image_position),
    ];
    for (column, value) in scraped {
        if !value.is_empty() {
            row.set(column, value);
        }
    }

    row.set(columns::SKU, source.sku.clone());
    row.set(
        columns::VENDOR,
        source.vendor.clone().unwrap_or_else(|| DEFAULT_VENDOR.to_string()),
    );
    if let Some(barcode) = &source.barcode {
        row.set(columns::BARCODE, barcode.clone());
    }

    row
}
