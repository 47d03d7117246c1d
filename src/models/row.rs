use std::collections::HashMap;
use std::sync::Arc;

/// Shopify product CSV column names this tool writes to.
pub mod columns {
    pub const HANDLE: &str = "Handle";
    pub const TITLE: &str = "Title";
    pub const BODY: &str = "Body (HTML)";
    pub const VENDOR: &str = "Vendor";
    pub const BRAND: &str = "Brand";
    pub const TAGS: &str = "Tags";
    pub const GRAMS: &str = "Variant Grams";
    pub const SKU: &str = "Variant SKU";
    pub const PRICE: &str = "Variant Price";
    pub const BARCODE: &str = "Variant Barcode";
    pub const IMAGE_SRC: &str = "Image Src";
    pub const IMAGE_POSITION: &str = "Image Position";
}

/// Ordered column names plus a name lookup. Shared by every row of one file.
#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Schema {
    pub fn new(names: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(names.len());
        for (pos, name) in names.iter().enumerate() {
            index.entry(name.clone()).or_insert(pos);
        }
        Self { names, index }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }
}

/// Output schema and the default value of every column, taken from the
/// first data row of a reference export.
#[derive(Debug, Clone)]
pub struct TemplateRow {
    schema: Arc<Schema>,
    defaults: Vec<String>,
}

impl TemplateRow {
    pub fn new(names: Vec<String>, mut defaults: Vec<String>) -> Self {
        defaults.resize(names.len(), String::new());
        Self {
            schema: Arc::new(Schema::new(names)),
            defaults,
        }
    }

    pub fn columns(&self) -> &[String] {
        self.schema.names()
    }

    pub fn default_for(&self, name: &str) -> Option<&str> {
        self.schema
            .position(name)
            .map(|pos| self.defaults[pos].as_str())
    }

    pub fn instantiate(&self) -> AssembledRow {
        AssembledRow {
            schema: Arc::clone(&self.schema),
            values: self.defaults.clone(),
        }
    }
}

/// A template copy with some columns overwritten. Always carries exactly the
/// template's columns in the template's order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledRow {
    schema: Arc<Schema>,
    values: Vec<String>,
}

impl AssembledRow {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.schema
            .position(name)
            .map(|pos| self.values[pos].as_str())
    }

    /// Writes `value` if the column exists; unknown columns are ignored.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.schema.position(name) {
            Some(pos) => {
                self.values[pos] = value.into();
                true
            }
            None => false,
        }
    }

    pub fn columns(&self) -> &[String] {
        self.schema.names()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn template() -> TemplateRow {
        TemplateRow::new(
            vec!["Handle".into(), "Title".into(), "Vendor".into()],
            vec!["".into(), "".into(), "Generic".into()],
        )
    }

    #[test]
    fn instantiated_row_keeps_template_order_and_defaults() {
        let row = template().instantiate();
        assert_eq!(row.columns(), &["Handle", "Title", "Vendor"]);
        assert_eq!(row.values(), &["", "", "Generic"]);
    }

    #[test]
    fn set_ignores_columns_outside_the_template() {
        let mut row = template().instantiate();
        assert!(row.set(columns::TITLE, "Blue Mug"));
        assert!(!row.set(columns::BRAND, "Acme"));
        assert_eq!(row.get(columns::TITLE), Some("Blue Mug"));
        assert_eq!(row.get(columns::BRAND), None);
        assert_eq!(row.values().len(), 3);
    }

    #[test]
    fn short_default_row_is_padded() {
        let template = TemplateRow::new(vec!["A".into(), "B".into()], vec!["x".into()]);
        assert_eq!(template.default_for("B"), Some(""));
        assert_eq!(template.default_for("C"), None);
    }
}
