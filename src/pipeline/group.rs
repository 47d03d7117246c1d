use std::collections::{HashMap, HashSet};

use crate::models::{columns, AssembledRow};

/// Rows sharing one handle, plus the union of their images.
#[derive(Debug, Clone)]
pub struct ProductGroup {
    handle: String,
    rows: Vec<AssembledRow>,
    images: Vec<String>,
    seen: HashSet<String>,
}

impl ProductGroup {
    fn new(handle: String) -> Self {
        Self {
            handle,
            rows: Vec::new(),
            images: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn push(&mut self, row: AssembledRow, images: &[String]) {
        for url in images {
            if !url.is_empty() && self.seen.insert(url.clone()) {
                self.images.push(url.clone());
            }
        }
        self.rows.push(row);
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Shopify layout: the first variant repeats once per image with
    /// `Image Position` 1..n; later variants carry no image.
    pub fn into_output_rows(self) -> Vec<AssembledRow> {
        let mut output = Vec::with_capacity(self.images.len().max(1) + self.rows.len());
        let mut rows = self.rows.into_iter();

        if let Some(first) = rows.next() {
            if self.images.is_empty() {
                output.push(without_image(first));
            } else {
                for (idx, url) in self.images.iter().enumerate() {
                    let mut row = first.clone();
                    row.set(columns::IMAGE_SRC, url.clone());
                    row.set(columns::IMAGE_POSITION, (idx + 1).to_string());
                    output.push(row);
                }
            }
        }

        output.extend(rows.map(without_image));
        output
    }
}

fn without_image(mut row: AssembledRow) -> AssembledRow {
    row.set(columns::IMAGE_SRC, "");
    row.set(columns::IMAGE_POSITION, "");
    row
}

/// Groups rows by handle, keeping groups in order of first appearance.
#[derive(Debug, Default)]
pub struct ProductGrouper {
    groups: Vec<ProductGroup>,
    index: HashMap<String, usize>,
}

impl ProductGrouper {
    pub fn add(&mut self, handle: &str, row: AssembledRow, images: &[String]) {
        let pos = match self.index.get(handle) {
            Some(&pos) => pos,
            None => {
                self.groups.push(ProductGroup::new(handle.to_string()));
                self.index.insert(handle.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        self.groups[pos].push(row, images);
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[ProductGroup] {
        &self.groups
    }

    pub fn into_rows(self) -> Vec<AssembledRow> {
        self.groups
            .into_iter()
            .flat_map(ProductGroup::into_output_rows)
            .collect()
    }
}
