use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::ImportError;
use crate::models::{columns, AssembledRow, ProductIdentifier, TemplateRow};

const BOM: &str = "\u{feff}";

/// One usable line of the input table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    /// 1-based line number in the input file, header included.
    pub line: usize,
    pub id: ProductIdentifier,
    /// `Variant SKU` exactly as written in the input.
    pub sku: String,
    pub vendor: Option<String>,
    pub barcode: Option<String>,
}

struct RawTable {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
}

fn read_table(path: &Path) -> Result<RawTable, ImportError> {
    let csv_error = |source| ImportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let mut headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();
    if let Some(first) = headers.first_mut() {
        if let Some(stripped) = first.strip_prefix(BOM) {
            *first = stripped.to_string();
        }
    }

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        records.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { headers, records })
}

/// Header row defines the schema, first data row the defaults.
pub fn read_template(path: &Path) -> Result<TemplateRow, ImportError> {
    let table = read_table(path)?;
    if table.headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ImportError::EmptyTemplate(path.to_path_buf()));
    }
    let defaults = match table.records.into_iter().next() {
        Some(first) => first,
        None => {
            warn!("Template {} has no data row; all defaults are empty", path.display());
            Vec::new()
        }
    };
    Ok(TemplateRow::new(table.headers, defaults))
}

/// Rows with a non-blank `Variant SKU`, in file order.
pub fn read_input(path: &Path) -> Result<Vec<SourceRow>, ImportError> {
    let table = read_table(path)?;
    let position = |name: &str| table.headers.iter().position(|h| h.trim() == name);

    let sku_col = position(columns::SKU).ok_or_else(|| ImportError::MissingColumn {
        path: path.to_path_buf(),
        column: columns::SKU,
    })?;
    let vendor_col = position(columns::VENDOR);
    let barcode_col = position(columns::BARCODE);

    let non_blank = |record: &Vec<String>, col: Option<usize>| {
        col.and_then(|c| record.get(c))
            .filter(|value| !value.trim().is_empty())
            .cloned()
    };

    let mut rows = Vec::new();
    for (idx, record) in table.records.iter().enumerate() {
        let line = idx + 2;
        let sku = record.get(sku_col).cloned().unwrap_or_default();
        let Some(id) = ProductIdentifier::parse(&sku) else {
            debug!("Skipping line {}: blank Variant SKU", line);
            continue;
        };
        rows.push(SourceRow {
            line,
            id,
            sku,
            vendor: non_blank(record, vendor_col),
            barcode: non_blank(record, barcode_col),
        });
    }
    Ok(rows)
}

/// UTF-8 with a byte-order mark, columns in template order.
pub fn write_output(
    path: &Path,
    template: &TemplateRow,
    rows: &[AssembledRow],
) -> Result<(), ImportError> {
    let io_error = |source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let csv_error = |source| ImportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    debug_assert!(rows.iter().all(|row| row.columns() == template.columns()));

    let mut file = File::create(path).map_err(io_error)?;
    file.write_all(BOM.as_bytes()).map_err(io_error)?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(template.columns()).map_err(csv_error)?;
    for row in rows {
        writer.write_record(row.values()).map_err(csv_error)?;
    }
    writer.flush().map_err(io_error)?;
    Ok(())
}

/// `dir/name.csv` becomes `dir/name<suffix>.csv`.
pub fn output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };
    input.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn output_path_inserts_suffix_before_extension() {
        assert_eq!(
            output_path(Path::new("/data/demo.csv"), "_update"),
            PathBuf::from("/data/demo_update.csv")
        );
        assert_eq!(
            output_path(Path::new("exports/demo.v2.csv"), "_update"),
            PathBuf::from("exports/demo.v2_update.csv")
        );
        assert_eq!(output_path(Path::new("demo"), "_update"), PathBuf::from("demo_update"));
    }

    #[test]
    fn input_rows_are_filtered_and_keep_raw_sku() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "in.csv",
            "\u{feff}Variant SKU,Vendor,Variant Barcode\n B000123456 ,Acme,\n,,\n   ,Acme,\nB000999999,,0123\n",
        );

        let rows = read_input(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[0].id.as_str(), "B000123456");
        assert_eq!(rows[0].sku, " B000123456 ");
        assert_eq!(rows[0].vendor.as_deref(), Some("Acme"));
        assert_eq!(rows[0].barcode, None);
        assert_eq!(rows[1].line, 5);
        assert_eq!(rows[1].vendor, None);
        assert_eq!(rows[1].barcode.as_deref(), Some("0123"));
    }

    #[test]
    fn missing_sku_column_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "in.csv", "ASIN\nB000123456\n");
        assert!(matches!(
            read_input(&path),
            Err(ImportError::MissingColumn { column: "Variant SKU", .. })
        ));
    }

    #[test]
    fn template_uses_first_row_as_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "template.csv",
            "Handle,Vendor,Published\nold-handle,Generic,TRUE\nother,Other,FALSE\n",
        );
        let template = read_template(&path).unwrap();
        assert_eq!(template.columns(), &["Handle", "Vendor", "Published"]);
        assert_eq!(template.default_for("Vendor"), Some("Generic"));
        assert_eq!(template.default_for("Published"), Some("TRUE"));
    }

    #[test]
    fn header_only_template_has_empty_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "template.csv", "Handle,Vendor\n");
        let template = read_template(&path).unwrap();
        assert_eq!(template.default_for("Vendor"), Some(""));
    }

    #[test]
    fn written_output_round_trips_non_ascii_text() {
        let dir = TempDir::new().unwrap();
        let template = TemplateRow::new(vec!["Handle".into(), "Title".into()], vec![]);
        let mut row = template.instantiate();
        row.set("Handle", "cay-canh-3456");
        row.set("Title", "Cây cảnh, mini \"xanh\"");

        let out = dir.path().join("out.csv");
        write_output(&out, &template, &[row]).unwrap();

        let bytes = fs::read(&out).unwrap();
        assert!(bytes.starts_with(BOM.as_bytes()));
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text.trim_start_matches(BOM),
            "Handle,Title\ncay-canh-3456,\"Cây cảnh, mini \"\"xanh\"\"\"\n"
        );
    }
}
