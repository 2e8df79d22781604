//! CSV product import.
//!
//! Parsing and per-row validation live here; persisting a row is delegated
//! to an [`ImportSink`] so the same pipeline runs against Postgres in
//! production and an in-memory sink in tests.
//!
//! Rows are imported one by one with no surrounding transaction: a failure
//! on a later row never rolls back rows that were already written.

use std::io::Read;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::category_tree::parse_category_path;
use crate::error::CoreError;
use crate::money::parse_price_cents;

/// Columns that must appear in the header row.
pub const REQUIRED_COLUMNS: &[&str] = &["name", "category", "sku", "price", "stock"];

/// Separator between tag names in the `tags` column.
pub const TAG_SEPARATOR: char = ';';

/// Errors that prevent the file from being processed at all.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("CSV could not be read: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("CSV contains no data rows")]
    Empty,
}

/// A row exactly as it appears in the file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProductRow {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub stock: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
}

/// A validated row ready to be written by an [`ImportSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProductImportRow {
    /// Line number in the source file (the header is line 1).
    pub line: u64,
    pub name: String,
    pub description: Option<String>,
    pub category_path: Vec<String>,
    pub material: Option<String>,
    pub sku: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub price_cents: i64,
    pub stock: i32,
    pub tags: Vec<String>,
}

/// A single rejected row.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RowError {
    pub row: u64,
    pub sku: Option<String>,
    pub message: String,
}

/// Outcome of an import run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub total_rows: usize,
    pub imported: usize,
    pub failed: usize,
    /// `true` when the run stopped at the first bad row (`skip_errors=false`).
    pub aborted: bool,
    pub errors: Vec<RowError>,
}

/// Destination for validated rows.
#[async_trait]
pub trait ImportSink: Send {
    /// Persist one row (category path, product, variant, tags).
    async fn import_row(&mut self, row: &ProductImportRow) -> Result<(), CoreError>;
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validate a raw row into a [`ProductImportRow`].
pub fn validate_row(line: u64, raw: RawProductRow) -> Result<ProductImportRow, RowError> {
    let sku = clean(raw.sku);
    let fail = |message: String| RowError {
        row: line,
        sku: sku.clone(),
        message,
    };

    let name = clean(raw.name).ok_or_else(|| fail("Missing required field 'name'".into()))?;

    let category_path = parse_category_path(raw.category.as_deref().unwrap_or_default());
    if category_path.is_empty() {
        return Err(fail("Missing required field 'category'".into()));
    }

    let sku_value = sku
        .clone()
        .ok_or_else(|| fail("Missing required field 'sku'".into()))?;

    let price_raw = clean(raw.price).ok_or_else(|| fail("Missing required field 'price'".into()))?;
    let price_cents = parse_price_cents(&price_raw).map_err(|_| fail(format!("Invalid price '{price_raw}'")))?;

    let stock_raw = clean(raw.stock).ok_or_else(|| fail("Missing required field 'stock'".into()))?;
    let stock = stock_raw
        .parse::<i32>()
        .ok()
        .filter(|s| *s >= 0)
        .ok_or_else(|| fail(format!("Invalid stock '{stock_raw}'")))?;

    let tags = raw
        .tags
        .as_deref()
        .unwrap_or_default()
        .split(TAG_SEPARATOR)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    Ok(ProductImportRow {
        line,
        name,
        description: clean(raw.description),
        category_path,
        material: clean(raw.material),
        sku: sku_value,
        size: clean(raw.size),
        color: clean(raw.color),
        price_cents,
        stock,
        tags,
    })
}

/// One data record: its line number and the decoded row or why it failed.
pub type ParsedRow = (u64, Result<RawProductRow, String>);

/// Parse an in-memory CSV payload.
pub fn parse_csv(bytes: &[u8]) -> Result<Vec<ParsedRow>, ImportError> {
    read_rows(csv_builder().from_reader(bytes))
}

/// Parse a CSV file on disk. Blocking; call it off the async runtime.
pub fn parse_csv_file(path: &Path) -> Result<Vec<ParsedRow>, ImportError> {
    read_rows(csv_builder().from_path(path)?)
}

fn csv_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.trim(csv::Trim::All).flexible(false);
    builder
}

/// Header problems are fatal. A record that cannot be decoded at all (e.g.
/// wrong field count) is reported as a row-level error instead.
fn read_rows<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<ParsedRow>, ImportError> {
    let headers = reader.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h.eq_ignore_ascii_case(col)))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns(missing));
    }

    let lower: csv::StringRecord = headers.iter().map(str::to_ascii_lowercase).collect();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let fallback_line = index as u64 + 2;
        match record {
            Ok(record) => {
                let line = record.position().map_or(fallback_line, |p| p.line());
                let parsed = record
                    .deserialize::<RawProductRow>(Some(&lower))
                    .map_err(|e| e.to_string());
                rows.push((line, parsed));
            }
            Err(e) => {
                let line = e.position().map_or(fallback_line, |p| p.line());
                rows.push((line, Err(e.to_string())));
            }
        }
    }

    if rows.is_empty() {
        return Err(ImportError::Empty);
    }
    Ok(rows)
}

/// Parse `bytes` and import every row into `sink`.
pub async fn run_import<S: ImportSink>(
    bytes: &[u8],
    sink: &mut S,
    skip_errors: bool,
) -> Result<ImportReport, ImportError> {
    let rows = parse_csv(bytes)?;
    Ok(import_rows(rows, sink, skip_errors).await)
}

/// Feed already parsed rows to `sink`.
///
/// With `skip_errors` set, invalid rows and sink failures are recorded and
/// processing continues. Otherwise the run stops at the first failure and
/// reports `aborted = true`; rows imported before that point stay imported.
pub async fn import_rows<S: ImportSink>(
    rows: Vec<ParsedRow>,
    sink: &mut S,
    skip_errors: bool,
) -> ImportReport {
    let mut report = ImportReport {
        total_rows: rows.len(),
        ..ImportReport::default()
    };

    for (line, parsed) in rows {
        let outcome = match parsed {
            Ok(raw) => match validate_row(line, raw) {
                Ok(row) => sink.import_row(&row).await.map_err(|e| RowError {
                    row: line,
                    sku: Some(row.sku.clone()),
                    message: sink_message(e),
                }),
                Err(row_err) => Err(row_err),
            },
            Err(message) => Err(RowError {
                row: line,
                sku: None,
                message,
            }),
        };

        match outcome {
            Ok(()) => report.imported += 1,
            Err(row_err) => {
                report.failed += 1;
                report.errors.push(row_err);
                if !skip_errors {
                    report.aborted = true;
                    break;
                }
            }
        }
    }

    report
}

fn sink_message(err: CoreError) -> String {
    match err {
        CoreError::Conflict(msg) | CoreError::Validation(msg) => msg,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[derive(Default)]
    struct MemorySink {
        rows: Vec<ProductImportRow>,
    }

    #[async_trait]
    impl ImportSink for MemorySink {
        async fn import_row(&mut self, row: &ProductImportRow) -> Result<(), CoreError> {
            if self.rows.iter().any(|r| r.sku == row.sku) {
                return Err(CoreError::Conflict(format!("SKU '{}' already exists", row.sku)));
            }
            self.rows.push(row.clone());
            Ok(())
        }
    }

    const HEADER: &str = "name,description,category,material,sku,size,color,price,stock,tags\n";

    fn csv_with(rows: &[&str]) -> Vec<u8> {
        let mut s = HEADER.to_string();
        for r in rows {
            s.push_str(r);
            s.push('\n');
        }
        s.into_bytes()
    }

    fn sample_with_bad_price() -> Vec<u8> {
        csv_with(&[
            "Tee,Soft tee,Men > Shirts,cotton,TEE-S,S,white,19.99,10,summer;basics",
            "Tee,Soft tee,Men > Shirts,cotton,TEE-M,M,white,abc,10,",
            "Jeans,,Men > Pants,denim,JEAN-32,32,blue,49.50,4,",
        ])
    }

    #[tokio::test]
    async fn skip_errors_continues_past_invalid_price() {
        let mut sink = MemorySink::default();
        let report = run_import(&sample_with_bad_price(), &mut sink, true)
            .await
            .unwrap();

        assert_eq!(report.total_rows, 3);
        assert_eq!(report.imported, 2);
        assert_eq!(report.failed, 1);
        assert!(!report.aborted);
        assert_eq!(report.errors[0].row, 3);
        assert_eq!(report.errors[0].sku.as_deref(), Some("TEE-M"));
        assert!(report.errors[0].message.contains("Invalid price"));

        let skus: Vec<_> = sink.rows.iter().map(|r| r.sku.as_str()).collect();
        assert_eq!(skus, vec!["TEE-S", "JEAN-32"]);
    }

    #[tokio::test]
    async fn without_skip_errors_aborts_at_first_invalid_row() {
        let mut sink = MemorySink::default();
        let report = run_import(&sample_with_bad_price(), &mut sink, false)
            .await
            .unwrap();

        assert!(report.aborted);
        assert_eq!(report.imported, 1);
        assert_eq!(report.failed, 1);
        // The row before the failure is kept.
        assert_eq!(sink.rows.len(), 1);
        assert_eq!(sink.rows[0].sku, "TEE-S");
    }

    #[tokio::test]
    async fn sink_failures_are_row_errors() {
        let bytes = csv_with(&[
            "Cap,,Accessories,,CAP-1,,,9.00,3,",
            "Cap,,Accessories,,CAP-1,,,9.00,3,",
            "Scarf,,Accessories,,SCARF-1,,,12,1,",
        ]);
        let mut sink = MemorySink::default();
        let report = run_import(&bytes, &mut sink, true).await.unwrap();

        assert_eq!(report.imported, 2);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].message.contains("already exists"));
    }

    #[test]
    fn valid_row_is_normalised() {
        let raw = RawProductRow {
            name: Some(" Hoodie ".into()),
            category: Some("Women > Outerwear".into()),
            sku: Some("HD-1".into()),
            price: Some("39.9".into()),
            stock: Some("7".into()),
            tags: Some("warm; ;winter".into()),
            size: Some("".into()),
            ..RawProductRow::default()
        };
        let row = validate_row(2, raw).unwrap();
        assert_eq!(row.name, "Hoodie");
        assert_eq!(row.category_path, vec!["Women", "Outerwear"]);
        assert_eq!(row.price_cents, 3990);
        assert_eq!(row.stock, 7);
        assert_eq!(row.tags, vec!["warm", "winter"]);
        assert_eq!(row.size, None);
    }

    #[test]
    fn negative_stock_is_rejected() {
        let raw = RawProductRow {
            name: Some("Hoodie".into()),
            category: Some("Women".into()),
            sku: Some("HD-1".into()),
            price: Some("10".into()),
            stock: Some("-2".into()),
            ..RawProductRow::default()
        };
        let err = validate_row(5, raw).unwrap_err();
        assert_eq!(err.row, 5);
        assert!(err.message.contains("Invalid stock"));
    }

    #[test]
    fn missing_required_columns_is_fatal() {
        let bytes = b"name,sku\nTee,TEE-1\n";
        assert_matches!(parse_csv(bytes), Err(ImportError::MissingColumns(cols)) if cols.contains(&"price".to_string()));
    }

    #[test]
    fn header_only_file_is_empty() {
        assert_matches!(parse_csv(HEADER.as_bytes()), Err(ImportError::Empty));
    }

    #[test]
    fn header_case_is_ignored() {
        let bytes = b"Name,Category,SKU,Price,Stock\nTee,Men,TEE-1,5,1\n";
        let rows = parse_csv(bytes).unwrap();
        let raw = rows[0].1.clone().unwrap();
        assert_eq!(raw.sku.as_deref(), Some("TEE-1"));
    }

    #[test]
    fn staged_file_parses_like_the_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.csv");
        std::fs::write(&path, b"name,category,sku,price,stock\nTee,Men,TEE-1,5,1\nCap,Men,CAP-1,x,1\n").unwrap();

        let rows = parse_csv_file(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].0, 3);
    }

    #[test]
    fn missing_staged_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert_matches!(parse_csv_file(&dir.path().join("gone.csv")), Err(ImportError::Csv(_)));
    }
}
