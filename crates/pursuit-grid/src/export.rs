//! Bulk export of a row/column subset to delimited text.
//!
//! RFC4180 quoting comes from the `csv` writer: any cell containing the
//! delimiter, a quote, or a newline is quoted with internal quotes doubled.
//! Zero rows is a legal export and yields a header-only document.

use pursuit_core::model::item::WorkItem;

use crate::column::ColumnModel;

/// Error raised when the CSV writer fails (I/O or encoding).
#[derive(Debug, thiserror::Error)]
#[error("export failed: {0}")]
pub struct ExportError(#[from] csv::Error);

/// Serialize `rows` x `columns` to delimited UTF-8 text.
///
/// `columns` should be the visible data columns; structural columns carry no
/// values and are skipped defensively if passed.
///
/// # Errors
///
/// [`ExportError`] if the underlying writer fails; never for empty input.
pub fn export_rows(
    rows: &[&WorkItem],
    columns: &[&ColumnModel],
    delimiter: char,
) -> Result<String, ExportError> {
    let data_columns: Vec<&&ColumnModel> = columns
        .iter()
        .filter(|c| !c.kind.is_structural())
        .collect();

    let mut writer = csv::WriterBuilder::new()
        .delimiter(u8::try_from(delimiter).unwrap_or(b','))
        .from_writer(Vec::new());

    writer.write_record(data_columns.iter().map(|c| c.label.as_str()))?;
    for row in rows {
        writer.write_record(data_columns.iter().map(|c| row.value(&c.key).export()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError(csv::Error::from(e.into_error())))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Download name offered alongside the export blob.
#[must_use]
pub fn suggested_filename(today: chrono::NaiveDate) -> String {
    format!("pursuit-export-{}.csv", today.format("%Y-%m-%d"))
}
