use crate::error::{ReportError, Result};
use crate::types::{Dataset, RawRow, Record};
use crate::util::{parse_date_safe, parse_number_cell, Cell};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const REQUIRED_COLUMNS: [&str; 5] = ["date", "clicks", "impressions", "ad_spend", "revenue"];

/// Load and clean the campaign CSV at `path`.
///
/// Missing numeric cells become 0. A missing or unparseable date aborts the
/// load with `ReportError::DataFormat`.
pub fn load(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    tracing::info!("Ingesting data from {}", path.display());
    let file = File::open(path).map_err(|e| ReportError::io(path, e))?;
    let data = load_from_reader(file)?;
    tracing::info!("Loaded {} rows of data", data.len());
    Ok(data)
}

pub fn load_from_reader<R: Read>(reader: R) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| ReportError::DataFormat(format!("unreadable header row: {}", e)))?
        .clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(ReportError::DataFormat(format!(
            "missing required column(s): {}",
            missing.join(", ")
        )));
    }

    let mut data = Dataset::new();
    for (idx, result) in rdr.deserialize::<RawRow>().enumerate() {
        let row_no = idx + 1;
        let row = result
            .map_err(|e| ReportError::DataFormat(format!("row {}: malformed record: {}", row_no, e)))?;
        data.push(clean_row(row, row_no)?);
    }
    Ok(data)
}

fn clean_row(row: RawRow, row_no: usize) -> Result<Record> {
    let date = parse_date_safe(row.date.as_deref()).ok_or_else(|| {
        ReportError::DataFormat(format!(
            "row {}: unparseable date {:?}",
            row_no,
            row.date.as_deref().unwrap_or("")
        ))
    })?;

    Ok(Record {
        date,
        clicks: numeric(row.clicks.as_deref(), "clicks", row_no)?,
        impressions: numeric(row.impressions.as_deref(), "impressions", row_no)?,
        ad_spend: numeric(row.ad_spend.as_deref(), "ad_spend", row_no)?,
        revenue: numeric(row.revenue.as_deref(), "revenue", row_no)?,
    })
}

fn numeric(cell: Option<&str>, column: &str, row_no: usize) -> Result<f64> {
    match parse_number_cell(cell) {
        Cell::Value(v) => Ok(v),
        // Missing activity counts as zero activity.
        Cell::Missing => Ok(0.0),
        Cell::Invalid => Err(ReportError::DataFormat(format!(
            "row {}: column {} has non-numeric value {:?}",
            row_no,
            column,
            cell.unwrap_or("")
        ))),
    }
}
