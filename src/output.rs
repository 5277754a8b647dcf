use crate::error::{ReportError, Result};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value).map_err(|e| {
        ReportError::io(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })?;
    std::fs::write(path, s).map_err(|e| ReportError::io(path, e))?;
    Ok(())
}

/// Render rows as a markdown table, or `(no rows)` when empty.
pub fn render_table<T>(rows: &[T]) -> String
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(rows.to_vec()).with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T>(rows: &[T])
where
    T: Tabled + Clone,
{
    println!("{}\n", render_table(rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpi::kpi_rows;
    use crate::types::{KpiRow, KpiSummary};
    use tempfile::tempdir;

    #[test]
    fn test_render_kpi_table() {
        let table = render_table(&kpi_rows(&KpiSummary::default()));
        assert!(table.contains("| Metric"));
        assert!(table.contains("Total Ad Spend"));
        assert!(table.contains("$0.00"));
    }

    #[test]
    fn test_render_empty_table() {
        let rows: Vec<KpiRow> = Vec::new();
        assert_eq!(render_table(&rows), "(no rows)");
    }

    #[test]
    fn test_write_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("summary.json");
        write_json(&path, &KpiSummary::default()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["total_clicks"], 0);
        assert_eq!(value["ctr"], 0.0);
    }
}
