//! Export of computed reports
//!
//! Any report serializes to pretty JSON; officer performance also exports
//! as CSV for spreadsheets.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::models::OfficerPerformance;

fn create_file(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Export a report (or any section of one) as pretty-printed JSON
///
/// Failed sections keep their `{"failed": {...}}` marker.
///
/// # Examples
///
/// ```no_run
/// use agrodash_core::analytics::AnalyticsEngine;
/// use agrodash_core::export::export_report_to_json;
/// use agrodash_core::{DataStore, EngineConfig};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # async fn run() -> anyhow::Result<()> {
/// let engine = AnalyticsEngine::new(Arc::new(DataStore::with_defaults()), EngineConfig::default());
/// let report = engine.compute_global_analytics().await;
/// export_report_to_json(&report, Path::new("global.json"))?;
/// # Ok(())
/// # }
/// ```
pub fn export_report_to_json<T: Serialize>(report: &T, path: &Path) -> Result<()> {
    let mut writer = create_file(path)?;

    serde_json::to_writer_pretty(&mut writer, report)
        .with_context(|| format!("Failed to serialize report to {}", path.display()))?;
    writeln!(writer).context("Failed to write trailing newline")?;

    writer.flush().context("Failed to flush JSON writer")?;

    Ok(())
}

/// Quote a CSV field when it contains a delimiter, quote or newline
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Export officer performance rows to CSV
///
/// CSV columns: Officer ID, Name, Username, Email, Farmers, Farms, Crops,
/// Livestock, Allied. Rows keep their input order.
pub fn export_officer_performance_to_csv(rows: &[OfficerPerformance], path: &Path) -> Result<()> {
    let mut writer = create_file(path)?;

    writeln!(
        writer,
        "Officer ID,Name,Username,Email,Farmers,Farms,Crops,Livestock,Allied"
    )
    .context("Failed to write CSV header")?;

    for row in rows {
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{},{}",
            csv_field(row.officer.id.as_str()),
            csv_field(&row.officer.name),
            csv_field(&row.officer.username),
            csv_field(&row.officer.email),
            row.farmers,
            row.farms,
            row.crops,
            row.livestock,
            row.allied
        )
        .with_context(|| format!("Failed to write row for officer {}", row.officer.id))?;
    }

    writer.flush().context("Failed to flush CSV writer")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MonthCount, OfficerIdentity, Section};
    use tempfile::TempDir;

    fn row(id: &str, name: &str, farms: u64) -> OfficerPerformance {
        OfficerPerformance {
            officer: OfficerIdentity {
                id: id.into(),
                name: name.to_string(),
                username: id.to_string(),
                email: format!("{}@example.com", id),
            },
            farmers: 1,
            farms,
            crops: 0,
            livestock: 2,
            allied: 0,
        }
    }

    #[test]
    fn test_export_officer_performance_csv() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/performance.csv");

        let rows = vec![row("o1", "Ade Bello", 3), row("o2", "Okafor, Chika", 0)];
        export_officer_performance_to_csv(&rows, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Officer ID,Name,Username,Email,Farmers,Farms,Crops,Livestock,Allied"
        );
        assert_eq!(lines[1], "o1,Ade Bello,o1,o1@example.com,1,3,0,2,0");
        assert!(lines[2].starts_with("o2,\"Okafor, Chika\","));
    }

    #[test]
    fn test_export_report_json_keeps_failed_marker() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.json");

        let sections: Vec<Section<Vec<MonthCount>>> = vec![
            Section::Ready(vec![MonthCount { month: 3, value: 1 }]),
            Section::failed("monthlyLivestock", "global", "store unavailable"),
        ];
        export_report_to_json(&sections, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0][0]["month"], 3);
        assert_eq!(value[1]["failed"]["section"], "monthlyLivestock");
    }

    #[test]
    fn test_csv_field_escaping() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
