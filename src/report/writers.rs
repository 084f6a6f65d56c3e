//! File output for report tables.
//!
//! Tables are written as CSV (header plus string records, empty strings for
//! absent cells) or as pretty-printed JSON. Every write emits one
//! `report.written` event.
use crate::report::errors::{ReportError, ReportResult};
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};
use tracing::info;

/// Write `header` and `records` as CSV to any writer.
pub fn write_csv_records<W: Write>(
    writer: W, header: &[String], records: &[Vec<String>],
) -> ReportResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(header)?;
    for record in records {
        wtr.write_record(record)?;
    }
    wtr.flush().map_err(|e| ReportError::Csv { reason: e.to_string() })?;
    Ok(())
}

/// Write a CSV table to `path`, creating parent directories.
pub fn write_csv_file(path: &Path, header: &[String], records: &[Vec<String>]) -> ReportResult<()> {
    let file = create(path)?;
    write_csv_records(BufWriter::new(file), header, records)?;
    info!(path = %path.display(), rows = records.len(), format = "csv", "report.written");
    Ok(())
}

/// Write `value` as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> ReportResult<()> {
    let file = create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush().map_err(|e| io_error(path, e))?;
    info!(path = %path.display(), format = "json", "report.written");
    Ok(())
}

/// Cell text for an optional number; absent values are empty.
pub fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn create(path: &Path) -> ReportResult<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    File::create(path).map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, err: std::io::Error) -> ReportError {
    ReportError::Io { path: path.display().to_string(), reason: err.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_records_keep_empty_cells_empty() {
        let mut buf = Vec::new();
        let header = vec!["a".to_string(), "b".to_string()];
        let records = vec![vec![cell(Some(1.5)), cell(None)]];
        write_csv_records(&mut buf, &header, &records).expect("csv");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "a,b\n1.5,\n");
    }

    #[test]
    fn json_file_is_created_with_parents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out").join("v.json");
        write_json_file(&path, &vec![1, 2]).expect("json");
        let text = fs::read_to_string(&path).expect("read");
        assert_eq!(serde_json::from_str::<Vec<i32>>(&text).expect("parse"), vec![1, 2]);
    }
}
