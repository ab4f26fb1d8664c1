//! Load statement exports from disk into a [`RawTable`].

use std::fs;
use std::io;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use kasboek_core::{Bank, CanonicalTransaction, KasboekError, Result};
use tracing::{debug, info};

use crate::normalize::normalize;
use crate::profiles::profile_for;
use crate::types::{FileKind, RawTable};

/// Read, validate and normalize one statement file for `bank`.
pub fn read_statement(path: impl AsRef<Path>, bank: Bank) -> Result<Vec<CanonicalTransaction>> {
    let path = path.as_ref();
    let table = read_table(path)?;
    let profile = profile_for(bank, FileKind::from_path(path)?)?;
    let txns = normalize(&table, &profile)?;
    info!(file = %path.display(), %bank, count = txns.len(), "statement ingested");
    Ok(txns)
}

/// Read a spreadsheet or delimited file; the file kind comes from the extension.
/// A missing path is reported before an unsupported extension.
pub fn read_table(path: impl AsRef<Path>) -> Result<RawTable> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(KasboekError::file_access(
            path,
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
        ));
    }
    let kind = FileKind::from_path(path)?;
    let table = match kind {
        FileKind::Delimited => read_delimited(path)?,
        FileKind::Spreadsheet => read_spreadsheet(path)?,
    };
    debug!(file = %path.display(), ?kind, columns = table.headers.len(), rows = table.len(), "table loaded");
    Ok(table)
}

fn read_delimited(path: &Path) -> Result<RawTable> {
    let text = fs::read_to_string(path).map_err(|e| KasboekError::file_access(path, e))?;
    parse_delimited(&text).map_err(|e| KasboekError::file_access(path, io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Parse delimited text, sniffing `;` vs `,` from the header line.
pub fn parse_delimited(text: &str) -> std::result::Result<RawTable, csv::Error> {
    let text = text.trim_start_matches('\u{feff}');
    let header_line = text.lines().next().unwrap_or("");
    let delimiter = if header_line.matches(';').count() > header_line.matches(',').count() {
        b';'
    } else {
        b','
    };

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(RawTable::new(headers, rows))
}

fn read_spreadsheet(path: &Path) -> Result<RawTable> {
    let corrupt = |e: calamine::Error| {
        KasboekError::file_access(path, io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
    };
    let mut workbook = open_workbook_auto(path).map_err(corrupt)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| KasboekError::UnsupportedFormat(format!("{} has no worksheets", path.display())))?
        .map_err(corrupt)?;

    let mut rows = range.rows().map(|row| row.iter().map(cell_text).collect::<Vec<String>>());
    let headers = rows
        .next()
        .map(|h| h.into_iter().map(|c| c.trim().to_string()).collect())
        .unwrap_or_default();
    let rows = rows.filter(|r| r.iter().any(|c| !c.trim().is_empty())).collect();
    Ok(RawTable::new(headers, rows))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        // 20240302.0 must stay "20240302" so strict date formats still apply
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}
