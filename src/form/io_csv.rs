// Primitives for reading CSV files.

use std::path::Path;

use log::debug;
use snafu::prelude::*;

use crate::form::io_common::{simplify_file_name, table_to_rows, RawRow};
use crate::form::{FormResult, ReadingCsvSnafu};

/// Reads all the lines of a CSV file, header included.
///
/// Lines may have different lengths.
pub fn read_csv_table(path: &Path) -> csv::Result<Vec<Vec<String>>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut table: Vec<Vec<String>> = Vec::new();
    for line_r in rdr.into_records() {
        let line = line_r?;
        table.push(line.iter().map(|s| s.to_string()).collect());
    }
    Ok(table)
}

/// Reads the first line of a CSV file only, or `None` if the file is empty.
pub fn read_csv_first_line(path: &Path) -> csv::Result<Option<Vec<String>>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    match rdr.into_records().next() {
        Some(line_r) => Ok(Some(line_r?.iter().map(|s| s.to_string()).collect())),
        None => Ok(None),
    }
}

/// Reads an exported CSV file of responses. The first line holds the column names.
pub fn read_csv_file(path: &str) -> FormResult<Vec<RawRow>> {
    let table = read_csv_table(Path::new(path)).context(ReadingCsvSnafu { path })?;
    debug!(
        "read_csv_file: {}: {} line(s)",
        simplify_file_name(path),
        table.len()
    );
    Ok(table_to_rows(&table))
}
