use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use feedback_tally::FeedbackRecord;
use log::debug;

use crate::form::config_reader::ColumnNames;

/// A stored row, keyed by column name.
pub type RawRow = HashMap<String, String>;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Associates the cells of a row with the column names.
///
/// Missing trailing cells read as empty strings. Cells past the header are dropped.
pub fn zip_header(header: &[String], cells: &[String]) -> RawRow {
    if cells.len() > header.len() {
        debug!(
            "zip_header: dropping {} cell(s) beyond the header",
            cells.len() - header.len()
        );
    }
    header
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.clone(), cells.get(idx).cloned().unwrap_or_default()))
        .collect()
}

/// Turns a table (header first) into keyed rows.
pub fn table_to_rows(table: &[Vec<String>]) -> Vec<RawRow> {
    match table.split_first() {
        None => Vec::new(),
        Some((header, rest)) => rest.iter().map(|cells| zip_header(header, cells)).collect(),
    }
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Reads RFC 3339 timestamps, and the `2024-01-31 13:45:00` style of spreadsheets (as UTC).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    match NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        Ok(naive) => Some(Utc.from_utc_datetime(&naive)),
        Err(e) => {
            debug!("parse_timestamp: cannot read {:?}: {}", s, e);
            None
        }
    }
}

pub fn row_to_record(row: &RawRow, columns: &ColumnNames) -> FeedbackRecord {
    FeedbackRecord {
        timestamp: row
            .get(&columns.timestamp)
            .and_then(|s| parse_timestamp(s)),
        comments: row.get(&columns.comments).cloned().unwrap_or_default(),
        rating: row.get(&columns.rating).cloned(),
    }
}

pub fn rows_to_records(rows: &[RawRow], columns: &ColumnNames) -> Vec<FeedbackRecord> {
    rows.iter().map(|r| row_to_record(r, columns)).collect()
}

/// The values of a record, in the order of the given header.
///
/// Header columns unknown to the form are left empty.
pub fn record_to_row(record: &FeedbackRecord, header: &[String], columns: &ColumnNames) -> Vec<String> {
    header
        .iter()
        .map(|name| {
            if *name == columns.timestamp {
                record
                    .timestamp
                    .as_ref()
                    .map(format_timestamp)
                    .unwrap_or_default()
            } else if *name == columns.comments {
                record.comments.clone()
            } else if *name == columns.rating {
                record.rating.clone().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .collect()
}
