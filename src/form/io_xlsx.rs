// Reading responses exported as an Excel workbook.

use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::debug;
use snafu::prelude::*;

use crate::form::io_common::{simplify_file_name, table_to_rows, RawRow};
use crate::form::*;

/// Reads the rows of an exported spreadsheet. The first row holds the column names.
///
/// The first worksheet is used unless a name is given.
pub fn read_xlsx_rows(path: &str, worksheet: Option<String>) -> FormResult<Vec<RawRow>> {
    let wrange = get_range(path, worksheet)?;
    let table: Vec<Vec<String>> = wrange
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();
    debug!(
        "read_xlsx_rows: {}: {} row(s)",
        simplify_file_name(path),
        table.len()
    );
    Ok(table_to_rows(&table))
}

pub(crate) fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Empty => String::new(),
        // Ratings typed as numbers come back as floats.
        DataType::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Bool(b) => b.to_string(),
        other => {
            debug!("cell_to_string: unexpected cell {:?}", other);
            String::new()
        }
    }
}

fn get_range(path: &str, worksheet: Option<String>) -> FormResult<calamine::Range<DataType>> {
    debug!("get_range: path: {:?} worksheet: {:?}", path, &worksheet);
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    match worksheet {
        // A worksheet name was provided, use it.
        Some(name) => workbook
            .worksheet_range(&name)
            .context(MissingWorksheetSnafu {
                name: name.clone(),
                path,
            })?
            .context(OpeningExcelSnafu { path }),
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path }),
    }
}
