//! The record store: an append-only table of submissions, addressed by name.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use log::{debug, info, warn};
use snafu::prelude::*;

use crate::form::io_common::{table_to_rows, RawRow};
use crate::form::io_csv::{read_csv_first_line, read_csv_table};
use crate::form::config_reader::FormConfig;
use crate::form::*;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum StoreOperation {
    Open,
    Read,
    Write,
}

/// An opened table of the record store.
///
/// Handles are created by [`RecordStore::open`] and released with [`RecordStore::close`].
/// Nothing else keeps a reference to the underlying resource.
#[derive(Eq, PartialEq, Debug)]
pub struct StoreHandle {
    name: String,
    location: PathBuf,
    header: Vec<String>,
}

impl StoreHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &PathBuf {
        &self.location
    }

    /// The first row of the table, as found when the header was checked.
    pub fn header(&self) -> &[String] {
        &self.header
    }
}

pub trait RecordStore {
    /// Locates the table with the given name.
    fn open(&mut self, store_name: &str) -> FormResult<StoreHandle>;

    /// Writes the column names if the table is empty. Does nothing otherwise.
    fn ensure_header(&mut self, handle: &mut StoreHandle, columns: &[String]) -> FormResult<()>;

    /// Appends one row. Never retried.
    fn append_row(&mut self, handle: &StoreHandle, values: &[String]) -> FormResult<()>;

    /// All the rows after the header.
    fn read_all_rows(&self, handle: &StoreHandle) -> FormResult<Vec<RawRow>>;

    fn close(&mut self, handle: StoreHandle) {
        debug!("close: releasing {}", handle.name);
    }
}

fn check_header(handle: &StoreHandle, columns: &[String]) {
    if handle.header.as_slice() != columns {
        warn!(
            "ensure_header: {} has columns {:?}, expected {:?}. Keeping the existing ones.",
            handle.name, handle.header, columns
        );
    }
}

/// True for an empty file or one whose last byte is a line break.
fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Keeps each table in a `<name>.csv` file of a directory.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CsvRecordStore {
    directory: PathBuf,
    create_if_missing: bool,
}

impl CsvRecordStore {
    pub fn new(directory: PathBuf, create_if_missing: bool) -> CsvRecordStore {
        CsvRecordStore {
            directory,
            create_if_missing,
        }
    }

    pub fn from_config(config: &FormConfig) -> CsvRecordStore {
        CsvRecordStore::new(config.store_directory(), config.create_if_missing())
    }

    fn path_of(&self, store_name: &str) -> PathBuf {
        self.directory.join(format!("{}.csv", store_name))
    }

    fn write_line(&self, handle: &StoreHandle, values: &[String]) -> FormResult<()> {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&handle.location)
            .context(AppendingStoreSnafu {
                store_name: handle.name.clone(),
            })?;
        // Files edited by hand or exported elsewhere may lack the final line break.
        if !ends_with_newline(&mut file).context(AppendingStoreSnafu {
            store_name: handle.name.clone(),
        })? {
            debug!("write_line: completing the last line of {}", handle.name);
            file.write_all(b"\n").context(AppendingStoreSnafu {
                store_name: handle.name.clone(),
            })?;
        }
        let mut wtr = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(file);
        wtr.write_record(values).context(WritingStoreSnafu {
            store_name: handle.name.clone(),
        })?;
        wtr.flush().context(AppendingStoreSnafu {
            store_name: handle.name.clone(),
        })?;
        Ok(())
    }

    fn read_first_line(&self, handle: &StoreHandle) -> FormResult<Option<Vec<String>>> {
        read_csv_first_line(&handle.location).context(ReadingStoreSnafu {
            store_name: handle.name.clone(),
        })
    }

    fn read_table(&self, handle: &StoreHandle) -> FormResult<Vec<Vec<String>>> {
        read_csv_table(&handle.location).context(ReadingStoreSnafu {
            store_name: handle.name.clone(),
        })
    }
}

impl RecordStore for CsvRecordStore {
    fn open(&mut self, store_name: &str) -> FormResult<StoreHandle> {
        let location = self.path_of(store_name);
        let path = location.display().to_string();
        if !location.exists() {
            ensure!(
                self.create_if_missing,
                MissingStoreSnafu { store_name, path }
            );
            fs::create_dir_all(&self.directory).context(OpeningStoreSnafu {
                store_name,
                path: path.clone(),
            })?;
            File::create(&location).context(OpeningStoreSnafu {
                store_name,
                path: path.clone(),
            })?;
            info!("open: created record store {} at {}", store_name, path);
        }
        // Fail early on permissions.
        File::open(&location).context(OpeningStoreSnafu { store_name, path })?;
        Ok(StoreHandle {
            name: store_name.to_string(),
            location,
            header: Vec::new(),
        })
    }

    fn ensure_header(&mut self, handle: &mut StoreHandle, columns: &[String]) -> FormResult<()> {
        // Only the first line: a damaged row further down must not hide the store.
        match self.read_first_line(handle)? {
            Some(first_row) => {
                handle.header = first_row;
                check_header(handle, columns);
            }
            None => {
                info!("ensure_header: writing {:?} to {}", columns, handle.name);
                self.write_line(handle, columns)?;
                handle.header = columns.to_vec();
            }
        }
        Ok(())
    }

    fn append_row(&mut self, handle: &StoreHandle, values: &[String]) -> FormResult<()> {
        self.write_line(handle, values)
    }

    fn read_all_rows(&self, handle: &StoreHandle) -> FormResult<Vec<RawRow>> {
        let table = self.read_table(handle)?;
        Ok(table_to_rows(&table))
    }
}
