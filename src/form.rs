use log::{debug, info, warn};

use feedback_tally::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::io::{BufRead, Write};

use chrono::{DateTime, Utc};
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_xlsx;
pub mod render;
pub mod store;

use crate::form::config_reader::*;
use crate::form::io_common::{rows_to_records, record_to_row, RawRow};
use crate::form::store::{RecordStore, StoreHandle, StoreOperation};

pub const CONNECTION_BANNER: &str =
    "Unable to connect to the record store. Please check your configuration.";
pub const READ_NOTICE: &str = "Unable to load the existing feedback right now.";
pub const SUCCESS_MESSAGE: &str = "Your feedback has been recorded. Thank you!";
pub const FAILURE_MESSAGE: &str = "Failed to save feedback. Please try again later.";

#[derive(Debug, Snafu)]
pub enum FormError {
    #[snafu(display("Cannot find the record store {store_name} at {path}"))]
    MissingStore { store_name: String, path: String },
    #[snafu(display("Error opening the record store {store_name} at {path}"))]
    OpeningStore {
        store_name: String,
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("The record store {store_name} is not available ({operation:?})"))]
    StoreUnavailable {
        store_name: String,
        operation: StoreOperation,
    },
    #[snafu(display("Error reading the records of {store_name}"))]
    ReadingStore {
        store_name: String,
        source: csv::Error,
    },
    #[snafu(display("Error writing a record to {store_name}"))]
    WritingStore {
        store_name: String,
        source: csv::Error,
    },
    #[snafu(display("Error appending to the record store {store_name}"))]
    AppendingStore {
        store_name: String,
        source: std::io::Error,
    },
    #[snafu(display("Error reading file {path}"))]
    ReadingCsv { path: String, source: csv::Error },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Cannot find the worksheet {name} in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON content"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Invalid rating configuration: {source}"))]
    InvalidTaxonomy { source: TallyErrors },
    #[snafu(display("No rating is configured"))]
    EmptyTaxonomy {},
    #[snafu(display("A rating label is blank: {ratings:?}"))]
    BlankRating { ratings: Vec<String> },
    #[snafu(display("Invalid rating {rating:?}, expected one of {choices:?}"))]
    InvalidRating {
        rating: String,
        choices: Vec<String>,
    },
    #[snafu(display("Unknown input type {input_type:?}"))]
    UnknownInputType { input_type: String },
    #[snafu(display("Error reading the answers"))]
    ReadingInput { source: std::io::Error },
    #[snafu(display("Error writing the output"))]
    WritingOutput { source: std::io::Error },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        path: String,
        source: std::io::Error,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type FormResult<T> = Result<T, FormError>;

/// How a failure is handled at the boundary with the user.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ErrorKind {
    /// The store cannot be reached. The page shows no data and a banner.
    Connection,
    /// Existing records cannot be fetched. The page proceeds with no data.
    Read,
    /// A submission was not saved. The user may submit again.
    Write,
    Config,
    Input,
    Output,
    Other,
}

impl FormError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FormError::MissingStore { .. } | FormError::OpeningStore { .. } => {
                ErrorKind::Connection
            }
            FormError::StoreUnavailable { operation, .. } => match operation {
                StoreOperation::Open => ErrorKind::Connection,
                StoreOperation::Read => ErrorKind::Read,
                StoreOperation::Write => ErrorKind::Write,
            },
            FormError::ReadingStore { .. }
            | FormError::ReadingCsv { .. }
            | FormError::OpeningExcel { .. }
            | FormError::EmptyExcel { .. }
            | FormError::MissingWorksheet { .. } => ErrorKind::Read,
            FormError::WritingStore { .. } | FormError::AppendingStore { .. } => ErrorKind::Write,
            FormError::OpeningJson { .. }
            | FormError::ParsingJson { .. }
            | FormError::InvalidTaxonomy { .. }
            | FormError::EmptyTaxonomy {}
            | FormError::BlankRating { .. }
            | FormError::UnknownInputType { .. } => ErrorKind::Config,
            FormError::InvalidRating { .. } | FormError::ReadingInput { .. } => ErrorKind::Input,
            FormError::WritingOutput { .. } | FormError::WritingFile { .. } => ErrorKind::Output,
            FormError::Whatever { .. } => ErrorKind::Other,
        }
    }
}

/// The data behind one rendering of the page.
///
/// Loading a snapshot never fails: errors are turned into an empty data set and
/// a message for the user.
pub struct Snapshot {
    /// Present when the store could be opened. Submissions go through it.
    pub handle: Option<StoreHandle>,
    pub rows: Vec<RawRow>,
    pub records: Vec<FeedbackRecord>,
    pub banner: Option<String>,
    pub notice: Option<String>,
}

/// Opens the configured store and makes sure its first row holds the column names.
pub fn open_store<S: RecordStore>(store: &mut S, config: &FormConfig) -> FormResult<StoreHandle> {
    let mut handle = store.open(config.store_name())?;
    store.ensure_header(&mut handle, &config.columns().header())?;
    debug!(
        "open_store: {} opened at {} with header {:?}",
        handle.name(),
        handle.location().display(),
        handle.header()
    );
    Ok(handle)
}

pub fn load_snapshot<S: RecordStore>(store: &mut S, config: &FormConfig) -> Snapshot {
    let handle = match open_store(store, config) {
        Ok(h) => h,
        Err(e) => {
            warn!("load_snapshot: cannot open {}: {}", config.store_name(), e);
            return Snapshot {
                handle: None,
                rows: Vec::new(),
                records: Vec::new(),
                banner: Some(CONNECTION_BANNER.to_string()),
                notice: None,
            };
        }
    };
    match store.read_all_rows(&handle) {
        Ok(rows) => {
            let records = rows_to_records(&rows, &config.columns());
            info!(
                "load_snapshot: read {} records from {}",
                records.len(),
                handle.name()
            );
            Snapshot {
                handle: Some(handle),
                rows,
                records,
                banner: None,
                notice: None,
            }
        }
        Err(e) => {
            warn!("load_snapshot: cannot read {}: {}", handle.name(), e);
            Snapshot {
                handle: Some(handle),
                rows: Vec::new(),
                records: Vec::new(),
                banner: None,
                notice: Some(READ_NOTICE.to_string()),
            }
        }
    }
}

/// Records one submission.
///
/// The rating must be part of the scale. The row is written once: a failed write is
/// reported to the caller and never retried here.
pub fn submit_feedback<S: RecordStore>(
    store: &mut S,
    handle: &StoreHandle,
    config: &FormConfig,
    taxonomy: &RatingTaxonomy,
    comments: &str,
    rating: &str,
    timestamp: DateTime<Utc>,
) -> FormResult<FeedbackRecord> {
    ensure!(
        taxonomy.contains(rating),
        InvalidRatingSnafu {
            rating,
            choices: taxonomy.labels().to_vec(),
        }
    );
    let record = FeedbackRecord::new(timestamp, comments, rating);
    let values = record_to_row(&record, handle.header(), &config.columns());
    store.append_row(handle, &values)?;
    info!(
        "submit_feedback: recorded a {:?} rating in {}",
        rating,
        handle.name()
    );
    Ok(record)
}

pub fn build_summary_js(config: &FormConfig, report: &FeedbackReport) -> JSValue {
    let tally: Vec<JSValue> = report
        .table
        .entries()
        .iter()
        .map(|(rating, count)| json!({"rating": rating, "count": count}))
        .collect();
    json!({
        "config": {
            "title": config.title(),
            "store": config.store_name(),
            "positiveRatings": config.positive_labels(),
        },
        "results": {
            "total": report.summary.total,
            "positiveCount": report.summary.positive_count,
            "positivePercentage": report.summary.positive_percentage,
            "excluded": report.excluded,
            "tally": tally,
        }
    })
}

fn tally_snapshot(
    config: &FormConfig,
    taxonomy: &RatingTaxonomy,
    records: &[FeedbackRecord],
) -> FormResult<FeedbackReport> {
    run_feedback_stats(records, taxonomy, &config.positive_labels()).context(InvalidTaxonomySnafu {})
}

fn render_results<W: Write>(
    out: &mut W,
    config: &FormConfig,
    rows: &[RawRow],
    report: &FeedbackReport,
    show_records: bool,
) -> std::io::Result<()> {
    if report.summary.total == 0 {
        return render::render_empty(out);
    }
    render::render_chart(out, &report.table)?;
    render::render_summary(out, &report.summary, report.excluded)?;
    if show_records {
        render::render_records(out, &config.columns().header(), rows)?;
    }
    Ok(())
}

fn render_page<W: Write>(
    out: &mut W,
    config: &FormConfig,
    snapshot: &Snapshot,
    report: &FeedbackReport,
) -> FormResult<()> {
    render::render_header(out, config).context(WritingOutputSnafu {})?;
    if let Some(b) = &snapshot.banner {
        render::render_banner(out, b).context(WritingOutputSnafu {})?;
    }
    if let Some(n) = &snapshot.notice {
        render::render_banner(out, n).context(WritingOutputSnafu {})?;
    }
    render_results(out, config, &snapshot.rows, report, true).context(WritingOutputSnafu {})
}

fn read_answer<R: BufRead>(input: &mut R) -> FormResult<Option<String>> {
    let mut line = String::new();
    let n = input.read_line(&mut line).context(ReadingInputSnafu {})?;
    if n == 0 {
        Ok(None)
    } else {
        Ok(Some(
            line.trim_end_matches(|c| c == '\n' || c == '\r').to_string(),
        ))
    }
}

/// Reads a rating either by its number in the list (starting at 1) or by its label.
fn parse_choice(taxonomy: &RatingTaxonomy, answer: &str) -> Option<String> {
    let answer = answer.trim();
    if let Ok(n) = answer.parse::<usize>() {
        if n >= 1 {
            return taxonomy.label_at(n - 1).map(|s| s.to_string());
        }
        return None;
    }
    if taxonomy.contains(answer) {
        Some(answer.to_string())
    } else {
        None
    }
}

/// Runs the form interactively until the input is exhausted.
///
/// Every iteration renders the page from a fresh snapshot, asks for the comments and
/// the rating, and submits them. When a submission fails, the comments are kept and
/// offered again with the next form.
pub fn run_page<S: RecordStore, R: BufRead, W: Write>(
    store: &mut S,
    config: &FormConfig,
    input: &mut R,
    out: &mut W,
) -> FormResult<()> {
    let taxonomy = config.validate()?;
    let mut preserved: Option<String> = None;
    loop {
        let snapshot = load_snapshot(store, config);
        let report = tally_snapshot(config, &taxonomy, &snapshot.records)?;
        render_page(out, config, &snapshot, &report)?;

        let handle = match snapshot.handle {
            Some(h) => h,
            // Nothing can be submitted without a store.
            None => return Ok(()),
        };

        render::render_comments_prompt(out, config, preserved.as_deref())
            .context(WritingOutputSnafu {})?;
        let comments = match read_answer(input)? {
            Some(s) if s.is_empty() => preserved.take().unwrap_or_default(),
            Some(s) => s,
            None => {
                store.close(handle);
                return Ok(());
            }
        };

        let rating = loop {
            render::render_rating_prompt(out, config, &taxonomy).context(WritingOutputSnafu {})?;
            match read_answer(input)? {
                Some(answer) => match parse_choice(&taxonomy, &answer) {
                    Some(r) => break r,
                    None => {
                        writeln!(out, "Please pick one of the ratings.")
                            .context(WritingOutputSnafu {})?;
                    }
                },
                None => {
                    store.close(handle);
                    return Ok(());
                }
            }
        };

        match submit_feedback(
            store,
            &handle,
            config,
            &taxonomy,
            &comments,
            &rating,
            Utc::now(),
        ) {
            Ok(_) => {
                render::render_banner(out, SUCCESS_MESSAGE).context(WritingOutputSnafu {})?;
                preserved = None;
            }
            Err(e) if e.kind() == ErrorKind::Write => {
                warn!("run_page: submission failed: {}", e);
                render::render_banner(out, FAILURE_MESSAGE).context(WritingOutputSnafu {})?;
                preserved = Some(comments);
            }
            Err(e) => {
                store.close(handle);
                return Err(e);
            }
        }
        store.close(handle);
    }
}

/// Records a single submission from the command line.
pub fn run_submit<S: RecordStore, W: Write>(
    store: &mut S,
    config: &FormConfig,
    comments: &str,
    rating: &str,
    out: &mut W,
) -> FormResult<()> {
    let taxonomy = config.validate()?;
    let handle = open_store(store, config)?;
    let res = submit_feedback(
        store,
        &handle,
        config,
        &taxonomy,
        comments,
        rating,
        Utc::now(),
    );
    store.close(handle);
    match res {
        Ok(_) => writeln!(out, "{}", SUCCESS_MESSAGE).context(WritingOutputSnafu {}),
        Err(e) if e.kind() == ErrorKind::Write => {
            writeln!(out, "{}", FAILURE_MESSAGE).context(WritingOutputSnafu {})?;
            writeln!(out, "Your comments were not lost:\n{}", comments)
                .context(WritingOutputSnafu {})?;
            Err(e)
        }
        Err(e) => Err(e),
    }
}

/// Creates the store if the configuration allows it and writes the column names.
pub fn run_init<S: RecordStore, W: Write>(
    store: &mut S,
    config: &FormConfig,
    out: &mut W,
) -> FormResult<()> {
    config.validate()?;
    let handle = open_store(store, config)?;
    writeln!(
        out,
        "Record store {} is ready with columns {:?}",
        handle.name(),
        handle.header()
    )
    .context(WritingOutputSnafu {})?;
    store.close(handle);
    Ok(())
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct SummaryOptions {
    /// Summarize this file instead of the configured store.
    pub input: Option<String>,
    pub input_type: Option<String>,
    pub excel_worksheet_name: Option<String>,
    /// Where to write the JSON summary: a path or `stdout`.
    pub out: Option<String>,
    /// A JSON summary to compare the result with.
    pub reference: Option<String>,
    pub show_records: bool,
}

fn read_input_rows(opts: &SummaryOptions, path: &str) -> FormResult<Vec<RawRow>> {
    info!("Attempting to read feedback file {:?}", path);
    match opts.input_type.as_deref().unwrap_or("csv") {
        "csv" => io_csv::read_csv_file(path),
        "xlsx" => io_xlsx::read_xlsx_rows(path, opts.excel_worksheet_name.clone()),
        x => UnknownInputTypeSnafu { input_type: x }.fail(),
    }
}

/// Shows the chart and the summary of all the feedback collected so far.
pub fn run_summary<S: RecordStore, W: Write>(
    store: &mut S,
    config: &FormConfig,
    opts: &SummaryOptions,
    out: &mut W,
) -> FormResult<()> {
    let taxonomy = config.validate()?;

    let snapshot = match &opts.input {
        Some(path) => {
            let rows = read_input_rows(opts, path)?;
            let records = rows_to_records(&rows, &config.columns());
            Snapshot {
                handle: None,
                rows,
                records,
                banner: None,
                notice: None,
            }
        }
        None => {
            let mut s = load_snapshot(store, config);
            if let Some(h) = s.handle.take() {
                store.close(h);
            }
            s
        }
    };

    let report = tally_snapshot(config, &taxonomy, &snapshot.records)?;
    // With --verbose, shows the labels actually stored, including the ones of older scales.
    for (rating, count) in raw_rating_counts(&snapshot.records) {
        debug!("run_summary: stored rating {:?}: {}", rating, count);
    }

    render::render_header(out, config).context(WritingOutputSnafu {})?;
    for m in snapshot.banner.iter().chain(snapshot.notice.iter()) {
        render::render_banner(out, m).context(WritingOutputSnafu {})?;
    }
    render_results(out, config, &snapshot.rows, &report, opts.show_records)
        .context(WritingOutputSnafu {})?;

    let result_js = build_summary_js(config, &report);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    match opts.out.as_deref() {
        None => {}
        Some("stdout") => {
            writeln!(out, "{}", pretty_js_stats).context(WritingOutputSnafu {})?;
        }
        Some(path) => {
            info!("Writing summary to {:?}", path);
            fs::write(path, &pretty_js_stats).context(WritingFileSnafu { path })?;
        }
    }

    // The reference summary, if provided for comparison
    if let Some(reference_p) = &opts.reference {
        let summary_ref = read_reference(reference_p)?;
        debug!("reference summary: {:?}", summary_ref);
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::store::memory::MemoryRecordStore;
    use crate::form::store::CsvRecordStore;
    use chrono::TimeZone;
    use std::io::Cursor;

    fn config() -> FormConfig {
        FormConfig {
            store_name: Some("feedback".to_string()),
            ..FormConfig::default()
        }
    }

    fn stored(rows: &[[&str; 3]]) -> MemoryRecordStore {
        let mut table: Vec<Vec<String>> = vec![vec![
            "Timestamp".to_string(),
            "Comments".to_string(),
            "Rating".to_string(),
        ]];
        for r in rows {
            table.push(r.iter().map(|s| s.to_string()).collect());
        }
        MemoryRecordStore::new(false).with_table("feedback", table)
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn snapshot_of_existing_records() {
        let mut store = stored(&[
            ["2024-01-02T10:00:00Z", "ok", "Sure"],
            ["", "", ""],
            ["", "old", "Maybe"],
        ]);
        let snapshot = load_snapshot(&mut store, &config());
        assert!(snapshot.banner.is_none());
        assert_eq!(snapshot.records.len(), 3);
        let report =
            tally_snapshot(&config(), &config().validate().unwrap(), &snapshot.records).unwrap();
        assert_eq!(report.table.count("Sure"), Some(1));
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.excluded, 2);
    }

    #[test]
    fn connection_error_gives_empty_page_with_banner() {
        let mut store = MemoryRecordStore::new(false);
        let snapshot = load_snapshot(&mut store, &config());
        assert!(snapshot.handle.is_none());
        assert!(snapshot.records.is_empty());
        assert_eq!(snapshot.banner.as_deref(), Some(CONNECTION_BANNER));
    }

    #[test]
    fn read_error_degrades_to_empty_data() {
        let mut store = stored(&[["", "x", "Sure"]]);
        store.fail_reads = true;
        let snapshot = load_snapshot(&mut store, &config());
        assert!(snapshot.handle.is_some());
        assert!(snapshot.records.is_empty());
        assert!(snapshot.banner.is_none());
        assert_eq!(snapshot.notice.as_deref(), Some(READ_NOTICE));
    }

    #[test]
    fn submit_appends_one_row_in_header_order() {
        let mut store = stored(&[]);
        let cfg = config();
        let tax = cfg.validate().unwrap();
        let handle = open_store(&mut store, &cfg).unwrap();
        let ts = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let record =
            submit_feedback(&mut store, &handle, &cfg, &tax, "welcome back", "Definitely", ts)
                .unwrap();
        assert_eq!(record.timestamp, Some(ts));
        let table = store.table("feedback").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table[1],
            vec![
                "2024-05-06T07:08:09Z".to_string(),
                "welcome back".to_string(),
                "Definitely".to_string()
            ]
        );
    }

    #[test]
    fn submit_follows_an_older_header() {
        let mut store = MemoryRecordStore::new(false).with_table(
            "feedback",
            vec![vec!["Comments".to_string(), "Rating".to_string()]],
        );
        let cfg = config();
        let tax = cfg.validate().unwrap();
        let handle = open_store(&mut store, &cfg).unwrap();
        submit_feedback(&mut store, &handle, &cfg, &tax, "hi", "No", Utc::now()).unwrap();
        assert_eq!(
            store.table("feedback").unwrap()[1],
            vec!["hi".to_string(), "No".to_string()]
        );
    }

    #[test]
    fn submit_rejects_unknown_rating() {
        let mut store = stored(&[]);
        let cfg = config();
        let tax = cfg.validate().unwrap();
        let handle = open_store(&mut store, &cfg).unwrap();
        let err = submit_feedback(&mut store, &handle, &cfg, &tax, "", "Maybe", Utc::now())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
        assert_eq!(store.table("feedback").unwrap().len(), 1);
    }

    #[test]
    fn page_submits_and_refreshes() {
        let mut store = stored(&[["", "", "No"]]);
        let mut input = Cursor::new("Glad to see them\n4\n");
        let mut out: Vec<u8> = Vec::new();
        run_page(&mut store, &config(), &mut input, &mut out).unwrap();
        let text = output(out);
        assert!(text.contains(SUCCESS_MESSAGE));
        assert!(text.contains("Total Responses: 2"));
        let table = store.table("feedback").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table[2][1], "Glad to see them");
        assert_eq!(table[2][2], "Sure");
    }

    #[test]
    fn page_asks_again_for_an_invalid_rating() {
        let mut store = stored(&[]);
        let mut input = Cursor::new("\n9\nDefinitely\n");
        let mut out: Vec<u8> = Vec::new();
        run_page(&mut store, &config(), &mut input, &mut out).unwrap();
        assert!(output(out).contains("Please pick one of the ratings."));
        assert_eq!(store.table("feedback").unwrap()[1][2], "Definitely");
    }

    #[test]
    fn page_keeps_comments_after_failed_write() {
        let mut store = stored(&[]);
        store.fail_writes = true;
        let mut input = Cursor::new("please keep me\n2\n");
        let mut out: Vec<u8> = Vec::new();
        run_page(&mut store, &config(), &mut input, &mut out).unwrap();
        let text = output(out);
        assert!(text.contains(FAILURE_MESSAGE));
        assert!(text.contains("please keep me"));
        assert_eq!(store.table("feedback").unwrap().len(), 1);
    }

    #[test]
    fn page_resubmits_preserved_comments() {
        let mut store = stored(&[]);
        store.fail_writes = true;
        store.fail_writes_remaining = Some(1);
        let mut input = Cursor::new("second try\n2\n\n2\n");
        let mut out: Vec<u8> = Vec::new();
        run_page(&mut store, &config(), &mut input, &mut out).unwrap();
        let table = store.table("feedback").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[1][1], "second try");
        assert_eq!(table[1][2], "No");
    }

    #[test]
    fn page_without_store_shows_banner_and_stops() {
        let mut store = MemoryRecordStore::new(false);
        let mut input = Cursor::new("ignored\n1\n");
        let mut out: Vec<u8> = Vec::new();
        run_page(&mut store, &config(), &mut input, &mut out).unwrap();
        let text = output(out);
        assert!(text.contains(CONNECTION_BANNER));
        assert!(text.contains("No feedback yet."));
    }

    #[test]
    fn submit_command_reports_write_failure() {
        let mut store = stored(&[]);
        store.fail_writes = true;
        let mut out: Vec<u8> = Vec::new();
        let err = run_submit(&mut store, &config(), "my text", "Sure", &mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Write);
        let text = output(out);
        assert!(text.contains(FAILURE_MESSAGE));
        assert!(text.contains("my text"));
    }

    #[test]
    fn summary_json() {
        let mut store = stored(&[
            ["", "", "Sure"],
            ["", "", "Sure"],
            ["", "", "Hell No"],
            ["", "", ""],
            ["", "", "Sure"],
        ]);
        let opts = SummaryOptions {
            out: Some("stdout".to_string()),
            ..SummaryOptions::default()
        };
        let mut out: Vec<u8> = Vec::new();
        run_summary(&mut store, &config(), &opts, &mut out).unwrap();
        let text = output(out);
        assert!(text.contains("Positive Responses: 3 (60.0%)"));

        let snapshot = load_snapshot(&mut store, &config());
        let report =
            tally_snapshot(&config(), &config().validate().unwrap(), &snapshot.records).unwrap();
        let js = build_summary_js(&config(), &report);
        assert_eq!(js["results"]["total"], json!(5));
        assert_eq!(js["results"]["positiveCount"], json!(3));
        assert_eq!(js["results"]["positivePercentage"], json!(60.0));
        assert_eq!(js["results"]["excluded"], json!(1));
        assert_eq!(
            js["results"]["tally"][0],
            json!({"rating": "Hell No", "count": 1})
        );
        assert_eq!(
            js["results"]["tally"][3],
            json!({"rating": "Sure", "count": 3})
        );
    }

    #[test]
    fn damaged_row_in_csv_store_keeps_the_form_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut contents: Vec<u8> = b"Timestamp,Comments,Rating\n,ok,Sure\n,".to_vec();
        contents.extend_from_slice(&[0xff, 0xfe]);
        contents.extend_from_slice(b",No\n");
        fs::write(dir.path().join("feedback.csv"), contents).unwrap();
        let mut store = CsvRecordStore::new(dir.path().to_path_buf(), false);
        let snapshot = load_snapshot(&mut store, &config());
        assert!(snapshot.handle.is_some());
        assert!(snapshot.records.is_empty());
        assert!(snapshot.banner.is_none());
        assert_eq!(snapshot.notice.as_deref(), Some(READ_NOTICE));
    }

    fn five_answers() -> MemoryRecordStore {
        stored(&[
            ["", "", "Sure"],
            ["", "", "Sure"],
            ["", "", "Hell No"],
            ["", "", ""],
            ["", "", "Sure"],
        ])
    }

    #[test]
    fn summary_written_to_file_matches_itself_as_reference() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("summary.json").display().to_string();
        let mut store = five_answers();
        let opts = SummaryOptions {
            out: Some(out_path.clone()),
            ..SummaryOptions::default()
        };
        let mut out: Vec<u8> = Vec::new();
        run_summary(&mut store, &config(), &opts, &mut out).unwrap();

        let written = read_reference(&out_path).unwrap();
        assert_eq!(written["config"]["store"], json!("feedback"));
        assert_eq!(written["results"]["total"], json!(5));
        assert_eq!(written["results"]["positivePercentage"], json!(60.0));

        let opts = SummaryOptions {
            reference: Some(out_path),
            ..SummaryOptions::default()
        };
        let mut out: Vec<u8> = Vec::new();
        run_summary(&mut store, &config(), &opts, &mut out).unwrap();
    }

    #[test]
    fn summary_differing_from_reference_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ref_path = dir.path().join("reference.json");
        fs::write(&ref_path, r#"{"results": {"total": 4}}"#).unwrap();
        let mut store = five_answers();
        let opts = SummaryOptions {
            reference: Some(ref_path.display().to_string()),
            ..SummaryOptions::default()
        };
        let mut out: Vec<u8> = Vec::new();
        let err = run_summary(&mut store, &config(), &opts, &mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
    }

    #[test]
    fn summary_of_an_exported_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        fs::write(
            &path,
            "Comments,Rating\nwelcome back,Definitely\n\"no, thanks\",No\n,Sure\n",
        )
        .unwrap();
        // The store is not looked at.
        let mut store = MemoryRecordStore::new(false);
        let opts = SummaryOptions {
            input: Some(path.display().to_string()),
            show_records: true,
            ..SummaryOptions::default()
        };
        let mut out: Vec<u8> = Vec::new();
        run_summary(&mut store, &config(), &opts, &mut out).unwrap();
        let text = output(out);
        assert!(!text.contains(CONNECTION_BANNER));
        assert!(text.contains("Total Responses: 3"));
        assert!(text.contains("Positive Responses: 2 (66.7%)"));
        assert!(text.contains("no, thanks"));
    }

    #[test]
    fn summary_rejects_unknown_input_type() {
        let mut store = stored(&[]);
        let opts = SummaryOptions {
            input: Some("votes.ods".to_string()),
            input_type: Some("ods".to_string()),
            ..SummaryOptions::default()
        };
        let mut out: Vec<u8> = Vec::new();
        let err = run_summary(&mut store, &config(), &opts, &mut out).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn parse_choice_by_number_or_label() {
        let tax = config().validate().unwrap();
        assert_eq!(parse_choice(&tax, "1"), Some("Hell No".to_string()));
        assert_eq!(parse_choice(&tax, " Sure "), Some("Sure".to_string()));
        assert_eq!(parse_choice(&tax, "0"), None);
        assert_eq!(parse_choice(&tax, "6"), None);
        assert_eq!(parse_choice(&tax, "Maybe"), None);
    }
}
