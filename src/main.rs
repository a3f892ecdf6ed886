use clap::Parser;
use log::{debug, info, warn};
use snafu::ErrorCompat;

use std::io::{self, Write};

mod args;
mod form;

use crate::args::{Args, Command};
use crate::form::config_reader::{read_config, FormConfig};
use crate::form::store::CsvRecordStore;
use crate::form::{ErrorKind, FormResult, SummaryOptions};

fn load_config(args: &Args) -> FormResult<FormConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Reading configuration {:?}", path);
            read_config(path)?
        }
        None => FormConfig::default(),
    };
    if let Some(ratings) = &args.ratings {
        config.ratings = Some(ratings.clone());
        // Positive ratings of the configuration may not apply to other ratings.
        if args.positive_ratings.is_none() && config.positive_ratings.is_some() {
            warn!("Ratings overridden: using the default positive ratings");
            config.positive_ratings = None;
        }
    }
    if let Some(positives) = &args.positive_ratings {
        config.positive_ratings = Some(positives.clone());
    }
    debug!("config: {:?}", config);
    Ok(config)
}

fn run(args: &Args) -> FormResult<()> {
    let config = load_config(args)?;
    let mut store = CsvRecordStore::from_config(&config);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let command = args.command.clone().unwrap_or(Command::Summary {
        input: None,
        input_type: None,
        excel_worksheet_name: None,
        out: None,
        reference: None,
        no_records: false,
    });

    let res = match command {
        Command::Init => form::run_init(&mut store, &config, &mut out),
        Command::Submit { rating, comments } => form::run_submit(
            &mut store,
            &config,
            comments.as_deref().unwrap_or(""),
            &rating,
            &mut out,
        ),
        Command::Summary {
            input,
            input_type,
            excel_worksheet_name,
            out: out_path,
            reference,
            no_records,
        } => {
            let opts = SummaryOptions {
                input,
                input_type,
                excel_worksheet_name,
                out: out_path,
                reference,
                show_records: !no_records,
            };
            form::run_summary(&mut store, &config, &opts, &mut out)
        }
        Command::Page => {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            form::run_page(&mut store, &config, &mut input, &mut out)
        }
    };
    // Whatever happened, the output seen so far should reach the user.
    let _ = out.flush();
    res
}

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    debug!("args: {:?}", args);

    if let Err(e) = run(&args) {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured: {}", e);
        if e.kind() == ErrorKind::Connection {
            eprintln!("Check the storeDirectory and storeName settings, or run the init command.");
        }
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
