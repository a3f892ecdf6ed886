use clap::{Parser, Subcommand};

/// An anonymous feedback form: collects a rating and optional comments, and summarizes the answers.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON configuration of the form: store, wording and ratings.
    /// Without it, the store is looked for in the current directory with the default wording.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (list of values or not specified) If specified, the ratings offered by the form, from the
    /// most negative to the most positive. Overrides the ratings of the configuration.
    #[clap(long, value_parser)]
    pub ratings: Option<Vec<String>>,

    /// (list of values or not specified) If specified, the ratings counted as positive.
    #[clap(long, value_parser)]
    pub positive_ratings: Option<Vec<String>>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard error.
    /// The summary then also lists the count of every stored rating, even outside the scale.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Creates the record store if allowed, and writes the column names.
    Init,
    /// Records one answer.
    Submit {
        /// One of the ratings of the form.
        #[clap(short, long, value_parser)]
        rating: String,
        /// (optional) Free-form comments.
        #[clap(long, value_parser)]
        comments: Option<String>,
    },
    /// Shows the chart and the summary of the answers (the default).
    Summary {
        /// (file path, optional) Summarize this exported file instead of the record store.
        #[clap(short, long, value_parser)]
        input: Option<String>,

        /// (default csv) The type of the input: csv or xlsx.
        #[clap(long, value_parser)]
        input_type: Option<String>,

        /// When using an Excel file, indicates the name of the worksheet to use (default: the first one).
        #[clap(long, value_parser)]
        excel_worksheet_name: Option<String>,

        /// (file path, 'stdout' or empty) If specified, the summary will be written in JSON format to the given
        /// location.
        #[clap(short, long, value_parser)]
        out: Option<String>,

        /// (file path) A reference summary in JSON format. If provided, the program will
        /// check that the computed summary matches the reference.
        #[clap(short, long, value_parser)]
        reference: Option<String>,

        /// Do not list the individual answers.
        #[clap(long, takes_value = false)]
        no_records: bool,
    },
    /// Runs the form interactively on the terminal.
    Page,
}
