// Plain-text rendering of the page.

use std::io::{Result, Write};

use feedback_tally::{FrequencyTable, RatingTaxonomy, Summary};

use crate::form::config_reader::FormConfig;
use crate::form::io_common::RawRow;

const BAR_WIDTH: u64 = 40;
const MAX_CELL_WIDTH: usize = 60;

pub fn render_header<W: Write>(out: &mut W, config: &FormConfig) -> Result<()> {
    writeln!(out, "## {}", config.title())?;
    writeln!(out, "{}", config.intro())?;
    writeln!(out)
}

pub fn render_banner<W: Write>(out: &mut W, message: &str) -> Result<()> {
    writeln!(out, "!! {}", message)?;
    writeln!(out)
}

pub fn render_empty<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "No feedback yet.")?;
    writeln!(out)
}

fn bar_length(count: u64, max_count: u64) -> usize {
    if count == 0 || max_count == 0 {
        0
    } else {
        // Round to the closest, but never hide a non-zero count.
        (((count * BAR_WIDTH) + max_count / 2) / max_count).max(1) as usize
    }
}

/// One bar per rating, in the order of the scale.
pub fn render_chart<W: Write>(out: &mut W, table: &FrequencyTable) -> Result<()> {
    writeln!(out, "### Feedback Summary:")?;
    let label_width = table
        .entries()
        .iter()
        .map(|(l, _)| l.chars().count())
        .max()
        .unwrap_or(0);
    let max_count = table.max_count();
    for (label, count) in table.entries() {
        let bar = "#".repeat(bar_length(*count, max_count));
        writeln!(
            out,
            "{:<lw$} | {:<bw$} {}",
            label,
            bar,
            count,
            lw = label_width,
            bw = BAR_WIDTH as usize
        )?;
    }
    writeln!(out)
}

pub fn render_summary<W: Write>(out: &mut W, summary: &Summary, excluded: u64) -> Result<()> {
    writeln!(out, "Total Responses: {}", summary.total)?;
    writeln!(
        out,
        "Positive Responses: {} ({:.1}%)",
        summary.positive_count, summary.positive_percentage
    )?;
    if excluded > 0 {
        writeln!(out, "Responses without a current rating: {}", excluded)?;
    }
    writeln!(out)
}

fn cell_text(s: &str) -> String {
    let flat: String = s
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    if flat.chars().count() > MAX_CELL_WIDTH {
        let mut short: String = flat.chars().take(MAX_CELL_WIDTH - 3).collect();
        short.push_str("...");
        short
    } else {
        flat
    }
}

/// The raw records, one line each, aligned on the given columns.
pub fn render_records<W: Write>(out: &mut W, columns: &[String], rows: &[RawRow]) -> Result<()> {
    writeln!(out, "Detailed Feedback:")?;
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            columns
                .iter()
                .map(|c| cell_text(r.get(c).map(|s| s.as_str()).unwrap_or("")))
                .collect()
        })
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(idx, c)| {
            cells
                .iter()
                .map(|line| line[idx].chars().count())
                .chain(std::iter::once(c.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_line = |line: &[String]| -> String {
        line.iter()
            .zip(widths.iter())
            .map(|(s, w)| format!("{:<w$}", s, w = *w))
            .collect::<Vec<String>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", format_line(columns))?;
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    writeln!(out, "{}", separator.join("-+-"))?;
    for line in cells.iter() {
        writeln!(out, "{}", format_line(line))?;
    }
    writeln!(out)
}

/// Asks for the comments. Comments kept from a failed submission are shown and
/// reused when the answer is empty.
pub fn render_comments_prompt<W: Write>(
    out: &mut W,
    config: &FormConfig,
    preserved: Option<&str>,
) -> Result<()> {
    writeln!(out, "{}", config.comments_prompt())?;
    match preserved {
        Some(p) => writeln!(out, "  (press Enter to keep: {})", p),
        None => writeln!(out, "  ({})", config.comments_placeholder()),
    }
}

pub fn render_rating_prompt<W: Write>(
    out: &mut W,
    config: &FormConfig,
    taxonomy: &RatingTaxonomy,
) -> Result<()> {
    writeln!(out, "{}", config.rating_prompt())?;
    for (idx, label) in taxonomy.labels().iter().enumerate() {
        writeln!(out, "  {}) {}", idx + 1, label)?;
    }
    writeln!(out, "[{}]", config.submit_label())
}
