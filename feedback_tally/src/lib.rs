mod config;
use log::{debug, info};

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    ops::{Add, AddAssign},
};

pub use crate::config::*;

pub mod builder;
pub mod manual;

// **** Private structures ****

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct RatingCount(u64);

impl RatingCount {
    const EMPTY: RatingCount = RatingCount(0);
    const ONE: RatingCount = RatingCount(1);
}

impl std::iter::Sum for RatingCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        RatingCount(iter.map(|rc| rc.0).sum())
    }
}

impl AddAssign for RatingCount {
    fn add_assign(&mut self, rhs: RatingCount) {
        self.0 += rhs.0;
    }
}

impl Add for RatingCount {
    type Output = RatingCount;
    fn add(self: RatingCount, rhs: RatingCount) -> RatingCount {
        RatingCount(self.0 + rhs.0)
    }
}

// What a stored rating means for a given scale.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum RatingChoice<'a> {
    Blank,
    Unknown(&'a str),
    Filled(usize),
}

fn classify<'a>(record: &'a FeedbackRecord, taxonomy: &RatingTaxonomy) -> RatingChoice<'a> {
    match record.rating_label() {
        None => RatingChoice::Blank,
        Some(s) => match taxonomy.position(s) {
            Some(idx) => RatingChoice::Filled(idx),
            None => RatingChoice::Unknown(s),
        },
    }
}

/// Counts the ratings of the records against the given scale.
///
/// The result has one entry per label of `taxonomy`, in the same order, with a count
/// of zero for the labels that nobody selected. Records with a blank, missing or
/// unknown rating are left out of the table: historical data written before a change
/// of wording is expected and is not an error.
///
/// ```
/// use feedback_tally::*;
///
/// let taxonomy = RatingTaxonomy::new(&["No".to_string(), "Yes".to_string()])?;
/// let records = vec![FeedbackRecord {
///     timestamp: None,
///     comments: "".to_string(),
///     rating: Some("Yes".to_string()),
/// }];
/// let table = build_frequency_table(&records, &taxonomy);
/// assert_eq!(table.count("No"), Some(0));
/// assert_eq!(table.count("Yes"), Some(1));
/// # Ok::<(), TallyErrors>(())
/// ```
pub fn build_frequency_table(
    records: &[FeedbackRecord],
    taxonomy: &RatingTaxonomy,
) -> FrequencyTable {
    let mut tally: Vec<RatingCount> = vec![RatingCount::EMPTY; taxonomy.len()];
    for r in records.iter() {
        if let RatingChoice::Filled(idx) = classify(r, taxonomy) {
            tally[idx] += RatingCount::ONE;
        }
    }
    FrequencyTable {
        entries: taxonomy
            .labels()
            .iter()
            .zip(tally.iter())
            .map(|(label, rc)| (label.clone(), rc.0))
            .collect(),
    }
}

/// Computes the headline numbers of the summary page.
///
/// `total` counts every submission, valid rating or not, while `positive_count` only
/// counts the records whose rating is one of `positive_labels`.
pub fn summarize(records: &[FeedbackRecord], positive_labels: &[String]) -> Summary {
    let positives: HashSet<&str> = positive_labels.iter().map(|s| s.as_str()).collect();
    let total = RatingCount(records.len() as u64);
    let positive_count: RatingCount = records
        .iter()
        .filter(|r| matches!(r.rating_label(), Some(s) if positives.contains(s)))
        .map(|_| RatingCount::ONE)
        .sum();
    Summary {
        total: total.0,
        positive_count: positive_count.0,
        positive_percentage: percentage(positive_count, total),
    }
}

fn percentage(part: RatingCount, total: RatingCount) -> f64 {
    if total == RatingCount::EMPTY {
        0.0
    } else {
        (part.0 as f64) * 100.0 / (total.0 as f64)
    }
}

/// Builds the frequency table and the summary in one pass over the same snapshot.
///
/// Arguments:
/// * `records` the snapshot of all the stored submissions
/// * `taxonomy` the scale of ratings for this deployment
/// * `positive_labels` the ratings that count as favorable. They must all belong to `taxonomy`.
pub fn run_feedback_stats(
    records: &[FeedbackRecord],
    taxonomy: &RatingTaxonomy,
    positive_labels: &[String],
) -> Result<FeedbackReport, TallyErrors> {
    info!(
        "Processing {:?} records, ratings: {:?}, positive: {:?}",
        records.len(),
        taxonomy.labels(),
        positive_labels
    );
    for label in positive_labels {
        if !taxonomy.contains(label) {
            return Err(TallyErrors::UnknownPositiveLabel(label.clone()));
        }
    }

    let table = build_frequency_table(records, taxonomy);
    let summary = summarize(records, positive_labels);

    let excluded = summary.total - table.counted();
    if excluded > 0 {
        let mut skipped: BTreeMap<&str, RatingCount> = BTreeMap::new();
        for r in records.iter() {
            let key = match classify(r, taxonomy) {
                RatingChoice::Filled(_) => continue,
                RatingChoice::Blank => "",
                RatingChoice::Unknown(s) => s,
            };
            *skipped.entry(key).or_insert(RatingCount::EMPTY) += RatingCount::ONE;
        }
        for (rating, count) in skipped.iter() {
            debug!(
                "run_feedback_stats: not counted: rating {:?}: {} record(s)",
                rating, count.0
            );
        }
    }

    for (label, count) in table.entries() {
        info!("{:>8} {}", count, label);
    }
    info!(
        "Total: {} positive: {} ({:.1}%) excluded: {}",
        summary.total, summary.positive_count, summary.positive_percentage, excluded
    );

    Ok(FeedbackReport {
        table,
        summary,
        excluded,
    })
}

/// Number of records per distinct stored rating, including the ones outside the scale.
///
/// Useful to find out which labels an older deployment used.
pub fn raw_rating_counts(records: &[FeedbackRecord]) -> Vec<(String, u64)> {
    let mut counts: HashMap<String, RatingCount> = HashMap::new();
    for r in records.iter() {
        let key = r.rating.clone().unwrap_or_default();
        *counts.entry(key).or_insert(RatingCount::EMPTY) += RatingCount::ONE;
    }
    let mut res: Vec<(String, u64)> = counts.into_iter().map(|(k, v)| (k, v.0)).collect();
    res.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    res
}
