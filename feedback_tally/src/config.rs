// ********* Input data structures ***********

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;

use chrono::{DateTime, Utc};

/// One feedback submission, as read back from the record store.
///
/// Rows written by older deployments may lack a timestamp or carry a rating that is
/// blank or no longer part of the scale. Such records are still valid input: they
/// are counted as submissions but not as ratings.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct FeedbackRecord {
    pub timestamp: Option<DateTime<Utc>>,
    pub comments: String,
    /// The selected label. `None` if the cell was missing.
    pub rating: Option<String>,
}

impl FeedbackRecord {
    pub fn new(timestamp: DateTime<Utc>, comments: &str, rating: &str) -> FeedbackRecord {
        FeedbackRecord {
            timestamp: Some(timestamp),
            comments: comments.to_string(),
            rating: Some(rating.to_string()),
        }
    }

    /// The rating, if it is present and not blank.
    pub fn rating_label(&self) -> Option<&str> {
        match self.rating.as_deref() {
            Some(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

/// The ordered scale of labels a submitter chooses from, from the most negative
/// to the most positive.
///
/// The labels are not fixed: each deployment provides its own wording.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct RatingTaxonomy {
    labels: Vec<String>,
    positions: HashMap<String, usize>,
}

impl RatingTaxonomy {
    /// Builds a taxonomy. Labels must be distinct.
    ///
    /// An empty list is accepted and yields empty frequency tables.
    pub fn new(labels: &[String]) -> Result<RatingTaxonomy, TallyErrors> {
        let mut positions: HashMap<String, usize> = HashMap::new();
        for (idx, label) in labels.iter().enumerate() {
            if positions.insert(label.clone(), idx).is_some() {
                return Err(TallyErrors::DuplicateLabel(label.clone()));
            }
        }
        Ok(RatingTaxonomy {
            labels: labels.to_vec(),
            positions,
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.positions.contains_key(label)
    }

    /// Position of the label on the scale, starting at 0.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.positions.get(label).cloned()
    }

    pub fn label_at(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(|s| s.as_str())
    }

    /// Checks that a submitted rating is part of the scale.
    pub fn validate<'a>(&self, rating: &'a str) -> Result<&'a str, TallyErrors> {
        if self.contains(rating) {
            Ok(rating)
        } else {
            Err(TallyErrors::UnknownRating(rating.to_string()))
        }
    }
}

// ******** Output data structures *********

/// Number of occurrences for each label of a taxonomy.
///
/// There is exactly one entry per label, in the order of the taxonomy, including
/// the labels nobody picked.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct FrequencyTable {
    pub(crate) entries: Vec<(String, u64)>,
}

impl FrequencyTable {
    pub fn entries(&self) -> &[(String, u64)] {
        &self.entries
    }

    pub fn count(&self, label: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, c)| *c)
    }

    /// Number of records that were counted in the table.
    pub fn counted(&self) -> u64 {
        self.entries.iter().map(|(_, c)| *c).sum()
    }

    pub fn max_count(&self) -> u64 {
        self.entries.iter().map(|(_, c)| *c).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Summary {
    /// All the submissions, including the ones with a blank or unknown rating.
    pub total: u64,
    pub positive_count: u64,
    /// Between 0 and 100. Exactly 0 when there is no submission.
    pub positive_percentage: f64,
}

impl Summary {
    pub const EMPTY: Summary = Summary {
        total: 0,
        positive_count: 0,
        positive_percentage: 0.0,
    };
}

/// Everything displayed on the summary page.
#[derive(PartialEq, Debug, Clone)]
pub struct FeedbackReport {
    pub table: FrequencyTable,
    pub summary: Summary,
    /// Submissions that do not appear in the table.
    pub excluded: u64,
}

/// Errors raised when the scale or the positive labels are inconsistent.
///
/// The aggregation itself never fails on data.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TallyErrors {
    DuplicateLabel(String),
    UnknownRating(String),
    UnknownPositiveLabel(String),
}

impl Error for TallyErrors {}

impl Display for TallyErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TallyErrors::DuplicateLabel(s) => {
                write!(f, "the rating {:?} appears more than once in the scale", s)
            }
            TallyErrors::UnknownRating(s) => write!(f, "{:?} is not one of the ratings", s),
            TallyErrors::UnknownPositiveLabel(s) => {
                write!(f, "positive rating {:?} is not one of the ratings", s)
            }
        }
    }
}
