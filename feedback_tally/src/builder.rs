pub use crate::config::*;

use chrono::{DateTime, Utc};

/// A builder for accumulating feedback records before tallying them.
///
/// ```
/// pub use feedback_tally::builder::Builder;
/// pub use feedback_tally::RatingTaxonomy;
/// # use feedback_tally::TallyErrors;
///
/// let scale = RatingTaxonomy::new(&["No".to_string(), "Maybe".to_string(), "Yes".to_string()])?;
/// let mut builder = Builder::new(&scale).positive_labels(&["Yes".to_string()])?;
///
/// builder.add_rating("Yes");
/// builder.add_rating("");
///
/// let report = builder.build();
/// assert_eq!(report.summary.total, 2);
/// assert_eq!(report.table.count("Yes"), Some(1));
///
/// # Ok::<(), TallyErrors>(())
/// ```
pub struct Builder {
    pub(crate) _taxonomy: RatingTaxonomy,
    pub(crate) _positive_labels: Vec<String>,
    pub(crate) _records: Vec<FeedbackRecord>,
}

impl Builder {
    pub fn new(taxonomy: &RatingTaxonomy) -> Builder {
        Builder {
            _taxonomy: taxonomy.clone(),
            _positive_labels: Vec::new(),
            _records: Vec::new(),
        }
    }

    /// Sets the ratings counted as positive. They must belong to the scale.
    pub fn positive_labels(self, labels: &[String]) -> Result<Builder, TallyErrors> {
        for l in labels {
            if !self._taxonomy.contains(l) {
                return Err(TallyErrors::UnknownPositiveLabel(l.clone()));
            }
        }
        Ok(Builder {
            _taxonomy: self._taxonomy,
            _positive_labels: labels.to_vec(),
            _records: self._records,
        })
    }

    /// Adds a bare rating, without comments or timestamp.
    ///
    /// The rating does not need to be valid: blank or unknown ratings are kept as submissions.
    pub fn add_rating(&mut self, rating: &str) {
        self.add_record(FeedbackRecord {
            timestamp: None,
            comments: String::new(),
            rating: Some(rating.to_string()),
        })
    }

    pub fn add_submission(&mut self, timestamp: DateTime<Utc>, comments: &str, rating: &str) {
        self.add_record(FeedbackRecord::new(timestamp, comments, rating))
    }

    pub fn add_record(&mut self, record: FeedbackRecord) {
        self._records.push(record);
    }

    pub fn records(&self) -> &[FeedbackRecord] {
        &self._records
    }

    pub fn build(&self) -> FeedbackReport {
        let table = crate::build_frequency_table(&self._records, &self._taxonomy);
        let summary = crate::summarize(&self._records, &self._positive_labels);
        let excluded = summary.total - table.counted();
        FeedbackReport {
            table,
            summary,
            excluded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn scale() -> RatingTaxonomy {
        RatingTaxonomy::new(&["Bad".to_string(), "Good".to_string()]).unwrap()
    }

    #[test]
    fn builder_matches_free_functions() {
        let mut b = Builder::new(&scale())
            .positive_labels(&["Good".to_string()])
            .unwrap();
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        b.add_submission(ts, "great", "Good");
        b.add_submission(ts, "meh", "Bad");
        b.add_rating("Other");

        let report = b.build();
        assert_eq!(
            report.table,
            crate::build_frequency_table(b.records(), &scale())
        );
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.positive_count, 1);
        assert_eq!(report.excluded, 1);
    }

    #[test]
    fn builder_rejects_unknown_positive_label() {
        let res = Builder::new(&scale()).positive_labels(&["Great".to_string()]);
        assert!(matches!(res, Err(TallyErrors::UnknownPositiveLabel(_))));
    }

    #[test]
    fn empty_builder() {
        let report = Builder::new(&scale()).build();
        assert_eq!(report.summary, Summary::EMPTY);
        assert_eq!(report.table.entries().len(), 2);
    }
}
