use crate::form::*;

use feedback_tally::{RatingTaxonomy, TallyErrors};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_STORE_NAME: &str = "Decisiondata";
pub const DEFAULT_TITLE: &str = "Team Member Feedback";
pub const DEFAULT_INTRO: &str =
    "Provide your anonymous feedback on whether the former team member should rejoin the team.";
pub const DEFAULT_COMMENTS_PROMPT: &str = "Any comments?";
pub const DEFAULT_COMMENTS_PLACEHOLDER: &str = "Write your feedback here...";
pub const DEFAULT_RATING_PROMPT: &str = "How do you feel about this team member returning?";
pub const DEFAULT_SUBMIT_LABEL: &str = "Submit Feedback";
pub const DEFAULT_RATINGS: [&str; 5] = ["Hell No", "No", "I Don't Care", "Sure", "Definitely"];

/// Names of the columns of the record store.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ColumnNames {
    pub timestamp: String,
    pub comments: String,
    pub rating: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        ColumnNames {
            timestamp: "Timestamp".to_string(),
            comments: "Comments".to_string(),
            rating: "Rating".to_string(),
        }
    }
}

impl ColumnNames {
    /// The first row of a new store.
    pub fn header(&self) -> Vec<String> {
        vec![
            self.timestamp.clone(),
            self.comments.clone(),
            self.rating.clone(),
        ]
    }
}

/// Everything that differs between two deployments of the form.
///
/// All the fields are optional: a missing field falls back to the wording of the
/// first deployment.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormConfig {
    #[serde(rename = "storeName")]
    pub store_name: Option<String>,
    #[serde(rename = "storeDirectory")]
    pub store_directory: Option<String>,
    #[serde(rename = "createIfMissing")]
    pub create_if_missing: Option<bool>,
    pub title: Option<String>,
    pub intro: Option<String>,
    #[serde(rename = "commentsPrompt")]
    pub comments_prompt: Option<String>,
    #[serde(rename = "commentsPlaceholder")]
    pub comments_placeholder: Option<String>,
    #[serde(rename = "ratingPrompt")]
    pub rating_prompt: Option<String>,
    pub ratings: Option<Vec<String>>,
    #[serde(rename = "positiveRatings")]
    pub positive_ratings: Option<Vec<String>>,
    #[serde(rename = "submitLabel")]
    pub submit_label: Option<String>,
    pub columns: Option<ColumnNames>,
}

impl FormConfig {
    pub fn store_name(&self) -> &str {
        self.store_name.as_deref().unwrap_or(DEFAULT_STORE_NAME)
    }

    pub fn store_directory(&self) -> PathBuf {
        PathBuf::from(self.store_directory.as_deref().unwrap_or("."))
    }

    pub fn create_if_missing(&self) -> bool {
        self.create_if_missing.unwrap_or(false)
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    pub fn intro(&self) -> &str {
        self.intro.as_deref().unwrap_or(DEFAULT_INTRO)
    }

    pub fn comments_prompt(&self) -> &str {
        self.comments_prompt
            .as_deref()
            .unwrap_or(DEFAULT_COMMENTS_PROMPT)
    }

    pub fn comments_placeholder(&self) -> &str {
        self.comments_placeholder
            .as_deref()
            .unwrap_or(DEFAULT_COMMENTS_PLACEHOLDER)
    }

    pub fn rating_prompt(&self) -> &str {
        self.rating_prompt.as_deref().unwrap_or(DEFAULT_RATING_PROMPT)
    }

    pub fn submit_label(&self) -> &str {
        self.submit_label.as_deref().unwrap_or(DEFAULT_SUBMIT_LABEL)
    }

    pub fn ratings(&self) -> Vec<String> {
        match &self.ratings {
            Some(r) => r.clone(),
            None => DEFAULT_RATINGS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The configured positive ratings, or the two most positive ones of the scale.
    pub fn positive_labels(&self) -> Vec<String> {
        match &self.positive_ratings {
            Some(p) => p.clone(),
            None => {
                let ratings = self.ratings();
                let skip = ratings.len().saturating_sub(2);
                ratings.into_iter().skip(skip).collect()
            }
        }
    }

    pub fn columns(&self) -> ColumnNames {
        self.columns.clone().unwrap_or_default()
    }

    pub fn taxonomy(&self) -> FormResult<RatingTaxonomy> {
        RatingTaxonomy::new(&self.ratings()).context(InvalidTaxonomySnafu {})
    }

    /// Checks the rating scale and the positive ratings, and returns the scale.
    pub fn validate(&self) -> FormResult<RatingTaxonomy> {
        let taxonomy = self.taxonomy()?;
        ensure!(!taxonomy.is_empty(), EmptyTaxonomySnafu {});
        // A blank cell reads as "no rating", so such a label could never be counted.
        ensure!(
            taxonomy.labels().iter().all(|l| !l.trim().is_empty()),
            BlankRatingSnafu {
                ratings: taxonomy.labels().to_vec(),
            }
        );
        for label in self.positive_labels() {
            if !taxonomy.contains(&label) {
                return Err(FormError::InvalidTaxonomy {
                    source: TallyErrors::UnknownPositiveLabel(label),
                });
            }
        }
        Ok(taxonomy)
    }
}

/// Reads the configuration of a form.
///
/// The store directory is resolved against the directory of the configuration file.
pub fn read_config(path: &str) -> FormResult<FormConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let mut config: FormConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    let root_p: &Path = Path::new(path).parent().unwrap_or_else(|| Path::new(""));
    let store_dir: PathBuf = match &config.store_directory {
        Some(d) if Path::new(d).is_absolute() => PathBuf::from(d),
        Some(d) => root_p.join(d),
        None => root_p.to_path_buf(),
    };
    // An empty parent means the current directory.
    let store_dir = if store_dir.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        store_dir
    };
    config.store_directory = Some(store_dir.display().to_string());
    debug!("read_config: {:?}", config);
    Ok(config)
}

/// Reads a JSON summary produced by an earlier run, for comparison.
pub fn read_reference(path: &str) -> FormResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_first_deployment() {
        let config = FormConfig::default();
        assert_eq!(config.store_name(), "Decisiondata");
        assert_eq!(config.ratings().len(), 5);
        assert_eq!(
            config.positive_labels(),
            vec!["Sure".to_string(), "Definitely".to_string()]
        );
        assert_eq!(config.columns().header(), vec!["Timestamp", "Comments", "Rating"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_partial_config() {
        let js = r#"{
            "storeName": "Retro",
            "ratings": ["Strong reject", "Reject", "Neutral", "Accept", "Strong accept"],
            "positiveRatings": ["Strong accept"],
            "columns": {"timestamp": "When", "comments": "Notes", "rating": "Vote"}
        }"#;
        let config: FormConfig = serde_json::from_str(js).unwrap();
        assert_eq!(config.store_name(), "Retro");
        assert_eq!(config.title(), DEFAULT_TITLE);
        assert_eq!(config.positive_labels(), vec!["Strong accept".to_string()]);
        assert_eq!(config.columns().rating, "Vote");
        let tax = config.validate().unwrap();
        assert_eq!(tax.label_at(4), Some("Strong accept"));
    }

    #[test]
    fn positive_ratings_must_be_in_the_scale() {
        let config = FormConfig {
            ratings: Some(vec!["No".to_string(), "Yes".to_string()]),
            positive_ratings: Some(vec!["Sure".to_string()]),
            ..FormConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::Config);
    }

    #[test]
    fn empty_and_duplicated_scales_are_rejected() {
        let empty = FormConfig {
            ratings: Some(vec![]),
            positive_ratings: Some(vec![]),
            ..FormConfig::default()
        };
        assert!(matches!(empty.validate(), Err(FormError::EmptyTaxonomy {})));
        let dup = FormConfig {
            ratings: Some(vec!["No".to_string(), "No".to_string()]),
            ..FormConfig::default()
        };
        assert!(matches!(
            dup.validate(),
            Err(FormError::InvalidTaxonomy { .. })
        ));
    }

    #[test]
    fn blank_rating_labels_are_rejected() {
        let config = FormConfig {
            ratings: Some(vec!["".to_string(), "Yes".to_string()]),
            positive_ratings: Some(vec!["Yes".to_string()]),
            ..FormConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, FormError::BlankRating { .. }));
        assert_eq!(err.kind(), ErrorKind::Config);
        let spaces = FormConfig {
            ratings: Some(vec!["No".to_string(), "  ".to_string()]),
            positive_ratings: Some(vec!["No".to_string()]),
            ..FormConfig::default()
        };
        assert!(spaces.validate().is_err());
    }

    #[test]
    fn short_scale_positive_default() {
        let config = FormConfig {
            ratings: Some(vec!["Yes".to_string()]),
            ..FormConfig::default()
        };
        assert_eq!(config.positive_labels(), vec!["Yes".to_string()]);
    }

    #[test]
    fn store_directory_is_relative_to_the_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form.json");
        fs::write(&path, r#"{"storeDirectory": "data"}"#).unwrap();
        let config = read_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config.store_directory(), dir.path().join("data"));

        fs::write(&path, "{}").unwrap();
        let config = read_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config.store_directory(), dir.path().to_path_buf());
    }

    #[test]
    fn missing_config_file() {
        let err = read_config("/nonexistent/form.json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
