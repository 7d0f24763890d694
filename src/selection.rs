use serde::Serialize;

use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::loader::Dataset;

/// The user's current choices, checked against the dataset before any
/// query runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    year: i32,
    category: String,
    question: String,
}

impl Selection {
    /// `question = None` picks the category's first question, matching the
    /// initial state of the question dropdown.
    pub fn new(
        dataset: &Dataset,
        config: &DashboardConfig,
        year: i32,
        category: &str,
        question: Option<&str>,
    ) -> Result<Self, DashboardError> {
        if !config.year_range.contains(&year) {
            return Err(DashboardError::YearOutOfRange {
                year,
                min: *config.year_range.start(),
                max: *config.year_range.end(),
            });
        }

        let questions = dataset.columns_for_category(category)?;
        let question = match question {
            Some(q) if questions.iter().any(|c| c == q) => q.to_string(),
            Some(q) => {
                return Err(DashboardError::UnknownQuestion {
                    category: category.to_string(),
                    question: q.to_string(),
                })
            }
            None => questions.into_iter().next().ok_or_else(|| {
                DashboardError::InvalidData(format!("category {category} has no questions"))
            })?,
        };

        Ok(Self {
            year,
            category: category.to_string(),
            question,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn question(&self) -> &str {
        &self.question
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryMap;
    use crate::testing::{question_categories, scenario_table, PAY_QUESTIONS};

    fn setup() -> (Dataset, DashboardConfig) {
        let config = DashboardConfig::new("unused.xlsx").with_categories(question_categories());
        let dataset = Dataset::prepare(scenario_table(), &config).unwrap();
        (dataset, config)
    }

    #[test]
    fn defaults_to_first_question() {
        let (dataset, config) = setup();
        let sel = Selection::new(&dataset, &config, 1971, "PAY", None).unwrap();
        assert_eq!(sel.year(), 1971);
        assert_eq!(sel.category(), "PAY");
        assert_eq!(sel.question(), PAY_QUESTIONS[0]);
    }

    #[test]
    fn explicit_question_must_belong_to_category() {
        let (dataset, config) = setup();
        let ok = Selection::new(&dataset, &config, 1980, "PAY", Some(PAY_QUESTIONS[1])).unwrap();
        assert_eq!(ok.question(), PAY_QUESTIONS[1]);

        let err = Selection::new(&dataset, &config, 1980, "MOBILITY", Some(PAY_QUESTIONS[1]))
            .unwrap_err();
        assert!(matches!(err, DashboardError::UnknownQuestion { .. }));
    }

    #[test]
    fn year_outside_slider_range_is_rejected() {
        let (dataset, config) = setup();
        let err = Selection::new(&dataset, &config, 1970, "PAY", None).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::YearOutOfRange { year: 1970, min: 1971, max: 2023 }
        ));
    }

    #[test]
    fn unknown_category_is_rejected() {
        let (dataset, config) = setup();
        let err = Selection::new(&dataset, &config, 1980, "HEALTH", None).unwrap_err();
        assert!(matches!(err, DashboardError::UnknownCategory(_)));
    }

    #[test]
    fn category_without_questions_has_no_default() {
        let config = DashboardConfig::new("unused.xlsx")
            .with_categories(CategoryMap::new().with_positions("EMPTY", Vec::<usize>::new()));
        let dataset = Dataset::prepare(scenario_table(), &config).unwrap();
        let err = Selection::new(&dataset, &config, 1980, "EMPTY", None).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidData(_)));
    }
}
