//! Exam scores and the derived admission total.

use serde::{Deserialize, Serialize};

use super::domain::{SubjectCode, SubjectCombination};

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 10.0;

/// The nine independent optional score fields of the application form, each
/// constrained to [0, 10].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSet {
    pub math: Option<f64>,
    pub literature: Option<f64>,
    pub english: Option<f64>,
    pub physics: Option<f64>,
    pub chemistry: Option<f64>,
    pub biology: Option<f64>,
    pub history: Option<f64>,
    pub geography: Option<f64>,
    pub civic_education: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoreError {
    #[error("score {value} for {subject} is outside the allowed range 0..=10")]
    OutOfRange { subject: &'static str, value: f64 },
}

impl ScoreSet {
    pub fn get(&self, subject: SubjectCode) -> Option<f64> {
        match subject {
            SubjectCode::Math => self.math,
            SubjectCode::Literature => self.literature,
            SubjectCode::English => self.english,
            SubjectCode::Physics => self.physics,
            SubjectCode::Chemistry => self.chemistry,
            SubjectCode::Biology => self.biology,
            SubjectCode::History => self.history,
            SubjectCode::Geography => self.geography,
            SubjectCode::CivicEducation => self.civic_education,
        }
    }

    /// Set or clear one field, rejecting out-of-range values before they can
    /// reach a payload.
    pub fn set(&mut self, subject: SubjectCode, value: Option<f64>) -> Result<(), ScoreError> {
        if let Some(value) = value {
            if !(SCORE_MIN..=SCORE_MAX).contains(&value) || value.is_nan() {
                return Err(ScoreError::OutOfRange {
                    subject: subject.backend_code(),
                    value,
                });
            }
        }
        let slot = match subject {
            SubjectCode::Math => &mut self.math,
            SubjectCode::Literature => &mut self.literature,
            SubjectCode::English => &mut self.english,
            SubjectCode::Physics => &mut self.physics,
            SubjectCode::Chemistry => &mut self.chemistry,
            SubjectCode::Biology => &mut self.biology,
            SubjectCode::History => &mut self.history,
            SubjectCode::Geography => &mut self.geography,
            SubjectCode::CivicEducation => &mut self.civic_education,
        };
        *slot = value;
        Ok(())
    }

    /// Set one field from raw text input. Empty or unparseable input clears
    /// the field (it then contributes 0 to the total); a parsed value still
    /// goes through the range check.
    pub fn set_raw(&mut self, subject: SubjectCode, raw: &str) -> Result<(), ScoreError> {
        let parsed = raw.trim().parse::<f64>().ok();
        self.set(subject, parsed)
    }
}

/// Sum of the scores for exactly the subjects listed in `combination`.
/// Subjects outside the combination never contribute; a missing score
/// contributes 0. Computed at full floating precision — rounding happens
/// only at display time.
pub fn total_score(combination: &SubjectCombination, scores: &ScoreSet) -> f64 {
    combination
        .subjects
        .iter()
        .filter_map(|subject| SubjectCode::from_backend_code(&subject.code))
        .map(|subject| scores.get(subject).unwrap_or(0.0))
        .sum()
}

/// Two-decimal rendering of a total for the form and listings.
pub fn display_total(total: f64) -> String {
    format!("{total:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::domain::Subject;

    fn combination(codes: &[&str]) -> SubjectCombination {
        SubjectCombination {
            code: "D01".to_string(),
            name: "Toán, Văn, Anh".to_string(),
            subjects: codes
                .iter()
                .map(|code| Subject {
                    code: (*code).to_string(),
                    name: code.to_string(),
                    display_name: code.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn total_sums_only_combination_subjects_with_missing_as_zero() {
        let mut scores = ScoreSet::default();
        scores.set(SubjectCode::Math, Some(8.5)).expect("in range");
        scores
            .set(SubjectCode::Literature, Some(7.0))
            .expect("in range");
        // English left unset on purpose; physics must not count at all.
        scores.set(SubjectCode::Physics, Some(9.75)).expect("in range");

        let combo = combination(&["MATH101", "LIT102", "ENG103"]);
        assert_eq!(total_score(&combo, &scores), 15.5);
    }

    #[test]
    fn unknown_subject_codes_are_ignored() {
        let mut scores = ScoreSet::default();
        scores.set(SubjectCode::Math, Some(6.0)).expect("in range");
        let combo = combination(&["MATH101", "ART999"]);
        assert_eq!(total_score(&combo, &scores), 6.0);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut scores = ScoreSet::default();
        assert!(matches!(
            scores.set(SubjectCode::Math, Some(10.5)),
            Err(ScoreError::OutOfRange { .. })
        ));
        assert!(matches!(
            scores.set(SubjectCode::Math, Some(-0.25)),
            Err(ScoreError::OutOfRange { .. })
        ));
        assert_eq!(scores.math, None);
    }

    #[test]
    fn raw_input_parses_or_clears() {
        let mut scores = ScoreSet::default();
        scores.set_raw(SubjectCode::English, "9.25").expect("parses");
        assert_eq!(scores.english, Some(9.25));
        scores.set_raw(SubjectCode::English, "abc").expect("clears");
        assert_eq!(scores.english, None);
        assert!(scores.set_raw(SubjectCode::English, "11").is_err());
    }

    #[test]
    fn totals_round_only_for_display() {
        let mut scores = ScoreSet::default();
        scores.set(SubjectCode::Math, Some(3.33)).expect("in range");
        scores
            .set(SubjectCode::Literature, Some(3.33))
            .expect("in range");
        scores.set(SubjectCode::English, Some(3.345)).expect("in range");
        let combo = combination(&["MATH101", "LIT102", "ENG103"]);
        let total = total_score(&combo, &scores);
        assert!((total - 10.005).abs() < 1e-9);
        assert_eq!(display_total(15.5), "15.50");
    }
}
