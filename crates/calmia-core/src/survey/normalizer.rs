//! Answer normalization.
//!
//! Turns a raw answer array into the fixed-width numeric feature vector the
//! condition classifier was trained on. Every slot is interpreted against
//! its declared type; anything that does not fit is a typed rejection
//! naming the offending index. Nothing is coerced silently and no slot
//! ever falls through to a default score.

use crate::survey::schema::{Answer, CategoricalMap, FeatureVector, SlotType, SurveySchema};
use thiserror::Error;

/// Lower bound of a scale answer (inclusive).
pub const SCALE_MIN: f64 = 1.0;

/// Upper bound of a scale answer (inclusive).
pub const SCALE_MAX: f64 = 10.0;

/// Rejection produced while normalizing a submission.
///
/// Each variant carries the position that failed so callers can surface an
/// actionable message; the whole submission is rejected on the first
/// failing slot.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The answer array length does not match the schema.
    #[error("Expected {expected} responses, got {got}")]
    WrongArity { expected: usize, got: usize },

    /// A scale slot held a non-number or a number outside 1-10.
    #[error("Response at index {index} must be numeric between {SCALE_MIN} and {SCALE_MAX}")]
    OutOfRange { index: usize },

    /// A binary slot held something other than yes/no, true/false, 0 or 1.
    #[error("Response at index {index} must be 'Yes', 'No', 'True', 'False', 0, or 1.")]
    InvalidBinary { index: usize },

    /// A categorical slot held text outside the declared vocabulary.
    #[error("Response at index {index} must be one of: {}", .allowed.join(", "))]
    InvalidCategorical { index: usize, allowed: Vec<String> },
}

impl ValidationError {
    /// The slot position that failed, if the rejection is positional.
    pub fn index(&self) -> Option<usize> {
        match self {
            ValidationError::WrongArity { .. } => None,
            ValidationError::OutOfRange { index }
            | ValidationError::InvalidBinary { index }
            | ValidationError::InvalidCategorical { index, .. } => Some(*index),
        }
    }
}

/// Normalize a raw answer array against a schema.
///
/// Pure function: no logging, no clock, no collaborator calls. Arity is
/// checked before any slot is inspected, so a wrong-length submission never
/// reaches per-slot interpretation.
pub fn normalize(
    answers: &[Answer],
    schema: &SurveySchema,
    categories: &CategoricalMap,
) -> Result<FeatureVector, ValidationError> {
    if answers.len() != schema.len() {
        return Err(ValidationError::WrongArity {
            expected: schema.len(),
            got: answers.len(),
        });
    }

    let mut features = Vec::with_capacity(schema.len());
    for (index, (answer, slot)) in answers.iter().zip(schema.slots()).enumerate() {
        let value = match slot {
            SlotType::Scale => {
                normalize_scale(answer).ok_or(ValidationError::OutOfRange { index })?
            }
            SlotType::Binary => {
                normalize_binary(answer).ok_or(ValidationError::InvalidBinary { index })?
            }
            SlotType::Categorical => normalize_categorical(answer, categories).ok_or_else(|| {
                ValidationError::InvalidCategorical {
                    index,
                    allowed: categories.allowed_values(),
                }
            })?,
        };
        features.push(value);
    }

    Ok(FeatureVector::new(features))
}

/// A scale answer passes through unchanged when numeric and within bounds.
/// NaN fails the range check and is rejected like any other out-of-range
/// number.
fn normalize_scale(answer: &Answer) -> Option<f64> {
    match answer {
        Answer::Number(n) if (SCALE_MIN..=SCALE_MAX).contains(n) => Some(*n),
        _ => None,
    }
}

/// Binary answers accept booleans, the exact numbers 0 and 1, and the
/// spellings yes/no/true/false in any case.
fn normalize_binary(answer: &Answer) -> Option<f64> {
    match answer {
        Answer::Bool(true) => Some(1.0),
        Answer::Bool(false) => Some(0.0),
        Answer::Number(n) if *n == 1.0 => Some(1.0),
        Answer::Number(n) if *n == 0.0 => Some(0.0),
        Answer::Text(s) if s.eq_ignore_ascii_case("yes") || s.eq_ignore_ascii_case("true") => {
            Some(1.0)
        }
        Answer::Text(s) if s.eq_ignore_ascii_case("no") || s.eq_ignore_ascii_case("false") => {
            Some(0.0)
        }
        _ => None,
    }
}

/// Categorical answers must be text found in the declared vocabulary.
/// Numbers are rejected even when they equal a declared score.
fn normalize_categorical(answer: &Answer, categories: &CategoricalMap) -> Option<f64> {
    match answer {
        Answer::Text(s) => categories.score(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::schema::CategoricalValue;
    use proptest::prelude::*;

    fn categories() -> CategoricalMap {
        CategoricalMap::new(vec![
            CategoricalValue { value: "High".to_string(), score: 3.0 },
            CategoricalValue { value: "Medium".to_string(), score: 2.0 },
            CategoricalValue { value: "Low".to_string(), score: 1.0 },
            CategoricalValue { value: "No".to_string(), score: 0.0 },
            CategoricalValue { value: "Yes".to_string(), score: 1.0 },
            CategoricalValue { value: "Poor".to_string(), score: 1.0 },
            CategoricalValue { value: "Good".to_string(), score: 3.0 },
            CategoricalValue { value: "True".to_string(), score: 1.0 },
            CategoricalValue { value: "False".to_string(), score: 0.0 },
        ])
    }

    fn wellness_schema() -> SurveySchema {
        SurveySchema::new(vec![
            SlotType::Scale,
            SlotType::Binary,
            SlotType::Binary,
            SlotType::Binary,
            SlotType::Categorical,
            SlotType::Categorical,
            SlotType::Binary,
            SlotType::Binary,
            SlotType::Binary,
            SlotType::Binary,
            SlotType::Binary,
            SlotType::Scale,
            SlotType::Binary,
            SlotType::Scale,
            SlotType::Scale,
        ])
    }

    #[test]
    fn test_wrong_arity_rejected_before_slot_checks() {
        let schema = wellness_schema();
        // Index 0 would fail the scale check if slots were inspected first.
        let answers = vec![Answer::Text("garbage".to_string())];

        let err = normalize(&answers, &schema, &categories()).unwrap_err();
        assert_eq!(err, ValidationError::WrongArity { expected: 15, got: 1 });
        assert_eq!(err.index(), None);
    }

    #[test]
    fn test_scale_bounds_inclusive() {
        let schema = SurveySchema::new(vec![SlotType::Scale]);
        let cats = categories();

        for ok in [1.0, 5.5, 10.0] {
            let result = normalize(&[Answer::Number(ok)], &schema, &cats).unwrap();
            assert_eq!(result.values(), &[ok]);
        }
        for bad in [0.0, 0.5, 10.5, -3.0, f64::NAN] {
            let err = normalize(&[Answer::Number(bad)], &schema, &cats).unwrap_err();
            assert_eq!(err, ValidationError::OutOfRange { index: 0 });
        }
    }

    #[test]
    fn test_scale_rejects_text_and_bool() {
        let schema = SurveySchema::new(vec![SlotType::Scale]);
        let cats = categories();

        for bad in [Answer::Text("7".to_string()), Answer::Bool(true)] {
            let err = normalize(&[bad], &schema, &cats).unwrap_err();
            assert_eq!(err, ValidationError::OutOfRange { index: 0 });
        }
    }

    #[test]
    fn test_binary_accepted_forms() {
        let schema = SurveySchema::new(vec![SlotType::Binary]);
        let cats = categories();

        let ones = [
            Answer::Text("Yes".to_string()),
            Answer::Text("yes".to_string()),
            Answer::Text("TRUE".to_string()),
            Answer::Bool(true),
            Answer::Number(1.0),
        ];
        for answer in ones {
            let result = normalize(&[answer], &schema, &cats).unwrap();
            assert_eq!(result.values(), &[1.0]);
        }

        let zeros = [
            Answer::Text("No".to_string()),
            Answer::Text("false".to_string()),
            Answer::Bool(false),
            Answer::Number(0.0),
        ];
        for answer in zeros {
            let result = normalize(&[answer], &schema, &cats).unwrap();
            assert_eq!(result.values(), &[0.0]);
        }
    }

    #[test]
    fn test_binary_rejects_other_numbers_and_text() {
        let schema = SurveySchema::new(vec![SlotType::Binary]);
        let cats = categories();

        for bad in [
            Answer::Number(2.0),
            Answer::Number(0.5),
            Answer::Number(-1.0),
            Answer::Text("maybe".to_string()),
            Answer::Text("".to_string()),
        ] {
            let err = normalize(&[bad], &schema, &cats).unwrap_err();
            assert_eq!(err, ValidationError::InvalidBinary { index: 0 });
        }
    }

    #[test]
    fn test_rejection_messages() {
        let scale = SurveySchema::new(vec![SlotType::Scale]);
        let binary = SurveySchema::new(vec![SlotType::Binary]);
        let cats = categories();

        let err = normalize(&[Answer::Number(5.0)], &wellness_schema(), &cats).unwrap_err();
        assert_eq!(err.to_string(), "Expected 15 responses, got 1");

        let err = normalize(&[Answer::Number(11.0)], &scale, &cats).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Response at index 0 must be numeric between 1 and 10"
        );

        let err = normalize(&[Answer::Text("maybe".to_string())], &binary, &cats).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Response at index 0 must be 'Yes', 'No', 'True', 'False', 0, or 1."
        );
    }

    #[test]
    fn test_categorical_case_insensitive_match() {
        let schema = SurveySchema::new(vec![SlotType::Categorical]);
        let cats = categories();

        for (text, score) in [("High", 3.0), ("high", 3.0), ("MEDIUM", 2.0), ("poor", 1.0)] {
            let result = normalize(&[Answer::Text(text.to_string())], &schema, &cats).unwrap();
            assert_eq!(result.values(), &[score]);
        }
    }

    #[test]
    fn test_categorical_rejects_numbers_even_when_score_matches() {
        let schema = SurveySchema::new(vec![SlotType::Categorical]);
        let cats = categories();

        // 3 is the score for "High" but a number is not a vocabulary word.
        let err = normalize(&[Answer::Number(3.0)], &schema, &cats).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidCategorical { index: 0, .. }));
    }

    #[test]
    fn test_categorical_rejection_lists_vocabulary() {
        let schema = SurveySchema::new(vec![SlotType::Categorical]);
        let err =
            normalize(&[Answer::Text("Extreme".to_string())], &schema, &categories()).unwrap_err();

        let message = err.to_string();
        assert!(message.contains("index 0"));
        assert!(message.contains("High"));
        assert!(message.contains("False"));
    }

    #[test]
    fn test_full_wellness_submission() {
        let answers = vec![
            Answer::Number(10.0),
            Answer::Text("Yes".to_string()),
            Answer::Number(1.0),
            Answer::Bool(true),
            Answer::Text("High".to_string()),
            Answer::Text("high".to_string()),
            Answer::Text("No".to_string()),
            Answer::Text("yes".to_string()),
            Answer::Bool(false),
            Answer::Number(0.0),
            Answer::Text("True".to_string()),
            Answer::Number(1.0),
            Answer::Text("False".to_string()),
            Answer::Number(1.0),
            Answer::Number(1.0),
        ];

        let result = normalize(&answers, &wellness_schema(), &categories()).unwrap();
        assert_eq!(
            result.values(),
            &[10.0, 1.0, 1.0, 1.0, 3.0, 3.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0]
        );
    }

    #[test]
    fn test_all_affirmative_submission() {
        // Stress at 10, every binary "Yes", both categoricals "High", the
        // remaining scales at 1.
        let mut answers = vec![Answer::Text("Yes".to_string()); 15];
        answers[0] = Answer::Number(10.0);
        answers[4] = Answer::Text("High".to_string());
        answers[5] = Answer::Text("High".to_string());
        answers[11] = Answer::Number(1.0);
        answers[13] = Answer::Number(1.0);
        answers[14] = Answer::Number(1.0);

        let result = normalize(&answers, &wellness_schema(), &categories()).unwrap();
        assert_eq!(
            result.values(),
            &[10.0, 1.0, 1.0, 1.0, 3.0, 3.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]
        );
    }

    #[test]
    fn test_first_failing_slot_reported() {
        let mut answers = vec![
            Answer::Number(5.0),
            Answer::Text("Yes".to_string()),
            Answer::Text("No".to_string()),
            Answer::Text("banana".to_string()), // invalid binary at 3
            Answer::Text("banana".to_string()), // invalid categorical at 4
            Answer::Text("High".to_string()),
            Answer::Text("No".to_string()),
            Answer::Text("No".to_string()),
            Answer::Text("No".to_string()),
            Answer::Text("No".to_string()),
            Answer::Text("No".to_string()),
            Answer::Number(5.0),
            Answer::Text("No".to_string()),
            Answer::Number(5.0),
            Answer::Number(5.0),
        ];

        let err = normalize(&answers, &wellness_schema(), &categories()).unwrap_err();
        assert_eq!(err.index(), Some(3));

        // Fix slot 3 and the categorical failure at 4 surfaces next.
        answers[3] = Answer::Text("No".to_string());
        let err = normalize(&answers, &wellness_schema(), &categories()).unwrap_err();
        assert_eq!(err.index(), Some(4));
    }

    fn valid_answer_for(slot: SlotType) -> BoxedStrategy<Answer> {
        match slot {
            SlotType::Scale => (1.0..=10.0f64).prop_map(Answer::Number).boxed(),
            SlotType::Binary => prop_oneof![
                Just(Answer::Text("Yes".to_string())),
                Just(Answer::Text("no".to_string())),
                Just(Answer::Text("True".to_string())),
                Just(Answer::Text("false".to_string())),
                Just(Answer::Bool(true)),
                Just(Answer::Bool(false)),
                Just(Answer::Number(0.0)),
                Just(Answer::Number(1.0)),
            ]
            .boxed(),
            SlotType::Categorical => prop_oneof![
                Just(Answer::Text("High".to_string())),
                Just(Answer::Text("medium".to_string())),
                Just(Answer::Text("LOW".to_string())),
                Just(Answer::Text("Good".to_string())),
                Just(Answer::Text("poor".to_string())),
            ]
            .boxed(),
        }
    }

    fn valid_submission() -> impl Strategy<Value = Vec<Answer>> {
        wellness_schema()
            .slots()
            .iter()
            .map(|slot| valid_answer_for(*slot))
            .collect::<Vec<_>>()
    }

    proptest! {
        #[test]
        fn prop_valid_submissions_always_normalize(answers in valid_submission()) {
            let result = normalize(&answers, &wellness_schema(), &categories()).unwrap();
            prop_assert_eq!(result.len(), 15);
            for value in result.values() {
                prop_assert!(value.is_finite());
            }
        }

        #[test]
        fn prop_wrong_length_always_wrong_arity(len in 0usize..30) {
            prop_assume!(len != 15);
            let answers = vec![Answer::Number(5.0); len];
            let err = normalize(&answers, &wellness_schema(), &categories()).unwrap_err();
            prop_assert_eq!(err, ValidationError::WrongArity { expected: 15, got: len });
        }
    }
}
