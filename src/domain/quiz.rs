//! Quiz questions and grading

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Duration, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionKind {
    #[sea_orm(string_value = "SINGLE")]
    Single,
    #[sea_orm(string_value = "MULTIPLE")]
    Multiple,
    #[sea_orm(string_value = "TRUE_FALSE")]
    TrueFalse,
}

impl std::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Single => "SINGLE",
            Self::Multiple => "MULTIPLE",
            Self::TrueFalse => "TRUE_FALSE",
        })
    }
}

impl std::str::FromStr for QuestionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SINGLE" => Ok(Self::Single),
            "MULTIPLE" => Ok(Self::Multiple),
            "TRUE_FALSE" => Ok(Self::TrueFalse),
            other => Err(DomainError::validation(format!("Unknown question kind: {}", other))),
        }
    }
}

/// Options and correct answers (indices into options) of one question.
#[derive(Debug, Clone)]
pub struct QuestionKey {
    pub id: String,
    pub kind: QuestionKind,
    pub options: Vec<String>,
    pub correct: Vec<u32>,
    pub points: i32,
}

impl QuestionKey {
    /// Structural checks run when a question is authored.
    pub fn validate(&self) -> DomainResult<()> {
        if self.points <= 0 {
            return Err(DomainError::validation("Question points must be positive"));
        }
        if self.kind == QuestionKind::TrueFalse && self.options.len() != 2 {
            return Err(DomainError::validation(
                "True/false questions need exactly two options",
            ));
        }
        if self.options.len() < 2 {
            return Err(DomainError::validation("A question needs at least two options"));
        }
        if self.correct.is_empty() {
            return Err(DomainError::validation("A question needs a correct answer"));
        }
        if self.correct.iter().any(|i| *i as usize >= self.options.len()) {
            return Err(DomainError::validation("Correct answer index out of range"));
        }
        if self.kind != QuestionKind::Multiple && self.correct.len() != 1 {
            return Err(DomainError::validation(
                "Single-answer questions take exactly one correct option",
            ));
        }
        Ok(())
    }

    /// MULTIPLE needs the exact set; other kinds compare the single choice.
    pub fn is_correct(&self, chosen: &[u32]) -> bool {
        let expected: BTreeSet<u32> = self.correct.iter().copied().collect();
        let given: BTreeSet<u32> = chosen.iter().copied().collect();
        match self.kind {
            QuestionKind::Multiple => expected == given,
            QuestionKind::Single | QuestionKind::TrueFalse => {
                chosen.len() == 1 && expected == given
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GradeOutcome {
    pub points: i32,
    pub max_points: i32,
    pub score_percent: i32,
    pub passed: bool,
}

pub fn grade(
    questions: &[QuestionKey],
    answers: &HashMap<String, Vec<u32>>,
    passing_score: i32,
) -> GradeOutcome {
    let max_points: i32 = questions.iter().map(|q| q.points).sum();
    let points: i32 = questions
        .iter()
        .filter(|q| answers.get(&q.id).is_some_and(|a| q.is_correct(a)))
        .map(|q| q.points)
        .sum();
    let score_percent = if max_points > 0 {
        points * 100 / max_points
    } else {
        0
    };
    GradeOutcome {
        points,
        max_points,
        score_percent,
        passed: max_points > 0 && score_percent >= passing_score,
    }
}

/// Late submissions are recorded as a failed zero score.
pub fn time_limit_exceeded(
    started_at: DateTime<Utc>,
    submitted_at: DateTime<Utc>,
    time_limit_minutes: Option<i32>,
) -> bool {
    match time_limit_minutes {
        Some(limit) if limit > 0 => submitted_at > started_at + Duration::minutes(limit as i64),
        _ => false,
    }
}

pub fn validate_settings(passing_score: i32, max_attempts: Option<i32>) -> DomainResult<()> {
    if !(0..=100).contains(&passing_score) {
        return Err(DomainError::validation("Passing score must be between 0 and 100"));
    }
    if matches!(max_attempts, Some(n) if n < 1) {
        return Err(DomainError::validation("Max attempts must be at least 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(id: &str, kind: QuestionKind, correct: Vec<u32>, points: i32) -> QuestionKey {
        let options = match kind {
            QuestionKind::TrueFalse => vec!["True".into(), "False".into()],
            _ => vec!["a".into(), "b".into(), "c".into(), "d".into()],
        };
        QuestionKey {
            id: id.into(),
            kind,
            options,
            correct,
            points,
        }
    }

    #[test]
    fn multiple_choice_needs_exact_set() {
        let question = q("q1", QuestionKind::Multiple, vec![0, 2], 1);
        assert!(question.is_correct(&[2, 0]));
        assert!(!question.is_correct(&[0]));
        assert!(!question.is_correct(&[0, 1, 2]));
    }

    #[test]
    fn single_rejects_extra_choices() {
        let question = q("q1", QuestionKind::Single, vec![1], 1);
        assert!(question.is_correct(&[1]));
        assert!(!question.is_correct(&[1, 2]));
    }

    #[test]
    fn grading_weights_points() {
        let questions = vec![
            q("q1", QuestionKind::Single, vec![0], 3),
            q("q2", QuestionKind::TrueFalse, vec![1], 1),
        ];
        let mut answers = HashMap::new();
        answers.insert("q1".to_string(), vec![0]);
        answers.insert("q2".to_string(), vec![0]);
        let out = grade(&questions, &answers, 70);
        assert_eq!(out.points, 3);
        assert_eq!(out.max_points, 4);
        assert_eq!(out.score_percent, 75);
        assert!(out.passed);
    }

    #[test]
    fn unanswered_scores_zero() {
        let questions = vec![q("q1", QuestionKind::Single, vec![0], 1)];
        let out = grade(&questions, &HashMap::new(), 50);
        assert_eq!(out.score_percent, 0);
        assert!(!out.passed);
    }

    #[test]
    fn time_limit() {
        let start = Utc::now();
        assert!(time_limit_exceeded(start, start + Duration::minutes(11), Some(10)));
        assert!(!time_limit_exceeded(start, start + Duration::minutes(9), Some(10)));
        assert!(!time_limit_exceeded(start, start + Duration::days(3), None));
    }

    #[test]
    fn question_validation() {
        assert!(q("q", QuestionKind::Single, vec![0, 1], 1).validate().is_err());
        assert!(q("q", QuestionKind::Single, vec![9], 1).validate().is_err());
        assert!(q("q", QuestionKind::Multiple, vec![0, 1], 2).validate().is_ok());
        assert!(q("q", QuestionKind::TrueFalse, vec![0], 0).validate().is_err());
    }
}
