//! Side-by-side course comparison

use serde::Serialize;

use crate::shared::errors::{DomainError, DomainResult};

pub const MIN_COMPARE: usize = 2;
pub const MAX_COMPARE: usize = 4;

pub fn validate_selection(course_ids: &[String]) -> DomainResult<Vec<String>> {
    let mut ids: Vec<String> = Vec::with_capacity(course_ids.len());
    for id in course_ids {
        if !ids.contains(id) {
            ids.push(id.clone());
        }
    }
    if !(MIN_COMPARE..=MAX_COMPARE).contains(&ids.len()) {
        return Err(DomainError::validation(format!(
            "Select between {} and {} distinct courses to compare",
            MIN_COMPARE, MAX_COMPARE
        )));
    }
    Ok(ids)
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRow {
    pub course_id: String,
    pub title: String,
    pub price_cents: i64,
    pub monetization_type: String,
    pub level: String,
    pub lesson_count: u64,
    pub total_duration_seconds: i64,
    pub enrollment_count: u64,
    pub rating_average: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparisonHighlights {
    pub cheapest: Option<String>,
    pub best_rated: Option<String>,
    pub longest: Option<String>,
}

fn pick_best<F>(rows: &[ComparisonRow], better: F) -> Option<String>
where
    F: Fn(&ComparisonRow, &ComparisonRow) -> bool,
{
    let mut best: Option<&ComparisonRow> = None;
    for row in rows {
        match best {
            Some(b) if !better(row, b) => {}
            _ => best = Some(row),
        }
    }
    best.map(|r| r.course_id.clone())
}

/// Ties resolve to the first row in selection order.
pub fn highlights(rows: &[ComparisonRow]) -> ComparisonHighlights {
    ComparisonHighlights {
        cheapest: pick_best(rows, |a, b| a.price_cents < b.price_cents),
        best_rated: pick_best(rows, |a, b| a.rating_average > b.rating_average),
        longest: pick_best(rows, |a, b| a.total_duration_seconds > b.total_duration_seconds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, price: i64, rating: f64, duration: i64) -> ComparisonRow {
        ComparisonRow {
            course_id: id.into(),
            title: id.into(),
            price_cents: price,
            monetization_type: "PREMIUM".into(),
            level: "BEGINNER".into(),
            lesson_count: 1,
            total_duration_seconds: duration,
            enrollment_count: 0,
            rating_average: rating,
        }
    }

    #[test]
    fn selection_size() {
        assert!(validate_selection(&["a".into()]).is_err());
        assert!(validate_selection(&["a".into(), "a".into()]).is_err());
        assert_eq!(validate_selection(&["a".into(), "b".into()]).unwrap().len(), 2);
        let five: Vec<String> = (0..5).map(|i| i.to_string()).collect();
        assert!(validate_selection(&five).is_err());
    }

    #[test]
    fn picks_highlights() {
        let rows = vec![row("a", 1_000, 4.5, 600), row("b", 500, 4.5, 900), row("c", 500, 3.0, 100)];
        let h = highlights(&rows);
        assert_eq!(h.cheapest.as_deref(), Some("b"));
        assert_eq!(h.best_rated.as_deref(), Some("a"));
        assert_eq!(h.longest.as_deref(), Some("b"));
    }
}
