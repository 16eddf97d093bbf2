//! Course recommendation scoring
//!
//! Three signals, each normalised to `[0, 1]`, are blended with configurable
//! weights: collaborative (co-enrollment), content (tag/category overlap) and
//! popularity (enrollments blended with rating).

use std::collections::{HashMap, HashSet};

use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct Weights {
    pub collaborative: f64,
    pub content: f64,
    pub popularity: f64,
}

/// Everything known about one candidate course.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub course_id: String,
    pub features: HashSet<String>,
    pub enrollment_count: u64,
    pub rating_average: f64,
    /// Students enrolled in this course
    pub students: HashSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Reason {
    Collaborative,
    Content,
    Popularity,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collaborative => "collaborative",
            Self::Content => "content",
            Self::Popularity => "popularity",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "collaborative" => Some(Self::Collaborative),
            "content" => Some(Self::Content),
            "popularity" => Some(Self::Popularity),
            _ => None,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Collaborative => "Students like you also enrolled",
            Self::Content => "Similar to courses you are taking",
            Self::Popularity => "Popular with learners",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Scored {
    pub course_id: String,
    pub score: f64,
    pub collaborative: f64,
    pub content: f64,
    pub popularity: f64,
    pub reason: Reason,
}

pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    inter / union
}

/// Students sharing at least one enrolled course with the target student.
pub fn peers(
    student_courses: &HashSet<String>,
    enrollments_by_course: &HashMap<String, HashSet<String>>,
    student_id: &str,
) -> HashSet<String> {
    student_courses
        .iter()
        .filter_map(|c| enrollments_by_course.get(c))
        .flat_map(|s| s.iter())
        .filter(|s| s.as_str() != student_id)
        .cloned()
        .collect()
}

/// Score candidates; sorted by score descending, ties by course id.
///
/// With an empty `profile` (no enrollments) the student is cold and only
/// popularity is used.
pub fn score(
    candidates: &[Candidate],
    profile: &HashSet<String>,
    peers: &HashSet<String>,
    weights: Weights,
) -> Vec<Scored> {
    let cold = profile.is_empty() && peers.is_empty();

    let collab_raw: Vec<f64> = candidates
        .iter()
        .map(|c| c.students.intersection(peers).count() as f64)
        .collect();
    let collab_max = collab_raw.iter().copied().fold(0.0, f64::max);
    let enroll_max = candidates
        .iter()
        .map(|c| c.enrollment_count)
        .max()
        .unwrap_or(0) as f64;

    let mut out: Vec<Scored> = candidates
        .iter()
        .zip(collab_raw)
        .map(|(c, raw)| {
            let collaborative = if collab_max > 0.0 { raw / collab_max } else { 0.0 };
            let content = jaccard(&c.features, profile);
            let enroll_norm = if enroll_max > 0.0 {
                c.enrollment_count as f64 / enroll_max
            } else {
                0.0
            };
            let rating_norm = (c.rating_average / 5.0).clamp(0.0, 1.0);
            let popularity = (enroll_norm + rating_norm) / 2.0;

            let score = if cold {
                popularity
            } else {
                weights.collaborative * collaborative
                    + weights.content * content
                    + weights.popularity * popularity
            }
            .max(0.0);

            let reason = if cold {
                Reason::Popularity
            } else {
                dominant(
                    weights.collaborative * collaborative,
                    weights.content * content,
                    weights.popularity * popularity,
                )
            };

            Scored {
                course_id: c.course_id.clone(),
                score,
                collaborative,
                content,
                popularity,
                reason,
            }
        })
        .collect();

    out.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.course_id.cmp(&b.course_id))
    });
    out
}

fn dominant(collaborative: f64, content: f64, popularity: f64) -> Reason {
    if collaborative >= content && collaborative >= popularity && collaborative > 0.0 {
        Reason::Collaborative
    } else if content >= popularity && content > 0.0 {
        Reason::Content
    } else {
        Reason::Popularity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn cand(id: &str, features: &[&str], enrollments: u64, rating: f64, students: &[&str]) -> Candidate {
        Candidate {
            course_id: id.into(),
            features: set(features),
            enrollment_count: enrollments,
            rating_average: rating,
            students: set(students),
        }
    }

    const W: Weights = Weights {
        collaborative: 0.5,
        content: 0.3,
        popularity: 0.2,
    };

    #[test]
    fn jaccard_overlap() {
        assert_eq!(jaccard(&set(&["a", "b"]), &set(&["b", "c"])), 1.0 / 3.0);
        assert_eq!(jaccard(&set(&[]), &set(&[])), 0.0);
    }

    #[test]
    fn scores_sorted_and_non_negative() {
        let candidates = vec![
            cand("x", &["rust"], 10, 4.0, &["p1", "p2"]),
            cand("y", &["cooking"], 50, 5.0, &[]),
            cand("z", &["rust", "systems"], 1, 0.0, &["p1"]),
        ];
        let scored = score(&candidates, &set(&["rust", "systems"]), &set(&["p1", "p2"]), W);
        assert_eq!(scored.len(), 3);
        assert!(scored.iter().all(|s| s.score >= 0.0));
        assert!(scored.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(scored[0].course_id, "x");
        assert_eq!(scored[0].reason, Reason::Collaborative);
    }

    #[test]
    fn cold_start_uses_popularity() {
        let candidates = vec![cand("a", &["x"], 1, 3.0, &[]), cand("b", &["y"], 9, 4.5, &[])];
        let scored = score(&candidates, &HashSet::new(), &HashSet::new(), W);
        assert_eq!(scored[0].course_id, "b");
        assert!(scored.iter().all(|s| s.reason == Reason::Popularity));
        assert!((scored[0].score - scored[0].popularity).abs() < 1e-9);
    }

    #[test]
    fn peers_exclude_self() {
        let mut by_course = HashMap::new();
        by_course.insert("c1".to_string(), set(&["me", "p1"]));
        by_course.insert("c2".to_string(), set(&["p2"]));
        let p = peers(&set(&["c1"]), &by_course, "me");
        assert_eq!(p, set(&["p1"]));
    }
}
