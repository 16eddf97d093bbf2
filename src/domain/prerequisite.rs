//! Prerequisite graph
//!
//! An edge `(course, prerequisite)` means `course` requires `prerequisite`.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::shared::errors::{DomainError, DomainResult};

/// Would adding `course -> prerequisite` close a cycle?
///
/// True when `course` is already reachable from `prerequisite` by following
/// existing requirement edges.
pub fn would_create_cycle(edges: &[(String, String)], course: &str, prerequisite: &str) -> bool {
    if course == prerequisite {
        return true;
    }

    let mut requires: HashMap<&str, Vec<&str>> = HashMap::new();
    for (c, p) in edges {
        requires.entry(c.as_str()).or_default().push(p.as_str());
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    queue.push_back(prerequisite);

    while let Some(node) = queue.pop_front() {
        if node == course {
            return true;
        }
        if !seen.insert(node) {
            continue;
        }
        if let Some(next) = requires.get(node) {
            queue.extend(next.iter().copied());
        }
    }
    false
}

pub fn validate_new_edge(
    edges: &[(String, String)],
    course: &str,
    prerequisite: &str,
) -> DomainResult<()> {
    if course == prerequisite {
        return Err(DomainError::validation("A course cannot require itself"));
    }
    if edges.iter().any(|(c, p)| c == course && p == prerequisite) {
        return Err(DomainError::Conflict("Prerequisite already exists".to_string()));
    }
    if would_create_cycle(edges, course, prerequisite) {
        return Err(DomainError::validation(
            "Adding this prerequisite would create a circular dependency",
        ));
    }
    Ok(())
}

/// Prerequisites of `course` not contained in `completed`.
pub fn missing_prerequisites(
    required: &[String],
    completed: &HashSet<String>,
) -> Vec<String> {
    required
        .iter()
        .filter(|p| !completed.contains(*p))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(c: &str, p: &str) -> (String, String) {
        (c.to_string(), p.to_string())
    }

    #[test]
    fn direct_cycle_is_detected() {
        let edges = vec![e("b", "a")];
        assert!(would_create_cycle(&edges, "a", "b"));
    }

    #[test]
    fn transitive_cycle_is_detected() {
        // c requires b, b requires a; a requiring c closes the loop
        let edges = vec![e("c", "b"), e("b", "a")];
        assert!(would_create_cycle(&edges, "a", "c"));
        assert!(!would_create_cycle(&edges, "d", "c"));
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let edges = vec![e("d", "b"), e("d", "c"), e("b", "a"), e("c", "a")];
        assert!(!would_create_cycle(&edges, "e", "d"));
        assert!(validate_new_edge(&edges, "c", "b").is_ok());
    }

    #[test]
    fn self_and_duplicate_edges_rejected() {
        let edges = vec![e("b", "a")];
        assert!(validate_new_edge(&edges, "a", "a").is_err());
        assert!(matches!(
            validate_new_edge(&edges, "b", "a"),
            Err(DomainError::Conflict(_))
        ));
    }

    #[test]
    fn missing_list() {
        let done: HashSet<String> = ["a".to_string()].into_iter().collect();
        let missing = missing_prerequisites(&["a".into(), "b".into()], &done);
        assert_eq!(missing, vec!["b".to_string()]);
    }
}
