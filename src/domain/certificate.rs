use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// First 16 hex characters of SHA-256 over `student|course|issued_at`.
pub fn verification_code(student_id: &str, course_id: &str, issued_at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}|{}|{}", student_id, course_id, issued_at.to_rfc3339()).as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..16].to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn code_is_stable_and_sixteen_chars() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let a = verification_code("s1", "c1", at);
        let b = verification_code("s1", "c1", at);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, verification_code("s2", "c1", at));
    }
}
