/// Share of a video that must be watched before the lesson counts as completed.
pub const COMPLETION_THRESHOLD_PERCENT: i64 = 90;

pub fn watched_enough(position_seconds: i64, duration_seconds: i64) -> bool {
    duration_seconds > 0 && position_seconds.max(0) * 100 >= duration_seconds * COMPLETION_THRESHOLD_PERCENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ninety_percent_completes() {
        assert!(watched_enough(90, 100));
        assert!(!watched_enough(89, 100));
        assert!(!watched_enough(10, 0));
    }
}
