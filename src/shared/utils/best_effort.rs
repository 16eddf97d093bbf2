//! Secondary side effects (emails, earnings, referral tracking, cache
//! invalidation) must never fail the primary operation.

use std::future::Future;

use tracing::warn;

/// Await `fut` and log its error instead of propagating it.
///
/// Returns the value on success so callers can still use it when present.
pub async fn best_effort<T, E, Fut>(action: &'static str, fut: Fut) -> Option<T>
where
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    match fut.await {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(action, error = %e, "Best-effort side effect failed");
            metrics::counter!("side_effect_failures_total", "action" => action).increment(1);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn swallows_errors() {
        let out = best_effort("email", async { Err::<(), _>("smtp down") }).await;
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn passes_values_through() {
        let out = best_effort("earnings", async { Ok::<_, String>(42) }).await;
        assert_eq!(out, Some(42));
    }
}
