pub mod best_effort;
pub mod retry;

pub use best_effort::best_effort;
pub use retry::{retry_with_backoff, RetryConfig};
