//! Paced, retrying parallel uploads

pub mod coordinator;
pub mod rate_limiter;
pub mod retry;
pub mod task;

pub use coordinator::{plan_uploads, worker_count, Coordinator, RunOutcome, UploadSummary};
pub use rate_limiter::RateLimiter;
pub use retry::{Attempted, RetryOutcome, RetryPolicy};
pub use task::{UploadResult, UploadTask};
