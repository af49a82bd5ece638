pub mod request_id;
pub mod retry;

pub use request_id::{request_id_middleware, REQUEST_ID_HEADER};
pub use retry::{is_lock_contention, with_retry, RetryConfig, RetryPolicy, WriteContentionPolicy};
