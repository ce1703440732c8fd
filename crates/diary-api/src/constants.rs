//! API constants

/// Maximum requests processed concurrently before new ones queue
pub const HTTP_CONCURRENCY_LIMIT: usize = 256;

/// Room for the text fields and multipart framing on top of the image itself
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Timeout for the database ping in readiness checks
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
