//! Exponential backoff for `Transient` errors at suspension-point calls
//! (object-store fetch, embedder batch, index upsert), per `spec.md` §5:
//! "base 0.5s, factor 2, max 3 retries; after retries the operation
//! surfaces a typed error."
//!
//! The rest of this crate realises the suspension-point model with plain
//! synchronous trait calls run on a `rayon`/`std::thread` worker pool
//! rather than an async runtime — every injected capability
//! (`ObjectStore`, `TextEmbedder`, `VectorStore`, `LexicalStore`) is a sync
//! call in both its production and fake form, so there is no async I/O to
//! await here. `std::thread::sleep` between attempts is therefore the
//! idiomatic backoff primitive, not a stand-in for a missing runtime.

use crate::error::{Error, Result};
use std::thread;
use std::time::Duration;
use tracing::{error, warn};

const BASE: Duration = Duration::from_millis(500);
const FACTOR: u32 = 2;
const MAX_RETRIES: u32 = 3;

/// Runs `op`, retrying with exponential backoff while the returned error
/// classifies as [`crate::error::ErrorKind::Transient`]. Any other error
/// kind propagates immediately without a retry. After [`MAX_RETRIES`]
/// attempts the last error is returned.
///
/// # Errors
///
/// Returns the last error `op` produced once retries are exhausted, or
/// immediately for any non-`Transient` error.
pub fn with_retry<T>(label: &str, op: impl FnMut() -> Result<T>) -> Result<T> {
    with_retry_cfg(label, BASE, FACTOR, MAX_RETRIES, op)
}

/// [`with_retry`] with an injectable base delay/factor/retry count, so
/// tests can exercise the retry/exhaustion paths without real sleeps.
///
/// # Errors
///
/// Same as [`with_retry`].
pub fn with_retry_cfg<T>(
    label: &str,
    base: Duration,
    factor: u32,
    max_retries: u32,
    mut op: impl FnMut() -> Result<T>,
) -> Result<T> {
    let mut attempt = 0_u32;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < max_retries => {
                let delay = base * factor.pow(attempt);
                warn!(label, attempt, delay_ms = delay.as_millis() as u64, error = %err, "retrying after transient error");
                thread::sleep(delay);
                attempt += 1;
            }
            Err(err) => {
                if err.is_retryable() {
                    error!(label, attempts = attempt, error = %err, "retries exhausted");
                }
                return Err(err);
            }
        }
    }
}
