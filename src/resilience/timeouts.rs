//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap the upstream call with a deadline
//! - Cancel the call cleanly on expiry
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; expiry drops the wrapped future, which
//!   releases its connection
//! - Timeout errors are distinct from other errors
//! - Timed-out requests return 504 Gateway Timeout

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// The wrapped operation did not finish in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline of {0:?} exceeded")]
pub struct DeadlineExceeded(pub Duration);

/// Run `fut` to completion or give up after `deadline`.
pub async fn with_deadline<F>(deadline: Duration, fut: F) -> Result<F::Output, DeadlineExceeded>
where
    F: Future,
{
    tokio::time::timeout(deadline, fut)
        .await
        .map_err(|_| DeadlineExceeded(deadline))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_completes_in_time() {
        let out = with_deadline(Duration::from_secs(1), async { 7 }).await;
        assert_eq!(out, Ok(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expires_and_drops_future() {
        struct Flag(Arc<AtomicBool>);
        impl Drop for Flag {
            fn drop(&mut self) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let dropped = Arc::new(AtomicBool::new(false));
        let flag = Flag(dropped.clone());
        let slow = async move {
            let _flag = flag;
            tokio::time::sleep(Duration::from_secs(60)).await;
        };

        let out = with_deadline(Duration::from_secs(25), slow).await;
        assert_eq!(out, Err(DeadlineExceeded(Duration::from_secs(25))));
        assert!(dropped.load(Ordering::SeqCst), "timed-out future must be dropped");
    }
}
