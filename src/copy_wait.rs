//! Polling wait loop for asynchronous server-side copies.
//!
//! The store exposes no completion callback for server-side copies, so the
//! only correctness-preserving option is to poll the target's copy state. The
//! short fixed interval bounds latency overhead without saturating the store
//! with status requests.

use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::container::{BlobContainer, CopyStatus};
use crate::errors::{CopyError, StoreResult};

/// Fixed interval between copy-status reads.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Cancellation signal for an in-flight wait. The wait stops with
/// [`CopyError::Interrupted`] when the paired sender sends or is dropped.
pub type CancelSignal = watch::Receiver<()>;

/// Options bounding a copy wait
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Interval between status reads
    pub poll_interval: Duration,
    /// Overall deadline; expiry yields [`CopyError::Timeout`]. `None` means
    /// the wait is bounded only by the remote side completing or failing.
    pub deadline: Option<Duration>,
    /// Cooperative cancellation signal
    pub cancel: Option<CancelSignal>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            deadline: None,
            cancel: None,
        }
    }
}

impl WaitOptions {
    /// Bound the wait by an overall deadline
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Attach a cancellation signal
    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Wait until the copy targeting `key` reaches a terminal state.
///
/// Loops while the state is `Unspecified` or `Pending`, sleeping
/// `poll_interval` between reads. Returns `Ok(())` only on `Success`; any
/// other terminal state yields [`CopyError::Failed`]. Interruption and
/// deadline expiry are reported to the caller, never swallowed.
pub async fn wait_for_copy(
    container: &dyn BlobContainer,
    key: &str,
    options: &WaitOptions,
) -> StoreResult<()> {
    let started = Instant::now();
    let mut cancel = options.cancel.clone();

    loop {
        let status = container.copy_status(key).await?;

        if status.is_terminal() {
            if status == CopyStatus::Success {
                debug!(key, elapsed = ?started.elapsed(), "server-side copy completed");
                return Ok(());
            }
            warn!(key, ?status, "server-side copy failed");
            return Err(CopyError::Failed { status }.into());
        }

        if let Some(limit) = options.deadline {
            if started.elapsed() >= limit {
                warn!(key, waited = ?started.elapsed(), "copy wait deadline expired");
                return Err(CopyError::Timeout {
                    waited: started.elapsed(),
                }
                .into());
            }
        }

        match cancel.as_mut() {
            Some(rx) => {
                tokio::select! {
                    _ = sleep(options.poll_interval) => {}
                    _ = rx.changed() => {
                        warn!(key, "copy wait interrupted");
                        return Err(CopyError::Interrupted.into());
                    }
                }
            }
            None => sleep(options.poll_interval).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ObjectMeta;
    use crate::errors::StoreError;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    /// Container stub answering copy-status reads from a scripted sequence.
    struct ScriptedContainer {
        statuses: Mutex<VecDeque<CopyStatus>>,
        polls: AtomicUsize,
    }

    impl ScriptedContainer {
        fn new(statuses: Vec<CopyStatus>) -> Self {
            Self {
                statuses: Mutex::new(statuses.into()),
                polls: AtomicUsize::new(0),
            }
        }

        fn polls(&self) -> usize {
            self.polls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BlobContainer for ScriptedContainer {
        async fn container_exists(&self) -> StoreResult<bool> {
            unimplemented!()
        }
        async fn create_container(&self) -> StoreResult<()> {
            unimplemented!()
        }
        async fn exists(&self, _key: &str) -> StoreResult<bool> {
            unimplemented!()
        }
        async fn put(&self, _key: &str, _data: Bytes) -> StoreResult<()> {
            unimplemented!()
        }
        async fn get(&self, _key: &str) -> StoreResult<Bytes> {
            unimplemented!()
        }
        async fn delete(&self, _key: &str) -> StoreResult<()> {
            unimplemented!()
        }
        async fn list(&self, _prefix: &str) -> StoreResult<Vec<ObjectMeta>> {
            unimplemented!()
        }
        async fn start_copy(&self, _from_key: &str, _to_key: &str) -> StoreResult<()> {
            unimplemented!()
        }
        async fn copy_status(&self, _key: &str) -> StoreResult<CopyStatus> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            let mut statuses = self.statuses.lock().await;
            // Past the end of the script the last state repeats.
            Ok(statuses.pop_front().unwrap_or(CopyStatus::Pending))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_pending_states_with_one_poll_each() {
        let container = ScriptedContainer::new(vec![
            CopyStatus::Pending,
            CopyStatus::Pending,
            CopyStatus::Success,
        ]);

        wait_for_copy(&container, "databases/db-1", &WaitOptions::default())
            .await
            .unwrap();

        // One poll per non-terminal state plus the terminal read.
        assert_eq!(container.polls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn unspecified_counts_as_non_terminal() {
        let container = ScriptedContainer::new(vec![
            CopyStatus::Unspecified,
            CopyStatus::Pending,
            CopyStatus::Success,
        ]);

        wait_for_copy(&container, "k", &WaitOptions::default())
            .await
            .unwrap();
        assert_eq!(container.polls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_failure_is_reported() {
        let container = ScriptedContainer::new(vec![CopyStatus::Pending, CopyStatus::Failed]);

        let err = wait_for_copy(&container, "k", &WaitOptions::default())
            .await
            .unwrap_err();
        match err {
            StoreError::Copy(CopyError::Failed { status }) => {
                assert_eq!(status, CopyStatus::Failed)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn aborted_copy_is_a_failure() {
        let container = ScriptedContainer::new(vec![CopyStatus::Aborted]);

        let err = wait_for_copy(&container, "k", &WaitOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Copy(CopyError::Failed { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_expiry_yields_timeout() {
        let container = ScriptedContainer::new(vec![]);
        let options = WaitOptions::default().with_deadline(Duration::from_millis(250));

        let err = wait_for_copy(&container, "k", &options).await.unwrap_err();
        assert!(matches!(err, StoreError::Copy(CopyError::Timeout { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_yields_interrupted() {
        let container = ScriptedContainer::new(vec![]);
        let (tx, rx) = watch::channel(());
        let options = WaitOptions::default().with_cancel(rx);

        let wait = tokio::spawn(async move {
            wait_for_copy(&container, "k", &options).await
        });
        // Let the waiter reach its sleep, then signal.
        tokio::task::yield_now().await;
        tx.send(()).unwrap();

        let err = wait.await.unwrap().unwrap_err();
        assert!(matches!(err, StoreError::Copy(CopyError::Interrupted)));
    }
}
