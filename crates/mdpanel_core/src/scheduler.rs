//! Single-slot render scheduling.
//!
//! At most one render runs at a time. Requests arriving while the slot is
//! taken are dropped rather than queued, the next request after completion
//! simply carries the newest text. There is no cancellation.

use tokio::task::JoinHandle;

/// Outcome of [`RenderSupervisor::try_submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The job was started.
    Accepted,
    /// A job is still in flight (or its result not yet collected); the
    /// request was dropped.
    Busy,
}

/// Runs blocking render jobs one at a time on the blocking thread pool.
///
/// Results are collected with [`RenderSupervisor::completed`] on the owning
/// task, so whatever applies them runs on a single context.
#[derive(Debug)]
pub struct RenderSupervisor<T> {
    slot: Option<JoinHandle<T>>,
    dropped: u64,
}

impl<T> Default for RenderSupervisor<T> {
    fn default() -> Self {
        Self {
            slot: None,
            dropped: 0,
        }
    }
}

impl<T: Send + 'static> RenderSupervisor<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a job occupies the slot.
    pub fn is_busy(&self) -> bool {
        self.slot.is_some()
    }

    /// Number of requests dropped so far because the slot was taken.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Starts `job` if the slot is empty.
    ///
    /// Must be called from within a tokio runtime.
    pub fn try_submit<F>(&mut self, job: F) -> Submission
    where
        F: FnOnce() -> T + Send + 'static,
    {
        if self.slot.is_some() {
            self.dropped += 1;
            tracing::trace!(dropped = self.dropped, "Render in flight, request dropped");
            return Submission::Busy;
        }
        self.slot.replace(tokio::task::spawn_blocking(job));
        Submission::Accepted
    }

    /// Waits for the job in flight and frees the slot.
    ///
    /// Returns `None` immediately when the slot is empty, and `None` after
    /// freeing the slot if the job panicked. Cancel safe: dropping the future
    /// keeps the job in the slot.
    pub async fn completed(&mut self) -> Option<T> {
        let handle = self.slot.as_mut()?;
        let outcome = handle.await;
        self.slot.take();
        match outcome {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::error!(?err, "Render job failed");
                None
            }
        }
    }
}
