//! Debounced draft persistence
//!
//! Observes a form's value stream and, once the stream has been quiet for
//! the debounce window, writes the configured fields to storage. Each change
//! restarts the window, so a burst of edits produces a single write timed
//! from the last edit.

use super::snapshot::{self, DraftSpec};
use super::storage::DraftStorage;
use crate::validation::FieldValue;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// Quiet period before a draft is written
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Starts draft observers for one form type
#[derive(Clone)]
pub struct DraftPersister {
    storage: Arc<dyn DraftStorage>,
    spec: DraftSpec,
    window: Duration,
}

impl DraftPersister {
    pub fn new(storage: Arc<dyn DraftStorage>, spec: DraftSpec) -> Self {
        Self {
            storage,
            spec,
            window: DEFAULT_DEBOUNCE,
        }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn spec(&self) -> &DraftSpec {
        &self.spec
    }

    /// Start observing `changes` on the current runtime.
    ///
    /// The observer runs until the returned subscription is cancelled or
    /// dropped, or until the sending side of `changes` goes away.
    pub fn observe(&self, changes: watch::Receiver<FieldValue>) -> DraftSubscription {
        let task = tokio::spawn(debounce_writes(
            changes,
            Arc::clone(&self.storage),
            self.spec.clone(),
            self.window,
        ));
        tracing::debug!(key = %self.spec.key, window = ?self.window, "Observing form for drafts");
        DraftSubscription {
            task: Some(task),
            key: self.spec.key.clone(),
        }
    }
}

async fn debounce_writes(
    mut changes: watch::Receiver<FieldValue>,
    storage: Arc<dyn DraftStorage>,
    spec: DraftSpec,
    window: Duration,
) {
    loop {
        if changes.changed().await.is_err() {
            return;
        }

        let quiet = time::sleep(window);
        tokio::pin!(quiet);
        loop {
            tokio::select! {
                changed = changes.changed() => {
                    if changed.is_err() {
                        tracing::debug!(key = %spec.key, "Value stream closed, dropping pending draft");
                        return;
                    }
                    quiet.as_mut().reset(Instant::now() + window);
                }
                () = &mut quiet => break,
            }
        }

        let value = changes.borrow_and_update().clone();
        match snapshot::save(storage.as_ref(), &spec, &value) {
            Ok(()) => tracing::debug!(key = %spec.key, "Draft saved"),
            Err(err) => tracing::warn!("Draft not saved, continuing: {err}"),
        }
    }
}

/// Handle to a running draft observer.
///
/// Cancelling or dropping it stops the observer and discards any pending
/// timer. On a current-thread runtime the observer cannot be mid-write while
/// this runs, so no write happens after teardown.
#[derive(Debug)]
pub struct DraftSubscription {
    task: Option<JoinHandle<()>>,
    key: String,
}

impl DraftSubscription {
    pub fn cancel(mut self) {
        self.stop();
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!(key = %self.key, "Stopped observing form for drafts");
        }
    }
}

impl Drop for DraftSubscription {
    fn drop(&mut self) {
        self.stop();
    }
}
