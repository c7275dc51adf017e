// Standard Library Imports
use std::{
    future::Future,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

// External Crate Imports
use color_eyre::{Result, eyre::Report};
use futures::future::join_all;
use tracing::{debug, warn};

// Local Crate Imports
use crate::notifications::Notifications;

// Public API ==========================================================================================================

#[derive(Clone, Debug, Default)]
pub struct BulkReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, Arc<Report>)>,
}

/// Runs `operation` on every item at once. Each unit succeeds or fails on its own (nothing is rolled back), and
/// `on_complete` is called exactly once, by whichever unit happens to finish last
pub async fn run_bulk<T, F, Fut>(
    items: impl IntoIterator<Item = (String, T)>,
    operation: F,
    on_complete: impl FnOnce(),
) -> BulkReport
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let items: Vec<_> = items.into_iter().collect();
    let pending = Pending::new(items.len(), on_complete);

    let units = items.into_iter().map(|(label, item)| {
        let unit = operation(item);
        let pending = &pending;
        async move {
            let result = unit.await;
            pending.finish_one();
            (label, result)
        }
    });

    let mut report = BulkReport::default();
    for (label, result) in join_all(units).await {
        match result {
            Ok(()) => report.succeeded.push(label),
            Err(error) => {
                warn!(%label, %error, "bulk operation failed");
                report.failed.push((label, Arc::new(error)));
            }
        }
    }

    debug!(
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        "bulk operation finished"
    );
    report
}

impl BulkReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.succeeded.is_empty() && self.failed.is_empty()
    }

    /// One notification per unit: `success(label)` for the ones that worked, `"{label}: {error}"` for the rest
    pub fn notify_each(&self, notifications: &Notifications, success: impl Fn(&str) -> String) {
        for label in &self.succeeded {
            notifications.success(success(label));
        }
        self.notify_failures(notifications);
    }

    /// A single notification covering every success, followed by one per failure
    pub fn notify_summary(&self, notifications: &Notifications, success: impl Fn(usize) -> String) {
        if !self.succeeded.is_empty() {
            notifications.success(success(self.succeeded.len()));
        }
        self.notify_failures(notifications);
    }
}

// Private Helper Code =================================================================================================

struct Pending<F> {
    remaining: AtomicUsize,
    on_complete: Mutex<Option<F>>,
}

impl<F: FnOnce()> Pending<F> {
    fn new(units: usize, on_complete: F) -> Self {
        let pending = Self {
            remaining: AtomicUsize::new(units),
            on_complete: Mutex::new(Some(on_complete)),
        };

        // With nothing to wait for, we're already done
        if units == 0 {
            pending.complete();
        }

        pending
    }

    fn finish_one(&self) {
        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.complete();
        }
    }

    fn complete(&self) {
        if let Some(on_complete) = self.on_complete.lock().unwrap().take() {
            on_complete();
        }
    }
}

impl BulkReport {
    fn notify_failures(&self, notifications: &Notifications) {
        for (label, error) in &self.failed {
            notifications.error(format!("{label}: {error}"));
        }
    }
}

// Unit Tests ==========================================================================================================
