// Standard Library Imports
use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};

// External Crate Imports
use color_eyre::{
    Result,
    eyre::{Report, eyre},
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

// Local Crate Imports
use crate::{
    bulk::run_bulk,
    file::Metadata,
    notifications::Notifications,
    refresh::Refresh,
    spreadsheet::{TagRow, read_tag_rows},
    store::{Store, Tags},
};

// Public API ==========================================================================================================

/// Bytes handed to the network so far, out of the total. Clones share the same counters
#[derive(Clone, Debug, Default)]
pub struct Progress {
    sent: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
}

#[derive(Clone, Debug, Default)]
pub enum Status {
    #[default]
    Idle,
    Checking,
    Uploading(Progress),
    Tagging(usize),
    Completed(Duration),
    Failed(Arc<Report>, Duration),
    Cancelled,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Outcome {
    Completed,
    Cancelled,
}

/// Everything needed to create one file on the server
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct UploadRequest {
    pub name: String,
    pub metadata: Metadata,
    pub body: Vec<u8>,
}

/// A single, abortable upload. Clones share the same status and can abort each other
#[derive(Clone, Debug, Default)]
pub struct Upload {
    status: Arc<Mutex<Status>>,
    cancel: CancellationToken,
}

impl Progress {
    pub fn start(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        self.sent.store(0, Ordering::Relaxed);
    }

    pub fn advance(&self, bytes: usize) {
        self.sent.fetch_add(bytes, Ordering::Relaxed);
    }

    #[must_use]
    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Whole percent sent, capped at 100
    #[must_use]
    pub fn percent(&self) -> usize {
        match self.total() {
            0 => 100,
            total => (self.sent() * 100 / total).min(100),
        }
    }
}

impl Status {
    #[must_use]
    pub const fn running(&self) -> bool {
        matches!(self, Self::Checking | Self::Uploading(_) | Self::Tagging(_))
    }
}

impl Upload {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status.lock().unwrap().clone()
    }

    /// Stops the upload if the file hasn't been created yet. An upload that hasn't started will be cancelled as soon
    /// as it's run
    pub fn abort(&self) {
        self.cancel.cancel();
    }

    /// Uploads `request` unless a file with the same name already exists, then applies tags if the file turns out to
    /// be a tagging spreadsheet. Success and failure are both reported through `notifications`, and `refresh` is
    /// bumped once a file has actually been created
    pub async fn run<S: Store + ?Sized>(
        &self,
        store: &S,
        request: UploadRequest,
        notifications: &Notifications,
        refresh: &Refresh,
    ) -> Result<Outcome> {
        if !matches!(self.status(), Status::Idle) {
            return Err(eyre!(
                "this upload has already been started, each `Upload` can only be run once"
            ));
        }

        let started_at = Instant::now();
        let name = request.name.clone();

        // NOTE: Aborting only stops things up to the point the file is created. From then on, tags and the refresh always
        // go ahead
        let transferred = tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            result = self.transfer(store, request) => Some(result),
        };

        let result = match transferred {
            None => Ok(Outcome::Cancelled),
            Some(Err(error)) => Err(error),
            Some(Ok(tag_rows)) => {
                self.finish(store, &name, tag_rows, notifications, refresh)
                    .await;
                Ok(Outcome::Completed)
            }
        };

        match &result {
            Ok(Outcome::Completed) => {
                info!(%name, elapsed = ?started_at.elapsed(), "upload complete");
                self.set_status(Status::Completed(started_at.elapsed()));
            }
            Ok(Outcome::Cancelled) => {
                info!(%name, "upload cancelled");
                self.set_status(Status::Cancelled);
            }
            Err(error) => {
                warn!(%name, %error, "upload failed");
                notifications.error(format!("{name}: {error}"));
                self.set_status(Status::Failed(
                    Arc::new(eyre!("{error}")),
                    started_at.elapsed(),
                ));
            }
        }

        result
    }
}

// NOTE: Two `Upload`s are equal when they're handles to the same upload, regardless of where that upload has got to
impl PartialEq for Upload {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.status, &other.status)
    }
}

// Private Helper Code =================================================================================================

impl Upload {
    fn set_status(&self, status: Status) {
        *self.status.lock().unwrap() = status;
    }

    /// Creates the file, handing back whatever came of reading it as a tagging spreadsheet
    async fn transfer<S: Store + ?Sized>(
        &self,
        store: &S,
        UploadRequest {
            name,
            metadata,
            body,
        }: UploadRequest,
    ) -> Result<Result<Option<Vec<TagRow>>>> {
        self.set_status(Status::Checking);
        if store.resource_exists(&name).await? {
            return Err(eyre!("File already exists"));
        }

        // NOTE: The spreadsheet is read before the body is handed over to the store, but any problems reading it are
        // only reported once the file itself has been uploaded
        let tag_rows = read_tag_rows(&name, &body);

        let progress = Progress::default();
        self.set_status(Status::Uploading(progress.clone()));
        store.put_file(&name, &metadata, body, &progress).await?;

        Ok(tag_rows)
    }

    async fn finish<S: Store + ?Sized>(
        &self,
        store: &S,
        name: &str,
        tag_rows: Result<Option<Vec<TagRow>>>,
        notifications: &Notifications,
        refresh: &Refresh,
    ) {
        notifications.success(format!("{name}: Uploaded"));

        match tag_rows {
            Ok(Some(rows)) => self.apply_tags(store, rows, notifications).await,
            Ok(None) => {}
            Err(error) => {
                notifications.error(format!("{name}: {error}"));
            }
        }

        refresh.bump();
    }

    async fn apply_tags<S: Store + ?Sized>(
        &self,
        store: &S,
        rows: Vec<TagRow>,
        notifications: &Notifications,
    ) {
        self.set_status(Status::Tagging(rows.len()));

        let rows = rows.into_iter().map(|row| (row.label(), row));
        let report = run_bulk(
            rows,
            |row| async move {
                row.validate()?;
                let tags = Tags::from([(row.tag_name, true)]);
                store.update_tags(&row.id, &tags).await
            },
            || {},
        )
        .await;

        report.notify_summary(notifications, |count| {
            format!("Tags applied to {count} device(s)")
        });
    }
}

// Unit Tests ==========================================================================================================
