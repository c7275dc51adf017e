// Standard Library Imports
use std::sync::Arc;

// External Crate Imports
use color_eyre::{Result, eyre::eyre};
use futures::try_join;
use tracing::{debug, info};

// Local Crate Imports
use crate::{
    access::{AccessLevel, Permissions},
    bulk::{BulkReport, run_bulk},
    file::FileRecord,
    form::NewFileForm,
    notifications::Notifications,
    refresh::Refresh,
    route::FilesRoute,
    store::{HttpStore, Store},
    upload::{Outcome, Upload},
};

// Public API ==========================================================================================================

/// One screenful of the files table
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Listing {
    pub records: Vec<FileRecord>,
    pub total: usize,
}

/// The files admin page: lists, filters, uploads and deletes files through a `Store`
#[derive(Debug)]
pub struct FilesPage<S> {
    store: Arc<S>,
    permissions: Permissions,
    page_size: usize,
    notifications: Notifications,
    refresh: Refresh,
}

impl<S: Store> FilesPage<S> {
    pub const RESOURCE: &str = "files";

    /// Opens the page, provided `permissions` allow files to be read at all
    pub fn init(store: S, permissions: Permissions, page_size: usize) -> Result<Self> {
        if !permissions.has_access(Self::RESOURCE, AccessLevel::Read) {
            return Err(eyre!("not authorized to view {}", Self::RESOURCE));
        }

        if page_size == 0 {
            return Err(eyre!("the page size must be at least 1"));
        }

        Ok(Self {
            store: Arc::new(store),
            permissions,
            page_size,
            notifications: Notifications::new(),
            refresh: Refresh::new(),
        })
    }

    #[must_use]
    pub fn can_write(&self) -> bool {
        self.permissions
            .has_access(Self::RESOURCE, AccessLevel::Write)
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// "Show more" grows the table by a page at a time
    #[must_use]
    pub const fn next_show_count(&self, show_count: usize) -> usize {
        show_count.saturating_add(self.page_size)
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    #[must_use]
    pub const fn refresh(&self) -> &Refresh {
        &self.refresh
    }

    /// Fetches up to `show_count` matching files along with the total number of matches
    pub async fn load(&self, route: &FilesRoute, show_count: usize) -> Result<Listing> {
        debug!(query = %route.to_query(), show_count, "loading files");
        let (records, total) = try_join!(
            self.store.fetch(&route.filter, &route.sort, show_count),
            self.store.count(&route.filter),
        )?;

        Ok(Listing { records, total })
    }

    /// Deletes every file in `ids` in parallel, reporting each one, and refreshes the table once they're all done
    pub async fn delete(&self, ids: Vec<String>) -> Result<BulkReport> {
        self.require_write()?;
        info!(files = ids.len(), "deleting files");

        let store = &*self.store;
        let report = run_bulk(
            ids.into_iter().map(|id| (id.clone(), id)),
            |id| async move { store.delete_resource(&id).await },
            || {
                self.refresh.bump();
            },
        )
        .await;

        report.notify_each(&self.notifications, |id| format!("{id}: Deleted"));
        Ok(report)
    }

    /// Uploads the file selected in `form` through `upload`, which the caller keeps hold of so it can be aborted
    pub async fn create(&self, form: NewFileForm, upload: &Upload) -> Result<Outcome> {
        self.require_write()?;

        let request = match form.into_request().await {
            Ok(request) => request,
            Err(error) => {
                self.notifications.error(error.to_string());
                return Err(error);
            }
        };

        upload
            .run(&*self.store, request, &self.notifications, &self.refresh)
            .await
    }
}

impl FilesPage<HttpStore> {
    #[must_use]
    pub fn csv_export_url(&self, route: &FilesRoute) -> String {
        self.store.csv_export_url(&route.filter)
    }

    #[must_use]
    pub fn download_url(&self, id: &str) -> String {
        self.store.blob_url(id)
    }
}

/// What to ask before deleting `ids`
#[must_use]
pub fn delete_prompt(ids: &[String]) -> String {
    format!("Deleting {} files. Are you sure?", ids.len())
}

impl Listing {
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.records.len() < self.total
    }
}

// Private Helper Code =================================================================================================

impl<S: Store> FilesPage<S> {
    fn require_write(&self) -> Result<()> {
        if self.can_write() {
            Ok(())
        } else {
            Err(eyre!("not authorized to modify {}", Self::RESOURCE))
        }
    }
}

// Unit Tests ==========================================================================================================

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::{
        filter::Filter,
        notifications::{Kind, tests::messages},
        refresh::tests::counting_subscriber,
        store::tests::{Call, MemoryStore},
    };

    use super::*;

    fn page(store: MemoryStore, level: AccessLevel) -> Result<FilesPage<MemoryStore>> {
        FilesPage::init(store, Permissions::new().grant("files", level), 50)
    }

    #[test]
    fn init_requires_read_access() {
        for level in [AccessLevel::None, AccessLevel::Count] {
            let error = page(MemoryStore::default(), level).unwrap_err();
            assert_eq!(error.to_string(), "not authorized to view files");
        }

        let read_only = page(MemoryStore::default(), AccessLevel::Read).unwrap();
        assert!(!read_only.can_write());

        let writable = page(MemoryStore::default(), AccessLevel::Write).unwrap();
        assert!(writable.can_write());

        // Access to other resources doesn't count
        let elsewhere = FilesPage::init(
            MemoryStore::default(),
            Permissions::new().grant("devices", AccessLevel::Write),
            50,
        );
        assert!(elsewhere.is_err());

        let no_rows = FilesPage::init(
            MemoryStore::default(),
            Permissions::new().grant("files", AccessLevel::Write),
            0,
        );
        assert_eq!(
            no_rows.unwrap_err().to_string(),
            "the page size must be at least 1"
        );
    }

    #[tokio::test]
    async fn load() {
        let store = MemoryStore::with_files(&["a.bin", "b.bin", "c.bin"]);
        let page = page(store, AccessLevel::Read).unwrap();
        let route = FilesRoute::from_params("metadata.oui = \"001122\"", r#"{"_id":-1}"#);

        let listing = page.load(&route, 2).await.unwrap();
        assert_eq!(listing.total, 3);
        assert_eq!(listing.records.len(), 2);
        assert!(listing.has_more());

        let listing = page.load(&route, page.next_show_count(2)).await.unwrap();
        assert_eq!(listing.records.len(), 3);
        assert!(!listing.has_more());

        let calls = page.store().calls();
        assert!(calls.contains(&Call::Fetch(
            "metadata.oui = \"001122\"".to_owned(),
            r#"{"_id":-1}"#.to_owned(),
            2
        )));
        assert!(calls.contains(&Call::Count("metadata.oui = \"001122\"".to_owned())));
        assert!(calls.contains(&Call::Fetch(
            "metadata.oui = \"001122\"".to_owned(),
            r#"{"_id":-1}"#.to_owned(),
            52
        )));
    }

    #[tokio::test]
    async fn delete_in_bulk() {
        let store = MemoryStore::with_files(&["a.bin", "b.bin", "c.bin"]).failing(&["b.bin"]);
        let page = page(store, AccessLevel::Write).unwrap();
        let refreshes = counting_subscriber(page.refresh());

        let ids = vec!["a.bin".to_owned(), "b.bin".to_owned(), "c.bin".to_owned()];
        assert_eq!(
            delete_prompt(&ids),
            "Deleting 3 files. Are you sure?"
        );
        let report = page.delete(ids).await.unwrap();

        assert_eq!(report.succeeded, ["a.bin", "c.bin"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(page.store().ids(), ["b.bin"]);

        // A single refresh once everything has settled
        assert_eq!(refreshes.lock().unwrap()[..], [1]);
        assert_eq!(
            messages(page.notifications()),
            [
                (Kind::Success, "a.bin: Deleted".to_owned()),
                (Kind::Success, "c.bin: Deleted".to_owned()),
                (
                    Kind::Error,
                    "b.bin: the server responded with 500 Internal Server Error: b.bin".to_owned()
                ),
            ]
        );
    }

    #[tokio::test]
    async fn read_only_pages_cannot_modify() {
        let page = page(MemoryStore::with_files(&["a.bin"]), AccessLevel::Read).unwrap();

        let error = page.delete(vec!["a.bin".to_owned()]).await.unwrap_err();
        assert_eq!(error.to_string(), "not authorized to modify files");

        let error = page
            .create(NewFileForm::default(), &Upload::new())
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "not authorized to modify files");

        assert!(page.store().calls().is_empty());
        assert_eq!(page.store().ids(), ["a.bin"]);
    }

    #[tokio::test]
    async fn create_reports_form_errors() {
        let page = page(MemoryStore::default(), AccessLevel::Write).unwrap();

        let result = page.create(NewFileForm::default(), &Upload::new()).await;
        assert!(result.is_err());
        assert_eq!(
            messages(page.notifications()),
            [(Kind::Error, "a file must be selected".to_owned())]
        );

        let form = NewFileForm {
            file: Some(PathBuf::from("tests/data/missing.bin")),
            ..NewFileForm::default()
        };
        assert!(page.create(form, &Upload::new()).await.is_err());
        assert!(page.store().calls().is_empty());
    }

    #[tokio::test]
    async fn create_uploads_and_refreshes() {
        let file = tempfile::Builder::new()
            .suffix(".bin")
            .tempfile()
            .unwrap();
        std::fs::write(file.path(), b"image").unwrap();

        let page = page(MemoryStore::default(), AccessLevel::Write).unwrap();
        let form = NewFileForm {
            file: Some(file.path().to_owned()),
            ..NewFileForm::default()
        };
        let name = form.file_name().unwrap();

        let outcome = page.create(form, &Upload::new()).await.unwrap();
        assert_eq!(outcome, Outcome::Completed);
        assert_eq!(page.store().ids(), [name.clone()]);
        assert_eq!(page.refresh().generation(), 1);

        let listing = page.load(&FilesRoute::default(), 50).await.unwrap();
        assert_eq!(listing.total, 1);
        assert!(
            page.store()
                .calls()
                .contains(&Call::Count(Filter::default().to_string()))
        );
    }

    #[test]
    fn http_urls() {
        let store = HttpStore::new("http://acs.local:3000").unwrap();
        let page = FilesPage::init(store, Permissions::new().grant("files", AccessLevel::Read), 50)
            .unwrap();

        assert_eq!(
            page.download_url("fw.bin"),
            "http://acs.local:3000/api/blob/files/fw.bin"
        );
        assert!(
            page.csv_export_url(&FilesRoute::default())
                .starts_with("http://acs.local:3000/api/files.csv?filter=true&columns=")
        );
    }
}
