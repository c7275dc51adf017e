// Standard Library Imports
use std::{collections::BTreeMap, io::Cursor, sync::Arc};

// External Crate Imports
use async_trait::async_trait;
use color_eyre::{
    Result,
    eyre::{OptionExt, WrapErr, eyre},
};
use futures::TryStreamExt;
use reqwest::{
    Body, Client, Response,
    header::{CONTENT_LENGTH, CONTENT_TYPE},
};
use serde_json::json;
use tokio::sync::OnceCell;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};
use urlencoding::encode;

// Local Crate Imports
use crate::{
    file::{FileRecord, Metadata, csv_columns},
    filter::Filter,
    sort::Sort,
    upload::Progress,
};

// Public API ==========================================================================================================

/// Tags to set (`true`) or clear (`false`) on a device
pub type Tags = BTreeMap<String, bool>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn fetch(&self, filter: &Filter, sort: &Sort, limit: usize) -> Result<Vec<FileRecord>>;

    async fn count(&self, filter: &Filter) -> Result<usize>;

    async fn delete_resource(&self, id: &str) -> Result<()>;

    async fn update_tags(&self, device_id: &str, tags: &Tags) -> Result<()>;

    async fn put_file(
        &self,
        name: &str,
        metadata: &Metadata,
        body: Vec<u8>,
        progress: &Progress,
    ) -> Result<()>;

    async fn resource_exists(&self, id: &str) -> Result<bool> {
        Ok(self.count(&Filter::id_equals(id)).await? > 0)
    }
}

/// A `Store` talking to the files API of a running server
#[derive(Clone, Debug)]
pub struct HttpStore {
    client: Client,
    base_url: String,
    credentials: Option<(String, String)>,
    session: Arc<OnceCell<()>>,
}

impl HttpStore {
    const RESOURCE: &str = "files";
    const TOTAL_COUNT_HEADER: &str = "x-total-count";
    const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

    pub fn new(server_url: &str) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .wrap_err("failed to build the HTTP client")?;
        let base_url = if server_url.ends_with('/') {
            server_url.to_owned()
        } else {
            format!("{server_url}/")
        };

        Ok(Self {
            client,
            base_url,
            credentials: None,
            session: Arc::new(OnceCell::new()),
        })
    }

    /// Logs in with these credentials before the first request is made
    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self.session = Arc::new(OnceCell::new());
        self
    }

    /// Opens a session. The server hands back a cookie that the client then sends with every other request
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let response = self
            .client
            .post(self.url("login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        check(response).await.wrap_err("failed to log in")?;

        info!(username, "logged in");
        Ok(())
    }

    #[must_use]
    pub fn csv_export_url(&self, filter: &Filter) -> String {
        format!(
            "{}?filter={}&columns={}",
            self.url(&format!("api/{}.csv", Self::RESOURCE)),
            encode(filter.as_expression()),
            encode(&csv_columns())
        )
    }

    #[must_use]
    pub fn blob_url(&self, id: &str) -> String {
        self.url(&format!("api/blob/{}/{}", Self::RESOURCE, encode(id)))
    }
}

#[async_trait]
impl Store for HttpStore {
    async fn fetch(&self, filter: &Filter, sort: &Sort, limit: usize) -> Result<Vec<FileRecord>> {
        let mut query = vec![
            ("filter", filter.as_expression().to_owned()),
            ("limit", limit.to_string()),
        ];
        if !sort.is_empty() {
            query.push(("sort", sort.to_param()));
        }

        self.session().await?;
        debug!(%filter, limit, "fetching files");
        let response = self
            .client
            .get(self.collection_url())
            .query(&query)
            .send()
            .await?;

        check(response)
            .await?
            .json::<Vec<FileRecord>>()
            .await
            .wrap_err("the server returned malformed file records")
    }

    async fn count(&self, filter: &Filter) -> Result<usize> {
        self.session().await?;
        let response = self
            .client
            .head(self.collection_url())
            .query(&[("filter", filter.as_expression())])
            .send()
            .await?;
        let response = check(response).await?;

        response
            .headers()
            .get(Self::TOTAL_COUNT_HEADER)
            .ok_or_eyre("the server didn't report a total count")?
            .to_str()?
            .parse::<usize>()
            .wrap_err("the server reported an invalid total count")
    }

    async fn delete_resource(&self, id: &str) -> Result<()> {
        self.session().await?;
        debug!(id, "deleting file");
        let response = self.client.delete(self.item_url(id)).send().await?;
        check(response).await?;

        Ok(())
    }

    async fn update_tags(&self, device_id: &str, tags: &Tags) -> Result<()> {
        self.session().await?;
        debug!(device_id, ?tags, "updating tags");
        let url = self.url(&format!("api/devices/{}/tags", encode(device_id)));
        let response = self.client.post(url).json(tags).send().await?;
        check(response).await?;

        Ok(())
    }

    async fn put_file(
        &self,
        name: &str,
        metadata: &Metadata,
        body: Vec<u8>,
        progress: &Progress,
    ) -> Result<()> {
        self.session().await?;
        let total = body.len();
        progress.start(total);
        info!(name, bytes = total, "uploading file");

        let stream = ReaderStream::with_capacity(Cursor::new(body), Self::UPLOAD_CHUNK_SIZE)
            .inspect_ok({
                let progress = progress.clone();
                move |chunk| progress.advance(chunk.len())
            });

        let mut request = self
            .client
            .put(self.item_url(name))
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, total);
        for (header, value) in metadata.headers() {
            request = request.header(header, value);
        }

        let response = request.body(Body::wrap_stream(stream)).send().await?;
        check(response).await?;

        Ok(())
    }
}

// Private Helper Code =================================================================================================

impl HttpStore {
    // NOTE: A failed login leaves the cell empty, so the next request tries again
    async fn session(&self) -> Result<()> {
        let Some((username, password)) = &self.credentials else {
            return Ok(());
        };
        self.session
            .get_or_try_init(|| self.login(username, password))
            .await?;

        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn collection_url(&self) -> String {
        self.url(&format!("api/{}/", Self::RESOURCE))
    }

    fn item_url(&self, id: &str) -> String {
        self.url(&format!("api/{}/{}", Self::RESOURCE, encode(id)))
    }
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let body = body.trim();
    if body.is_empty() {
        Err(eyre!("the server responded with {status}"))
    } else {
        Err(eyre!("the server responded with {status}: {body}"))
    }
}

// Unit Tests ==========================================================================================================

#[cfg(test)]
pub mod tests {
    use std::{
        collections::{HashMap, HashSet},
        sync::{Arc, Mutex},
        time::Duration,
    };

    use axum::{
        Json, Router,
        body::Bytes,
        extract::{Path, Query, State},
        http::{HeaderMap, StatusCode},
        routing::{get, post, put},
    };
    use const_format::formatc;
    use serde_json::Value;
    use tokio::{net::TcpListener, time::sleep};

    use crate::file::FileType;

    use super::*;

    // In-Memory Test Double ===========================================================================================

    #[derive(Clone, Eq, PartialEq, Debug)]
    pub enum Call {
        Fetch(String, String, usize),
        Count(String),
        Delete(String),
        UpdateTags(String, Tags),
        Exists(String),
        Put(String, Vec<(String, String)>, usize),
    }

    /// Keeps files in memory and remembers every call made against it. Any id listed in `failing` makes the
    /// corresponding delete, tag update or upload fail
    #[derive(Default, Debug)]
    pub struct MemoryStore {
        pub files: Mutex<Vec<FileRecord>>,
        pub calls: Mutex<Vec<Call>>,
        pub failing: HashSet<String>,
        pub put_delay: Option<Duration>,
        pub tags_delay: Option<Duration>,
    }

    impl MemoryStore {
        pub fn with_files(ids: &[&str]) -> Self {
            let files = ids.iter().map(|&id| file_record(id)).collect();
            Self {
                files: Mutex::new(files),
                ..Self::default()
            }
        }

        #[must_use]
        pub fn failing(mut self, ids: &[&str]) -> Self {
            self.failing = ids.iter().map(|&id| id.to_owned()).collect();
            self
        }

        #[must_use]
        pub fn put_delay(mut self, delay: Duration) -> Self {
            self.put_delay = Some(delay);
            self
        }

        #[must_use]
        pub fn tags_delay(mut self, delay: Duration) -> Self {
            self.tags_delay = Some(delay);
            self
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub fn ids(&self) -> Vec<String> {
            self.files
                .lock()
                .unwrap()
                .iter()
                .map(|file| file.id.clone())
                .collect()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }

        fn fail_if_listed(&self, id: &str) -> Result<()> {
            if self.failing.contains(id) {
                Err(eyre!("the server responded with 500 Internal Server Error: {id}"))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl Store for MemoryStore {
        async fn fetch(
            &self,
            filter: &Filter,
            sort: &Sort,
            limit: usize,
        ) -> Result<Vec<FileRecord>> {
            self.record(Call::Fetch(filter.to_string(), sort.to_param(), limit));
            let files = self.files.lock().unwrap();
            Ok(files.iter().take(limit).cloned().collect())
        }

        async fn count(&self, filter: &Filter) -> Result<usize> {
            self.record(Call::Count(filter.to_string()));
            Ok(self.files.lock().unwrap().len())
        }

        async fn delete_resource(&self, id: &str) -> Result<()> {
            self.record(Call::Delete(id.to_owned()));
            self.fail_if_listed(id)?;
            self.files.lock().unwrap().retain(|file| file.id != id);
            Ok(())
        }

        async fn update_tags(&self, device_id: &str, tags: &Tags) -> Result<()> {
            self.record(Call::UpdateTags(device_id.to_owned(), tags.clone()));
            if let Some(delay) = self.tags_delay {
                sleep(delay).await;
            }
            self.fail_if_listed(device_id)
        }

        async fn put_file(
            &self,
            name: &str,
            metadata: &Metadata,
            body: Vec<u8>,
            progress: &Progress,
        ) -> Result<()> {
            self.record(Call::Put(name.to_owned(), metadata.headers(), body.len()));
            progress.start(body.len());
            if let Some(delay) = self.put_delay {
                sleep(delay).await;
            }
            self.fail_if_listed(name)?;
            progress.advance(body.len());

            let mut file = file_record(name);
            file.metadata = metadata.clone();
            self.files.lock().unwrap().push(file);
            Ok(())
        }

        async fn resource_exists(&self, id: &str) -> Result<bool> {
            self.record(Call::Exists(id.to_owned()));
            Ok(self.files.lock().unwrap().iter().any(|file| file.id == id))
        }
    }

    pub fn file_record(id: &str) -> FileRecord {
        FileRecord {
            id: id.to_owned(),
            metadata: Metadata {
                file_type: FileType::FirmwareUpgradeImage,
                ..Metadata::default()
            },
            length: None,
            upload_date: None,
        }
    }

    // HTTP Tests ======================================================================================================

    const HOST: &str = "127.0.0.1";
    const ANY_PORT: &str = formatc!("{HOST}:0");

    #[derive(Clone, Default)]
    struct Server {
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl Server {
        fn log(&self, request: impl Into<String>) {
            self.requests.lock().unwrap().push(request.into());
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    async fn list(
        State(server): State<Server>,
        Query(query): Query<HashMap<String, String>>,
    ) -> Json<Value> {
        server.log(format!(
            "GET filter={} limit={} sort={}",
            query["filter"],
            query["limit"],
            query.get("sort").map_or("-", String::as_str)
        ));

        Json(json!([
            { "_id": "fw-1.bin", "metadata": { "fileType": "1 Firmware Upgrade Image", "version": "1" } },
            { "_id": "web.tar", "metadata": { "fileType": "2 Web Content" } }
        ]))
    }

    async fn count(
        State(server): State<Server>,
        Query(query): Query<HashMap<String, String>>,
    ) -> (HeaderMap, ()) {
        server.log(format!("HEAD filter={}", query["filter"]));

        let total = if query["filter"] == r#"_id = "fw-1.bin""# { "1" } else { "0" };
        let mut headers = HeaderMap::new();
        headers.insert(HttpStore::TOTAL_COUNT_HEADER, total.parse().unwrap());
        (headers, ())
    }

    async fn delete(State(server): State<Server>, Path(id): Path<String>) -> (StatusCode, String) {
        server.log(format!("DELETE {id}"));

        if id == "fw-1.bin" {
            (StatusCode::OK, String::new())
        } else {
            (StatusCode::NOT_FOUND, "File not found".to_owned())
        }
    }

    async fn upload(
        State(server): State<Server>,
        Path(id): Path<String>,
        headers: HeaderMap,
        body: Bytes,
    ) -> StatusCode {
        let mut metadata: Vec<_> = headers
            .iter()
            .filter(|(name, _)| name.as_str().starts_with("metadata"))
            .map(|(name, value)| format!("{name}={}", value.to_str().unwrap()))
            .collect();
        metadata.sort();
        server.log(format!("PUT {id} {} {}", body.len(), metadata.join(",")));

        StatusCode::CREATED
    }

    async fn tags(
        State(server): State<Server>,
        Path(id): Path<String>,
        Json(tags): Json<Value>,
    ) -> StatusCode {
        server.log(format!("TAGS {id} {tags}"));

        StatusCode::OK
    }

    async fn login(State(server): State<Server>, Json(credentials): Json<Value>) -> StatusCode {
        server.log(format!("LOGIN {}", credentials["username"]));

        if credentials["password"] == "hunter2" {
            StatusCode::OK
        } else {
            StatusCode::UNAUTHORIZED
        }
    }

    async fn serve() -> (HttpStore, Server) {
        let server = Server::default();
        let router = Router::new()
            .route("/api/files/", get(list).head(count))
            .route("/api/files/{id}", put(upload).delete(delete))
            .route("/api/devices/{id}/tags", post(tags))
            .route("/login", post(login))
            .with_state(server.clone());

        let listener = TcpListener::bind(ANY_PORT).await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

        let store = HttpStore::new(&format!("http://{address}")).unwrap();
        (store, server)
    }

    #[test]
    fn urls() {
        let store = HttpStore::new("https://acs.example.net").unwrap();

        assert_eq!(
            store.blob_url("fw 1.bin"),
            "https://acs.example.net/api/blob/files/fw%201.bin"
        );
        assert_eq!(
            store.csv_export_url(&Filter::default()),
            "https://acs.example.net/api/files.csv?filter=true&columns=%7B%22Name%22%3A%22_id%22%2C%22Type%22%3A%22metadata.fileType%22%2C%22OUI%22%3A%22metadata.oui%22%2C%22Product%20Class%22%3A%22metadata.productClass%22%2C%22Version%22%3A%22metadata.version%22%7D"
        );
        assert!(
            store
                .csv_export_url(&Filter::parse("metadata.oui = \"1\""))
                .contains("?filter=metadata.oui%20%3D%20%221%22&columns=")
        );
    }

    #[tokio::test]
    async fn fetch_and_count() {
        let (store, server) = serve().await;

        let sort: Sort = Sort::new().toggle("_id");
        let files = store.fetch(&Filter::default(), &sort, 50).await.unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].id, "fw-1.bin");
        assert_eq!(files[0].metadata.version, "1");
        assert_eq!(files[1].metadata.file_type, FileType::WebContent);

        let total = store.count(&Filter::parse("metadata.version = \"1\"")).await.unwrap();
        assert_eq!(total, 0);

        assert!(store.resource_exists("fw-1.bin").await.unwrap());
        assert!(!store.resource_exists("web.tar").await.unwrap());

        assert_eq!(
            server.requests(),
            [
                r#"GET filter=true limit=50 sort={"_id":1}"#,
                r#"HEAD filter=metadata.version = "1""#,
                r#"HEAD filter=_id = "fw-1.bin""#,
                r#"HEAD filter=_id = "web.tar""#,
            ]
        );
    }

    #[tokio::test]
    async fn delete_resource() {
        let (store, server) = serve().await;

        store.delete_resource("fw-1.bin").await.unwrap();

        let error = store.delete_resource("gone.bin").await.unwrap_err();
        assert_eq!(
            error.to_string(),
            "the server responded with 404 Not Found: File not found"
        );

        assert_eq!(server.requests(), ["DELETE fw-1.bin", "DELETE gone.bin"]);
    }

    #[tokio::test]
    async fn put_file() {
        let (store, server) = serve().await;

        let metadata = Metadata {
            file_type: FileType::FirmwareUpgradeImage,
            oui: "001122".to_owned(),
            product_class: String::new(),
            version: "2.0".to_owned(),
        };
        let body = vec![7; 200_000];
        let progress = Progress::default();

        store
            .put_file("fw 2.0.bin", &metadata, body, &progress)
            .await
            .unwrap();

        assert_eq!(progress.sent(), 200_000);
        assert_eq!(progress.total(), 200_000);
        assert_eq!(
            server.requests(),
            ["PUT fw 2.0.bin 200000 metadata-filetype=1 Firmware Upgrade Image,metadata-oui=001122,metadata-version=2.0"]
        );
    }

    #[tokio::test]
    async fn update_tags_and_login() {
        let (store, server) = serve().await;

        let tags = Tags::from([("provisioned".to_owned(), true)]);
        store.update_tags("001122-IGD-0001", &tags).await.unwrap();

        store.login("admin", "hunter2").await.unwrap();
        let error = store.login("admin", "wrong").await.unwrap_err();
        assert_eq!(error.to_string(), "failed to log in");

        assert_eq!(
            server.requests(),
            [
                r#"TAGS 001122-IGD-0001 {"provisioned":true}"#,
                r#"LOGIN "admin""#,
                r#"LOGIN "admin""#,
            ]
        );
    }

    #[tokio::test]
    async fn logs_in_once_before_the_first_request() {
        let (store, server) = serve().await;

        let rejected = store.clone().with_credentials("admin", "wrong");
        let error = rejected.count(&Filter::default()).await.unwrap_err();
        assert_eq!(error.to_string(), "failed to log in");

        let store = store.with_credentials("admin", "hunter2");
        store.count(&Filter::default()).await.unwrap();
        store.delete_resource("fw-1.bin").await.unwrap();

        assert_eq!(
            server.requests(),
            [
                r#"LOGIN "admin""#,
                r#"LOGIN "admin""#,
                "HEAD filter=true",
                "DELETE fw-1.bin",
            ]
        );
    }
}
