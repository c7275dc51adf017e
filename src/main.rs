mod components;

use std::{ops::Deref, ptr, sync::OnceLock};

use color_eyre::Result;
use dioxus::{
    desktop::{self, WindowBuilder},
    prelude::*,
};
use files_console::{config::Config, page::FilesPage, route::FilesRoute, store::HttpStore};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use components::{Files, Header};

pub const FAVICON: Asset = asset!("/assets/favicon.svg");
const TAILWIND_CSS: Asset = asset!("/assets/tailwind.css");

const INDEX_HTML: &str = include_str!("../index.html");

// NOTE: Set once in `main` before the UI launches. An `Err` holds the reason the page can't be shown
static PAGE: OnceLock<Result<FilesPage<HttpStore>, String>> = OnceLock::new();

/// The page every component reads from, handed down through the context
#[derive(Copy, Clone)]
pub struct Page(&'static FilesPage<HttpStore>);

#[derive(Routable, Clone, PartialEq, Debug)]
#[rustfmt::skip]
enum Route {
    #[redirect("/", || Route::Files { filter: String::new(), sort: String::new() })]
    #[route("/admin/files?:filter&:sort")]
    Files { filter: String, sort: String },
}

#[component]
fn App() -> Element {
    let content = match PAGE.get() {
        Some(Ok(page)) => rsx! {
            Console { page: Page(page) }
        },
        Some(Err(error)) => rsx! {
            div { class: "alert alert-error", role: "alert", {error.clone()} }
        },
        None => rsx! {},
    };

    rsx! {
        document::Link { rel: "icon", href: FAVICON }
        document::Stylesheet { href: TAILWIND_CSS }

        Header {}

        main { class: "card w-9/10 bg-base-100 shadow-sm",
            div { class: "flex flex-col card-body", {content} }
        }
    }
}

#[component]
fn Console(page: Page) -> Element {
    use_context_provider(|| page);

    rsx! {
        Router::<Route> {}
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load()?;
    let page = open_page(config).map_err(|error| {
        error!(%error, "failed to open the files page");
        format!("{error:#}")
    });
    let _ = PAGE.set(page);

    dioxus::LaunchBuilder::new()
        .with_cfg(
            desktop::Config::default()
                .with_menu(None)
                .with_window(WindowBuilder::new().with_title("Files Console"))
                .with_custom_index(INDEX_HTML.to_string()),
        )
        .launch(App);

    Ok(())
}

fn open_page(config: Config) -> Result<FilesPage<HttpStore>> {
    let mut store = HttpStore::new(&config.server_url)?;
    if let Some((username, password)) = config.credentials() {
        store = store.with_credentials(username, password);
    }

    info!(server_url = %config.server_url, "opening the files page");
    FilesPage::init(store, config.access, config.page_size)
}

impl From<&FilesRoute> for Route {
    fn from(route: &FilesRoute) -> Self {
        Self::Files {
            filter: route.filter_param(),
            sort: route.sort_param(),
        }
    }
}

impl Deref for Page {
    type Target = FilesPage<HttpStore>;

    fn deref(&self) -> &Self::Target {
        self.0
    }
}

impl PartialEq for Page {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.0, other.0)
    }
}
