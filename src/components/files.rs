// NOTE: The `#[component]` macro is deriving `PartialEq`, but not `Eq` (since that's not needed), and clippy is
// complaining about that. This needs to be a module-level `#![expect(...)]` since I can't actually place an
// `#[expect(...)]` inside of the `#[component]` macro
#![expect(clippy::derive_partial_eq_without_eq)]

use std::collections::BTreeSet;

use dioxus::prelude::*;
use files_console::route::FilesRoute;

use crate::{
    Page,
    components::{
        delete_selected::DeleteSelected, files_table::FilesTable, filter_bar::FilterBar,
        new_file_button::NewFileButton, toasts::Toasts, use_refresh::use_refresh,
    },
};

/// The `/admin/files` route
#[component]
pub fn Files(filter: String, sort: String) -> Element {
    rsx! {
        FilesView { route: FilesRoute::from_params(&filter, &sort) }
    }
}

#[component]
fn FilesView(route: ReadOnlySignal<FilesRoute>) -> Element {
    let page = use_context::<Page>();
    let generation = use_refresh(page.refresh());

    let mut selected = use_signal(BTreeSet::<String>::new);

    // "Show more" only applies to the route it was clicked on, so a new filter or sort starts from the first page
    let mut shown = use_signal(|| (route.peek().clone(), page.page_size()));
    let show_count = move || {
        let shown = shown.read();
        if shown.0 == *route.read() {
            shown.1
        } else {
            page.page_size()
        }
    };

    // A new filter or sort also clears the selection
    use_effect(move || {
        let _ = route.read();
        if !selected.peek().is_empty() {
            selected.write().clear();
        }
    });

    let listing = use_resource(move || {
        let route = route();
        let show_count = show_count();
        let _ = generation();
        async move { page.load(&route, show_count).await }
    });

    let can_write = page.can_write();
    let content = match &*listing.read_unchecked() {
        Some(Ok(listing)) => {
            let has_more = listing.has_more();
            let total = listing.total;
            let plural = if total == 1 { "" } else { "s" };

            rsx! {
                FilesTable {
                    route: route(),
                    records: listing.records.clone(),
                    selected,
                    can_write,
                }

                div { class: "flex items-center justify-between gap-4 px-4",
                    span { class: "text-sm opacity-70", "{total} file{plural}" }

                    if has_more {
                        button {
                            class: "btn btn-sm",
                            onclick: move |_| {
                                let next = page.next_show_count(show_count());
                                shown.set((route(), next));
                            },
                            "Show more"
                        }
                    }

                    a {
                        class: "btn btn-sm btn-ghost",
                        href: page.csv_export_url(&route.read()),
                        target: "_blank",
                        "Download CSV"
                    }
                }
            }
        }
        Some(Err(error)) => rsx! {
            div { class: "alert alert-error", role: "alert", "{error}" }
        },
        None => rsx! {
            div { class: "flex justify-center p-8",
                span { class: "loading loading-spinner loading-lg" }
            }
        },
    };

    rsx! {
        div { class: "flex items-center justify-between gap-4 px-4",
            h2 { class: "card-title grow", "Files" }

            FilterBar { route }

            if can_write {
                DeleteSelected { selected }
                NewFileButton {}
            }
        }

        {content}

        Toasts {}
    }
}
