// NOTE: The `#[component]` macro is deriving `PartialEq`, but not `Eq` (since that's not needed), and clippy is
// complaining about that. This needs to be a module-level `#![expect(...)]` since I can't actually place an
// `#[expect(...)]` inside of the `#[component]` macro
#![expect(clippy::derive_partial_eq_without_eq)]

use std::collections::BTreeSet;

use dioxus::prelude::*;
use files_console::{
    file::{ATTRIBUTES, FileRecord},
    route::FilesRoute,
    sort::Direction,
};

use crate::{Page, Route};

#[component]
pub fn FilesTable(
    route: FilesRoute,
    records: Vec<FileRecord>,
    selected: Signal<BTreeSet<String>>,
    can_write: bool,
) -> Element {
    let page = use_context::<Page>();
    let navigator = use_navigator();
    let mut selected = selected;

    let headings: Vec<_> = ATTRIBUTES
        .iter()
        .map(|attribute| {
            let arrow = match route.sort.direction_of(attribute.id) {
                Some(Direction::Ascending) => "▲",
                Some(Direction::Descending) => "▼",
                None => "",
            };
            let target = Route::from(&route.with_sort_toggled(attribute.id));
            (attribute.label, arrow, target)
        })
        .collect();

    let ids: BTreeSet<String> = records.iter().map(|record| record.id.clone()).collect();
    let all_selected = !ids.is_empty() && ids.iter().all(|id| selected.read().contains(id));

    let rows: Vec<_> = records
        .iter()
        .map(|record| {
            let cells: Vec<_> = ATTRIBUTES
                .iter()
                .map(|attribute| record.attribute(attribute.id).unwrap_or_default())
                .collect();
            (record.id.clone(), cells, page.download_url(&record.id))
        })
        .collect();
    let columns = ATTRIBUTES.len() + 1 + usize::from(can_write);

    rsx! {
        div { class: "overflow-x-auto",
            table { class: "table table-zebra",
                thead {
                    tr {
                        if can_write {
                            th {
                                input {
                                    class: "checkbox checkbox-sm",
                                    r#type: "checkbox",
                                    checked: all_selected,
                                    onchange: move |_| {
                                        if all_selected {
                                            selected.write().clear();
                                        } else {
                                            selected.set(ids.clone());
                                        }
                                    },
                                }
                            }
                        }
                        for (label , arrow , target) in headings {
                            th { key: "{label}",
                                button {
                                    class: "btn btn-ghost btn-sm gap-1",
                                    onclick: move |_| {
                                        navigator.push(target.clone());
                                    },
                                    {label}
                                    span { class: "text-xs", {arrow} }
                                }
                            }
                        }
                        th {}
                    }
                }
                tbody {
                    if rows.is_empty() {
                        tr {
                            td { class: "text-center opacity-70", colspan: "{columns}", "No files" }
                        }
                    }
                    for (id , cells , download_url) in rows {
                        tr { key: "{id}",
                            if can_write {
                                td {
                                    input {
                                        class: "checkbox checkbox-sm",
                                        r#type: "checkbox",
                                        checked: selected.read().contains(&id),
                                        onchange: {
                                            let id = id.clone();
                                            move |_| {
                                                let mut selected = selected.write();
                                                if !selected.remove(&id) {
                                                    selected.insert(id.clone());
                                                }
                                            }
                                        },
                                    }
                                }
                            }
                            for (index , cell) in cells.into_iter().enumerate() {
                                td {
                                    key: "{index}",
                                    class: if index == 0 { "font-mono" } else { "" },
                                    {cell}
                                }
                            }
                            td {
                                a {
                                    class: "link link-primary",
                                    href: download_url,
                                    target: "_blank",
                                    "Download"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
