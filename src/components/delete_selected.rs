use std::collections::BTreeSet;

use dioxus::prelude::*;
use files_console::page::delete_prompt;
use tracing::error;

use crate::{
    Page,
    components::{confirm, delete_icon::DeleteIcon},
};

#[component]
pub fn DeleteSelected(selected: Signal<BTreeSet<String>>) -> Element {
    let page = use_context::<Page>();
    let mut selected = selected;
    let count = selected.read().len();

    let onclick = move |_| {
        let ids: Vec<String> = selected.read().iter().cloned().collect();
        spawn(async move {
            if !confirm(&delete_prompt(&ids)).await {
                return;
            }

            match page.delete(ids).await {
                Ok(_) => selected.write().clear(),
                Err(report) => error!(%report, "failed to delete files"),
            }
        });
    };

    rsx! {
        div { class: "tooltip", "data-tip": "Delete the selected files",
            button {
                class: "btn btn-square btn-error btn-outline",
                disabled: count == 0,
                onclick,
                DeleteIcon {}
            }
        }
    }
}
