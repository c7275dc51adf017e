use std::time::Duration;

use dioxus::prelude::*;
use files_console::notifications::Kind;
use tokio::time::sleep;

use crate::{Page, components::use_refresh::use_refresh};

const TOAST_LIFETIME: Duration = Duration::from_secs(8);

#[component]
pub fn Toasts() -> Element {
    let page = use_context::<Page>();
    let changed = use_refresh(page.notifications().changed());

    use_future(move || async move {
        loop {
            sleep(Duration::from_secs(1)).await;
            page.notifications().expire(TOAST_LIFETIME);
        }
    });

    // Redraw whenever a notification comes or goes
    let _ = changed();

    rsx! {
        div { class: "toast toast-end",
            for notification in page.notifications().list() {
                div {
                    key: "{notification.id}",
                    class: match notification.kind {
                        Kind::Success => "alert alert-success",
                        Kind::Error => "alert alert-error",
                    },
                    role: "alert",

                    span { {notification.message.clone()} }
                    button {
                        class: "btn btn-xs btn-ghost",
                        onclick: move |_| page.notifications().dismiss(notification.id),
                        "✕"
                    }
                }
            }
        }
    }
}
