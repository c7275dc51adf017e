use dioxus::prelude::*;

use crate::components::{new_file_modal::NewFileModal, upload_icon::UploadIcon};

#[component]
pub fn NewFileButton() -> Element {
    const MODAL_ID: &str = "new_file_modal";

    rsx! {
        button {
            class: "btn btn-primary gap-2",
            onclick: |_| {
                document::eval(&format!("{MODAL_ID}.showModal()"));
            },
            UploadIcon {}
            "New"
        }
        NewFileModal { id: MODAL_ID }
    }
}
