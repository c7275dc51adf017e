// NOTE: The `#[component]` macro is deriving `PartialEq`, but not `Eq` (since that's not needed), and clippy is
// complaining about that. This needs to be a module-level `#![expect(...)]` since I can't actually place an
// `#[expect(...)]` inside of the `#[component]` macro
#![expect(clippy::derive_partial_eq_without_eq)]

use dioxus::prelude::*;
use files_console::{
    form::{NewFileForm, close_requested},
    upload::{Outcome, Upload},
};

use crate::{
    Page,
    components::{
        confirm, file_path_picker::FilePathPicker, file_type_input::FileTypeInput,
        text_input::TextInput, upload_badge::UploadBadge,
    },
};

#[component]
pub fn NewFileModal(id: &'static str) -> Element {
    let page = use_context::<Page>();
    let mut form = use_signal(NewFileForm::default);
    let mut upload = use_signal(Upload::new);
    let mut busy = use_signal(|| false);

    let close_modal = move || {
        document::eval(&format!("{id}.close()"));
    };

    let mut reset = move || {
        form.set(NewFileForm::default());
        upload.set(Upload::new());
    };

    let submit = move |_| {
        let values = form();
        let current = Upload::new();
        upload.set(current.clone());
        busy.set(true);

        spawn(async move {
            let outcome = page.create(values, &current).await;
            busy.set(false);

            if let Ok(Outcome::Completed) = outcome {
                reset();
                close_modal();
            }
        });
    };

    let cancel = move || {
        spawn(async move {
            let values = form.peek().clone();
            let current = upload.peek().clone();

            if close_requested(&values, &current, |prompt| confirm(prompt)).await {
                reset();
                close_modal();
            }
        });
    };

    rsx! {
        dialog {
            class: "modal",
            id,
            // NOTE: Escape would otherwise close the dialog without asking about unsaved changes
            onkeydown: move |event| {
                if event.key() == Key::Escape {
                    event.prevent_default();
                    cancel();
                }
            },

            div { class: "modal-box overflow-visible flex flex-col items-stretch gap-4",
                h3 { class: "text-lg font-bold text-center mb-1", "New File" }

                FilePathPicker {
                    label: "File",
                    tooltip: "The file is stored under its own name. Spreadsheets with `id` and `tagName` columns also \
                              tag each listed device once they're uploaded",
                    value: form.read().file.clone(),
                    onchange: move |file| form.write().file = file,
                }
                FileTypeInput {
                    value: form.read().file_type.clone(),
                    oninput: move |file_type| form.write().file_type = file_type,
                }
                TextInput {
                    label: "OUI",
                    value: form.read().oui.clone(),
                    oninput: move |oui| form.write().oui = oui,
                }
                TextInput {
                    label: "Product Class",
                    value: form.read().product_class.clone(),
                    oninput: move |product_class| form.write().product_class = product_class,
                }
                TextInput {
                    label: "Version",
                    value: form.read().version.clone(),
                    oninput: move |version| form.write().version = version,
                }

                div { class: "flex justify-center", UploadBadge { upload } }

                div { class: "modal-action mt-2",
                    button {
                        class: "btn grow",
                        r#type: "button",
                        onclick: move |_| cancel(),
                        "Cancel"
                    }
                    button {
                        class: "btn grow btn-primary",
                        r#type: "button",
                        disabled: busy() || form.read().file.is_none(),
                        onclick: submit,
                        "Upload"
                    }
                }
            }
        }
    }
}
