// NOTE: The `#[component]` macro is deriving `PartialEq`, but not `Eq` (since that's not needed), and clippy is
// complaining about that. This needs to be a module-level `#![expect(...)]` since I can't actually place an
// `#[expect(...)]` inside of the `#[component]` macro
#![expect(clippy::derive_partial_eq_without_eq)]

use dioxus::prelude::*;
use files_console::file::FileType;

/// Offers the standard file types, but vendors are free to type in their own
#[component]
pub fn FileTypeInput(value: FileType, oninput: EventHandler<FileType>) -> Element {
    const OPTIONS_ID: &str = "file_type_options";

    rsx! {
        label { class: "grid grid-cols-[8rem_1fr] input w-full",
            span { class: "label", "Type" }
            input {
                list: OPTIONS_ID,
                placeholder: "Choose or type a file type",
                value: value.to_string(),
                oninput: move |event| oninput.call(FileType::from(event.value())),
            }
            datalist { id: OPTIONS_ID,
                for file_type in FileType::STANDARD {
                    option { key: "{file_type}", value: file_type.to_string() }
                }
            }
        }
    }
}
