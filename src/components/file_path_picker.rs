// NOTE: The `#[component]` macro is deriving `PartialEq`, but not `Eq` (since that's not needed), and clippy is
// complaining about that. This needs to be a module-level `#![expect(...)]` since I can't actually place an
// `#[expect(...)]` inside of the `#[component]` macro
#![expect(clippy::derive_partial_eq_without_eq)]

use std::{ffi::OsStr, path::PathBuf};

use dioxus::prelude::*;

#[component]
pub fn FilePathPicker(
    label: &'static str,
    tooltip: &'static str,
    value: Option<PathBuf>,
    onchange: EventHandler<Option<PathBuf>>,
    #[props(extends = GlobalAttributes, extends = input)] input_attributes: Vec<Attribute>,
) -> Element {
    let input_text = value
        .as_deref()
        .and_then(|path| path.file_name())
        .and_then(OsStr::to_str)
        .map_or_else(|| "Click to select a file...".to_owned(), str::to_owned);

    rsx! {
        label { class: "grid grid-cols-[8rem_1fr] input w-full",
            span { class: "label tooltip",
                {label}

                p { class: "tooltip-content", {tooltip} }
            }
            label { class: "cursor-pointer truncate",
                {input_text}
                input {
                    class: "h-0 w-0 p-0 opacity-0",
                    onchange: move |event: FormEvent| {
                        let path = event
                            .files()
                            .and_then(|engine| engine.files().into_iter().next())
                            .map(PathBuf::from);
                        onchange.call(path);
                    },
                    r#type: "file",
                    ..input_attributes,
                }
            }
        }
    }
}
