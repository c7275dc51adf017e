// NOTE: The `#[component]` macro is deriving `PartialEq`, but not `Eq` (since that's not needed), and clippy is
// complaining about that. This needs to be a module-level `#![expect(...)]` since I can't actually place an
// `#[expect(...)]` inside of the `#[component]` macro
#![expect(clippy::derive_partial_eq_without_eq)]

use dioxus::prelude::*;

#[component]
pub fn TextInput(
    label: &'static str,
    value: String,
    oninput: EventHandler<String>,
    #[props(extends = GlobalAttributes, extends = input)] input_attributes: Vec<Attribute>,
) -> Element {
    rsx! {
        label { class: "grid grid-cols-[8rem_1fr] input w-full",
            span { class: "label", {label} }
            input {
                class: "font-mono",
                value,
                oninput: move |event| oninput.call(event.value()),
                ..input_attributes,
            }
        }
    }
}
