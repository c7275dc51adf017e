use crate::FAVICON;
use dioxus::prelude::*;

#[component]
pub fn Header() -> Element {
    rsx! {
        div { class: "flex items-center justify-center gap-6 my-6",
            img { src: FAVICON, class: "h-16" }
            h1 { class: "text-5xl font-mono font-bold", "Files" }
        }
    }
}
