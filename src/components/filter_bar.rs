use dioxus::prelude::*;
use files_console::route::FilesRoute;

use crate::Route;

#[component]
pub fn FilterBar(route: ReadOnlySignal<FilesRoute>) -> Element {
    let navigator = use_navigator();
    let mut text = use_signal(String::new);

    // Follow the route when it's changed from elsewhere (back / forward, or a cleared filter)
    use_effect(move || text.set(route.read().filter_param()));

    let apply = move || {
        let next = route.read().with_filter(&text());
        if next != *route.peek() {
            navigator.push(Route::from(&next));
        }
    };

    rsx! {
        label { class: "input input-sm w-1/2",
            span { class: "label", "Filter" }
            input {
                class: "font-mono",
                r#type: "search",
                placeholder: "metadata.oui = \"001122\"",
                value: text,
                oninput: move |event| text.set(event.value()),
                onkeydown: move |event| {
                    if event.key() == Key::Enter {
                        apply();
                    }
                },
                onblur: move |_| apply(),
            }
        }
    }
}
