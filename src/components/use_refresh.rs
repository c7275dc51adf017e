use std::sync::Arc;

use dioxus::prelude::*;
use files_console::refresh::Refresh;

/// Mirrors the generation of `refresh` in a signal, so anything reading it reruns whenever the `Refresh` is bumped
pub fn use_refresh(refresh: &Refresh) -> Signal<u64, SyncStorage> {
    let generation = use_signal_sync(|| refresh.generation());

    let subscription = use_hook(|| {
        refresh.subscribe(Arc::new(move |latest| {
            let mut generation = generation;
            generation.set(latest);
        }))
    });

    let refresh = refresh.clone();
    use_drop(move || refresh.unsubscribe(subscription));

    generation
}
