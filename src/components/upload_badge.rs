use std::time::Duration;

use dioxus::prelude::*;
use files_console::upload::{Status, Upload};
use tokio::time::sleep;

#[component]
pub fn UploadBadge(upload: ReadOnlySignal<Upload>) -> Element {
    // NOTE: Progress is read straight out of the `Upload`, so the badge polls while anything is happening and draws
    // one last time once things settle
    use_future(move || async move {
        let mut was_running = false;
        loop {
            sleep(Duration::from_millis(200)).await;
            let running = upload.peek().status().running();
            if running || was_running {
                needs_update();
            }
            was_running = running;
        }
    });

    let (color_class, content, tooltip) = match upload.read().status() {
        Status::Idle => return rsx! {},
        Status::Checking => ("badge-neutral", "Checking the name...".to_owned(), None),
        Status::Uploading(progress) => (
            "badge-info",
            format!("Uploading ({}%)", progress.percent()),
            None,
        ),
        Status::Tagging(rows) => ("badge-info", format!("Tagging {rows} device(s)"), None),
        Status::Completed(duration) => (
            "badge-success",
            format!("Uploaded ({})", format_duration(duration)),
            None,
        ),
        Status::Failed(report, duration) => (
            "badge-warning",
            format!("Failed ({})", format_duration(duration)),
            Some(report.to_string()),
        ),
        Status::Cancelled => ("badge-neutral", "Cancelled".to_owned(), None),
    };

    rsx! {
        div { class: "tooltip badge {color_class} font-mono",
            if let Some(tooltip) = tooltip {
                div { class: "tooltip-content", {tooltip} }
            }

            {content}
        }
    }
}

fn format_duration(duration: Duration) -> String {
    let elapsed_seconds = duration.as_secs();
    let seconds = elapsed_seconds % 60;
    let minutes = elapsed_seconds / 60;

    if minutes == 0 {
        format!("{seconds}s")
    } else {
        format!("{minutes}m{seconds}s")
    }
}
