mod delete_icon;
mod delete_selected;
mod file_path_picker;
mod file_type_input;
mod files;
mod files_table;
mod filter_bar;
mod header;
mod new_file_button;
mod new_file_modal;
mod text_input;
mod toasts;
mod upload_badge;
mod upload_icon;
mod use_refresh;

use dioxus::prelude::*;
use serde_json::Value;
use tracing::warn;

pub use files::Files;
pub use header::Header;

/// Asks the user to confirm `message` with the webview's own dialog. Anything that stops the dialog from showing
/// counts as a "no"
async fn confirm(message: &str) -> bool {
    let script = format!("return confirm({});", Value::from(message));

    match document::eval(&script).join::<bool>().await {
        Ok(confirmed) => confirmed,
        Err(error) => {
            warn!(?error, "failed to show a confirmation dialog");
            false
        }
    }
}
