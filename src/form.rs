// Standard Library Imports
use std::{ffi::OsStr, future::Future, path::PathBuf};

// External Crate Imports
use color_eyre::{
    Result,
    eyre::{OptionExt, WrapErr},
};

// Local Crate Imports
use crate::{
    file::{FileType, Metadata},
    upload::{Status, Upload, UploadRequest},
};

// Public API ==========================================================================================================

pub const UNSAVED_CHANGES_PROMPT: &str = "You have unsaved changes. Close anyway?";

/// The values of the "New file" form
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct NewFileForm {
    pub file: Option<PathBuf>,
    pub file_type: FileType,
    pub oui: String,
    pub product_class: String,
    pub version: String,
}

impl NewFileForm {
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        *self != Self::default()
    }

    /// The file is stored under its own name, which also becomes its id
    pub fn file_name(&self) -> Result<String> {
        let file = self.file.as_ref().ok_or_eyre("a file must be selected")?;
        let name = file
            .file_name()
            .and_then(OsStr::to_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_eyre("the selected file has no usable name")?;

        Ok(name.to_owned())
    }

    #[must_use]
    pub fn metadata(&self) -> Metadata {
        Metadata {
            file_type: self.file_type.clone(),
            oui: self.oui.trim().to_owned(),
            product_class: self.product_class.trim().to_owned(),
            version: self.version.trim().to_owned(),
        }
    }

    /// Validates the form and reads the selected file into memory
    pub async fn into_request(self) -> Result<UploadRequest> {
        let name = self.file_name()?;
        let metadata = self.metadata();
        let path = self.file.ok_or_eyre("a file must be selected")?;

        let body = tokio::fs::read(&path)
            .await
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;

        Ok(UploadRequest {
            name,
            metadata,
            body,
        })
    }
}

/// Decides whether the form can be closed. Unsaved edits need `confirm` to agree first (unless the upload already
/// went through), and closing always aborts whatever upload is still in flight
pub async fn close_requested<F: Future<Output = bool>>(
    form: &NewFileForm,
    upload: &Upload,
    confirm: impl FnOnce(&'static str) -> F,
) -> bool {
    let saved = matches!(upload.status(), Status::Completed(_));
    if form.is_dirty() && !saved && !confirm(UNSAVED_CHANGES_PROMPT).await {
        return false;
    }

    upload.abort();
    true
}

// Unit Tests ==========================================================================================================

#[cfg(test)]
mod tests {
    use std::{
        io::Write,
        sync::atomic::{AtomicBool, Ordering},
    };

    use tempfile::NamedTempFile;

    use crate::{
        notifications::Notifications,
        refresh::Refresh,
        store::tests::MemoryStore,
        upload::Outcome,
    };

    use super::*;

    #[test]
    fn dirty() {
        let mut form = NewFileForm::default();
        assert!(!form.is_dirty());

        form.version = "1.0".to_owned();
        assert!(form.is_dirty());

        form.version.clear();
        assert!(!form.is_dirty());
    }

    #[test]
    fn file_name() {
        let mut form = NewFileForm::default();
        assert_eq!(
            form.file_name().unwrap_err().to_string(),
            "a file must be selected"
        );

        form.file = Some(PathBuf::from("/srv/firmware/IGD-2.0.1.bin"));
        assert_eq!(form.file_name().unwrap(), "IGD-2.0.1.bin");

        form.file = Some(PathBuf::from("/"));
        assert_eq!(
            form.file_name().unwrap_err().to_string(),
            "the selected file has no usable name"
        );
    }

    #[tokio::test]
    async fn into_request() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"firmware bytes").unwrap();

        let form = NewFileForm {
            file: Some(file.path().to_owned()),
            file_type: FileType::FirmwareUpgradeImage,
            oui: " 001122 ".to_owned(),
            product_class: "IGD".to_owned(),
            version: String::new(),
        };

        let request = form.clone().into_request().await.unwrap();
        assert_eq!(request.name, form.file_name().unwrap());
        assert_eq!(request.body, b"firmware bytes");
        assert_eq!(request.metadata.oui, "001122");
        assert_eq!(request.metadata.file_type, FileType::FirmwareUpgradeImage);

        let missing = NewFileForm {
            file: Some(PathBuf::from("tests/data/missing.bin")),
            ..NewFileForm::default()
        };
        assert_eq!(
            missing.into_request().await.unwrap_err().to_string(),
            "failed to read tests/data/missing.bin"
        );
    }

    #[tokio::test]
    async fn closing_a_clean_form() {
        let upload = Upload::new();
        let asked = AtomicBool::new(false);

        let closed = close_requested(&NewFileForm::default(), &upload, |_| async {
            asked.store(true, Ordering::Relaxed);
            false
        })
        .await;

        assert!(closed);
        assert!(!asked.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn closing_with_unsaved_edits() {
        let form = NewFileForm {
            oui: "001122".to_owned(),
            ..NewFileForm::default()
        };
        let upload = Upload::new();

        // Refusing keeps the form open and leaves the upload alone
        let closed = close_requested(&form, &upload, |prompt| async move {
            assert_eq!(prompt, UNSAVED_CHANGES_PROMPT);
            false
        })
        .await;
        assert!(!closed);

        // Agreeing closes it and aborts the upload
        assert!(close_requested(&form, &upload, |_| async { true }).await);

        let store = MemoryStore::default();
        let request = UploadRequest {
            name: "late.bin".to_owned(),
            metadata: form.metadata(),
            body: Vec::new(),
        };
        let outcome = upload
            .run(&store, request, &Notifications::new(), &Refresh::new())
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
        assert!(matches!(upload.status(), Status::Cancelled));
    }

    #[tokio::test]
    async fn closing_after_a_successful_upload() {
        let form = NewFileForm {
            version: "3".to_owned(),
            ..NewFileForm::default()
        };
        let upload = Upload::new();
        let request = UploadRequest {
            name: "done.bin".to_owned(),
            metadata: form.metadata(),
            body: b"done".to_vec(),
        };
        upload
            .run(&MemoryStore::default(), request, &Notifications::new(), &Refresh::new())
            .await
            .unwrap();

        let closed = close_requested(&form, &upload, |_| async { false }).await;
        assert!(closed);
    }
}
