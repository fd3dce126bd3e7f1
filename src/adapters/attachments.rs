use crate::config::FilesConfig;
use crate::utils::error::{ApplyError, Result};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct AttachmentFile {
    /// Logical slot ("cv", "cover_letter", "flyer"), used to pick form field names.
    pub slot: &'static str,
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Attachment files read once at startup and shared by both adapters.
/// An unreadable file is a startup error, before any company is processed.
#[derive(Debug, Clone, Default)]
pub struct AttachmentSet {
    pub files: Vec<AttachmentFile>,
}

impl AttachmentSet {
    pub fn load(files: &FilesConfig) -> Result<Self> {
        let mut loaded = Vec::new();
        for (slot, path) in files.attachment_paths() {
            let path_ref = Path::new(path);
            let bytes = std::fs::read(path_ref).map_err(|e| ApplyError::Config {
                message: format!("cannot read attachment '{}': {}", path, e),
            })?;
            let filename = path_ref
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(slot)
                .to_string();
            loaded.push(AttachmentFile {
                slot,
                filename,
                content_type: content_type_for(path_ref),
                bytes,
            });
        }
        Ok(Self { files: loaded })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        "application/pdf"
    } else {
        "application/octet-stream"
    }
}
