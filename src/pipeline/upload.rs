//! Upload handling: the résumé bytes a single action works on.
//!
//! An [`UploadedResume`] is created per request (a multipart field or a file
//! read by the CLI) and dropped once the action finishes. Before anything is
//! handed to pdfium we look for the `%PDF-` header so a renamed text file is
//! reported as such instead of as a pdfium parse failure. Like PDF readers,
//! the header may sit anywhere in the first 1024 bytes (BOM, mail or scanner
//! prefixes).

use crate::error::AtsError;
use std::path::Path;
use tracing::debug;

const PDF_HEADER: &[u8] = b"%PDF-";

/// How far into the file the header may start.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Raw bytes of a user-submitted PDF.
#[derive(Clone)]
pub struct UploadedResume {
    name: String,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadedResume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedResume")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl UploadedResume {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        Self {
            name: if name.is_empty() {
                "resume.pdf".to_string()
            } else {
                name
            },
            bytes: bytes.into(),
        }
    }

    /// Read a résumé from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, AtsError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => AtsError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => AtsError::FileNotFound {
                path: path.to_path_buf(),
            },
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!("Read résumé {} ({} bytes)", path.display(), bytes.len());
        Ok(Self::new(name, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Reject anything without a PDF header in its first 1024 bytes.
    pub fn ensure_pdf(&self) -> Result<(), AtsError> {
        let window = &self.bytes[..self.bytes.len().min(HEADER_SEARCH_WINDOW)];
        if let Some(offset) = window
            .windows(PDF_HEADER.len())
            .position(|w| w == PDF_HEADER)
        {
            if offset > 0 {
                debug!("'{}': PDF header at byte {}", self.name, offset);
            }
            return Ok(());
        }
        Err(AtsError::NotAPdf {
            name: self.name.clone(),
            magic: self.bytes.iter().take(4).copied().collect(),
        })
    }
}

/// Fail fast when no résumé came with the action.
///
/// A file that was uploaded but is empty is not "missing": it goes on to
/// [`UploadedResume::ensure_pdf`] and fails there as a conversion error.
pub fn require_upload(upload: Option<UploadedResume>) -> Result<UploadedResume, AtsError> {
    upload.ok_or(AtsError::MissingInput)
}
