//! Attachment file encoding.
//!
//! # Responsibility
//! - Read attachment files concurrently and encode them as data URLs.
//!
//! # Invariants
//! - All reads of one batch are in flight together; the batch resolves only
//!   after every read finished or the first one failed.
//! - Absent entries (`None`) are skipped, not reported.
//! - Output order follows input order.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures_util::future::try_join_all;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

pub type AttachmentResult<T> = Result<T, AttachmentError>;

/// Attachment read failure.
#[derive(Debug)]
pub enum AttachmentError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for AttachmentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read attachment `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for AttachmentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
        }
    }
}

/// One file picked for attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentFile {
    pub path: PathBuf,
    /// Caller-reported media type; inferred from the extension when absent.
    pub mime_type: Option<String>,
}

impl AttachmentFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    fn resolved_mime_type(&self) -> &str {
        match self.mime_type.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => value,
            _ => mime_type_for_path(&self.path),
        }
    }
}

/// Best-effort media type from a file extension.
pub fn mime_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        Some("heic") => "image/heic",
        _ => FALLBACK_MIME_TYPE,
    }
}

/// Builds `data:<mime>;base64,<payload>`.
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// Encodes every present file, failing the batch on the first read error.
///
/// Must run inside a tokio runtime.
pub async fn encode_attachments(files: &[Option<AttachmentFile>]) -> AttachmentResult<Vec<String>> {
    let reads = files.iter().map(|file| async move {
        match file {
            Some(file) => encode_file(file).await.map(Some),
            None => Ok(None),
        }
    });

    match try_join_all(reads).await {
        Ok(encoded) => {
            let urls = encoded.into_iter().flatten().collect::<Vec<_>>();
            info!(
                "event=attachments_encode module=attachment status=ok requested={} encoded={}",
                files.len(),
                urls.len()
            );
            Ok(urls)
        }
        Err(err) => {
            error!(
                "event=attachments_encode module=attachment status=error requested={} error={}",
                files.len(),
                err
            );
            Err(err)
        }
    }
}

async fn encode_file(file: &AttachmentFile) -> AttachmentResult<String> {
    let bytes = tokio::fs::read(&file.path)
        .await
        .map_err(|source| AttachmentError::Read {
            path: file.path.clone(),
            source,
        })?;
    Ok(encode_data_url(file.resolved_mime_type(), &bytes))
}

#[cfg(test)]
mod tests {
    use super::{encode_data_url, mime_type_for_path, AttachmentFile};
    use std::path::Path;

    #[test]
    fn data_url_uses_standard_base64() {
        assert_eq!(encode_data_url("image/png", b"hi"), "data:image/png;base64,aGk=");
    }

    #[test]
    fn mime_type_falls_back_for_unknown_extension() {
        assert_eq!(mime_type_for_path(Path::new("scan.JPG")), "image/jpeg");
        assert_eq!(
            mime_type_for_path(Path::new("notes.bin")),
            "application/octet-stream"
        );
    }

    #[test]
    fn explicit_mime_type_wins_unless_blank() {
        let file = AttachmentFile::new("a.png").with_mime_type("image/webp");
        assert_eq!(file.resolved_mime_type(), "image/webp");
        let blank = AttachmentFile::new("a.png").with_mime_type("  ");
        assert_eq!(blank.resolved_mime_type(), "image/png");
    }
}
