use std::path::Path;
use std::time::Duration;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::models::draft::{FileAttachment, MAX_DOCUMENT_BYTES};

const CV_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

/// Intake for uploaded CVs. Parsing is simulated by a fixed delay before the
/// file is accepted.
#[derive(Clone)]
pub struct DocumentService {
    parse_delay: Duration,
}

impl DocumentService {
    pub fn new(parse_delay: Duration) -> Self {
        Self { parse_delay }
    }

    pub async fn accept_cv(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        data: Bytes,
    ) -> Result<FileAttachment> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if !CV_EXTENSIONS.contains(&ext.as_str()) {
            return Err(Error::BadRequest(format!("File type .{} is not allowed for a CV", ext)));
        }
        if data.len() > MAX_DOCUMENT_BYTES {
            return Err(Error::Draft(crate::models::draft::DraftError::FileTooLarge {
                name: file_name.to_string(),
                limit: MAX_DOCUMENT_BYTES,
            }));
        }
        if ext == "pdf" && !data.starts_with(b"%PDF") {
            return Err(Error::BadRequest("Invalid PDF file content".into()));
        }

        if !self.parse_delay.is_zero() {
            tokio::time::sleep(self.parse_delay).await;
        }

        let content_type = content_type
            .map(str::to_string)
            .unwrap_or_else(|| content_type_for(&ext).to_string());
        tracing::info!(file = %file_name, size = data.len(), "CV accepted");
        Ok(FileAttachment::new(file_name, content_type, data))
    }
}

fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accepts_pdf_with_magic_bytes() {
        let svc = DocumentService::new(Duration::ZERO);
        let cv = svc
            .accept_cv("Resume.PDF", None, Bytes::from_static(b"%PDF-1.4 body"))
            .await
            .unwrap();
        assert_eq!(cv.content_type, "application/pdf");
        assert_eq!(cv.size(), 13);
    }

    #[tokio::test]
    async fn rejects_wrong_extension_and_fake_pdf() {
        let svc = DocumentService::new(Duration::ZERO);
        assert!(matches!(
            svc.accept_cv("cv.exe", None, Bytes::from_static(b"MZ")).await,
            Err(Error::BadRequest(_))
        ));
        assert!(matches!(
            svc.accept_cv("cv.pdf", None, Bytes::from_static(b"not a pdf")).await,
            Err(Error::BadRequest(_))
        ));
    }
}
