// src/web/handlers/helpers.rs
//! Shared utility functions for upload handlers

use rocket::fs::TempFile;
use std::path::Path;
use tracing::debug;

use crate::core::FsOps;
use crate::error::{FormatterError, FormatterResult};

const DEFAULT_RESUME_NAME: &str = "resume.pdf";

/// Read an uploaded form file fully into memory
pub async fn read_upload(file: &mut TempFile<'_>, prefix: &str) -> FormatterResult<Vec<u8>> {
    let temp_path = std::env::temp_dir().join(format!("{}_{}", prefix, uuid::Uuid::new_v4()));

    file.persist_to(&temp_path)
        .await
        .map_err(|e| FormatterError::io(&temp_path, e))?;

    let bytes = FsOps::read_bytes(&temp_path).await;
    let _ = tokio::fs::remove_file(&temp_path).await;

    let bytes = bytes?;
    debug!("Read {} uploaded bytes", bytes.len());
    Ok(bytes)
}

/// Check that an uploaded resume is a PDF and settle on the file name
/// reported for it.
///
/// An explicit name wins over the multipart file name. The client's name is
/// kept as sent (minus any directory and header-breaking characters); `.pdf`
/// is only appended once the upload has passed the check and has no extension.
pub fn resume_filename(explicit: Option<&str>, file: &TempFile<'_>) -> FormatterResult<String> {
    let name = explicit
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .or_else(|| {
            file.raw_name()
                .map(|n| n.dangerous_unsafe_unsanitized_raw().as_str())
        })
        .and_then(clean_file_name);

    let is_pdf_type = file.content_type().is_some_and(|ct| ct.is_pdf());
    let has_pdf_extension = name
        .as_deref()
        .is_some_and(|n| FsOps::has_extension(Path::new(n), &["pdf"]));

    if !is_pdf_type && !has_pdf_extension {
        return Err(FormatterError::InvalidUpload("resume must be a PDF file"));
    }

    Ok(match name {
        Some(name) if FsOps::get_extension(Path::new(&name)).is_some() => name,
        Some(name) => format!("{}.pdf", name),
        None => DEFAULT_RESUME_NAME.to_string(),
    })
}

/// Base name of a client-supplied path with quotes and control characters removed
pub(crate) fn clean_file_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(&['/', '\\'][..]).next().unwrap_or(raw);
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .collect();
    let cleaned = cleaned.trim();

    match cleaned {
        "" | "." | ".." => None,
        _ => Some(cleaned.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_file_name() {
        assert_eq!(clean_file_name("alice.pdf").as_deref(), Some("alice.pdf"));
        assert_eq!(clean_file_name("C:\\Users\\a\\cv.pdf").as_deref(), Some("cv.pdf"));
        assert_eq!(clean_file_name("../../etc/cv.pdf").as_deref(), Some("cv.pdf"));
        assert_eq!(clean_file_name("a\"b\r\n.pdf").as_deref(), Some("ab.pdf"));
        assert_eq!(clean_file_name("  Zoë CV.pdf ").as_deref(), Some("Zoë CV.pdf"));
    }

    #[test]
    fn test_clean_file_name_rejects_empty_names() {
        for raw in ["", "   ", "dir/", "..", "\"\""] {
            assert_eq!(clean_file_name(raw), None, "{raw:?}");
        }
    }
}
