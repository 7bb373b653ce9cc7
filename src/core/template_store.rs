// src/core/template_store.rs
//! Flat-directory template storage and ZIP import

use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use zip::ZipArchive;

use crate::core::FsOps;
use crate::error::{FormatterError, FormatterResult};

/// Extensions (lowercase, without dot) a template file may carry
pub const ACCEPTED_EXTENSIONS: &[&str] = &["html", "htm"];

const DEFAULT_EXTENSION: &str = "html";

/// Upper bound on a single uncompressed archive entry
const MAX_ENTRY_SIZE: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, Serialize)]
pub struct TemplateFailure {
    pub name: String,
    pub error: String,
}

/// Templates keyed by file name, plus the entries that had to be skipped
#[derive(Debug, Default)]
pub struct TemplateBatch {
    pub templates: BTreeMap<String, String>,
    pub failures: Vec<TemplateFailure>,
}

impl TemplateBatch {
    fn fail(&mut self, name: impl Into<String>, error: impl ToString) {
        let failure = TemplateFailure {
            name: name.into(),
            error: error.to_string(),
        };
        warn!("Skipping template {}: {}", failure.name, failure.error);
        self.failures.push(failure);
    }
}

#[derive(Debug, Default)]
pub struct SaveSummary {
    pub saved: Vec<PathBuf>,
    pub failures: Vec<TemplateFailure>,
}

#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read every accepted template in the directory.
    ///
    /// Unreadable files are reported in the batch and skipped. A missing
    /// directory is an empty store.
    pub async fn load_all(&self) -> FormatterResult<TemplateBatch> {
        let mut batch = TemplateBatch::default();

        if !self.dir.exists() {
            warn!("Templates directory does not exist: {}", self.dir.display());
            return Ok(batch);
        }

        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| FormatterError::io(&self.dir, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| FormatterError::io(&self.dir, e))?
        {
            let path = entry.path();
            if !path.is_file() || !FsOps::has_extension(&path, ACCEPTED_EXTENSIONS) {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            match FsOps::read_file_safe(&path).await {
                Ok(content) => {
                    batch.templates.insert(name.to_string(), content);
                }
                Err(e) => batch.fail(name, e),
            }
        }

        info!(
            "Loaded {} templates from {} ({} skipped)",
            batch.templates.len(),
            self.dir.display(),
            batch.failures.len()
        );
        Ok(batch)
    }

    pub async fn list(&self) -> FormatterResult<Vec<String>> {
        Ok(self.load_all().await?.templates.into_keys().collect())
    }

    /// Read a single template; the name is normalized the same way `save` does it
    pub async fn load(&self, name: &str) -> FormatterResult<String> {
        let file_name = Self::normalize_name(name)?;
        let path = self.dir.join(&file_name);
        if !path.is_file() {
            return Err(FormatterError::TemplateNotFound(file_name));
        }
        FsOps::read_file_safe(&path).await
    }

    /// Write a template, appending `.html` when the name has no accepted extension
    pub async fn save(&self, name: &str, content: &str) -> FormatterResult<PathBuf> {
        let file_name = Self::normalize_name(name)?;
        let path = self.dir.join(file_name);
        FsOps::write_file_safe(&path, content).await?;
        info!("Saved template: {}", path.display());
        Ok(path)
    }

    pub async fn save_all(&self, templates: &BTreeMap<String, String>) -> SaveSummary {
        let mut summary = SaveSummary::default();
        for (name, content) in templates {
            match self.save(name, content).await {
                Ok(path) => summary.saved.push(path),
                Err(e) => {
                    warn!("Failed to save template {}: {}", name, e);
                    summary.failures.push(TemplateFailure {
                        name: name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        summary
    }

    /// Turn a user-supplied name into a bare file name inside the store
    pub fn normalize_name(name: &str) -> FormatterResult<String> {
        let name = name.trim();
        if name.is_empty()
            || name.starts_with('.')
            || name.contains(&['/', '\\'][..])
            || name.contains("..")
        {
            return Err(FormatterError::InvalidTemplateName(name.to_string()));
        }

        if FsOps::has_extension(Path::new(name), ACCEPTED_EXTENSIONS) {
            Ok(name.to_string())
        } else {
            Ok(format!("{}.{}", name, DEFAULT_EXTENSION))
        }
    }

    /// Pull every accepted template out of an in-memory ZIP archive.
    ///
    /// Entries are keyed by base file name. A corrupt archive yields an empty
    /// batch with a single failure.
    pub fn extract_from_archive(bytes: &[u8]) -> TemplateBatch {
        let mut batch = TemplateBatch::default();

        let mut archive = match ZipArchive::new(Cursor::new(bytes)) {
            Ok(archive) => archive,
            Err(e) => {
                batch.fail("archive", e);
                return batch;
            }
        };

        for index in 0..archive.len() {
            let mut entry = match archive.by_index(index) {
                Ok(entry) => entry,
                Err(e) => {
                    batch.fail(format!("entry #{}", index), e);
                    continue;
                }
            };

            if entry.is_dir() {
                continue;
            }

            let entry_name = entry.name().to_string();
            let Some(base_name) = Path::new(&entry_name)
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
            else {
                continue;
            };

            if !FsOps::has_extension(Path::new(&base_name), ACCEPTED_EXTENSIONS) {
                continue;
            }

            if entry.size() > MAX_ENTRY_SIZE {
                batch.fail(
                    entry_name,
                    format!("entry exceeds {} MiB", MAX_ENTRY_SIZE / (1024 * 1024)),
                );
                continue;
            }

            let mut buf = Vec::with_capacity(entry.size() as usize);
            if let Err(e) = entry.by_ref().take(MAX_ENTRY_SIZE).read_to_end(&mut buf) {
                batch.fail(entry_name, e);
                continue;
            }

            match String::from_utf8(buf) {
                Ok(content) => {
                    batch.templates.insert(base_name, content);
                }
                Err(_) => batch.fail(entry_name, "not valid UTF-8"),
            }
        }

        info!(
            "Extracted {} templates from archive ({} skipped)",
            batch.templates.len(),
            batch.failures.len()
        );
        batch
    }
}
