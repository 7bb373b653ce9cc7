// src/core/fs_ops.rs
//! File system helpers shared by the template store and the CLI

use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::error::{FormatterError, FormatterResult};

pub struct FsOps;

impl FsOps {
    pub async fn ensure_dir_exists(path: &Path) -> FormatterResult<()> {
        if !path.exists() {
            fs::create_dir_all(path)
                .await
                .map_err(|e| FormatterError::io(path, e))?;
            info!("Created directory: {}", path.display());
        }
        Ok(())
    }

    /// Read a UTF-8 text file
    pub async fn read_file_safe(path: &Path) -> FormatterResult<String> {
        fs::read_to_string(path)
            .await
            .map_err(|e| FormatterError::io(path, e))
    }

    pub async fn read_bytes(path: &Path) -> FormatterResult<Vec<u8>> {
        fs::read(path).await.map_err(|e| FormatterError::io(path, e))
    }

    /// Write a file, creating its parent directory first
    pub async fn write_file_safe(path: &Path, content: impl AsRef<[u8]>) -> FormatterResult<()> {
        if let Some(parent) = path.parent() {
            Self::ensure_dir_exists(parent).await?;
        }

        fs::write(path, content)
            .await
            .map_err(|e| FormatterError::io(path, e))?;

        info!("Written file: {}", path.display());
        Ok(())
    }

    /// Lowercased file extension, if any
    pub fn get_extension(path: &Path) -> Option<String> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
        Self::get_extension(path).is_some_and(|ext| extensions.contains(&ext.as_str()))
    }

    /// File name without its extension, falling back to `default`
    pub fn file_stem_or<'a>(file_name: &'a str, default: &'a str) -> &'a str {
        Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or(default)
    }
}
