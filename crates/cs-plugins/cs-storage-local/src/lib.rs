//! # cs-storage-local
//!
//! Local filesystem implementation of `MediaStore`: one flat directory of
//! media objects, each addressable by name, with public URLs derived from a
//! configured prefix.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use cs_core::error::{AppError, Result};
use cs_core::media::{MediaFile, MediaKind};
use cs_core::traits::MediaStore;

pub struct LocalMediaStore {
    /// Root directory for all uploads (e.g., "./data/uploads")
    root_path: PathBuf,
    /// Public URL prefix (e.g., "/static/uploads")
    url_prefix: String,
}

impl LocalMediaStore {
    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self {
            root_path: root,
            url_prefix,
        }
    }

    fn public_url(&self, name: &str) -> String {
        format!("{}/{}", self.url_prefix, name)
    }

    /// The namespace is flat; a separator in a name would escape it.
    fn checked_path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err(AppError::Validation(format!("invalid object name: {name}")));
        }
        Ok(self.root_path.join(name))
    }
}

fn io_err(err: io::Error) -> AppError {
    AppError::Transport(err.to_string())
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    /// Lists every stored media object, name-ascending. Files with
    /// unacceptable extensions are skipped rather than surfaced.
    async fn list(&self) -> Result<Vec<MediaFile>> {
        let mut files = Vec::new();
        let mut entries = match fs::read_dir(&self.root_path).await {
            Ok(entries) => entries,
            // an empty library is a library that was never written to
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(files),
            Err(err) => return Err(io_err(err)),
        };
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            if !entry.file_type().await.map_err(io_err)?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(kind) = MediaKind::from_name(&name) {
                files.push(MediaFile {
                    url: self.public_url(&name),
                    name,
                    kind,
                });
            }
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    async fn upload(&self, name: &str, data: Vec<u8>) -> Result<MediaFile> {
        let kind = MediaKind::from_name(name).ok_or_else(|| {
            AppError::Validation(format!("unacceptable media extension: {name}"))
        })?;
        let path = self.checked_path(name)?;
        let content_type = mime_guess::from_path(&path).first_or_octet_stream();
        fs::create_dir_all(&self.root_path).await.map_err(io_err)?;
        fs::write(&path, &data).await.map_err(io_err)?;
        log::debug!("stored {} ({}, {} bytes)", name, content_type, data.len());
        Ok(MediaFile {
            name: name.to_string(),
            url: self.public_url(name),
            kind,
        })
    }

    async fn remove(&self, name: &str) -> Result<()> {
        let path = self.checked_path(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("no stored object named {name}")))
            }
            Err(err) => Err(io_err(err)),
        }
    }
}
