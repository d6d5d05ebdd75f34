//! # Media Library
//!
//! The upload/list/delete surface over the object store. Validation and
//! object-name derivation happen here, before anything leaves the machine;
//! the store only ever sees acceptable, collision-safe names.

use std::sync::Arc;

use chrono::Utc;
use rand::distr::{Alphanumeric, SampleString};

use cs_core::{validate_upload, AppError, Identity, MediaFile, MediaStore, Result};

pub struct MediaLibrary {
    store: Arc<dyn MediaStore>,
    files: Vec<MediaFile>,
}

impl MediaLibrary {
    pub fn new(store: Arc<dyn MediaStore>) -> Self {
        MediaLibrary {
            store,
            files: Vec::new(),
        }
    }

    pub fn files(&self) -> &[MediaFile] {
        &self.files
    }

    pub async fn refresh(&mut self) -> Result<()> {
        match self.store.list().await {
            Ok(files) => {
                self.files = files;
                Ok(())
            }
            Err(err) => {
                log::error!("failed to list media files: {err}");
                Err(AppError::Transport("Failed to load media files".to_string()))
            }
        }
    }

    /// Validates and stores an upload. The original filename contributes
    /// only its extension; the stored name is `<timestamp>-<suffix>.<ext>`.
    pub async fn upload(
        &mut self,
        identity: Option<&Identity>,
        original_name: &str,
        data: Vec<u8>,
    ) -> Result<MediaFile> {
        require_identity(identity)?;
        validate_upload(original_name, data.len() as u64)?;
        let ext = original_name
            .rsplit_once('.')
            .map(|(_, e)| e.to_ascii_lowercase())
            .ok_or_else(|| AppError::Validation("Invalid file name".to_string()))?;
        let name = object_name(&ext);
        let file = self.store.upload(&name, data).await?;
        if let Err(err) = self.refresh().await {
            log::warn!("uploaded, but refreshing the library failed: {err}");
        }
        Ok(file)
    }

    pub async fn remove(&mut self, identity: Option<&Identity>, name: &str) -> Result<()> {
        require_identity(identity)?;
        self.store.remove(name).await?;
        if let Err(err) = self.refresh().await {
            log::warn!("removed, but refreshing the library failed: {err}");
        }
        Ok(())
    }
}

fn require_identity(identity: Option<&Identity>) -> Result<&Identity> {
    identity.ok_or_else(|| {
        AppError::Permission("Please sign in to access the media library".to_string())
    })
}

/// Collision-safe object name: a numeric timestamp down to milliseconds plus
/// a short random suffix.
fn object_name(extension: &str) -> String {
    let stamp = Utc::now().format("%Y%m%d%H%M%S%3f");
    let suffix = Alphanumeric
        .sample_string(&mut rand::rng(), 6)
        .to_lowercase();
    format!("{stamp}-{suffix}.{extension}")
}
