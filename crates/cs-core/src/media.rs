//! # Media Rules
//!
//! What counts as an acceptable upload, decided from the file name alone.
//! The original filename is discarded at upload time; only the extension
//! survives.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];
pub const VIDEO_EXTENSIONS: [&str; 2] = ["mp4", "webm"];

pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;
pub const MAX_VIDEO_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classifies a file by extension, case-insensitively. `None` means the
    /// file is not accepted media at all.
    pub fn from_name(name: &str) -> Option<MediaKind> {
        let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    pub fn max_bytes(self) -> u64 {
        match self {
            MediaKind::Image => MAX_IMAGE_BYTES,
            MediaKind::Video => MAX_VIDEO_BYTES,
        }
    }
}

/// One stored object as the library sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFile {
    pub name: String,
    pub url: String,
    pub kind: MediaKind,
}

/// Rejects uploads with unacceptable extensions or over the size ceiling.
pub fn validate_upload(name: &str, size: u64) -> Result<MediaKind> {
    let Some(kind) = MediaKind::from_name(name) else {
        return Err(AppError::Validation(
            "Invalid file type. Please upload an image or video file (jpg, png, gif, webp, mp4, webm)."
                .to_string(),
        ));
    };
    if size > kind.max_bytes() {
        return Err(AppError::Validation(match kind {
            MediaKind::Video => "Video files must be smaller than 50MB".to_string(),
            MediaKind::Image => "Image files must be smaller than 5MB".to_string(),
        }));
    }
    Ok(kind)
}
