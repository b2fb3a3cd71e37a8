//! Photo storage on the local filesystem under `<public_dir>/images/<folder>/<file name>`.
//!
//! The uploaded file keeps its original name. A second upload with the same name in the same
//! folder replaces the first one.

use crate::error::UploadError;
use axum::body::Bytes;
use std::path::{Path, PathBuf};

/// Multipart field carrying the photo.
pub const PHOTO_FORM_FIELD: &str = "photo";

/// URL prefix the images directory is served under.
pub const IMAGES_URL_PREFIX: &str = "/images";

/// Width of the `photo` column; longer public paths cannot be recorded.
pub const MAX_PHOTO_PATH_LEN: usize = 255;

/// One file taken from a multipart request.
#[derive(Clone, Debug)]
pub struct FileUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Clone, Debug)]
pub struct UploadStore {
    images_dir: PathBuf,
}

impl UploadStore {
    pub fn new(public_dir: &Path) -> Self {
        UploadStore {
            images_dir: public_dir.join("images"),
        }
    }

    /// Directory served at `/images`.
    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Write the file into `folder`, creating the directory if needed, and return its public path.
    /// The bytes go to a temporary sibling first and are renamed into place.
    pub async fn store(&self, folder: &str, upload: &FileUpload) -> Result<String, UploadError> {
        let file_name = sanitize_file_name(&upload.file_name)?;
        let public = public_path(folder, &file_name);
        if public.chars().count() > MAX_PHOTO_PATH_LEN {
            return Err(UploadError::InvalidFileName(upload.file_name.clone()));
        }
        let dir = self.images_dir.join(folder);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| UploadError::CreateDir {
                path: dir.clone(),
                source,
            })?;

        let target = dir.join(&file_name);
        let tmp = dir.join(format!(".upload-{}.part", uuid::Uuid::new_v4().simple()));
        if let Err(source) = tokio::fs::write(&tmp, &upload.bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(UploadError::Write { path: tmp, source });
        }
        if let Err(source) = tokio::fs::rename(&tmp, &target).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(UploadError::Write { path: target, source });
        }
        tracing::info!(path = %target.display(), bytes = upload.bytes.len(), "photo stored");
        Ok(public)
    }
}

pub fn public_path(folder: &str, file_name: &str) -> String {
    format!("{}/{}/{}", IMAGES_URL_PREFIX, folder, file_name)
}

/// Reduce a client-supplied name to its last path component. Empty, `.`, `..` and hidden
/// temporary names are rejected.
pub fn sanitize_file_name(raw: &str) -> Result<String, UploadError> {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or("").trim();
    let is_temp = name.starts_with('.') && name.ends_with(".part");
    if name.is_empty() || name == "." || name == ".." || name.contains('\0') || is_temp {
        return Err(UploadError::InvalidFileName(raw.to_string()));
    }
    Ok(name.to_string())
}
