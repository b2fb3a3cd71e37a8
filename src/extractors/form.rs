//! Multipart form submission: text fields plus at most one `photo` file.

use crate::error::{AppError, FormError, UploadError};
use crate::upload::{FileUpload, PHOTO_FORM_FIELD};
use async_trait::async_trait;
use axum::extract::{FromRequest, Multipart, Request};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct FormSubmission {
    pub fields: HashMap<String, String>,
    pub photo: Option<FileUpload>,
}

#[async_trait]
impl<S> FromRequest<S> for FormSubmission
where
    S: Send + Sync,
{
    type Rejection = FormError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let mut form = FormSubmission::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == PHOTO_FORM_FIELD {
                // No file chosen: browsers still send the part, with an empty file name.
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| AppError::BadRequest(e.body_text()))?;
                if file_name.is_empty() {
                    continue;
                }
                if form.photo.is_some() {
                    return Err(UploadError::TooManyFiles(name).into());
                }
                form.photo = Some(FileUpload { file_name, bytes });
            } else if !name.is_empty() {
                let text = field.text().await.map_err(|e| AppError::BadRequest(e.body_text()))?;
                form.fields.insert(name, text);
            }
        }
        Ok(form)
    }
}
