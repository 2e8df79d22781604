//! Multipart image extractor.
//!
//! Collects every `file` field and an optional `alt_text` field. Files whose
//! declared content type is not an accepted image type, or that exceed
//! `MAX_UPLOAD_BYTES`, reject the whole request with `400` before the
//! handler runs.

use axum::extract::{FromRequest, Multipart, Request};
use storefront_core::image::{is_allowed_image_type, ALLOWED_IMAGE_TYPES};

use crate::error::AppError;
use crate::state::AppState;

/// Upper bound on `file` fields in one request.
pub const MAX_FILES_PER_UPLOAD: usize = 10;

#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub files: Vec<UploadedImage>,
    pub alt_text: Option<String>,
}

impl ImageUpload {
    /// The single file of a one-image endpoint. Extra files are rejected.
    pub fn single(mut self) -> Result<UploadedImage, AppError> {
        if self.files.len() > 1 {
            return Err(AppError::BadRequest(
                "Exactly one 'file' field is expected".into(),
            ));
        }
        self.files
            .pop()
            .ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))
    }
}

impl FromRequest<AppState> for ImageUpload {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let max_bytes = state.config.max_upload_bytes;
        let mut files = Vec::new();
        let mut alt_text = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "file" => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_ascii_lowercase();
                    if !is_allowed_image_type(&content_type) {
                        return Err(AppError::BadRequest(format!(
                            "Unsupported file type '{content_type}'. Allowed: {}",
                            ALLOWED_IMAGE_TYPES.join(", ")
                        )));
                    }
                    if files.len() == MAX_FILES_PER_UPLOAD {
                        return Err(AppError::BadRequest(format!(
                            "At most {MAX_FILES_PER_UPLOAD} files per upload"
                        )));
                    }

                    let file_name = field.file_name().map(str::to_string);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    if bytes.is_empty() {
                        return Err(AppError::BadRequest("Uploaded file is empty".into()));
                    }
                    if bytes.len() > max_bytes {
                        return Err(AppError::BadRequest(format!(
                            "File exceeds the {max_bytes} byte upload limit"
                        )));
                    }

                    files.push(UploadedImage {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                "alt_text" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    alt_text = Some(text.trim().to_string()).filter(|t| !t.is_empty());
                }
                _ => {} // ignore unknown fields
            }
        }

        if files.is_empty() {
            return Err(AppError::BadRequest(
                "Missing required 'file' field".into(),
            ));
        }

        Ok(ImageUpload { files, alt_text })
    }
}
