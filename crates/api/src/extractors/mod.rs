//! Request-body extractors that reject bad input before a handler runs.

pub mod image_upload;
pub mod validated_json;

pub use image_upload::{ImageUpload, UploadedImage};
pub use validated_json::ValidatedJson;
