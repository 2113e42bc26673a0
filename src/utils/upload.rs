//! # Upload Utilities
//!
//! Validation of the uploaded image part and derivation of blob keys and
//! locators. Kept free of I/O so the rules can be tested directly.

use std::path::Path;

use tracing::trace;
use uuid::Uuid;

use crate::utils::constant::MAX_UPLOAD_SIZE;

/// Provides image validation utilities for the upload handler.
pub struct ImageUploadValidator;

impl ImageUploadValidator {
    /// Validates that the content type is an image type.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Content type starts with `image/`
    /// * `Err(&str)` - Content type is missing or not an image
    pub fn validate_content_type(content_type: Option<&str>) -> Result<(), &'static str> {
        match content_type {
            Some(ct) if ct.starts_with("image/") => Ok(()),
            _ => Err("File must be an image (image/* content type required)"),
        }
    }

    /// Validates that the file does not exceed [`MAX_UPLOAD_SIZE`].
    pub fn validate_size(data: &[u8]) -> Result<(), &'static str> {
        if data.len() > MAX_UPLOAD_SIZE {
            return Err("File exceeds the 5 MiB limit");
        }
        trace!(size = data.len(), "File size validated");
        Ok(())
    }
}

/// Builds and parses the references between file records and blobs.
pub struct StorageLocator;

impl StorageLocator {
    /// Generates a blob key for a new upload.
    ///
    /// The key is `{id}/{random uuid}{ext}`, where `ext` is the extension of
    /// the original file name including the leading dot, or empty.
    pub fn generate_key(id: Uuid, original_name: &str) -> String {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();

        format!("{id}/{}{extension}", Uuid::new_v4())
    }

    /// Combines the blob store location and a key into the locator stored
    /// in the file record.
    pub fn locator(location: &str, key: &str) -> String {
        format!("{location}/{key}")
    }

    /// Recovers the blob key from a stored locator.
    ///
    /// A locator that does not start with `{location}/` is used as the key
    /// unchanged.
    pub fn key_from_locator<'a>(location: &str, locator: &'a str) -> &'a str {
        locator
            .strip_prefix(location)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(locator)
    }
}
