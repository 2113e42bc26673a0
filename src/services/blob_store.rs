//! # Blob Store Service
//!
//! Object storage for uploaded file content. The trait keeps handlers
//! independent of the backing service so tests and local development can
//! run without AWS credentials.
//!
//! ## Implementations
//!
//! - [`S3BlobStore`] - Production implementation backed by an S3 bucket
//! - [`MemoryBlobStore`] - In-process implementation for development and testing

use async_trait::async_trait;
use aws_sdk_s3::{Client, config::Region, error::DisplayErrorContext, primitives::ByteStream};
use bytes::Bytes;
use dashmap::DashMap;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Errors that can occur during blob store operations
#[derive(Debug, Error)]
pub enum BlobStoreError {
    #[error("failed to put object `{key}`: {message}")]
    Put { key: String, message: String },

    #[error("failed to delete object `{key}`: {message}")]
    Delete { key: String, message: String },
}

/// Trait for object storage backends
///
/// Objects are addressed by key inside a single location (the bucket).
/// Locators stored in file records are `"{location}/{key}"`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `data` under `key`, replacing any existing object.
    ///
    /// # Errors
    ///
    /// Returns [`BlobStoreError::Put`] if the backend rejects the write.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), BlobStoreError>;

    /// Removes the object stored under `key`.
    ///
    /// Deleting a key that does not exist is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`BlobStoreError::Delete`] if the backend rejects the delete.
    async fn delete(&self, key: &str) -> Result<(), BlobStoreError>;

    /// Name of the bucket (or equivalent) objects are written to.
    fn location(&self) -> &str;
}

/// S3 backed blob store.
///
/// Credentials are resolved by the default AWS provider chain
/// (environment, profile, instance metadata).
pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    /// Builds a client for `region` from the ambient AWS configuration.
    pub async fn new(bucket: String, region: String) -> Self {
        info!(bucket = %bucket, region = %region, "Initializing S3 blob store");

        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region))
            .load()
            .await;

        Self {
            client: Client::new(&config),
            bucket,
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    #[instrument(skip(self, data), fields(bucket = %self.bucket, size = data.len()))]
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), BlobStoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| BlobStoreError::Put {
                key: key.to_owned(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        debug!("Object stored in S3");
        Ok(())
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| BlobStoreError::Delete {
                key: key.to_owned(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        debug!("Object deleted from S3");
        Ok(())
    }

    fn location(&self) -> &str {
        &self.bucket
    }
}

/// An object held by [`MemoryBlobStore`].
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub data: Bytes,
    pub content_type: String,
}

/// In-process blob store
///
/// Keeps objects in a concurrent map. Nothing survives a restart, which
/// makes it suitable for local development and integration tests.
#[derive(Debug)]
pub struct MemoryBlobStore {
    location: String,
    objects: DashMap<String, StoredBlob>,
}

impl MemoryBlobStore {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            objects: DashMap::new(),
        }
    }

    /// Returns a copy of the object stored under `key`.
    pub fn get(&self, key: &str) -> Option<StoredBlob> {
        self.objects.get(key).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    #[instrument(skip(self, data), fields(location = %self.location, size = data.len()))]
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), BlobStoreError> {
        self.objects.insert(
            key.to_owned(),
            StoredBlob {
                data,
                content_type: content_type.to_owned(),
            },
        );
        debug!("Object stored in memory");
        Ok(())
    }

    #[instrument(skip(self), fields(location = %self.location))]
    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        if self.objects.remove(key).is_none() {
            debug!("Object was already absent");
        }
        Ok(())
    }

    fn location(&self) -> &str {
        &self.location
    }
}
