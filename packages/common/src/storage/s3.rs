use std::io::Cursor;

use async_trait::async_trait;
use ::s3::Bucket;
use ::s3::Region;
use ::s3::creds::Credentials;

use super::error::StorageError;
use super::key::ObjectKey;
use super::traits::{BlobStore, BoxReader};
use crate::config::S3StorageConfig;

/// Blob store backed by an S3-compatible object storage bucket.
pub struct S3BlobStore {
    bucket: Box<Bucket>,
    max_size: u64,
    public_base_url: String,
}

fn backend<E: std::fmt::Display>(err: E) -> StorageError {
    StorageError::Backend(err.to_string())
}

impl S3BlobStore {
    pub fn new(
        config: &S3StorageConfig,
        max_size: u64,
        public_base_url: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(backend)?;
        let bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(backend)?
            .with_path_style();

        Ok(Self {
            bucket,
            max_size,
            public_base_url: public_base_url.into(),
        })
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(
        &self,
        key: &ObjectKey,
        data: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let response = self
            .bucket
            .put_object_with_content_type(key.as_str(), data, content_type)
            .await
            .map_err(backend)?;
        match response.status_code() {
            200..=299 => Ok(()),
            code => Err(StorageError::Backend(format!(
                "put {key} returned status {code}"
            ))),
        }
    }

    async fn get_stream(&self, key: &ObjectKey) -> Result<BoxReader, StorageError> {
        let response = self.bucket.get_object(key.as_str()).await.map_err(backend)?;
        match response.status_code() {
            200..=299 => Ok(Box::new(Cursor::new(response.bytes().to_vec()))),
            404 => Err(StorageError::NotFound(key.to_string())),
            code => Err(StorageError::Backend(format!(
                "get {key} returned status {code}"
            ))),
        }
    }

    async fn exists(&self, key: &ObjectKey) -> Result<bool, StorageError> {
        let (_, code) = self
            .bucket
            .head_object(key.as_str())
            .await
            .map_err(backend)?;
        match code {
            200..=299 => Ok(true),
            404 => Ok(false),
            code => Err(StorageError::Backend(format!(
                "head {key} returned status {code}"
            ))),
        }
    }

    async fn delete(&self, key: &ObjectKey) -> Result<bool, StorageError> {
        if !self.exists(key).await? {
            return Ok(false);
        }
        let response = self
            .bucket
            .delete_object(key.as_str())
            .await
            .map_err(backend)?;
        match response.status_code() {
            200..=299 => Ok(true),
            404 => Ok(false),
            code => Err(StorageError::Backend(format!(
                "delete {key} returned status {code}"
            ))),
        }
    }

    fn public_base_url(&self) -> &str {
        &self.public_base_url
    }
}
