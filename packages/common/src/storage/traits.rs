use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;
use super::key::ObjectKey;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Key-addressed blob storage with public URLs.
///
/// The store is not transactional: callers that pair blob writes with
/// database writes must compensate on failure themselves.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under `key`, replacing any previous object with that key.
    async fn put(
        &self,
        key: &ObjectKey,
        data: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Retrieve all bytes of an object.
    async fn get(&self, key: &ObjectKey) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.get_stream(key).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Retrieve an object as a streaming async reader.
    async fn get_stream(&self, key: &ObjectKey) -> Result<BoxReader, StorageError>;

    /// Check whether an object exists.
    async fn exists(&self, key: &ObjectKey) -> Result<bool, StorageError>;

    /// Delete an object.
    ///
    /// Returns `true` if the object was deleted, `false` if it did not exist,
    /// which makes repeated deletes harmless.
    async fn delete(&self, key: &ObjectKey) -> Result<bool, StorageError>;

    /// Base URL that objects of this store are served under.
    fn public_base_url(&self) -> &str;

    /// Public URL of an object.
    fn url_for(&self, key: &ObjectKey) -> String {
        format!("{}/{}", self.public_base_url().trim_end_matches('/'), key)
    }

    /// Recover the key from a URL produced by [`BlobStore::url_for`].
    ///
    /// Returns `None` for URLs that do not belong to this store.
    fn key_for_url(&self, url: &str) -> Option<ObjectKey> {
        let base = self.public_base_url().trim_end_matches('/');
        let rest = url.strip_prefix(base)?.strip_prefix('/')?;
        ObjectKey::parse(rest).ok()
    }
}
