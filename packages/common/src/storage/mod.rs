mod error;
mod key;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;

use std::sync::Arc;

pub use error::StorageError;
pub use filesystem::FilesystemBlobStore;
pub use key::ObjectKey;
#[cfg(feature = "object-storage")]
pub use self::s3::S3BlobStore;
pub use traits::{BlobStore, BoxReader};

use crate::config::{StorageBackend, StorageConfig};

/// Build the blob store selected by `config`.
pub async fn open_blob_store(config: &StorageConfig) -> Result<Arc<dyn BlobStore>, StorageError> {
    match config.backend {
        StorageBackend::Filesystem => {
            let store = FilesystemBlobStore::new(
                config.filesystem.path.clone(),
                config.max_blob_size,
                config.public_base_url.clone(),
            )
            .await?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "object-storage")]
        StorageBackend::S3 => {
            let s3 = config.s3.as_ref().ok_or_else(|| {
                StorageError::Backend("storage.backend is s3 but [storage.s3] is missing".into())
            })?;
            let store = S3BlobStore::new(s3, config.max_blob_size, config.public_base_url.clone())?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "object-storage"))]
        StorageBackend::S3 => Err(StorageError::Backend(
            "built without the object-storage feature".into(),
        )),
    }
}
