use chrono::Utc;
use common::storage::{BlobStore, ObjectKey};
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};
use tracing::warn;

use crate::entity::product_image;
use crate::error::AppError;
use crate::utils::filename::ImageKind;

/// Upper bound on images attached to one article.
pub const MAX_IMAGES: usize = 10;

/// An image received from the client, already checked to be an image type.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub kind: ImageKind,
    pub bytes: Vec<u8>,
}

/// Uploads images for one article and remembers every key it touched, so a
/// failed transaction can take the blobs back out.
pub(crate) struct ImageWriter<'a> {
    blobs: &'a dyn BlobStore,
    written: Vec<ObjectKey>,
}

impl<'a> ImageWriter<'a> {
    pub fn new(blobs: &'a dyn BlobStore) -> Self {
        Self {
            blobs,
            written: Vec::new(),
        }
    }

    /// Put each upload under `articles/{article_id}/` and insert its row.
    pub async fn store_all<C: ConnectionTrait>(
        &mut self,
        conn: &C,
        article_id: i32,
        uploads: Vec<ImageUpload>,
    ) -> Result<Vec<product_image::Model>, AppError> {
        let prefix = format!("articles/{article_id}");
        let mut rows = Vec::with_capacity(uploads.len());

        for upload in uploads {
            let key = ObjectKey::generate(&prefix, &upload.kind.extension)?;
            // Recorded before the put so a partial write is also cleaned up.
            self.written.push(key.clone());
            self.blobs
                .put(&key, &upload.bytes, &upload.kind.content_type)
                .await?;

            let row = product_image::ActiveModel {
                article_id: Set(article_id),
                url: Set(self.blobs.url_for(&key)),
                created_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(conn)
            .await?;
            rows.push(row);
        }

        Ok(rows)
    }

    /// Delete everything written so far. Best-effort.
    pub async fn discard(self) {
        for key in &self.written {
            if let Err(e) = self.blobs.delete(key).await {
                warn!(key = %key, "Failed to discard uploaded image: {e}");
            }
        }
    }
}

/// Delete the blobs behind image URLs. Best-effort and idempotent.
pub(crate) async fn delete_image_blobs<'u>(
    blobs: &dyn BlobStore,
    urls: impl IntoIterator<Item = &'u str>,
) {
    for url in urls {
        let Some(key) = blobs.key_for_url(url) else {
            warn!(url, "Image URL does not belong to the blob store; skipping");
            continue;
        };
        if let Err(e) = blobs.delete(&key).await {
            warn!(key = %key, "Failed to delete image blob: {e}");
        }
    }
}
