use chrono::Utc;
use common::TradeStatus;
use common::storage::BlobStore;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{info, warn};

use super::images::{ImageUpload, ImageWriter, delete_image_blobs};
use super::find_article_for_update;
use crate::entity::{article, like_article, offer, product_image, review, user};
use crate::error::AppError;
use crate::extractors::auth::AuthUser;

/// Descriptive fields of a new article.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub price: i64,
    pub quantity: i32,
    pub category: String,
    pub trade_method: String,
    pub addr1: Option<String>,
    pub addr2: Option<String>,
}

/// Partial update of an article's descriptive fields.
///
/// Merge rule: `None` leaves the stored value as it is, `Some(v)` replaces
/// it. Identity, writer, counters, trade status and the creation time are not
/// representable here and therefore never change through an update.
#[derive(Debug, Clone, Default)]
pub struct ArticleChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub price: Option<i64>,
    pub quantity: Option<i32>,
    pub category: Option<String>,
    pub trade_method: Option<String>,
    pub addr1: Option<String>,
    pub addr2: Option<String>,
}

impl ArticleChanges {
    pub fn apply(self, active: &mut article::ActiveModel) {
        fn merge<T: Into<sea_orm::Value>>(slot: &mut ActiveValue<T>, value: Option<T>) {
            if let Some(v) = value {
                *slot = Set(v);
            }
        }

        merge(&mut active.title, self.title);
        merge(&mut active.content, self.content);
        merge(&mut active.price, self.price);
        merge(&mut active.quantity, self.quantity);
        merge(&mut active.category, self.category);
        merge(&mut active.trade_method, self.trade_method);
        if let Some(addr1) = self.addr1 {
            active.addr1 = Set(Some(addr1));
        }
        if let Some(addr2) = self.addr2 {
            active.addr2 = Set(Some(addr2));
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArticleWithImages {
    pub article: article::Model,
    pub images: Vec<product_image::Model>,
}

/// Everything the detail page shows.
#[derive(Debug, Clone)]
pub struct ArticleDetail {
    pub article: article::Model,
    pub images: Vec<product_image::Model>,
    pub writer: user::Model,
    /// `None` for anonymous viewers.
    pub is_liked: Option<bool>,
}

/// Article authoring: keeps article rows, image rows and image blobs in step.
///
/// The blob store is not transactional. Blobs uploaded inside a failed
/// transaction are deleted again; blobs of deleted or replaced images are
/// deleted only after the commit.
pub struct ArticleService<'a> {
    db: &'a DatabaseConnection,
    blobs: &'a dyn BlobStore,
}

impl<'a> ArticleService<'a> {
    pub fn new(db: &'a DatabaseConnection, blobs: &'a dyn BlobStore) -> Self {
        Self { db, blobs }
    }

    async fn abort(&self, txn: DatabaseTransaction, writer: ImageWriter<'_>) {
        if let Err(e) = txn.rollback().await {
            warn!("Rollback failed: {e}");
        }
        writer.discard().await;
    }

    pub async fn create(
        &self,
        principal: &AuthUser,
        fields: NewArticle,
        images: Vec<ImageUpload>,
    ) -> Result<ArticleWithImages, AppError> {
        let txn = self.db.begin().await?;
        let mut writer = ImageWriter::new(self.blobs);

        let result = async {
            let now = Utc::now();
            let article = article::ActiveModel {
                writer_id: Set(principal.user_id),
                title: Set(fields.title),
                content: Set(fields.content),
                price: Set(fields.price),
                quantity: Set(fields.quantity),
                category: Set(fields.category),
                trade_method: Set(fields.trade_method),
                addr1: Set(fields.addr1),
                addr2: Set(fields.addr2),
                view_count: Set(0),
                like_count: Set(0),
                trade_status: Set(TradeStatus::Sale),
                created_at: Set(now),
                modified_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;

            let images = writer.store_all(&txn, article.id, images).await?;
            Ok::<_, AppError>(ArticleWithImages { article, images })
        }
        .await;

        let created = match result {
            Ok(created) => created,
            Err(e) => {
                self.abort(txn, writer).await;
                return Err(e);
            }
        };
        if let Err(e) = txn.commit().await {
            writer.discard().await;
            return Err(e.into());
        }

        info!(
            article_id = created.article.id,
            writer_id = principal.user_id,
            images = created.images.len(),
            "Article created"
        );
        Ok(created)
    }

    /// Merge `changes` into the article. A non-empty `images` replaces the
    /// whole image set; an empty one leaves the images untouched.
    pub async fn update(
        &self,
        principal: &AuthUser,
        id: i32,
        changes: ArticleChanges,
        images: Vec<ImageUpload>,
    ) -> Result<ArticleWithImages, AppError> {
        let txn = self.db.begin().await?;
        let existing = find_article_for_update(&txn, id).await?;
        if existing.writer_id != principal.user_id {
            return Err(AppError::Forbidden(
                "Only the writer can edit this article".into(),
            ));
        }

        let replace_images = !images.is_empty();
        let old_images = product_image::Entity::find()
            .filter(product_image::Column::ArticleId.eq(id))
            .order_by_asc(product_image::Column::Id)
            .all(&txn)
            .await?;

        let mut writer = ImageWriter::new(self.blobs);
        let result = async {
            let mut active: article::ActiveModel = existing.into();
            changes.apply(&mut active);
            active.modified_at = Set(Utc::now());
            let article = active.update(&txn).await?;

            let images = if replace_images {
                product_image::Entity::delete_many()
                    .filter(product_image::Column::ArticleId.eq(id))
                    .exec(&txn)
                    .await?;
                writer.store_all(&txn, id, images).await?
            } else {
                old_images.clone()
            };
            Ok::<_, AppError>(ArticleWithImages { article, images })
        }
        .await;

        let updated = match result {
            Ok(updated) => updated,
            Err(e) => {
                self.abort(txn, writer).await;
                return Err(e);
            }
        };
        if let Err(e) = txn.commit().await {
            writer.discard().await;
            return Err(e.into());
        }

        if replace_images {
            let urls: Vec<&str> = old_images.iter().map(|img| img.url.as_str()).collect();
            delete_image_blobs(self.blobs, urls).await;
        }

        info!(article_id = id, replaced_images = replace_images, "Article updated");
        Ok(updated)
    }

    /// Delete an article with its likes, offers and images.
    ///
    /// Refused once the article has a review: the trade record is final.
    pub async fn delete(&self, principal: &AuthUser, id: i32) -> Result<(), AppError> {
        let txn = self.db.begin().await?;
        let existing = find_article_for_update(&txn, id).await?;
        if existing.writer_id != principal.user_id {
            return Err(AppError::Forbidden(
                "Only the writer can delete this article".into(),
            ));
        }

        let reviews = review::Entity::find()
            .filter(review::Column::ArticleId.eq(id))
            .count(&txn)
            .await?;
        if reviews > 0 {
            return Err(AppError::Conflict(
                "An article with reviews cannot be deleted".into(),
            ));
        }

        let images = product_image::Entity::find()
            .filter(product_image::Column::ArticleId.eq(id))
            .all(&txn)
            .await?;

        like_article::Entity::delete_many()
            .filter(like_article::Column::ArticleId.eq(id))
            .exec(&txn)
            .await?;
        offer::Entity::delete_many()
            .filter(offer::Column::ArticleId.eq(id))
            .exec(&txn)
            .await?;
        product_image::Entity::delete_many()
            .filter(product_image::Column::ArticleId.eq(id))
            .exec(&txn)
            .await?;
        article::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        let urls: Vec<&str> = images.iter().map(|img| img.url.as_str()).collect();
        delete_image_blobs(self.blobs, urls).await;

        info!(article_id = id, images = images.len(), "Article deleted");
        Ok(())
    }

    /// Load the detail view and count the visit.
    pub async fn detail(
        &self,
        viewer: Option<&AuthUser>,
        id: i32,
    ) -> Result<ArticleDetail, AppError> {
        let txn = self.db.begin().await?;
        let existing = find_article_for_update(&txn, id).await?;
        let views = existing.view_count.saturating_add(1);
        let mut active: article::ActiveModel = existing.into();
        active.view_count = Set(views);
        let article = active.update(&txn).await?;
        txn.commit().await?;

        let images = product_image::Entity::find()
            .filter(product_image::Column::ArticleId.eq(id))
            .order_by_asc(product_image::Column::Id)
            .all(self.db)
            .await?;

        let writer = user::Entity::find_by_id(article.writer_id)
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Writer of article {id} is missing")))?;

        let is_liked = match viewer {
            Some(viewer) => Some(
                like_article::Entity::find_by_id((viewer.user_id, id))
                    .one(self.db)
                    .await?
                    .is_some(),
            ),
            None => None,
        };

        Ok(ArticleDetail {
            article,
            images,
            writer,
            is_liked,
        })
    }
}
