pub mod images;
pub mod like;
pub mod service;

use sea_orm::sea_query::LockType;
use sea_orm::{ConnectionTrait, DatabaseTransaction, EntityTrait, QuerySelect};

pub use images::{ImageUpload, MAX_IMAGES};
pub use like::{LikeRegistry, LikeState};
pub use service::{ArticleChanges, ArticleDetail, ArticleService, ArticleWithImages, NewArticle};

use crate::entity::article;
use crate::error::AppError;

pub(crate) async fn find_article<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<article::Model, AppError> {
    article::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Article not found".into()))
}

/// Load an article with `SELECT ... FOR UPDATE`, serializing every state
/// change of that article behind the transaction holding the lock.
pub(crate) async fn find_article_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<article::Model, AppError> {
    article::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Article not found".into()))
}
