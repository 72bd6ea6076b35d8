//! The article trade state machine.
//!
//! `SALE -> RESERVED -> COMPLETE`, driven by offer selection and completion.
//! The backward moves (`RESERVED -> SALE`, `COMPLETE -> RESERVED`) are only
//! allowed while the article has no review. Every transition holds the
//! article's row lock for its whole transaction.

pub mod offer;
pub mod review;

pub use offer::OfferService;
pub use review::{NewReview, ReviewLedger};

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};

use crate::entity::review as review_entity;
use crate::error::AppError;

pub(crate) async fn has_reviews<C: ConnectionTrait>(
    conn: &C,
    article_id: i32,
) -> Result<bool, AppError> {
    let count = review_entity::Entity::find()
        .filter(review_entity::Column::ArticleId.eq(article_id))
        .count(conn)
        .await?;
    Ok(count > 0)
}
