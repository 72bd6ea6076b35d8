use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::info;

use super::find_article_for_update;
use crate::entity::{article, like_article};
use crate::error::{AppError, conflict_on_unique};
use crate::extractors::auth::AuthUser;

/// Outcome of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum LikeState {
    Added,
    Removed,
}

/// Maintains `like_article` rows and the `like_count` mirrored on articles.
pub struct LikeRegistry<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait + TransactionTrait<Transaction = DatabaseTransaction>>
    LikeRegistry<'a, C>
{
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Add the caller's like if absent, remove it if present.
    ///
    /// Runs under the article's row lock, and the counter is recounted from
    /// the rows rather than adjusted, so it always equals the row count.
    /// Returns the new state and the new counter.
    pub async fn toggle(
        &self,
        principal: &AuthUser,
        article_id: i32,
    ) -> Result<(LikeState, i32), AppError> {
        let txn = self.conn.begin().await?;
        let target = find_article_for_update(&txn, article_id).await?;
        if target.writer_id == principal.user_id {
            return Err(AppError::Forbidden(
                "You cannot like your own article".into(),
            ));
        }

        let existing = like_article::Entity::find_by_id((principal.user_id, article_id))
            .one(&txn)
            .await?;

        let state = match existing {
            Some(_) => {
                like_article::Entity::delete_by_id((principal.user_id, article_id))
                    .exec(&txn)
                    .await?;
                LikeState::Removed
            }
            None => {
                like_article::ActiveModel {
                    user_id: Set(principal.user_id),
                    article_id: Set(article_id),
                    created_at: Set(Utc::now()),
                    ..Default::default()
                }
                .insert(&txn)
                .await
                .map_err(|e| conflict_on_unique(e, "Like is already recorded"))?;
                LikeState::Added
            }
        };

        let count = like_article::Entity::find()
            .filter(like_article::Column::ArticleId.eq(article_id))
            .count(&txn)
            .await?;
        let count =
            i32::try_from(count).map_err(|_| AppError::Internal("like counter overflow".into()))?;

        let mut active: article::ActiveModel = target.into();
        active.like_count = Set(count);
        active.update(&txn).await?;

        txn.commit().await?;

        info!(
            article_id,
            user_id = principal.user_id,
            ?state,
            "Like toggled"
        );
        Ok((state, count))
    }
}
