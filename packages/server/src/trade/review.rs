use chrono::Utc;
use common::TradeStatus;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use tracing::info;

use crate::article::find_article_for_update;
use crate::entity::{offer, review, user};
use crate::error::{AppError, conflict_on_unique};
use crate::extractors::auth::AuthUser;

pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 5;

#[derive(Debug, Clone)]
pub struct NewReview {
    pub article_id: i32,
    pub score: i32,
    pub content: String,
}

/// Records one review per party of a completed trade and folds its score
/// into the reviewee's running totals.
pub struct ReviewLedger<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait + TransactionTrait<Transaction = DatabaseTransaction>>
    ReviewLedger<'a, C>
{
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn post(
        &self,
        principal: &AuthUser,
        input: NewReview,
    ) -> Result<review::Model, AppError> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&input.score) {
            return Err(AppError::Validation(format!(
                "Score must be between {MIN_SCORE} and {MAX_SCORE}"
            )));
        }

        let txn = self.conn.begin().await?;
        let target = find_article_for_update(&txn, input.article_id).await?;
        if target.trade_status != TradeStatus::Complete {
            return Err(AppError::Conflict(
                "Only completed trades can be reviewed".into(),
            ));
        }

        let selected = offer::Entity::find()
            .filter(offer::Column::ArticleId.eq(target.id))
            .filter(offer::Column::IsSelected.eq(true))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!("Completed article {} has no buyer", target.id))
            })?;

        let reviewee_id = if principal.user_id == target.writer_id {
            selected.offerer_id
        } else if principal.user_id == selected.offerer_id {
            target.writer_id
        } else {
            return Err(AppError::Forbidden(
                "Only the parties of the trade can review it".into(),
            ));
        };

        let duplicate = review::Entity::find()
            .filter(review::Column::ArticleId.eq(target.id))
            .filter(review::Column::ReviewerId.eq(principal.user_id))
            .one(&txn)
            .await?;
        if duplicate.is_some() {
            return Err(AppError::Conflict(
                "You have already reviewed this trade".into(),
            ));
        }

        let created = review::ActiveModel {
            article_id: Set(target.id),
            reviewer_id: Set(principal.user_id),
            reviewee_id: Set(reviewee_id),
            score: Set(input.score),
            content: Set(input.content),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| conflict_on_unique(e, "You have already reviewed this trade"))?;

        let reviewee = user::Entity::find_by_id(reviewee_id)
            .lock(LockType::Update)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Reviewee {reviewee_id} is missing")))?;
        let score = reviewee.score + i64::from(input.score);
        let review_count = reviewee.review_count.saturating_add(1);
        let mut active: user::ActiveModel = reviewee.into();
        active.score = Set(score);
        active.review_count = Set(review_count);
        active.update(&txn).await?;

        txn.commit().await?;

        info!(
            review_id = created.id,
            article_id = created.article_id,
            reviewer_id = created.reviewer_id,
            reviewee_id,
            "Review posted"
        );
        Ok(created)
    }
}
