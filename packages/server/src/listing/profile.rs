use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};

use crate::entity::{article, like_article, offer, review};
use crate::error::AppError;

/// Activity counters shown on a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileCounts {
    /// Articles written.
    pub sale_count: u64,
    /// Likes given.
    pub like_count: u64,
    /// Offers placed.
    pub offer_count: u64,
    /// Offers of the user that were selected.
    pub buy_count: u64,
    /// Reviews the user wrote or received.
    pub review_count: u64,
}

pub async fn profile_counts<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<ProfileCounts, AppError> {
    let sale_count = article::Entity::find()
        .filter(article::Column::WriterId.eq(user_id))
        .count(conn)
        .await?;
    let like_count = like_article::Entity::find()
        .filter(like_article::Column::UserId.eq(user_id))
        .count(conn)
        .await?;
    let offer_count = offer::Entity::find()
        .filter(offer::Column::OffererId.eq(user_id))
        .count(conn)
        .await?;
    let buy_count = offer::Entity::find()
        .filter(offer::Column::OffererId.eq(user_id))
        .filter(offer::Column::IsSelected.eq(true))
        .count(conn)
        .await?;
    let review_count = review::Entity::find()
        .filter(
            Condition::any()
                .add(review::Column::ReviewerId.eq(user_id))
                .add(review::Column::RevieweeId.eq(user_id)),
        )
        .count(conn)
        .await?;

    Ok(ProfileCounts {
        sale_count,
        like_count,
        offer_count,
        buy_count,
        review_count,
    })
}
