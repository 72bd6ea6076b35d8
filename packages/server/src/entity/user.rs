use common::UserRole;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// `{provider}_{provider_id}`, assigned on first handshake.
    #[sea_orm(unique)]
    pub username: String,
    pub email: String,
    pub name: String,

    /// Identity origin; unique together.
    pub provider: String,
    pub provider_id: String,

    pub addr1: Option<String>,
    pub addr2: Option<String>,

    /// Sum of all received review scores.
    #[sea_orm(default_value = 0)]
    pub score: i64,
    /// Number of received reviews.
    #[sea_orm(default_value = 0)]
    pub review_count: i32,
    #[sea_orm(default_value = 1)]
    pub offer_level: i32,
    pub role: UserRole,

    pub created_at: DateTimeUtc,
}

impl Model {
    /// Mean received score, or `None` before the first review.
    pub fn average_score(&self) -> Option<f64> {
        (self.review_count > 0).then(|| self.score as f64 / self.review_count as f64)
    }
}

impl ActiveModelBehavior for ActiveModel {}
