use common::TradeStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "article")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub writer_id: i32,
    #[sea_orm(belongs_to, from = "writer_id", to = "id")]
    pub writer: HasOne<super::user::Entity>,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub price: i64,
    pub quantity: i32,
    pub category: String,
    pub trade_method: String,
    pub addr1: Option<String>,
    pub addr2: Option<String>,

    #[sea_orm(default_value = 0)]
    pub view_count: i32,
    /// Kept equal to the number of `like_article` rows of this article.
    #[sea_orm(default_value = 0)]
    pub like_count: i32,
    /// Changed only by the offer state machine.
    pub trade_status: TradeStatus,

    pub created_at: DateTimeUtc,
    pub modified_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
