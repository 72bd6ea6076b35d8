use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "review")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub article_id: i32,
    #[sea_orm(belongs_to, from = "article_id", to = "id")]
    pub article: HasOne<super::article::Entity>,

    pub reviewer_id: i32,
    #[sea_orm(belongs_to, relation_enum = "Reviewer", from = "reviewer_id", to = "id")]
    pub reviewer: HasOne<super::user::Entity>,

    pub reviewee_id: i32,
    #[sea_orm(belongs_to, relation_enum = "Reviewee", from = "reviewee_id", to = "id")]
    pub reviewee: HasOne<super::user::Entity>,

    /// 1..=5
    pub score: i32,
    #[sea_orm(column_type = "Text")]
    pub content: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
