use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "offer")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub article_id: i32,
    #[sea_orm(belongs_to, from = "article_id", to = "id")]
    pub article: HasOne<super::article::Entity>,

    pub offerer_id: i32,
    #[sea_orm(belongs_to, from = "offerer_id", to = "id")]
    pub offerer: HasOne<super::user::Entity>,

    pub price: i64,
    /// At most one offer per article is selected, and only while the
    /// article is RESERVED or COMPLETE.
    #[sea_orm(default_value = false)]
    pub is_selected: bool,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
