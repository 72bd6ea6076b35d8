use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A refresh token that has been issued and not yet rotated or revoked.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "refresh_token")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,
    pub username: String,

    /// SHA-256 hex digest of the encoded token.
    #[sea_orm(unique)]
    pub token_hash: String,

    pub expires_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
