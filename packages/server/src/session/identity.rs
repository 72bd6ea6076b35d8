use chrono::Utc;
use common::UserRole;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, SqlErr,
};
use tracing::info;

use crate::entity::user;
use crate::error::AppError;

/// Identity asserted by the trusted identity gateway.
#[derive(Debug, Clone)]
pub struct IdentityProfile {
    pub provider: String,
    pub provider_id: String,
    pub email: String,
    pub name: String,
}

impl IdentityProfile {
    pub fn username(&self) -> String {
        format!("{}_{}", self.provider, self.provider_id)
    }
}

async fn find_by_identity<C: ConnectionTrait>(
    conn: &C,
    profile: &IdentityProfile,
) -> Result<Option<user::Model>, AppError> {
    Ok(user::Entity::find()
        .filter(user::Column::Provider.eq(&profile.provider))
        .filter(user::Column::ProviderId.eq(&profile.provider_id))
        .one(conn)
        .await?)
}

/// Look the user up by `(provider, provider_id)`, creating it on first sight.
///
/// Returns the user and whether it was created.
pub async fn find_or_create_user<C: ConnectionTrait>(
    conn: &C,
    profile: &IdentityProfile,
) -> Result<(user::Model, bool), AppError> {
    if let Some(existing) = find_by_identity(conn, profile).await? {
        return Ok((existing, false));
    }

    let new_user = user::ActiveModel {
        username: Set(profile.username()),
        email: Set(profile.email.clone()),
        name: Set(profile.name.clone()),
        provider: Set(profile.provider.clone()),
        provider_id: Set(profile.provider_id.clone()),
        addr1: Set(None),
        addr2: Set(None),
        score: Set(0),
        review_count: Set(0),
        offer_level: Set(1),
        role: Set(UserRole::User),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match new_user.insert(conn).await {
        Ok(created) => {
            info!(user_id = created.id, username = %created.username, "Registered user");
            Ok((created, true))
        }
        // A concurrent handshake for the same identity won the insert.
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            let existing = find_by_identity(conn, profile)
                .await?
                .ok_or_else(|| AppError::Conflict("Username is already taken".into()))?;
            Ok((existing, false))
        }
        Err(e) => Err(e.into()),
    }
}
