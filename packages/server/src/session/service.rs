use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    TransactionSession, TransactionTrait,
};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::entity::{refresh_token, user};
use crate::error::AppError;
use crate::utils::jwt::{JwtKeys, SignedToken, TokenCategory, TokenError};

/// A freshly minted access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: SignedToken,
    pub refresh: SignedToken,
}

/// SHA-256 hex digest under which a refresh token is stored.
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Issues, rotates and revokes token pairs.
///
/// Access tokens are stateless. A refresh token is accepted only while its
/// record exists, and every successful rotation consumes the record, which
/// makes each refresh token single-use.
pub struct SessionService<'a, C> {
    conn: &'a C,
    keys: &'a JwtKeys,
}

impl<'a, C: ConnectionTrait + TransactionTrait> SessionService<'a, C> {
    pub fn new(conn: &'a C, keys: &'a JwtKeys) -> Self {
        Self { conn, keys }
    }

    fn mint_pair(&self, user: &user::Model) -> Result<TokenPair, AppError> {
        let access = self
            .keys
            .sign(TokenCategory::Access, user.id, &user.username, user.role)?;
        let refresh = self
            .keys
            .sign(TokenCategory::Refresh, user.id, &user.username, user.role)?;
        Ok(TokenPair { access, refresh })
    }

    async fn store_refresh<T: ConnectionTrait>(
        conn: &T,
        user: &user::Model,
        refresh: &SignedToken,
    ) -> Result<(), AppError> {
        refresh_token::ActiveModel {
            user_id: Set(user.id),
            username: Set(user.username.clone()),
            token_hash: Set(token_digest(&refresh.token)),
            expires_at: Set(refresh.expires_at),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        Ok(())
    }

    /// Sign a new pair for `user` and persist its refresh record.
    ///
    /// Records of this user that are already past their expiry are dropped
    /// on the way.
    pub async fn issue_pair(&self, user: &user::Model) -> Result<TokenPair, AppError> {
        let pair = self.mint_pair(user)?;

        refresh_token::Entity::delete_many()
            .filter(refresh_token::Column::UserId.eq(user.id))
            .filter(refresh_token::Column::ExpiresAt.lt(Utc::now()))
            .exec(self.conn)
            .await?;
        Self::store_refresh(self.conn, user, &pair.refresh).await?;

        info!(user_id = user.id, "Issued token pair");
        Ok(pair)
    }

    /// Exchange a refresh token for a new pair.
    ///
    /// Checks run in this order: missing, expired, wrong category, unknown.
    /// The old record is removed with a conditional delete; when two
    /// rotations of the same token race, only the one that deletes the row
    /// continues and the other fails with `TokenUnknown`.
    pub async fn rotate(
        &self,
        presented: Option<&str>,
    ) -> Result<(user::Model, TokenPair), AppError> {
        let token = presented
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::TokenMissing)?;

        let claims = self.keys.verify(token).map_err(|e| match e {
            TokenError::Expired => AppError::TokenExpired,
            TokenError::Invalid(detail) => {
                tracing::debug!("Rejecting malformed refresh token: {detail}");
                AppError::TokenUnknown
            }
            other => AppError::from(other),
        })?;
        if claims.category != TokenCategory::Refresh {
            return Err(AppError::TokenWrongCategory);
        }

        let txn = self.conn.begin().await?;

        let consumed = refresh_token::Entity::delete_many()
            .filter(refresh_token::Column::TokenHash.eq(token_digest(token)))
            .exec(&txn)
            .await?;
        if consumed.rows_affected == 0 {
            return Err(AppError::TokenUnknown);
        }

        let user = user::Entity::find_by_id(claims.user_id)
            .one(&txn)
            .await?
            .ok_or(AppError::TokenUnknown)?;

        let pair = self.mint_pair(&user)?;
        Self::store_refresh(&txn, &user, &pair.refresh).await?;
        txn.commit().await?;

        info!(user_id = user.id, "Rotated refresh token");
        Ok((user, pair))
    }

    /// Delete the record of a refresh token. Returns whether one existed.
    pub async fn revoke(&self, presented: &str) -> Result<bool, AppError> {
        let result = refresh_token::Entity::delete_many()
            .filter(refresh_token::Column::TokenHash.eq(token_digest(presented.trim())))
            .exec(self.conn)
            .await?;
        if result.rows_affected > 0 {
            info!("Revoked refresh token");
        }
        Ok(result.rows_affected > 0)
    }
}
