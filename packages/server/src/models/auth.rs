use common::UserRole;
use serde::{Deserialize, Serialize};

use super::shared::validate_trimmed_len;
use crate::error::AppError;
use crate::session::IdentityProfile;

/// Identity asserted by the trusted identity gateway after a successful
/// external login.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeRequest {
    /// Identity provider name.
    #[schema(example = "google")]
    pub provider: String,
    /// Subject id at the provider.
    #[schema(example = "108177420713851267493")]
    pub provider_id: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Display name.
    #[schema(example = "Alice")]
    pub name: String,
}

pub fn validate_handshake_request(payload: &HandshakeRequest) -> Result<(), AppError> {
    validate_trimmed_len("provider", &payload.provider, 1, 32)?;
    if !payload
        .provider
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(AppError::Validation(
            "provider must contain only letters, digits, and dashes".into(),
        ));
    }
    validate_trimmed_len("providerId", &payload.provider_id, 1, 128)?;
    validate_trimmed_len("email", &payload.email, 1, 255)?;
    validate_trimmed_len("name", &payload.name, 1, 100)?;
    Ok(())
}

impl From<HandshakeRequest> for IdentityProfile {
    fn from(req: HandshakeRequest) -> Self {
        Self {
            provider: req.provider.trim().to_ascii_lowercase(),
            provider_id: req.provider_id.trim().to_string(),
            email: req.email.trim().to_string(),
            name: req.name.trim().to_string(),
        }
    }
}

/// Session summary returned with a fresh token pair.
///
/// The access token itself travels in the `Authorization` response header
/// and the refresh token in the `refresh` cookie.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    #[schema(example = 42)]
    pub user_id: i32,
    #[schema(example = "google_108177420713851267493")]
    pub username: String,
    pub role: UserRole,
    /// Whether the handshake created the account. Always `false` on refresh.
    #[schema(example = false)]
    pub new_user: bool,
}
