use chrono::{DateTime, Utc};
use common::UserRole;
use serde::Serialize;

use crate::entity::user;
use crate::listing::ProfileCounts;

/// A user's profile with activity counters.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "google_108177420713851267493")]
    pub username: String,
    pub name: String,
    /// Only present on the caller's own profile.
    pub email: Option<String>,
    pub addr1: Option<String>,
    pub addr2: Option<String>,
    pub role: UserRole,
    #[schema(example = 1)]
    pub offer_level: i32,
    /// Sum of received review scores.
    #[schema(example = 14)]
    pub score: i64,
    /// Mean received review score; `null` before the first review.
    #[schema(example = 4.67)]
    pub average_score: Option<f64>,
    pub created_at: DateTime<Utc>,
    /// Articles written.
    pub sale_count: u64,
    /// Likes given.
    pub like_count: u64,
    /// Offers placed.
    pub offer_count: u64,
    /// Offers of the user that were selected.
    pub buy_count: u64,
    /// Reviews written or received.
    pub review_count: u64,
}

impl ProfileResponse {
    pub fn new(u: user::Model, counts: ProfileCounts, is_self: bool) -> Self {
        Self {
            average_score: u.average_score(),
            id: u.id,
            username: u.username,
            name: u.name,
            email: is_self.then_some(u.email),
            addr1: u.addr1,
            addr2: u.addr2,
            role: u.role,
            offer_level: u.offer_level,
            score: u.score,
            created_at: u.created_at,
            sale_count: counts.sale_count,
            like_count: counts.like_count,
            offer_count: counts.offer_count,
            buy_count: counts.buy_count,
            review_count: counts.review_count,
        }
    }
}
