use chrono::{DateTime, Utc};
use common::TradeStatus;
use serde::{Deserialize, Serialize};

use super::shared::validate_max_len;
use crate::entity::{article, offer, review};
use crate::error::AppError;
use crate::trade::NewReview;
use crate::trade::review::{MAX_SCORE, MIN_SCORE};

const REVIEW_TEXT_MAX: usize = 1000;

/// Request body for placing an offer.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct PlaceOfferRequest {
    /// Quoted price, >= 0.
    #[schema(example = 9000)]
    pub price: i64,
}

pub fn validate_place_offer(payload: &PlaceOfferRequest) -> Result<(), AppError> {
    if payload.price < 0 {
        return Err(AppError::Validation("price must be >= 0".into()));
    }
    Ok(())
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferResponse {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = 1)]
    pub article_id: i32,
    #[schema(example = 43)]
    pub offerer_id: i32,
    #[schema(example = 9000)]
    pub price: i64,
    pub is_selected: bool,
    pub created_at: DateTime<Utc>,
}

impl From<offer::Model> for OfferResponse {
    fn from(m: offer::Model) -> Self {
        Self {
            id: m.id,
            article_id: m.article_id,
            offerer_id: m.offerer_id,
            price: m.price,
            is_selected: m.is_selected,
            created_at: m.created_at,
        }
    }
}

/// Trade status of an article after a transition.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TradeStatusResponse {
    #[schema(example = 1)]
    pub article_id: i32,
    pub trade_status: TradeStatus,
    /// The offer the transition selected, when there is one.
    pub selected_offer: Option<OfferResponse>,
}

impl TradeStatusResponse {
    pub fn new(article: article::Model, selected: Option<offer::Model>) -> Self {
        Self {
            article_id: article.id,
            trade_status: article.trade_status,
            selected_offer: selected.map(Into::into),
        }
    }
}

/// Request body for reviewing a completed trade.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    #[schema(example = 1)]
    pub article_id: i32,
    /// 1 to 5.
    #[schema(example = 5)]
    pub score: i32,
    /// Up to 1000 characters.
    #[schema(example = "Friendly and on time.")]
    #[serde(default)]
    pub text: String,
}

pub fn validate_create_review(payload: &CreateReviewRequest) -> Result<(), AppError> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&payload.score) {
        return Err(AppError::Validation(format!(
            "score must be between {MIN_SCORE} and {MAX_SCORE}"
        )));
    }
    validate_max_len("text", &payload.text, REVIEW_TEXT_MAX)
}

impl From<CreateReviewRequest> for NewReview {
    fn from(req: CreateReviewRequest) -> Self {
        Self {
            article_id: req.article_id,
            score: req.score,
            content: req.text,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: i32,
    pub article_id: i32,
    pub reviewer_id: i32,
    pub reviewee_id: i32,
    #[schema(example = 5)]
    pub score: i32,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<review::Model> for ReviewResponse {
    fn from(m: review::Model) -> Self {
        Self {
            id: m.id,
            article_id: m.article_id,
            reviewer_id: m.reviewer_id,
            reviewee_id: m.reviewee_id,
            score: m.score,
            text: m.content,
            created_at: m.created_at,
        }
    }
}
