use chrono::{DateTime, Utc};
use common::TradeStatus;
use serde::{Deserialize, Serialize};

use super::shared::{validate_max_len, validate_trimmed_len};
use crate::article::{ArticleChanges, ArticleDetail, ArticleWithImages, LikeState, NewArticle};
use crate::entity::user;
use crate::error::AppError;
use crate::utils::time_ago::time_ago;

pub use super::shared::{ListQuery, Pagination};
pub use crate::listing::ArticleSummary;

const TITLE_MAX: usize = 100;
const CONTENT_MAX: usize = 5000;
const LABEL_MAX: usize = 50;
const ADDR_MAX: usize = 255;

/// JSON carried by the `article` part of a create request.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleRequest {
    /// 1-100 characters.
    #[schema(example = "Road bike, 54cm frame")]
    pub title: String,
    /// Up to 5000 characters.
    #[schema(example = "Ridden twice, comes with pedals.")]
    pub content: String,
    /// Asking price, >= 0.
    #[schema(example = 10000)]
    pub price: i64,
    /// Units for sale, >= 1.
    #[schema(example = 1)]
    pub quantity: i32,
    #[schema(example = "sports")]
    pub category: String,
    #[schema(example = "direct")]
    pub trade_method: String,
    #[schema(example = "Seoul")]
    pub addr1: Option<String>,
    #[schema(example = "Mapo-gu")]
    pub addr2: Option<String>,
}

/// JSON carried by the `article` part of an update request. Absent or
/// `null` fields keep their stored value.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[schema(example = 8000)]
    pub price: Option<i64>,
    pub quantity: Option<i32>,
    pub category: Option<String>,
    pub trade_method: Option<String>,
    pub addr1: Option<String>,
    pub addr2: Option<String>,
}

fn validate_price(price: i64) -> Result<(), AppError> {
    if price < 0 {
        return Err(AppError::Validation("price must be >= 0".into()));
    }
    Ok(())
}

fn validate_quantity(quantity: i32) -> Result<(), AppError> {
    if quantity < 1 {
        return Err(AppError::Validation("quantity must be >= 1".into()));
    }
    Ok(())
}

fn validate_address(field: &str, addr: Option<&String>) -> Result<(), AppError> {
    match addr {
        Some(addr) => validate_max_len(field, addr, ADDR_MAX),
        None => Ok(()),
    }
}

pub fn validate_create_article(payload: &CreateArticleRequest) -> Result<(), AppError> {
    validate_trimmed_len("title", &payload.title, 1, TITLE_MAX)?;
    validate_max_len("content", &payload.content, CONTENT_MAX)?;
    validate_price(payload.price)?;
    validate_quantity(payload.quantity)?;
    validate_trimmed_len("category", &payload.category, 1, LABEL_MAX)?;
    validate_trimmed_len("tradeMethod", &payload.trade_method, 1, LABEL_MAX)?;
    validate_address("addr1", payload.addr1.as_ref())?;
    validate_address("addr2", payload.addr2.as_ref())?;
    Ok(())
}

pub fn validate_update_article(payload: &UpdateArticleRequest) -> Result<(), AppError> {
    if let Some(ref title) = payload.title {
        validate_trimmed_len("title", title, 1, TITLE_MAX)?;
    }
    if let Some(ref content) = payload.content {
        validate_max_len("content", content, CONTENT_MAX)?;
    }
    if let Some(price) = payload.price {
        validate_price(price)?;
    }
    if let Some(quantity) = payload.quantity {
        validate_quantity(quantity)?;
    }
    if let Some(ref category) = payload.category {
        validate_trimmed_len("category", category, 1, LABEL_MAX)?;
    }
    if let Some(ref trade_method) = payload.trade_method {
        validate_trimmed_len("tradeMethod", trade_method, 1, LABEL_MAX)?;
    }
    validate_address("addr1", payload.addr1.as_ref())?;
    validate_address("addr2", payload.addr2.as_ref())?;
    Ok(())
}

impl From<CreateArticleRequest> for NewArticle {
    fn from(req: CreateArticleRequest) -> Self {
        Self {
            title: req.title.trim().to_string(),
            content: req.content,
            price: req.price,
            quantity: req.quantity,
            category: req.category.trim().to_string(),
            trade_method: req.trade_method.trim().to_string(),
            addr1: req.addr1,
            addr2: req.addr2,
        }
    }
}

impl From<UpdateArticleRequest> for ArticleChanges {
    fn from(req: UpdateArticleRequest) -> Self {
        Self {
            title: req.title.map(|t| t.trim().to_string()),
            content: req.content,
            price: req.price,
            quantity: req.quantity,
            category: req.category.map(|c| c.trim().to_string()),
            trade_method: req.trade_method.map(|t| t.trim().to_string()),
            addr1: req.addr1,
            addr2: req.addr2,
        }
    }
}

/// Full article view.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = 42)]
    pub writer_id: i32,
    pub title: String,
    pub content: String,
    #[schema(example = 10000)]
    pub price: i64,
    #[schema(example = 1)]
    pub quantity: i32,
    pub category: String,
    pub trade_method: String,
    pub addr1: Option<String>,
    pub addr2: Option<String>,
    pub view_count: i32,
    pub like_count: i32,
    pub trade_status: TradeStatus,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    /// Image URLs, oldest first.
    pub image_urls: Vec<String>,
}

impl From<ArticleWithImages> for ArticleResponse {
    fn from(value: ArticleWithImages) -> Self {
        let a = value.article;
        Self {
            id: a.id,
            writer_id: a.writer_id,
            title: a.title,
            content: a.content,
            price: a.price,
            quantity: a.quantity,
            category: a.category,
            trade_method: a.trade_method,
            addr1: a.addr1,
            addr2: a.addr2,
            view_count: a.view_count,
            like_count: a.like_count,
            trade_status: a.trade_status,
            created_at: a.created_at,
            modified_at: a.modified_at,
            image_urls: value.images.into_iter().map(|img| img.url).collect(),
        }
    }
}

/// Public facts about an article's writer.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WriterSummary {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub addr1: Option<String>,
    /// Mean received review score; `null` before the first review.
    #[schema(example = 4.5)]
    pub average_score: Option<f64>,
    pub review_count: i32,
}

impl From<user::Model> for WriterSummary {
    fn from(u: user::Model) -> Self {
        Self {
            average_score: u.average_score(),
            id: u.id,
            username: u.username,
            name: u.name,
            addr1: u.addr1,
            review_count: u.review_count,
        }
    }
}

/// Article detail page.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDetailResponse {
    #[serde(flatten)]
    pub article: ArticleResponse,
    pub writer: WriterSummary,
    /// Whether the viewer likes this article; `null` for anonymous viewers.
    pub is_liked: Option<bool>,
    #[schema(example = "5 minutes ago")]
    pub time_ago: String,
}

impl From<ArticleDetail> for ArticleDetailResponse {
    fn from(detail: ArticleDetail) -> Self {
        let time_ago = time_ago(detail.article.created_at, Utc::now());
        Self {
            article: ArticleWithImages {
                article: detail.article,
                images: detail.images,
            }
            .into(),
            writer: detail.writer.into(),
            is_liked: detail.is_liked,
            time_ago,
        }
    }
}

/// Outcome of a like toggle.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub state: LikeState,
    /// Like counter after the toggle.
    #[schema(example = 3)]
    pub like_count: i32,
}

/// Query parameters of a sales listing.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SalesQuery {
    /// Page number (1-indexed).
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Items per page (1-100, default 20).
    #[param(example = 20)]
    pub per_page: Option<u64>,
    /// `latest` (default), `high-price` or `low-price`.
    #[param(example = "latest")]
    pub sort: Option<String>,
    /// Only articles in this trade status (`SALE`, `RESERVED`, `COMPLETE`).
    #[param(example = "SALE")]
    pub status: Option<String>,
}

impl SalesQuery {
    pub fn list(&self) -> ListQuery {
        ListQuery {
            page: self.page,
            per_page: self.per_page,
            sort: self.sort.clone(),
        }
    }

    pub fn status(&self) -> Result<Option<TradeStatus>, AppError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|e: common::trade_status::ParseTradeStatusError| {
                    AppError::Validation(e.to_string())
                }),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ArticleSummaryPage {
    pub data: Vec<ArticleSummary>,
    pub pagination: Pagination,
}
