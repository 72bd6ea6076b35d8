//! Read-side article listings and profile counters.

pub mod profile;
pub mod sort;

pub use profile::{ProfileCounts, profile_counts};
pub use sort::ArticleSort;

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use common::TradeStatus;
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select,
};
use serde::Serialize;

use crate::entity::{article, like_article, offer, product_image, review};
use crate::error::AppError;
use crate::utils::time_ago::time_ago;

/// Normalized paging window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    pub const DEFAULT_PER_PAGE: u64 = 20;
    pub const MAX_PER_PAGE: u64 = 100;
    /// Highest page whose offset still fits a signed 64-bit SQL `OFFSET`.
    pub const MAX_PAGE: u64 = i64::MAX as u64 / Self::MAX_PER_PAGE;

    pub fn new(page: Option<u64>, per_page: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, Self::MAX_PAGE),
            per_page: per_page
                .unwrap_or(Self::DEFAULT_PER_PAGE)
                .clamp(1, Self::MAX_PER_PAGE),
        }
    }

    fn offset(self) -> u64 {
        (self.page - 1) * self.per_page
    }
}

/// Which articles a listing shows.
#[derive(Debug, Clone, Copy)]
pub enum ArticleScope {
    /// Written by the user, optionally in one trade status.
    Sales {
        writer_id: i32,
        status: Option<TradeStatus>,
    },
    /// Liked by the user.
    Likes { user_id: i32 },
    /// Offered on by the user.
    Offers { user_id: i32 },
    /// Bought by the user, i.e. their offer is the selected one.
    Buys { user_id: i32 },
}

impl ArticleScope {
    fn apply(self, select: Select<article::Entity>) -> Select<article::Entity> {
        match self {
            Self::Sales { writer_id, status } => {
                let select = select.filter(article::Column::WriterId.eq(writer_id));
                match status {
                    Some(status) => select.filter(article::Column::TradeStatus.eq(status)),
                    None => select,
                }
            }
            Self::Likes { user_id } => select.filter(
                article::Column::Id.in_subquery(
                    SeaQuery::select()
                        .column(like_article::Column::ArticleId)
                        .from(like_article::Entity)
                        .and_where(like_article::Column::UserId.eq(user_id))
                        .to_owned(),
                ),
            ),
            Self::Offers { user_id } => select.filter(
                article::Column::Id.in_subquery(
                    SeaQuery::select()
                        .column(offer::Column::ArticleId)
                        .from(offer::Entity)
                        .and_where(offer::Column::OffererId.eq(user_id))
                        .to_owned(),
                ),
            ),
            Self::Buys { user_id } => select.filter(
                article::Column::Id.in_subquery(
                    SeaQuery::select()
                        .column(offer::Column::ArticleId)
                        .from(offer::Entity)
                        .and_where(offer::Column::OffererId.eq(user_id))
                        .and_where(offer::Column::IsSelected.eq(true))
                        .to_owned(),
                ),
            ),
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct ArticleRow {
    id: i32,
    title: String,
    price: i64,
    addr1: Option<String>,
    addr2: Option<String>,
    trade_status: TradeStatus,
    created_at: DateTime<Utc>,
}

/// One row of an article listing.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub id: i32,
    pub title: String,
    pub price: i64,
    pub addr1: Option<String>,
    pub addr2: Option<String>,
    pub trade_status: TradeStatus,
    pub created_at: DateTime<Utc>,
    #[schema(example = "3 hours ago")]
    pub time_ago: String,
    /// URL of the first image, if any.
    pub thumbnail_url: Option<String>,
    /// Whether the viewer likes the article; `null` for anonymous viewers.
    pub is_liked: Option<bool>,
    /// Whether the viewer has reviewed the trade; only set on purchase listings.
    pub is_reviewed: Option<bool>,
}

#[derive(Debug)]
pub struct ArticlePage {
    pub items: Vec<ArticleSummary>,
    pub total: u64,
}

/// List the articles in `scope`, decorated for `viewer`.
pub async fn list_articles<C: ConnectionTrait>(
    conn: &C,
    scope: ArticleScope,
    viewer: Option<i32>,
    sort: ArticleSort,
    page: PageRequest,
) -> Result<ArticlePage, AppError> {
    let select = scope.apply(article::Entity::find());

    let total = select
        .clone()
        .paginate(conn, page.per_page)
        .num_items()
        .await?;

    let (column, order) = sort.key();
    let rows = select
        .select_only()
        .column(article::Column::Id)
        .column(article::Column::Title)
        .column(article::Column::Price)
        .column(article::Column::Addr1)
        .column(article::Column::Addr2)
        .column(article::Column::TradeStatus)
        .column(article::Column::CreatedAt)
        .order_by(column, order)
        .order_by(article::Column::Id, Order::Desc)
        .offset(Some(page.offset()))
        .limit(Some(page.per_page))
        .into_model::<ArticleRow>()
        .all(conn)
        .await?;

    let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
    let thumbnails = thumbnails(conn, &ids).await?;
    let liked = match viewer {
        Some(viewer) => Some(liked_by(conn, viewer, &ids).await?),
        None => None,
    };
    let reviewed = match (scope, viewer) {
        (ArticleScope::Buys { .. }, Some(viewer)) => Some(reviewed_by(conn, viewer, &ids).await?),
        _ => None,
    };

    let now = Utc::now();
    let items = rows
        .into_iter()
        .map(|row| ArticleSummary {
            thumbnail_url: thumbnails.get(&row.id).cloned(),
            is_liked: liked.as_ref().map(|set| set.contains(&row.id)),
            is_reviewed: reviewed.as_ref().map(|set| set.contains(&row.id)),
            time_ago: time_ago(row.created_at, now),
            id: row.id,
            title: row.title,
            price: row.price,
            addr1: row.addr1,
            addr2: row.addr2,
            trade_status: row.trade_status,
            created_at: row.created_at,
        })
        .collect();

    Ok(ArticlePage { items, total })
}

async fn thumbnails<C: ConnectionTrait>(
    conn: &C,
    ids: &[i32],
) -> Result<HashMap<i32, String>, AppError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let images = product_image::Entity::find()
        .filter(product_image::Column::ArticleId.is_in(ids.to_vec()))
        .order_by_asc(product_image::Column::Id)
        .all(conn)
        .await?;

    let mut first = HashMap::new();
    for image in images {
        first.entry(image.article_id).or_insert(image.url);
    }
    Ok(first)
}

async fn liked_by<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    ids: &[i32],
) -> Result<HashSet<i32>, AppError> {
    if ids.is_empty() {
        return Ok(HashSet::new());
    }
    Ok(like_article::Entity::find()
        .filter(like_article::Column::UserId.eq(user_id))
        .filter(like_article::Column::ArticleId.is_in(ids.to_vec()))
        .all(conn)
        .await?
        .into_iter()
        .map(|like| like.article_id)
        .collect())
}

async fn reviewed_by<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    ids: &[i32],
) -> Result<HashSet<i32>, AppError> {
    if ids.is_empty() {
        return Ok(HashSet::new());
    }
    Ok(review::Entity::find()
        .filter(review::Column::ReviewerId.eq(user_id))
        .filter(review::Column::ArticleId.is_in(ids.to_vec()))
        .all(conn)
        .await?
        .into_iter()
        .map(|r| r.article_id)
        .collect())
}
