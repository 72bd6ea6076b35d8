use sea_orm::Order;

use crate::entity::article;

/// Listing order, selected by the `sort` query token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArticleSort {
    #[default]
    Latest,
    HighPrice,
    LowPrice,
}

impl ArticleSort {
    /// Parse a `sort` token. Unknown or absent tokens fall back to `Latest`.
    pub fn from_token(token: Option<&str>) -> Self {
        match token.map(str::trim) {
            Some("high-price") => Self::HighPrice,
            Some("low-price") => Self::LowPrice,
            _ => Self::Latest,
        }
    }

    pub fn as_token(self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::HighPrice => "high-price",
            Self::LowPrice => "low-price",
        }
    }

    pub fn key(self) -> (article::Column, Order) {
        match self {
            Self::Latest => (article::Column::CreatedAt, Order::Desc),
            Self::HighPrice => (article::Column::Price, Order::Desc),
            Self::LowPrice => (article::Column::Price, Order::Asc),
        }
    }
}
