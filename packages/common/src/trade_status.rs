#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trade status of an article.
///
/// `Sale` is open for offers, `Reserved` has a chosen buyer and `Complete` is
/// settled. When the `sea-orm` feature is enabled, this enum can be used
/// directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "SALE"))]
    Sale,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "RESERVED"))]
    Reserved,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "COMPLETE"))]
    Complete,
}

impl TradeStatus {
    /// Whether `self -> next` is a legal transition.
    ///
    /// Forward moves are `Sale -> Reserved -> Complete`; the two backward
    /// moves are legal here but callers must still refuse them once a review
    /// exists.
    pub fn allows(&self, next: TradeStatus) -> bool {
        matches!(
            (self, next),
            (Self::Sale, Self::Reserved)
                | (Self::Reserved, Self::Complete)
                | (Self::Reserved, Self::Sale)
                | (Self::Complete, Self::Reserved)
        )
    }

    pub const ALL: &'static [TradeStatus] = &[Self::Sale, Self::Reserved, Self::Complete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sale => "SALE",
            Self::Reserved => "RESERVED",
            Self::Complete => "COMPLETE",
        }
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for TradeStatus {
    fn default() -> Self {
        Self::Sale
    }
}

/// Error when parsing an invalid trade status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTradeStatusError {
    invalid: String,
}

impl fmt::Display for ParseTradeStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid trade status '{}'. Valid values: {}",
            self.invalid,
            TradeStatus::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseTradeStatusError {}

impl FromStr for TradeStatus {
    type Err = ParseTradeStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SALE" => Ok(Self::Sale),
            "RESERVED" => Ok(Self::Reserved),
            "COMPLETE" => Ok(Self::Complete),
            _ => Err(ParseTradeStatusError {
                invalid: s.to_string(),
            }),
        }
    }
}
