pub mod article;
pub mod auth;
pub mod shared;
pub mod trade;
pub mod user;
