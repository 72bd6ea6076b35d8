pub mod article;
pub mod auth;
pub mod image;
pub mod trade;
pub mod user;
