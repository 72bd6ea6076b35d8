pub mod article;
pub mod like_article;
pub mod offer;
pub mod product_image;
pub mod refresh_token;
pub mod review;
pub mod user;
