pub mod identity;
pub mod service;

pub use identity::{IdentityProfile, find_or_create_user};
pub use service::{SessionService, TokenPair, token_digest};
