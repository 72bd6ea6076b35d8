pub mod config;
pub mod storage;
pub mod trade_status;
pub mod user_role;

pub use trade_status::TradeStatus;
pub use user_role::UserRole;
