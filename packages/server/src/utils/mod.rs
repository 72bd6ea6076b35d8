pub mod cookie;
pub mod filename;
pub mod jwt;
pub mod time_ago;
