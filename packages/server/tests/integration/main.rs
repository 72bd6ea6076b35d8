mod common;
mod listing;
mod review;
mod storage;
