pub mod account;
pub mod resource;
pub mod storage;
pub mod update;
