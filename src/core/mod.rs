pub mod types;
pub mod database;
pub mod table;
pub mod config;
pub mod error;
pub mod operations;
