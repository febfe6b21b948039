//! SQLite适配器模块

mod adapter;
mod data_conversion;
mod operations;
mod schema;

pub use adapter::SqliteAdapter;
