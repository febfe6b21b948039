//! 通用数据类型
//!
//! 定义数据值、查询条件和数据库连接配置

pub mod data_value;
pub mod database_config;
pub mod query;

// 重新导出所有公共类型
pub use data_value::DataValue;
pub use database_config::{ConnectionConfig, DatabaseType, DEFAULT_DB_URL, SQLITE_MEMORY};
pub use query::{
    PaginationConfig, QueryCondition, QueryOperator, QueryOptions, SortConfig, SortDirection,
    LOOKUP_SEPARATOR,
};
