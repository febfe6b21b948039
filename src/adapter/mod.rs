//! 数据库适配器模块
//!
//! 提供统一的数据库操作接口，运行时只通过此 trait 访问存储

use crate::error::BridgeResult;
use crate::model::ModelMeta;
use crate::pool::DatabaseConnection;
use crate::registry::{JoinTable, Schema};
use crate::types::*;
use async_trait::async_trait;
use indexmap::IndexMap;

mod query_builder;
mod sqlite;

pub use query_builder::{QueryType, SqlQueryBuilder};
pub use sqlite::SqliteAdapter;

/// 一行数据：列名 -> 值
pub type Row = IndexMap<String, DataValue>;

/// 数据库适配器trait
#[async_trait]
pub trait DatabaseAdapter: Send + Sync {
    /// 插入记录，返回新行的 rowid
    async fn create(&self, connection: &DatabaseConnection, table: &str, data: &Row) -> BridgeResult<i64>;

    /// 查询模型的记录，条件中的字段为列名
    async fn find(
        &self,
        connection: &DatabaseConnection,
        meta: &ModelMeta,
        conditions: &[QueryCondition],
        options: &QueryOptions,
    ) -> BridgeResult<Vec<Row>>;

    /// 统计记录数量
    async fn count(
        &self,
        connection: &DatabaseConnection,
        table: &str,
        conditions: &[QueryCondition],
    ) -> BridgeResult<u64>;

    /// 为模型建表，`safe` 为真时使用 IF NOT EXISTS
    async fn create_table(
        &self,
        connection: &DatabaseConnection,
        meta: &ModelMeta,
        schema: &Schema,
        safe: bool,
    ) -> BridgeResult<()>;

    /// 建多对多中间表
    async fn create_join_table(
        &self,
        connection: &DatabaseConnection,
        join: &JoinTable,
        schema: &Schema,
        safe: bool,
    ) -> BridgeResult<()>;

    /// 检查表是否存在
    async fn table_exists(&self, connection: &DatabaseConnection, table: &str) -> BridgeResult<bool>;

    /// 在中间表中插入一条关联，已存在时忽略
    async fn insert_link(
        &self,
        connection: &DatabaseConnection,
        join: &JoinTable,
        source: &DataValue,
        target: &DataValue,
    ) -> BridgeResult<()>;

    /// 从中间表读取关联值：`WHERE match_column = value` 的 `select_column`
    async fn linked_values(
        &self,
        connection: &DatabaseConnection,
        join: &JoinTable,
        match_column: &str,
        value: &DataValue,
        select_column: &str,
    ) -> BridgeResult<Vec<DataValue>>;

    /// 获取数据库版本
    async fn get_server_version(&self, connection: &DatabaseConnection) -> BridgeResult<String>;
}

/// 根据数据库类型创建适配器
pub fn create_adapter(db_type: &DatabaseType) -> BridgeResult<Box<dyn DatabaseAdapter>> {
    match db_type {
        DatabaseType::SQLite => Ok(Box::new(SqliteAdapter::new())),
    }
}
