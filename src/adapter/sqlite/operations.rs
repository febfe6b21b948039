use super::adapter::SqliteAdapter;
use super::data_conversion::{bind_all, bind_value, row_to_data_map_with_metadata};
use super::schema as sqlite_schema;
use crate::adapter::{DatabaseAdapter, Row, SqlQueryBuilder};
use crate::error::{BridgeError, BridgeResult};
use crate::model::ModelMeta;
use crate::pool::DatabaseConnection;
use crate::registry::{JoinTable, Schema};
use crate::security::DatabaseSecurityValidator;
use crate::types::*;
use async_trait::async_trait;
use rat_logger::debug;
use sqlx::Row as _;

#[async_trait]
impl DatabaseAdapter for SqliteAdapter {
    async fn create(&self, connection: &DatabaseConnection, table: &str, data: &Row) -> BridgeResult<i64> {
        let DatabaseConnection::SQLite(pool) = connection;
        let (sql, params) = SqlQueryBuilder::new().insert(data.clone()).from(table).build()?;
        debug!("执行SQLite插入SQL: {}", sql);

        let result = bind_all(sqlx::query(&sql), &params)
            .execute(pool)
            .await
            .map_err(|e| BridgeError::QueryError {
                message: format!("执行SQLite插入失败: {}", e),
            })?;
        Ok(result.last_insert_rowid())
    }

    async fn find(
        &self,
        connection: &DatabaseConnection,
        meta: &ModelMeta,
        conditions: &[QueryCondition],
        options: &QueryOptions,
    ) -> BridgeResult<Vec<Row>> {
        let DatabaseConnection::SQLite(pool) = connection;
        let columns: Vec<String> = meta.column_fields().map(|(name, _)| meta.column_name(name)).collect();
        let column_refs: Vec<&str> = columns.iter().map(String::as_str).collect();

        let (sql, params) = SqlQueryBuilder::new()
            .select(&column_refs)
            .from(&meta.table)
            .where_conditions(conditions)
            .options(options)
            .build()?;
        debug!("执行SQLite查询SQL: {} 参数: {:?}", sql, params);

        let rows = bind_all(sqlx::query(&sql), &params)
            .fetch_all(pool)
            .await
            .map_err(|e| BridgeError::QueryError {
                message: format!("执行SQLite查询失败: {}", e),
            })?;

        rows.iter()
            .map(|row| row_to_data_map_with_metadata(row, meta))
            .collect()
    }

    async fn count(
        &self,
        connection: &DatabaseConnection,
        table: &str,
        conditions: &[QueryCondition],
    ) -> BridgeResult<u64> {
        let DatabaseConnection::SQLite(pool) = connection;
        let (sql, params) = SqlQueryBuilder::new()
            .count()
            .from(table)
            .where_conditions(conditions)
            .build()?;
        debug!("执行SQLite计数SQL: {}", sql);

        let row = bind_all(sqlx::query(&sql), &params)
            .fetch_one(pool)
            .await
            .map_err(|e| BridgeError::QueryError {
                message: format!("执行SQLite计数失败: {}", e),
            })?;
        let count: i64 = row.try_get(0).map_err(|e| BridgeError::QueryError {
            message: format!("解析SQLite计数结果失败: {}", e),
        })?;
        Ok(count.max(0) as u64)
    }

    async fn create_table(
        &self,
        connection: &DatabaseConnection,
        meta: &ModelMeta,
        schema: &Schema,
        safe: bool,
    ) -> BridgeResult<()> {
        sqlite_schema::create_table(self, connection, meta, schema, safe).await
    }

    async fn create_join_table(
        &self,
        connection: &DatabaseConnection,
        join: &JoinTable,
        schema: &Schema,
        safe: bool,
    ) -> BridgeResult<()> {
        sqlite_schema::create_join_table(self, connection, join, schema, safe).await
    }

    async fn table_exists(&self, connection: &DatabaseConnection, table: &str) -> BridgeResult<bool> {
        sqlite_schema::table_exists(connection, table).await
    }

    async fn insert_link(
        &self,
        connection: &DatabaseConnection,
        join: &JoinTable,
        source: &DataValue,
        target: &DataValue,
    ) -> BridgeResult<()> {
        let DatabaseConnection::SQLite(pool) = connection;
        let validator = DatabaseSecurityValidator::new(DatabaseType::SQLite);
        let sql = format!(
            "INSERT OR IGNORE INTO {} ({}, {}) VALUES (?, ?)",
            validator.get_safe_table_identifier(&join.table)?,
            validator.get_safe_field_identifier(&join.source_column)?,
            validator.get_safe_field_identifier(&join.target_column)?
        );
        debug!("执行SQLite关联插入SQL: {}", sql);

        bind_value(bind_value(sqlx::query(&sql), source), target)
            .execute(pool)
            .await
            .map_err(|e| BridgeError::QueryError {
                message: format!("插入多对多关联失败: {}", e),
            })?;
        Ok(())
    }

    async fn linked_values(
        &self,
        connection: &DatabaseConnection,
        join: &JoinTable,
        match_column: &str,
        value: &DataValue,
        select_column: &str,
    ) -> BridgeResult<Vec<DataValue>> {
        let DatabaseConnection::SQLite(pool) = connection;
        let validator = DatabaseSecurityValidator::new(DatabaseType::SQLite);
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?",
            validator.get_safe_field_identifier(select_column)?,
            validator.get_safe_table_identifier(&join.table)?,
            validator.get_safe_field_identifier(match_column)?
        );
        debug!("执行SQLite关联查询SQL: {}", sql);

        let rows = bind_value(sqlx::query(&sql), value)
            .fetch_all(pool)
            .await
            .map_err(|e| BridgeError::QueryError {
                message: format!("查询多对多关联失败: {}", e),
            })?;

        rows.iter()
            .map(|row| match row.try_get::<i64, _>(0) {
                Ok(i) => Ok(DataValue::Int(i)),
                Err(_) => row
                    .try_get::<String, _>(0)
                    .map(DataValue::String)
                    .map_err(|e| BridgeError::QueryError {
                        message: format!("读取关联值失败: {}", e),
                    }),
            })
            .collect()
    }

    async fn get_server_version(&self, connection: &DatabaseConnection) -> BridgeResult<String> {
        sqlite_schema::get_server_version(connection).await
    }
}
