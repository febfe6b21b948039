//! SQLite建表操作

use super::adapter::SqliteAdapter;
use super::data_conversion::bind_value;
use crate::error::{BridgeError, BridgeResult};
use crate::model::{FieldDefinition, FieldType, ModelMeta};
use crate::pool::DatabaseConnection;
use crate::registry::{JoinTable, Schema};
use crate::security::DatabaseSecurityValidator;
use crate::types::{DataValue, DatabaseType};
use rat_logger::debug;
use sqlx::Row;

/// 字段对应的列类型
pub(crate) fn sql_type(field_type: &FieldType) -> String {
    match field_type {
        FieldType::String { max_length } => format!("VARCHAR({})", max_length),
        FieldType::Integer => "INTEGER".to_string(),
        FieldType::Boolean => "INTEGER".to_string(),
        FieldType::Text => "TEXT".to_string(),
        // SQLite没有DECIMAL，使用REAL；写入前已按小数位数舍入，精度上限为f64
        FieldType::Float | FieldType::Decimal { .. } => "REAL".to_string(),
        FieldType::DateTime => "TEXT".to_string(),
        FieldType::Date => "TEXT".to_string(),
        FieldType::ForeignKey { .. } | FieldType::ManyToMany { .. } => "INTEGER".to_string(),
    }
}

/// 被引用模型的表名、主键列和主键类型
fn reference_target<'a>(schema: &'a Schema, def: &FieldDefinition) -> BridgeResult<(&'a str, &'a str, String)> {
    let target = def.field_type.target_model().ok_or_else(|| BridgeError::QueryError {
        message: format!("{} 不是关系字段", def.field_type.type_name()),
    })?;
    let target_meta = schema.model(target)?;
    let (pk_name, pk_def) = target_meta.pk_field().ok_or_else(|| BridgeError::QueryError {
        message: format!("模型 {} 没有主键", target),
    })?;
    Ok((target_meta.table.as_str(), pk_name, sql_type(&pk_def.field_type)))
}

fn create_keyword(safe: bool) -> &'static str {
    if safe {
        "CREATE TABLE IF NOT EXISTS"
    } else {
        "CREATE TABLE"
    }
}

async fn execute(connection: &DatabaseConnection, sql: &str) -> BridgeResult<()> {
    let DatabaseConnection::SQLite(pool) = connection;
    debug!("执行SQLite建表SQL: {}", sql);
    sqlx::query(sql)
        .execute(pool)
        .await
        .map_err(|e| BridgeError::QueryError {
            message: format!("创建SQLite表失败: {}", e),
        })?;
    Ok(())
}

/// SQLite创建模型表
pub(crate) async fn create_table(
    adapter: &SqliteAdapter,
    connection: &DatabaseConnection,
    meta: &ModelMeta,
    schema: &Schema,
    safe: bool,
) -> BridgeResult<()> {
    let validator = DatabaseSecurityValidator::new(DatabaseType::SQLite);
    let mut columns = Vec::new();

    for (name, def) in meta.column_fields() {
        let column = validator.get_safe_field_identifier(&meta.column_name(name))?;
        let null_constraint = if def.null { "" } else { " NOT NULL" };

        let column_sql = if def.is_generated() {
            format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", column)
        } else if def.primary_key {
            format!("{} {} PRIMARY KEY NOT NULL", column, sql_type(&def.field_type))
        } else if def.is_foreign_key() {
            let (table, pk, pk_type) = reference_target(schema, def)?;
            format!(
                "{} {}{} REFERENCES {} ({}) ON DELETE CASCADE",
                column,
                pk_type,
                null_constraint,
                validator.get_safe_table_identifier(table)?,
                validator.get_safe_field_identifier(pk)?
            )
        } else {
            format!("{} {}{}", column, sql_type(&def.field_type), null_constraint)
        };
        columns.push(column_sql);
    }

    let _lock = adapter.acquire_table_lock(&meta.table).await;
    let sql = format!(
        "{} {} ({})",
        create_keyword(safe),
        validator.get_safe_table_identifier(&meta.table)?,
        columns.join(", ")
    );
    execute(connection, &sql).await?;
    debug!("✅ 创建SQLite表 '{}' 成功", meta.table);
    Ok(())
}

/// SQLite创建多对多中间表
pub(crate) async fn create_join_table(
    adapter: &SqliteAdapter,
    connection: &DatabaseConnection,
    join: &JoinTable,
    schema: &Schema,
    safe: bool,
) -> BridgeResult<()> {
    let validator = DatabaseSecurityValidator::new(DatabaseType::SQLite);
    let source = schema.model(&join.source_model)?;
    let target = schema.model(&join.target_model)?;

    let mut columns = Vec::new();
    for (column, meta) in [(&join.source_column, source), (&join.target_column, target)] {
        let (pk_name, pk_def) = meta.pk_field().ok_or_else(|| BridgeError::QueryError {
            message: format!("模型 {} 没有主键", meta.name),
        })?;
        columns.push(format!(
            "{} {} NOT NULL REFERENCES {} ({}) ON DELETE CASCADE",
            validator.get_safe_field_identifier(column)?,
            sql_type(&pk_def.field_type),
            validator.get_safe_table_identifier(&meta.table)?,
            validator.get_safe_field_identifier(pk_name)?
        ));
    }
    columns.push(format!(
        "UNIQUE ({}, {})",
        validator.get_safe_field_identifier(&join.source_column)?,
        validator.get_safe_field_identifier(&join.target_column)?
    ));

    let _lock = adapter.acquire_table_lock(&join.table).await;
    let sql = format!(
        "{} {} ({})",
        create_keyword(safe),
        validator.get_safe_table_identifier(&join.table)?,
        columns.join(", ")
    );
    execute(connection, &sql).await?;
    debug!("✅ 创建SQLite中间表 '{}' 成功", join.table);
    Ok(())
}

/// SQLite表存在检查
pub(crate) async fn table_exists(connection: &DatabaseConnection, table: &str) -> BridgeResult<bool> {
    let DatabaseConnection::SQLite(pool) = connection;
    let sql = "SELECT name FROM sqlite_master WHERE type='table' AND name=?";
    let row = bind_value(sqlx::query(sql), &DataValue::from(table))
        .fetch_optional(pool)
        .await
        .map_err(|e| BridgeError::QueryError {
            message: format!("检查SQLite表是否存在失败: {}", e),
        })?;
    Ok(row.is_some())
}

/// SQLite获取版本
pub(crate) async fn get_server_version(connection: &DatabaseConnection) -> BridgeResult<String> {
    let DatabaseConnection::SQLite(pool) = connection;
    let row = sqlx::query("SELECT sqlite_version()")
        .fetch_one(pool)
        .await
        .map_err(|e| BridgeError::QueryError {
            message: format!("查询SQLite版本失败: {}", e),
        })?;
    let version: String = row.try_get(0).map_err(|e| BridgeError::QueryError {
        message: format!("解析SQLite版本结果失败: {}", e),
    })?;
    debug!("成功获取SQLite版本: {}", version);
    Ok(version)
}
