//! SQLite数据转换模块
//!
//! DataValue 与 SQLite 存储值之间的转换：日期时间存为 RFC3339 文本，日期存为 `YYYY-MM-DD`，
//! 布尔存为 0/1

use crate::adapter::Row as DataRow;
use crate::error::{BridgeError, BridgeResult};
use crate::model::{FieldType, ModelMeta};
use crate::types::DataValue;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::Row;

pub(crate) type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// 绑定一个参数
pub(crate) fn bind_value<'q>(query: SqliteQuery<'q>, value: &DataValue) -> SqliteQuery<'q> {
    match value {
        DataValue::Null => query.bind(Option::<String>::None),
        DataValue::Bool(b) => query.bind(i64::from(*b)),
        DataValue::Int(i) => query.bind(*i),
        DataValue::Float(f) => query.bind(*f),
        DataValue::String(s) => query.bind(s.clone()),
        DataValue::DateTime(dt) => query.bind(dt.to_rfc3339()),
        DataValue::Date(d) => query.bind(d.format("%Y-%m-%d").to_string()),
        DataValue::Array(_) => query.bind(value.to_json_value().to_string()),
    }
}

/// 绑定全部参数
pub(crate) fn bind_all<'q>(mut query: SqliteQuery<'q>, params: &[DataValue]) -> SqliteQuery<'q> {
    for param in params {
        query = bind_value(query, param);
    }
    query
}

fn read_error(column: &str, e: sqlx::Error) -> BridgeError {
    BridgeError::QueryError {
        message: format!("读取字段 '{}' 失败: {}", column, e),
    }
}

/// 读取整数或文本形式的键值（外键列的类型跟随目标主键）
fn read_key(row: &SqliteRow, column: &str) -> BridgeResult<DataValue> {
    match row.try_get::<Option<i64>, _>(column) {
        Ok(value) => Ok(DataValue::from(value)),
        Err(_) => {
            crate::debug_log!("字段 {} 不是整数，按文本读取", column);
            row.try_get::<Option<String>, _>(column)
                .map(DataValue::from)
                .map_err(|e| read_error(column, e))
        }
    }
}

/// 按模型元数据把一行转换成列名 -> DataValue
pub(crate) fn row_to_data_map_with_metadata(row: &SqliteRow, meta: &ModelMeta) -> BridgeResult<DataRow> {
    let mut map = DataRow::new();

    for (name, def) in meta.column_fields() {
        let column = meta.column_name(name);
        let column = column.as_str();
        let value = match &def.field_type {
            FieldType::Integer => read_key(row, column)?,
            FieldType::ForeignKey { .. } => read_key(row, column)?,
            FieldType::Boolean => row
                .try_get::<Option<i64>, _>(column)
                .map(|v| DataValue::from(v.map(|i| i != 0)))
                .map_err(|e| read_error(column, e))?,
            FieldType::Float | FieldType::Decimal { .. } => row
                .try_get::<Option<f64>, _>(column)
                .map(DataValue::from)
                .map_err(|e| read_error(column, e))?,
            FieldType::String { .. } | FieldType::Text => row
                .try_get::<Option<String>, _>(column)
                .map(DataValue::from)
                .map_err(|e| read_error(column, e))?,
            FieldType::DateTime => match row
                .try_get::<Option<String>, _>(column)
                .map_err(|e| read_error(column, e))?
            {
                Some(text) => chrono::DateTime::parse_from_rfc3339(&text)
                    .map(|dt| DataValue::DateTime(dt.with_timezone(&chrono::Utc)))
                    .map_err(|e| BridgeError::QueryError {
                        message: format!("无效的日期时间 '{}': {}", text, e),
                    })?,
                None => DataValue::Null,
            },
            FieldType::Date => match row
                .try_get::<Option<String>, _>(column)
                .map_err(|e| read_error(column, e))?
            {
                Some(text) => chrono::NaiveDate::parse_from_str(&text, "%Y-%m-%d")
                    .map(DataValue::Date)
                    .map_err(|e| BridgeError::QueryError {
                        message: format!("无效的日期 '{}': {}", text, e),
                    })?,
                None => DataValue::Null,
            },
            FieldType::ManyToMany { .. } => continue,
        };
        map.insert(column.to_string(), value);
    }

    Ok(map)
}
