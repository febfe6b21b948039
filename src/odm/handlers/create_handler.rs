//! # 创建操作处理器

use crate::adapter::Row;
use crate::error::{BridgeError, BridgeResult};
use crate::model::{FieldType, Record};
use crate::odm::runtime::OdmRuntime;
use crate::types::DataValue;
use indexmap::IndexMap;
use rat_logger::{debug, info};

impl OdmRuntime {
    /// 创建记录
    ///
    /// 未提供的字段依次取：自动时间戳、默认值（生成函数每次调用一次）、空值。
    /// 外键既可以用字段名也可以用 `{field}_id` 传入，值可以是记录本身
    pub async fn create(&self, model: &str, values: Vec<(String, DataValue)>) -> BridgeResult<Record> {
        let meta = self.model(model)?;
        debug!("处理创建请求: model={}, 字段数={}", model, values.len());

        let mut provided: IndexMap<&str, DataValue> = IndexMap::new();
        for (key, value) in values {
            let (name, def) = meta.resolve_field(&key).ok_or_else(|| BridgeError::ValidationError {
                field: key.clone(),
                message: format!("模型 {} 没有字段 {}", meta.name, key),
            })?;
            if def.is_many_to_many() {
                return Err(BridgeError::ValidationError {
                    field: key,
                    message: "多对多字段需在创建后通过 add_related 关联".to_string(),
                });
            }
            provided.insert(name, value);
        }

        let now = chrono::Utc::now();
        let mut row = Row::new();
        for (name, def) in meta.column_fields() {
            let value = match provided.shift_remove(name.as_str()) {
                _ if def.auto_now => timestamp(&def.field_type, now),
                Some(value) => value,
                None if def.auto_now_add => timestamp(&def.field_type, now),
                None => def.default.as_ref().map(|d| d.produce()).unwrap_or(DataValue::Null),
            };
            let value = def.validate_with_field_name(value, name)?;
            row.insert(meta.column_name(name), value);
        }

        let rowid = self.adapter.create(&self.connection, &meta.table, &row).await?;

        if let Some((pk_name, pk_def)) = meta.pk_field() {
            let pk_column = meta.column_name(pk_name);
            if pk_def.is_generated() && row.get(&pk_column).map_or(true, DataValue::is_null) {
                row.insert(pk_column, DataValue::Int(rowid));
            }
        }

        let record = Self::to_record(meta, row);
        info!("✅ 创建 {} 记录成功: pk={}", model, record.pk());
        Ok(record)
    }
}

fn timestamp(field_type: &FieldType, now: chrono::DateTime<chrono::Utc>) -> DataValue {
    match field_type {
        FieldType::Date => DataValue::Date(now.date_naive()),
        _ => DataValue::DateTime(now),
    }
}
