//! 记录类型
//!
//! 查询或创建返回的一行数据，按字段声明顺序保存值

use crate::types::DataValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 一条模型记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// 所属模型名
    pub model: String,
    /// 主键字段名
    pub pk_name: String,
    /// 字段值，外键以 `{field}_id` 为键
    pub values: IndexMap<String, DataValue>,
}

impl Record {
    pub fn new(model: &str, pk_name: &str, values: IndexMap<String, DataValue>) -> Self {
        Self {
            model: model.to_string(),
            pk_name: pk_name.to_string(),
            values,
        }
    }

    /// 按字段名取值，`pk` 指向主键，外键可用字段名或列名
    pub fn get(&self, field: &str) -> Option<&DataValue> {
        if field == "pk" {
            return self.values.get(&self.pk_name);
        }
        self.values
            .get(field)
            .or_else(|| self.values.get(&format!("{}_id", field)))
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(DataValue::as_str)
    }

    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(DataValue::as_i64)
    }

    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(DataValue::as_f64)
    }

    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(DataValue::as_bool)
    }

    /// 主键值
    pub fn pk(&self) -> DataValue {
        self.values.get(&self.pk_name).cloned().unwrap_or(DataValue::Null)
    }

    /// 转换为 JSON 对象
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json_value()))
                .collect(),
        )
    }
}

impl From<&Record> for DataValue {
    fn from(record: &Record) -> Self {
        record.pk()
    }
}

impl From<Record> for DataValue {
    fn from(record: Record) -> Self {
        record.pk()
    }
}
