//! 字段类型定义模块
//!
//! 定义目标模型的字段类型、构造参数验证和模型元数据

use crate::error::{BridgeError, BridgeResult};
use crate::types::DataValue;
use indexmap::IndexMap;
use rat_logger::debug;
use std::sync::Arc;

/// 零参数默认值生成函数
pub type DefaultProducer = Arc<dyn Fn() -> DataValue + Send + Sync>;

/// 字段默认值：固定值或生成函数
#[derive(Clone)]
pub enum DefaultValue {
    /// 固定值
    Value(DataValue),
    /// 每次创建记录时调用一次的生成函数
    Producer(DefaultProducer),
}

impl DefaultValue {
    /// 用闭包构造生成函数默认值
    pub fn producer<F>(f: F) -> Self
    where
        F: Fn() -> DataValue + Send + Sync + 'static,
    {
        DefaultValue::Producer(Arc::new(f))
    }

    /// 求出默认值
    pub fn produce(&self) -> DataValue {
        match self {
            DefaultValue::Value(value) => value.clone(),
            DefaultValue::Producer(producer) => producer(),
        }
    }

    pub fn is_producer(&self) -> bool {
        matches!(self, DefaultValue::Producer(_))
    }
}

impl std::fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefaultValue::Value(value) => write!(f, "Value({:?})", value),
            DefaultValue::Producer(_) => write!(f, "Producer(<fn>)"),
        }
    }
}

impl PartialEq for DefaultValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DefaultValue::Value(a), DefaultValue::Value(b)) => a == b,
            (DefaultValue::Producer(a), DefaultValue::Producer(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<DataValue> for DefaultValue {
    fn from(value: DataValue) -> Self {
        DefaultValue::Value(value)
    }
}

/// 目标字段构造器种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Char,
    Int,
    Boolean,
    Text,
    Float,
    Decimal,
    Datetime,
    Date,
}

/// 字段构造参数
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldOptions {
    pub null: bool,
    pub default: Option<DefaultValue>,
    pub primary_key: bool,
    pub auto_now: bool,
    pub auto_now_add: bool,
    pub max_length: Option<usize>,
    pub max_digits: Option<u32>,
    pub decimal_places: Option<u32>,
}

/// 字段类型枚举
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// 定长字符串类型
    String { max_length: usize },
    /// 整数类型
    Integer,
    /// 布尔类型
    Boolean,
    /// 文本类型
    Text,
    /// 浮点数类型
    Float,
    /// 十进制类型
    Decimal { max_digits: u32, decimal_places: u32 },
    /// 日期时间类型
    DateTime,
    /// 日期类型
    Date,
    /// 外键，reference 形如 `models.Question`
    ForeignKey { reference: String, related_name: String },
    /// 多对多，through 始终为空
    ManyToMany {
        reference: String,
        related_name: String,
        through: Option<String>,
    },
}

impl FieldType {
    /// 字段类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String { .. } => "CharField",
            FieldType::Integer => "IntField",
            FieldType::Boolean => "BooleanField",
            FieldType::Text => "TextField",
            FieldType::Float => "FloatField",
            FieldType::Decimal { .. } => "DecimalField",
            FieldType::DateTime => "DatetimeField",
            FieldType::Date => "DateField",
            FieldType::ForeignKey { .. } => "ForeignKeyField",
            FieldType::ManyToMany { .. } => "ManyToManyField",
        }
    }

    /// 关系字段引用的目标模型名
    pub fn target_model(&self) -> Option<&str> {
        match self {
            FieldType::ForeignKey { reference, .. } | FieldType::ManyToMany { reference, .. } => {
                reference.rsplit_once('.').map(|(_, name)| name)
            }
            _ => None,
        }
    }

    /// 关系字段的反向访问名
    pub fn related_name(&self) -> Option<&str> {
        match self {
            FieldType::ForeignKey { related_name, .. }
            | FieldType::ManyToMany { related_name, .. } => Some(related_name.as_str()),
            _ => None,
        }
    }
}

/// 字段定义
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    /// 字段类型
    pub field_type: FieldType,
    /// 是否允许为空
    pub null: bool,
    /// 默认值
    pub default: Option<DefaultValue>,
    /// 是否为主键
    pub primary_key: bool,
    /// 每次保存时写入当前时间
    pub auto_now: bool,
    /// 创建时写入当前时间
    pub auto_now_add: bool,
}

impl FieldDefinition {
    /// 按种类和构造参数创建字段
    ///
    /// 与目标映射器的字段构造器一致，参数不合法时返回验证错误
    pub fn construct(kind: FieldKind, options: FieldOptions) -> BridgeResult<Self> {
        let field_type = match kind {
            FieldKind::Char => {
                let max_length = options.max_length.ok_or_else(|| {
                    crate::bridge_error!(validation, "max_length", "CharField 必须设置 max_length")
                })?;
                if max_length == 0 {
                    return Err(crate::bridge_error!(
                        validation,
                        "max_length",
                        "CharField 的 max_length 必须大于0"
                    ));
                }
                FieldType::String { max_length }
            }
            FieldKind::Int => FieldType::Integer,
            FieldKind::Boolean => FieldType::Boolean,
            FieldKind::Text => FieldType::Text,
            FieldKind::Float => FieldType::Float,
            FieldKind::Decimal => {
                let (max_digits, decimal_places) = match (options.max_digits, options.decimal_places) {
                    (Some(digits), Some(places)) => (digits, places),
                    _ => {
                        return Err(crate::bridge_error!(
                            validation,
                            "max_digits",
                            "DecimalField 必须同时设置 max_digits 和 decimal_places"
                        ));
                    }
                };
                if max_digits == 0 || decimal_places > max_digits {
                    return Err(crate::bridge_error!(
                        validation,
                        "decimal_places",
                        format!(
                            "DecimalField 精度无效: max_digits={}, decimal_places={}",
                            max_digits, decimal_places
                        )
                    ));
                }
                FieldType::Decimal {
                    max_digits,
                    decimal_places,
                }
            }
            FieldKind::Datetime => FieldType::DateTime,
            FieldKind::Date => FieldType::Date,
        };

        let temporal = matches!(kind, FieldKind::Datetime | FieldKind::Date);
        if temporal && options.auto_now && options.auto_now_add {
            return Err(crate::bridge_error!(
                validation,
                "auto_now",
                "auto_now 与 auto_now_add 只能选择其一"
            ));
        }

        Ok(Self {
            field_type,
            null: options.null,
            default: options.default,
            primary_key: options.primary_key,
            auto_now: temporal && options.auto_now,
            auto_now_add: temporal && options.auto_now_add,
        })
    }

    /// 创建外键字段
    pub fn foreign_key(reference: &str, related_name: &str, null: bool) -> BridgeResult<Self> {
        Self::check_reference(reference)?;
        Ok(Self {
            field_type: FieldType::ForeignKey {
                reference: reference.to_string(),
                related_name: related_name.to_string(),
            },
            null,
            default: None,
            primary_key: false,
            auto_now: false,
            auto_now_add: false,
        })
    }

    /// 创建多对多字段
    pub fn many_to_many(
        reference: &str,
        related_name: &str,
        through: Option<String>,
    ) -> BridgeResult<Self> {
        Self::check_reference(reference)?;
        Ok(Self {
            field_type: FieldType::ManyToMany {
                reference: reference.to_string(),
                related_name: related_name.to_string(),
                through,
            },
            null: false,
            default: None,
            primary_key: false,
            auto_now: false,
            auto_now_add: false,
        })
    }

    fn check_reference(reference: &str) -> BridgeResult<()> {
        match reference.split_once('.') {
            Some((namespace, model))
                if !namespace.is_empty() && !model.is_empty() && !model.contains('.') =>
            {
                Ok(())
            }
            _ => Err(crate::bridge_error!(
                validation,
                "reference",
                format!("关系引用必须形如 'namespace.Model': {}", reference)
            )),
        }
    }

    pub fn is_relation(&self) -> bool {
        matches!(
            self.field_type,
            FieldType::ForeignKey { .. } | FieldType::ManyToMany { .. }
        )
    }

    pub fn is_foreign_key(&self) -> bool {
        matches!(self.field_type, FieldType::ForeignKey { .. })
    }

    pub fn is_many_to_many(&self) -> bool {
        matches!(self.field_type, FieldType::ManyToMany { .. })
    }

    /// 字段是否由数据库生成（自增主键）
    pub fn is_generated(&self) -> bool {
        self.primary_key && matches!(self.field_type, FieldType::Integer)
    }

    pub fn max_length(&self) -> Option<usize> {
        match self.field_type {
            FieldType::String { max_length } => Some(max_length),
            _ => None,
        }
    }

    /// 验证并规范化字段值（写入前）
    ///
    /// 检查空值、类型、字符串长度和十进制精度
    pub fn validate_with_field_name(&self, value: DataValue, field_name: &str) -> BridgeResult<DataValue> {
        if value.is_null() {
            if self.null || self.is_generated() {
                return Ok(value);
            }
            return Err(BridgeError::ValidationError {
                field: field_name.to_string(),
                message: "必填字段不能为空".to_string(),
            });
        }

        let value = self.coerce_value(value, field_name)?;
        match (&self.field_type, &value) {
            (FieldType::String { max_length }, DataValue::String(s)) if s.chars().count() > *max_length => {
                Err(BridgeError::ValidationError {
                    field: field_name.to_string(),
                    message: format!("字符串长度不能超过{}", max_length),
                })
            }
            (
                FieldType::Decimal {
                    max_digits,
                    decimal_places,
                },
                DataValue::Float(number),
            ) => {
                let integer_digits = (number.abs().trunc() as u128).to_string().len() as u32;
                if number.abs() >= 1.0 && integer_digits > max_digits - decimal_places {
                    return Err(BridgeError::ValidationError {
                        field: field_name.to_string(),
                        message: format!("数值 {} 超出精度 ({}, {})", number, max_digits, decimal_places),
                    });
                }
                let scale = 10f64.powi(*decimal_places as i32);
                Ok(DataValue::Float((number * scale).round() / scale))
            }
            _ => Ok(value),
        }
    }

    /// 只做类型规范化，用于查询条件中的值
    ///
    /// 整数可用于浮点/十进制字段，RFC3339 与 `YYYY-MM-DD` 字符串可用于时间字段
    pub fn coerce_value(&self, value: DataValue, field_name: &str) -> BridgeResult<DataValue> {
        if value.is_null() {
            return Ok(value);
        }

        let mismatch = |expected: &str, value: &DataValue| BridgeError::ValidationError {
            field: field_name.to_string(),
            message: format!("字段类型不匹配，期望{}，实际收到{}", expected, value.type_name()),
        };

        match &self.field_type {
            FieldType::String { .. } | FieldType::Text => match value {
                DataValue::String(_) => Ok(value),
                other => Err(mismatch("字符串类型", &other)),
            },
            FieldType::Integer => match value {
                DataValue::Int(_) => Ok(value),
                other => Err(mismatch("整数类型", &other)),
            },
            // 外键值的类型跟随目标主键
            FieldType::ForeignKey { .. } => match value {
                DataValue::Int(_) | DataValue::String(_) => Ok(value),
                other => Err(mismatch("主键值", &other)),
            },
            FieldType::Boolean => match value {
                DataValue::Bool(_) => Ok(value),
                DataValue::Int(i) if i == 0 || i == 1 => Ok(DataValue::Bool(i == 1)),
                other => Err(mismatch("布尔类型", &other)),
            },
            FieldType::Float | FieldType::Decimal { .. } => match value {
                DataValue::Float(_) => Ok(value),
                DataValue::Int(i) => Ok(DataValue::Float(i as f64)),
                other => Err(mismatch("数值类型", &other)),
            },
            FieldType::DateTime => match value {
                DataValue::DateTime(_) => Ok(value),
                DataValue::String(s) => chrono::DateTime::parse_from_rfc3339(&s)
                    .map(|dt| DataValue::DateTime(dt.with_timezone(&chrono::Utc)))
                    .map_err(|e| BridgeError::ValidationError {
                        field: field_name.to_string(),
                        message: format!("无效的日期时间格式 '{}': {}", s, e),
                    }),
                other => Err(mismatch("日期时间类型", &other)),
            },
            FieldType::Date => match value {
                DataValue::Date(_) => Ok(value),
                DataValue::DateTime(dt) => Ok(DataValue::Date(dt.date_naive())),
                DataValue::String(s) => chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .map(DataValue::Date)
                    .map_err(|e| BridgeError::ValidationError {
                        field: field_name.to_string(),
                        message: format!("无效的日期格式 '{}': {}", s, e),
                    }),
                other => Err(mismatch("日期类型", &other)),
            },
            FieldType::ManyToMany { .. } => {
                debug!("多对多字段 {} 不接受直接赋值", field_name);
                Err(BridgeError::ValidationError {
                    field: field_name.to_string(),
                    message: "多对多字段不能直接赋值或比较".to_string(),
                })
            }
        }
    }
}

/// 模型元数据
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMeta {
    /// 模型名，与源模型同名
    pub name: String,
    /// 模型所属命名空间
    pub module: String,
    /// 表名
    pub table: String,
    /// 字段定义（保持声明顺序）
    pub fields: IndexMap<String, FieldDefinition>,
}

impl ModelMeta {
    pub fn new(name: &str, module: &str, table: &str) -> Self {
        Self {
            name: name.to_string(),
            module: module.to_string(),
            table: table.to_string(),
            fields: IndexMap::new(),
        }
    }

    /// 获取主键字段
    pub fn pk_field(&self) -> Option<(&str, &FieldDefinition)> {
        self.fields
            .iter()
            .find(|(_, def)| def.primary_key)
            .map(|(name, def)| (name.as_str(), def))
    }

    /// 主键字段名，未声明时为 `id`
    pub fn pk_name(&self) -> &str {
        self.pk_field().map(|(name, _)| name).unwrap_or("id")
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    /// 字段对应的列名，外键存储在 `{field}_id`
    pub fn column_name(&self, field: &str) -> String {
        match self.fields.get(field) {
            Some(def) if def.is_foreign_key() => format!("{}_id", field),
            _ => field.to_string(),
        }
    }

    /// 存储为列的字段（不含多对多）
    pub fn column_fields(&self) -> impl Iterator<Item = (&String, &FieldDefinition)> {
        self.fields.iter().filter(|(_, def)| !def.is_many_to_many())
    }

    /// 关系字段
    pub fn relation_fields(&self) -> impl Iterator<Item = (&String, &FieldDefinition)> {
        self.fields.iter().filter(|(_, def)| def.is_relation())
    }

    /// 按字段名或列名查找字段（`question` 或 `question_id`）
    pub fn resolve_field(&self, key: &str) -> Option<(&str, &FieldDefinition)> {
        if key == "pk" {
            return self.pk_field();
        }
        if let Some((name, def)) = self.fields.get_key_value(key) {
            return Some((name.as_str(), def));
        }
        key.strip_suffix("_id")
            .and_then(|base| self.fields.get_key_value(base))
            .filter(|(_, def)| def.is_foreign_key())
            .map(|(name, def)| (name.as_str(), def))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construct_char_requires_length() {
        assert!(FieldDefinition::construct(FieldKind::Char, FieldOptions::default()).is_err());
        let field = FieldDefinition::construct(
            FieldKind::Char,
            FieldOptions {
                max_length: Some(20),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(field.max_length(), Some(20));
    }

    #[test]
    fn test_construct_decimal_precision() {
        let bad = FieldOptions {
            max_digits: Some(2),
            decimal_places: Some(4),
            ..Default::default()
        };
        assert!(FieldDefinition::construct(FieldKind::Decimal, bad).is_err());

        let ok = FieldOptions {
            max_digits: Some(6),
            decimal_places: Some(2),
            ..Default::default()
        };
        let field = FieldDefinition::construct(FieldKind::Decimal, ok).unwrap();
        assert_eq!(
            field.validate_with_field_name(DataValue::Float(12.345), "price").unwrap(),
            DataValue::Float(12.35)
        );
        assert!(field.validate_with_field_name(DataValue::Float(123456.0), "price").is_err());
    }

    #[test]
    fn test_auto_now_only_on_temporal() {
        let options = FieldOptions {
            auto_now: true,
            ..Default::default()
        };
        let int_field = FieldDefinition::construct(FieldKind::Int, options.clone()).unwrap();
        assert!(!int_field.auto_now);
        let dt_field = FieldDefinition::construct(FieldKind::Datetime, options).unwrap();
        assert!(dt_field.auto_now);
    }

    #[test]
    fn test_relation_reference_format() {
        assert!(FieldDefinition::foreign_key("models.Question", "choice_set", false).is_ok());
        assert!(FieldDefinition::foreign_key("Question", "choice_set", false).is_err());
        assert!(FieldDefinition::many_to_many("models.", "post_set", None).is_err());
    }

    #[test]
    fn test_resolve_field_by_column() {
        let mut meta = ModelMeta::new("Choice", "models", "polls_choice");
        meta.fields.insert(
            "question".to_string(),
            FieldDefinition::foreign_key("models.Question", "choice_set", false).unwrap(),
        );
        assert_eq!(meta.resolve_field("question_id").map(|(n, _)| n), Some("question"));
        assert_eq!(meta.column_name("question"), "question_id");
        assert!(meta.resolve_field("votes").is_none());
    }

    #[test]
    fn test_producer_default_called_each_time() {
        use std::sync::atomic::{AtomicI64, Ordering};
        let counter = Arc::new(AtomicI64::new(0));
        let c = counter.clone();
        let default = DefaultValue::producer(move || DataValue::Int(c.fetch_add(1, Ordering::SeqCst)));
        assert_eq!(default.produce(), DataValue::Int(0));
        assert_eq!(default.produce(), DataValue::Int(1));
    }
}
