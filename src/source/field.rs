//! 源字段声明
//!
//! 同步ORM侧的字段元数据：字段种类、可空性、默认值和关系信息

use crate::model::DefaultValue;
use crate::types::DataValue;

/// 源ORM的字段种类
///
/// 封闭枚举，在声明模型时即确定，不在翻译时遍历继承层次
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceFieldKind {
    Char { max_length: Option<usize> },
    Email { max_length: Option<usize> },
    Slug { max_length: Option<usize> },
    Url { max_length: Option<usize> },
    Integer,
    SmallInteger,
    PositiveInteger,
    BigInteger,
    Boolean,
    Text,
    Float,
    Decimal {
        max_digits: Option<u32>,
        decimal_places: Option<u32>,
    },
    DateTime { auto_now: bool, auto_now_add: bool },
    Date { auto_now: bool, auto_now_add: bool },
    Auto,
    BigAuto,
    SmallAuto,
    // 以下种类没有对应的目标字段
    Time,
    Duration,
    Uuid,
    Json,
    Binary,
    File,
    GenericIp,
    Custom(String),
}

/// 映射表认识的基础种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseKind {
    Char,
    Integer,
    Boolean,
    Text,
    Float,
    Decimal,
    DateTime,
    Date,
    AutoId,
}

impl SourceFieldKind {
    /// 能力查询：返回字段继承自的基础种类
    ///
    /// 子类字段（Email、BigInteger 等）落到其基类的种类上
    pub fn base_kind(&self) -> Option<BaseKind> {
        match self {
            SourceFieldKind::Char { .. }
            | SourceFieldKind::Email { .. }
            | SourceFieldKind::Slug { .. }
            | SourceFieldKind::Url { .. } => Some(BaseKind::Char),
            SourceFieldKind::Integer
            | SourceFieldKind::SmallInteger
            | SourceFieldKind::PositiveInteger
            | SourceFieldKind::BigInteger
            | SourceFieldKind::BigAuto
            | SourceFieldKind::SmallAuto => Some(BaseKind::Integer),
            SourceFieldKind::Boolean => Some(BaseKind::Boolean),
            SourceFieldKind::Text => Some(BaseKind::Text),
            SourceFieldKind::Float => Some(BaseKind::Float),
            SourceFieldKind::Decimal { .. } => Some(BaseKind::Decimal),
            SourceFieldKind::DateTime { .. } => Some(BaseKind::DateTime),
            SourceFieldKind::Date { .. } => Some(BaseKind::Date),
            SourceFieldKind::Auto => Some(BaseKind::AutoId),
            SourceFieldKind::Time
            | SourceFieldKind::Duration
            | SourceFieldKind::Uuid
            | SourceFieldKind::Json
            | SourceFieldKind::Binary
            | SourceFieldKind::File
            | SourceFieldKind::GenericIp
            | SourceFieldKind::Custom(_) => None,
        }
    }

    /// 源ORM中的类名，用于日志
    pub fn class_name(&self) -> &str {
        match self {
            SourceFieldKind::Char { .. } => "CharField",
            SourceFieldKind::Email { .. } => "EmailField",
            SourceFieldKind::Slug { .. } => "SlugField",
            SourceFieldKind::Url { .. } => "URLField",
            SourceFieldKind::Integer => "IntegerField",
            SourceFieldKind::SmallInteger => "SmallIntegerField",
            SourceFieldKind::PositiveInteger => "PositiveIntegerField",
            SourceFieldKind::BigInteger => "BigIntegerField",
            SourceFieldKind::Boolean => "BooleanField",
            SourceFieldKind::Text => "TextField",
            SourceFieldKind::Float => "FloatField",
            SourceFieldKind::Decimal { .. } => "DecimalField",
            SourceFieldKind::DateTime { .. } => "DateTimeField",
            SourceFieldKind::Date { .. } => "DateField",
            SourceFieldKind::Auto => "AutoField",
            SourceFieldKind::BigAuto => "BigAutoField",
            SourceFieldKind::SmallAuto => "SmallAutoField",
            SourceFieldKind::Time => "TimeField",
            SourceFieldKind::Duration => "DurationField",
            SourceFieldKind::Uuid => "UUIDField",
            SourceFieldKind::Json => "JSONField",
            SourceFieldKind::Binary => "BinaryField",
            SourceFieldKind::File => "FileField",
            SourceFieldKind::GenericIp => "GenericIPAddressField",
            SourceFieldKind::Custom(name) => name.as_str(),
        }
    }

    pub fn max_length(&self) -> Option<usize> {
        match self {
            SourceFieldKind::Char { max_length }
            | SourceFieldKind::Email { max_length }
            | SourceFieldKind::Slug { max_length }
            | SourceFieldKind::Url { max_length } => *max_length,
            _ => None,
        }
    }
}

/// 关系种类
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationKind {
    ForeignKey,
    OneToOne,
    ManyToMany,
    /// 其他关系（如泛型关系），翻译时跳过
    Other(String),
}

/// 关系目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationTarget {
    /// 已解析的模型，携带其对象名
    Model(String),
    /// 点分字符串引用，如 `polls.Question`
    Reference(String),
    /// 无法确定目标
    Unresolved,
}

/// 关系声明
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub kind: RelationKind,
    pub target: RelationTarget,
    pub related_name: Option<String>,
}

/// 源模型的一个字段
#[derive(Debug, Clone, PartialEq)]
pub struct SourceField {
    pub name: String,
    pub kind: SourceFieldKind,
    pub null: bool,
    /// `None` 表示未提供默认值
    pub default: Option<DefaultValue>,
    pub primary_key: bool,
    pub relation: Option<Relation>,
}

impl SourceField {
    pub fn new(name: &str, kind: SourceFieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            null: false,
            default: None,
            primary_key: false,
            relation: None,
        }
    }

    pub fn char(name: &str, max_length: usize) -> Self {
        Self::new(
            name,
            SourceFieldKind::Char {
                max_length: Some(max_length),
            },
        )
    }

    pub fn integer(name: &str) -> Self {
        Self::new(name, SourceFieldKind::Integer)
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, SourceFieldKind::Boolean)
    }

    pub fn text(name: &str) -> Self {
        Self::new(name, SourceFieldKind::Text)
    }

    pub fn float(name: &str) -> Self {
        Self::new(name, SourceFieldKind::Float)
    }

    pub fn decimal(name: &str, max_digits: u32, decimal_places: u32) -> Self {
        Self::new(
            name,
            SourceFieldKind::Decimal {
                max_digits: Some(max_digits),
                decimal_places: Some(decimal_places),
            },
        )
    }

    pub fn datetime(name: &str) -> Self {
        Self::new(
            name,
            SourceFieldKind::DateTime {
                auto_now: false,
                auto_now_add: false,
            },
        )
    }

    pub fn date(name: &str) -> Self {
        Self::new(
            name,
            SourceFieldKind::Date {
                auto_now: false,
                auto_now_add: false,
            },
        )
    }

    /// 自增主键字段
    pub fn auto(name: &str) -> Self {
        Self::new(name, SourceFieldKind::Auto).primary_key()
    }

    /// 外键字段，目标为已解析模型名或点分引用
    pub fn foreign_key(name: &str, target: RelationTarget) -> Self {
        Self::relation_field(name, RelationKind::ForeignKey, target)
    }

    pub fn one_to_one(name: &str, target: RelationTarget) -> Self {
        Self::relation_field(name, RelationKind::OneToOne, target)
    }

    pub fn many_to_many(name: &str, target: RelationTarget) -> Self {
        Self::relation_field(name, RelationKind::ManyToMany, target)
    }

    fn relation_field(name: &str, kind: RelationKind, target: RelationTarget) -> Self {
        let mut field = Self::new(name, SourceFieldKind::Integer);
        field.relation = Some(Relation {
            kind,
            target,
            related_name: None,
        });
        field
    }

    pub fn null(mut self) -> Self {
        self.null = true;
        self
    }

    pub fn default(mut self, value: impl Into<DataValue>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    pub fn default_with<F>(mut self, producer: F) -> Self
    where
        F: Fn() -> DataValue + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::producer(producer));
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn auto_now(mut self) -> Self {
        match &mut self.kind {
            SourceFieldKind::DateTime { auto_now, .. } | SourceFieldKind::Date { auto_now, .. } => {
                *auto_now = true
            }
            _ => {}
        }
        self
    }

    pub fn auto_now_add(mut self) -> Self {
        match &mut self.kind {
            SourceFieldKind::DateTime { auto_now_add, .. }
            | SourceFieldKind::Date { auto_now_add, .. } => *auto_now_add = true,
            _ => {}
        }
        self
    }

    /// 设置关系的反向访问名，非关系字段忽略
    pub fn related_name(mut self, related_name: &str) -> Self {
        if let Some(relation) = self.relation.as_mut() {
            relation.related_name = Some(related_name.to_string());
        }
        self
    }

    pub fn is_relation(&self) -> bool {
        self.relation.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_kind_follows_inheritance() {
        assert_eq!(
            SourceFieldKind::Email { max_length: Some(254) }.base_kind(),
            Some(BaseKind::Char)
        );
        assert_eq!(SourceFieldKind::BigAuto.base_kind(), Some(BaseKind::Integer));
        assert_eq!(SourceFieldKind::Auto.base_kind(), Some(BaseKind::AutoId));
        assert_eq!(SourceFieldKind::Uuid.base_kind(), None);
        assert_eq!(SourceFieldKind::Custom("ArrayField".into()).base_kind(), None);
    }

    #[test]
    fn test_builder_flags() {
        let field = SourceField::datetime("pub_date").auto_now_add().null();
        assert!(field.null);
        assert_eq!(
            field.kind,
            SourceFieldKind::DateTime {
                auto_now: false,
                auto_now_add: true
            }
        );

        let fk = SourceField::foreign_key("owner", RelationTarget::Model("Person".into()))
            .related_name("pets");
        assert_eq!(
            fk.relation.and_then(|r| r.related_name),
            Some("pets".to_string())
        );
    }
}
