use crate::error::{BridgeError, BridgeResult};
use crate::types::data_value::DataValue;
use serde::{Deserialize, Serialize};

/// 查找表达式中字段名与操作符的分隔符
pub const LOOKUP_SEPARATOR: &str = "__";

/// 查询条件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryCondition {
    /// 字段名
    pub field: String,
    /// 操作符
    pub operator: QueryOperator,
    /// 值
    pub value: DataValue,
    /// 是否大小写不敏感（仅对字符串操作符有效）
    #[serde(default)]
    pub case_insensitive: bool,
}

/// 查询操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryOperator {
    /// 等于
    Eq,
    /// 大于
    Gt,
    /// 大于等于
    Gte,
    /// 小于
    Lt,
    /// 小于等于
    Lte,
    /// 包含（字符串）
    Contains,
    /// 开始于（字符串）
    StartsWith,
    /// 结束于（字符串）
    EndsWith,
    /// 在列表中
    In,
    /// 为空
    IsNull,
    /// 不为空
    IsNotNull,
}

impl QueryCondition {
    /// 创建等值条件
    pub fn eq(field: impl Into<String>, value: impl Into<DataValue>) -> Self {
        Self {
            field: field.into(),
            operator: QueryOperator::Eq,
            value: value.into(),
            case_insensitive: false,
        }
    }

    /// 解析 `field__lookup` 形式的查找表达式
    ///
    /// 未带后缀的键视为精确匹配；`isnull` 根据布尔值选择 IsNull / IsNotNull
    pub fn from_lookup(key: &str, value: DataValue) -> BridgeResult<Self> {
        let (field, lookup) = match key.rsplit_once(LOOKUP_SEPARATOR) {
            Some((field, lookup)) if !field.is_empty() => (field, lookup),
            _ => (key, "exact"),
        };

        let (operator, case_insensitive) = match lookup {
            "exact" => (QueryOperator::Eq, false),
            "iexact" => (QueryOperator::Eq, true),
            "contains" => (QueryOperator::Contains, false),
            "icontains" => (QueryOperator::Contains, true),
            "startswith" => (QueryOperator::StartsWith, false),
            "istartswith" => (QueryOperator::StartsWith, true),
            "endswith" => (QueryOperator::EndsWith, false),
            "iendswith" => (QueryOperator::EndsWith, true),
            "gt" => (QueryOperator::Gt, false),
            "gte" => (QueryOperator::Gte, false),
            "lt" => (QueryOperator::Lt, false),
            "lte" => (QueryOperator::Lte, false),
            "in" => {
                if !matches!(value, DataValue::Array(_)) {
                    return Err(BridgeError::ValidationError {
                        field: key.to_string(),
                        message: "in 查找需要数组值".to_string(),
                    });
                }
                (QueryOperator::In, false)
            }
            "isnull" => match value {
                DataValue::Bool(true) => (QueryOperator::IsNull, false),
                DataValue::Bool(false) => (QueryOperator::IsNotNull, false),
                _ => {
                    return Err(BridgeError::ValidationError {
                        field: key.to_string(),
                        message: "isnull 查找需要布尔值".to_string(),
                    });
                }
            },
            other => {
                return Err(BridgeError::ValidationError {
                    field: key.to_string(),
                    message: format!("不支持的查找操作: {}", other),
                });
            }
        };

        Ok(Self {
            field: field.to_string(),
            operator,
            value,
            case_insensitive,
        })
    }
}

/// 排序配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortConfig {
    /// 字段名
    pub field: String,
    /// 排序方向
    pub direction: SortDirection,
}

impl SortConfig {
    /// 解析排序表达式，`-field` 表示降序
    pub fn parse(expr: &str) -> Self {
        match expr.strip_prefix('-') {
            Some(field) => Self {
                field: field.to_string(),
                direction: SortDirection::Desc,
            },
            None => Self {
                field: expr.trim_start_matches('+').to_string(),
                direction: SortDirection::Asc,
            },
        }
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    /// 升序
    Asc,
    /// 降序
    Desc,
}

/// 分页配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// 跳过的记录数
    pub skip: u64,
    /// 限制返回的记录数
    pub limit: u64,
}

/// 查询选项
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryOptions {
    /// 排序配置
    pub sort: Vec<SortConfig>,
    /// 分页配置
    pub pagination: Option<PaginationConfig>,
}

impl QueryOptions {
    /// 创建新的查询选项
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置排序
    pub fn with_sort(mut self, sort: Vec<SortConfig>) -> Self {
        self.sort = sort;
        self
    }

    /// 设置分页
    pub fn with_pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// 只取前 limit 条
    pub fn with_limit(self, limit: u64) -> Self {
        self.with_pagination(PaginationConfig { skip: 0, limit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_parsing() {
        let cond = QueryCondition::from_lookup("text", DataValue::from("A")).unwrap();
        assert_eq!(cond.field, "text");
        assert_eq!(cond.operator, QueryOperator::Eq);

        let cond = QueryCondition::from_lookup("votes__gte", DataValue::from(3)).unwrap();
        assert_eq!(cond.field, "votes");
        assert_eq!(cond.operator, QueryOperator::Gte);

        let cond = QueryCondition::from_lookup("name__icontains", DataValue::from("x")).unwrap();
        assert_eq!(cond.operator, QueryOperator::Contains);
        assert!(cond.case_insensitive);

        let cond = QueryCondition::from_lookup("parent__isnull", DataValue::Bool(false)).unwrap();
        assert_eq!(cond.operator, QueryOperator::IsNotNull);

        assert!(QueryCondition::from_lookup("id__in", DataValue::Int(1)).is_err());
        assert!(QueryCondition::from_lookup("name__regex", DataValue::from("x")).is_err());
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!(SortConfig::parse("-pub_date").direction, SortDirection::Desc);
        assert_eq!(SortConfig::parse("pub_date").field, "pub_date");
    }
}
