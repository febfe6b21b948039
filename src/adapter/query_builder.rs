//! SQL查询构建器模块
//!
//! 构建参数化的 SELECT / INSERT / COUNT 语句，标识符经安全验证器加引号

use crate::error::{BridgeError, BridgeResult};
use crate::security::DatabaseSecurityValidator;
use crate::types::*;
use indexmap::IndexMap;

/// SQL查询构建器
pub struct SqlQueryBuilder {
    query_type: QueryType,
    table: String,
    fields: Vec<String>,
    conditions: Vec<QueryCondition>,
    order_by: Vec<SortConfig>,
    limit: Option<u64>,
    offset: Option<u64>,
    values: IndexMap<String, DataValue>,
    security_validator: DatabaseSecurityValidator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Count,
    Insert,
}

impl Default for SqlQueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlQueryBuilder {
    pub fn new() -> Self {
        Self {
            query_type: QueryType::Select,
            table: String::new(),
            fields: Vec::new(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            values: IndexMap::new(),
            security_validator: DatabaseSecurityValidator::new(DatabaseType::SQLite),
        }
    }

    /// 设置查询类型为SELECT
    pub fn select(mut self, fields: &[&str]) -> Self {
        self.query_type = QueryType::Select;
        self.fields = fields.iter().map(|s| s.to_string()).collect();
        self
    }

    /// 设置查询类型为 SELECT COUNT(*)
    pub fn count(mut self) -> Self {
        self.query_type = QueryType::Count;
        self
    }

    /// 设置查询类型为INSERT
    pub fn insert(mut self, values: IndexMap<String, DataValue>) -> Self {
        self.query_type = QueryType::Insert;
        self.values = values;
        self
    }

    pub fn from(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    pub fn where_conditions(mut self, conditions: &[QueryCondition]) -> Self {
        self.conditions.extend_from_slice(conditions);
        self
    }

    pub fn order_by(mut self, sort: &[SortConfig]) -> Self {
        self.order_by.extend_from_slice(sort);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// 应用查询选项（排序和分页）
    pub fn options(mut self, options: &QueryOptions) -> Self {
        self = self.order_by(&options.sort);
        if let Some(pagination) = &options.pagination {
            self = self.limit(pagination.limit);
            if pagination.skip > 0 {
                self = self.offset(pagination.skip);
            }
        }
        self
    }

    /// 构建SQL语句和参数
    pub fn build(&self) -> BridgeResult<(String, Vec<DataValue>)> {
        if self.table.is_empty() {
            return Err(BridgeError::QueryError {
                message: "表名不能为空".to_string(),
            });
        }
        match self.query_type {
            QueryType::Select => self.build_select(),
            QueryType::Count => self.build_count(),
            QueryType::Insert => self.build_insert(),
        }
    }

    fn build_select(&self) -> BridgeResult<(String, Vec<DataValue>)> {
        let table = self.security_validator.get_safe_table_identifier(&self.table)?;
        let fields = if self.fields.is_empty() {
            "*".to_string()
        } else {
            self.fields
                .iter()
                .map(|f| self.security_validator.get_safe_field_identifier(f))
                .collect::<BridgeResult<Vec<_>>>()?
                .join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", fields, table);
        let (where_clause, params) = self.build_where_clause(&self.conditions)?;
        if !where_clause.is_empty() {
            sql.push_str(&format!(" WHERE {}", where_clause));
        }

        if !self.order_by.is_empty() {
            let order_clauses = self
                .order_by
                .iter()
                .map(|o| {
                    let direction = match o.direction {
                        SortDirection::Asc => "ASC",
                        SortDirection::Desc => "DESC",
                    };
                    self.security_validator
                        .get_safe_field_identifier(&o.field)
                        .map(|field| format!("{} {}", field, direction))
                })
                .collect::<BridgeResult<Vec<_>>>()?;
            sql.push_str(&format!(" ORDER BY {}", order_clauses.join(", ")));
        }

        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset)),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {}", limit)),
            // SQLite 的 OFFSET 必须跟在 LIMIT 后
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {}", offset)),
            (None, None) => {}
        }

        Ok((sql, params))
    }

    fn build_count(&self) -> BridgeResult<(String, Vec<DataValue>)> {
        let table = self.security_validator.get_safe_table_identifier(&self.table)?;
        let mut sql = format!("SELECT COUNT(*) FROM {}", table);
        let (where_clause, params) = self.build_where_clause(&self.conditions)?;
        if !where_clause.is_empty() {
            sql.push_str(&format!(" WHERE {}", where_clause));
        }
        Ok((sql, params))
    }

    fn build_insert(&self) -> BridgeResult<(String, Vec<DataValue>)> {
        let table = self.security_validator.get_safe_table_identifier(&self.table)?;

        // NULL 值交给列默认值处理
        let values: Vec<(&String, &DataValue)> = self.values.iter().filter(|(_, v)| !v.is_null()).collect();
        if values.is_empty() {
            return Ok((format!("INSERT INTO {} DEFAULT VALUES", table), Vec::new()));
        }

        let columns = values
            .iter()
            .map(|(k, _)| self.security_validator.get_safe_field_identifier(k))
            .collect::<BridgeResult<Vec<_>>>()?;
        let placeholders = vec!["?"; columns.len()];
        let params = values.into_iter().map(|(_, v)| v.clone()).collect();

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders.join(", ")
        );
        Ok((sql, params))
    }

    /// 构建WHERE子句，条件之间为 AND
    pub(crate) fn build_where_clause(&self, conditions: &[QueryCondition]) -> BridgeResult<(String, Vec<DataValue>)> {
        let mut clauses = Vec::new();
        let mut params = Vec::new();
        for condition in conditions {
            let (clause, condition_params) = self.build_single_condition_clause(condition)?;
            clauses.push(clause);
            params.extend(condition_params);
        }
        Ok((clauses.join(" AND "), params))
    }

    fn build_single_condition_clause(&self, condition: &QueryCondition) -> BridgeResult<(String, Vec<DataValue>)> {
        let safe_field = self.security_validator.get_safe_field_identifier(&condition.field)?;
        let ci = condition.case_insensitive;
        let value = condition.value.clone();

        let result = match condition.operator {
            QueryOperator::Eq if value.is_null() => (format!("{} IS NULL", safe_field), vec![]),
            QueryOperator::Eq if ci => (format!("LOWER({}) = LOWER(?)", safe_field), vec![value]),
            QueryOperator::Eq => (format!("{} = ?", safe_field), vec![value]),
            QueryOperator::Gt => (format!("{} > ?", safe_field), vec![value]),
            QueryOperator::Gte => (format!("{} >= ?", safe_field), vec![value]),
            QueryOperator::Lt => (format!("{} < ?", safe_field), vec![value]),
            QueryOperator::Lte => (format!("{} <= ?", safe_field), vec![value]),
            QueryOperator::Contains => Self::pattern_clause(&safe_field, &value, ci, true, true)?,
            QueryOperator::StartsWith => Self::pattern_clause(&safe_field, &value, ci, false, true)?,
            QueryOperator::EndsWith => Self::pattern_clause(&safe_field, &value, ci, true, false)?,
            QueryOperator::In => match value {
                DataValue::Array(values) if values.is_empty() => ("0 = 1".to_string(), vec![]),
                DataValue::Array(values) => {
                    let placeholders = vec!["?"; values.len()].join(", ");
                    (format!("{} IN ({})", safe_field, placeholders), values)
                }
                _ => {
                    return Err(BridgeError::QueryError {
                        message: "IN 操作符需要数组类型的值".to_string(),
                    });
                }
            },
            QueryOperator::IsNull => (format!("{} IS NULL", safe_field), vec![]),
            QueryOperator::IsNotNull => (format!("{} IS NOT NULL", safe_field), vec![]),
        };
        Ok(result)
    }

    /// 字符串匹配：大小写敏感用 GLOB，不敏感用 LIKE（SQLite 的 LIKE 对 ASCII 不区分大小写）
    fn pattern_clause(
        safe_field: &str,
        value: &DataValue,
        case_insensitive: bool,
        leading: bool,
        trailing: bool,
    ) -> BridgeResult<(String, Vec<DataValue>)> {
        let Some(text) = value.as_str() else {
            return Err(BridgeError::QueryError {
                message: format!("字符串匹配需要字符串值，实际收到{}", value.type_name()),
            });
        };

        if case_insensitive {
            let escaped = text.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
            let pattern = format!(
                "{}{}{}",
                if leading { "%" } else { "" },
                escaped,
                if trailing { "%" } else { "" }
            );
            Ok((
                format!("{} LIKE ? ESCAPE '\\'", safe_field),
                vec![DataValue::String(pattern)],
            ))
        } else {
            let escaped: String = text
                .chars()
                .map(|c| match c {
                    '*' | '?' | '[' => format!("[{}]", c),
                    other => other.to_string(),
                })
                .collect();
            let pattern = format!(
                "{}{}{}",
                if leading { "*" } else { "" },
                escaped,
                if trailing { "*" } else { "" }
            );
            Ok((format!("{} GLOB ?", safe_field), vec![DataValue::String(pattern)]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_with_options() {
        let conditions = vec![
            QueryCondition::from_lookup("text", DataValue::from("A")).unwrap(),
            QueryCondition::from_lookup("votes__gte", DataValue::from(2)).unwrap(),
        ];
        let options = QueryOptions::new()
            .with_sort(vec![SortConfig::parse("-votes")])
            .with_limit(2);
        let (sql, params) = SqlQueryBuilder::new()
            .select(&["id", "text"])
            .from("polls_choice")
            .where_conditions(&conditions)
            .options(&options)
            .build()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT \"id\", \"text\" FROM \"polls_choice\" WHERE \"text\" = ? AND \"votes\" >= ? ORDER BY \"votes\" DESC LIMIT 2"
        );
        assert_eq!(params, vec![DataValue::from("A"), DataValue::Int(2)]);
    }

    #[test]
    fn test_pattern_escaping() {
        let cond = QueryCondition::from_lookup("name__icontains", DataValue::from("50%_off")).unwrap();
        let (sql, params) = SqlQueryBuilder::new().count().from("t").where_conditions(&[cond]).build().unwrap();
        assert_eq!(sql, "SELECT COUNT(*) FROM \"t\" WHERE \"name\" LIKE ? ESCAPE '\\'");
        assert_eq!(params, vec![DataValue::from("%50\\%\\_off%")]);

        let cond = QueryCondition::from_lookup("name__startswith", DataValue::from("a*")).unwrap();
        let (sql, params) = SqlQueryBuilder::new().count().from("t").where_conditions(&[cond]).build().unwrap();
        assert!(sql.ends_with("\"name\" GLOB ?"));
        assert_eq!(params, vec![DataValue::from("a[*]*")]);
    }

    #[test]
    fn test_insert_skips_nulls() {
        let mut values = IndexMap::new();
        values.insert("text".to_string(), DataValue::from("Hello"));
        values.insert("note".to_string(), DataValue::Null);
        let (sql, params) = SqlQueryBuilder::new().insert(values).from("t").build().unwrap();
        assert_eq!(sql, "INSERT INTO \"t\" (\"text\") VALUES (?)");
        assert_eq!(params.len(), 1);

        let (sql, _) = SqlQueryBuilder::new().insert(IndexMap::new()).from("t").build().unwrap();
        assert_eq!(sql, "INSERT INTO \"t\" DEFAULT VALUES");
    }

    #[test]
    fn test_empty_in_matches_nothing() {
        let cond = QueryCondition::from_lookup("id__in", DataValue::Array(vec![])).unwrap();
        let (sql, params) = SqlQueryBuilder::new().count().from("t").where_conditions(&[cond]).build().unwrap();
        assert!(sql.ends_with("WHERE 0 = 1"));
        assert!(params.is_empty());
    }
}
