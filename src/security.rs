//! 数据库安全验证工具
//!
//! 校验表名、列名等标识符并加引号，模型声明中的名字经此进入SQL

use crate::error::{BridgeError, BridgeResult};
use crate::types::DatabaseType;

/// 标识符最大长度
const MAX_IDENTIFIER_LEN: usize = 64;

/// 数据库安全验证器
#[derive(Debug, Clone, Copy)]
pub struct DatabaseSecurityValidator {
    db_type: DatabaseType,
}

impl DatabaseSecurityValidator {
    pub fn new(db_type: DatabaseType) -> Self {
        Self { db_type }
    }

    /// 验证字段名
    ///
    /// 只允许 ASCII 字母、数字和下划线，且不能以数字开头。
    /// 标识符总是加引号使用，因此不拒绝 `order`、`key` 这类关键字
    pub fn validate_field_name(&self, field_name: &str) -> BridgeResult<()> {
        self.validate_identifier("field_name", field_name, "字段名")
    }

    /// 验证表名
    pub fn validate_table_name(&self, table_name: &str) -> BridgeResult<()> {
        self.validate_identifier("table_name", table_name, "表名")
    }

    /// 获取安全的字段标识符（已加引号）
    pub fn get_safe_field_identifier(&self, field_name: &str) -> BridgeResult<String> {
        self.validate_field_name(field_name)?;
        Ok(self.quote(field_name))
    }

    /// 获取安全的表标识符（已加引号）
    pub fn get_safe_table_identifier(&self, table_name: &str) -> BridgeResult<String> {
        self.validate_table_name(table_name)?;
        Ok(self.quote(table_name))
    }

    fn quote(&self, identifier: &str) -> String {
        match self.db_type {
            DatabaseType::SQLite => format!("\"{}\"", identifier),
        }
    }

    fn validate_identifier(&self, kind: &str, name: &str, label: &str) -> BridgeResult<()> {
        let Some(first) = name.chars().next() else {
            return Err(BridgeError::ValidationError {
                field: kind.to_string(),
                message: format!("{}不能为空", label),
            });
        };

        if name.len() > MAX_IDENTIFIER_LEN {
            return Err(BridgeError::ValidationError {
                field: name.to_string(),
                message: format!("{}长度不能超过{}个字符", label, MAX_IDENTIFIER_LEN),
            });
        }

        if first.is_ascii_digit() {
            return Err(BridgeError::ValidationError {
                field: name.to_string(),
                message: format!("{}不能以数字开头", label),
            });
        }

        if let Some((i, ch)) = name
            .chars()
            .enumerate()
            .find(|(_, ch)| !ch.is_ascii_alphanumeric() && *ch != '_')
        {
            return Err(BridgeError::ValidationError {
                field: name.to_string(),
                message: format!("{}包含非法字符 '{}' 在位置 {}", label, ch, i),
            });
        }

        // SQLite 内部表
        if name.to_lowercase().starts_with("sqlite_") {
            return Err(BridgeError::ValidationError {
                field: name.to_string(),
                message: format!("{}不能使用 sqlite_ 前缀", label),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoting() {
        let validator = DatabaseSecurityValidator::new(DatabaseType::SQLite);
        assert_eq!(validator.get_safe_field_identifier("order").unwrap(), "\"order\"");
        assert_eq!(
            validator.get_safe_table_identifier("polls_question").unwrap(),
            "\"polls_question\""
        );
    }

    #[test]
    fn test_rejects_injection() {
        let validator = DatabaseSecurityValidator::new(DatabaseType::SQLite);
        assert!(validator.validate_field_name("name; DROP TABLE x").is_err());
        assert!(validator.validate_field_name("1abc").is_err());
        assert!(validator.validate_field_name("").is_err());
        assert!(validator.validate_table_name("sqlite_master").is_err());
        assert!(validator.validate_field_name(&"a".repeat(65)).is_err());
    }
}
