use serde::{Deserialize, Serialize};

/// 内存数据库路径
pub const SQLITE_MEMORY: &str = ":memory:";

/// 默认数据库URL
pub const DEFAULT_DB_URL: &str = "sqlite://:memory:";

/// 支持的数据库类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatabaseType {
    /// SQLite 数据库
    SQLite,
}

impl DatabaseType {
    /// 获取数据库类型的字符串表示
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseType::SQLite => "sqlite",
        }
    }

    /// 从URL scheme解析数据库类型
    pub fn from_scheme(s: &str) -> Result<Self, crate::error::BridgeError> {
        match s.to_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(DatabaseType::SQLite),
            _ => Err(crate::bridge_error!(unsupported_db, s)),
        }
    }
}

/// 连接配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConnectionConfig {
    /// SQLite 文件路径
    SQLite {
        /// 数据库文件路径，`:memory:` 表示内存数据库
        path: String,
        /// 是否创建数据库文件（如果不存在）
        create_if_missing: bool,
    },
}

impl ConnectionConfig {
    /// 从数据库URL解析连接配置
    ///
    /// 支持 `sqlite://:memory:`、`sqlite://relative.db` 和 `sqlite:///abs/path.db`
    pub fn from_url(url: &str) -> Result<Self, crate::error::BridgeError> {
        let (scheme, rest) = url.split_once("://").ok_or_else(|| {
            crate::bridge_error!(
                config,
                crate::i18n::tf("error.invalid_db_url", &[("url", url)])
            )
        })?;

        match DatabaseType::from_scheme(scheme)? {
            DatabaseType::SQLite => {
                // 查询参数目前不参与连接配置
                let path = rest.split('?').next().unwrap_or_default();
                if path.is_empty() {
                    return Err(crate::bridge_error!(
                        config,
                        crate::i18n::tf("error.invalid_db_url", &[("url", url)])
                    ));
                }
                Ok(ConnectionConfig::SQLite {
                    path: path.to_string(),
                    create_if_missing: true,
                })
            }
        }
    }

    pub fn db_type(&self) -> DatabaseType {
        match self {
            ConnectionConfig::SQLite { .. } => DatabaseType::SQLite,
        }
    }

    /// 是否为内存数据库
    pub fn is_memory(&self) -> bool {
        match self {
            ConnectionConfig::SQLite { path, .. } => path == SQLITE_MEMORY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sqlite_urls() {
        let memory = ConnectionConfig::from_url("sqlite://:memory:").unwrap();
        assert!(memory.is_memory());

        let relative = ConnectionConfig::from_url("sqlite://db.sqlite3").unwrap();
        assert_eq!(
            relative,
            ConnectionConfig::SQLite {
                path: "db.sqlite3".to_string(),
                create_if_missing: true,
            }
        );

        let absolute = ConnectionConfig::from_url("sqlite:///tmp/app.db?journal=wal").unwrap();
        assert_eq!(
            absolute,
            ConnectionConfig::SQLite {
                path: "/tmp/app.db".to_string(),
                create_if_missing: true,
            }
        );
    }

    #[test]
    fn test_reject_other_urls() {
        assert!(matches!(
            ConnectionConfig::from_url("postgres://localhost/db"),
            Err(crate::error::BridgeError::UnsupportedDatabase { .. })
        ));
        assert!(ConnectionConfig::from_url("not a url").is_err());
        assert!(ConnectionConfig::from_url("sqlite://").is_err());
    }
}
