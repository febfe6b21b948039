//! 数据库连接模块
//!
//! 根据连接配置建立 sqlx 连接池。内存数据库只保留一个常驻连接，
//! 保证所有查询看到同一个数据库

use crate::error::{BridgeError, BridgeResult};
use crate::types::{ConnectionConfig, DatabaseType};
use rat_logger::{debug, info};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;

/// 文件数据库的最大连接数
const FILE_POOL_MAX_CONNECTIONS: u32 = 5;

/// 数据库连接
#[derive(Debug, Clone)]
pub enum DatabaseConnection {
    SQLite(SqlitePool),
}

impl DatabaseConnection {
    pub fn db_type(&self) -> DatabaseType {
        match self {
            DatabaseConnection::SQLite(_) => DatabaseType::SQLite,
        }
    }

    /// 关闭连接池，等待借出的连接归还
    pub async fn close(&self) {
        match self {
            DatabaseConnection::SQLite(pool) => pool.close().await,
        }
    }

    pub fn is_closed(&self) -> bool {
        match self {
            DatabaseConnection::SQLite(pool) => pool.is_closed(),
        }
    }
}

/// 按配置建立连接
pub async fn connect(config: &ConnectionConfig) -> BridgeResult<DatabaseConnection> {
    match config {
        ConnectionConfig::SQLite {
            path,
            create_if_missing,
        } => connect_sqlite(path, *create_if_missing).await,
    }
}

async fn connect_sqlite(path: &str, create_if_missing: bool) -> BridgeResult<DatabaseConnection> {
    if path == crate::types::SQLITE_MEMORY {
        info!("连接SQLite内存数据库");
        let options: SqliteConnectOptions = "sqlite::memory:".parse().map_err(|e: sqlx::Error| {
            BridgeError::ConnectionError {
                message: crate::i18n::tf("error.sqlite_memory", &[("message", &e.to_string())]),
            }
        })?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options.foreign_keys(true))
            .await
            .map_err(|e| BridgeError::ConnectionError {
                message: crate::i18n::tf("error.sqlite_memory", &[("message", &e.to_string())]),
            })?;
        return Ok(DatabaseConnection::SQLite(pool));
    }

    let file_exists = Path::new(path).exists();
    if !file_exists && !create_if_missing {
        return Err(BridgeError::ConnectionError {
            message: crate::i18n::tf("error.sqlite_file_not_found", &[("path", path)]),
        });
    }

    if !file_exists {
        if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| BridgeError::ConnectionError {
                message: crate::i18n::tf("error.sqlite_dir_create_failed", &[("message", &e.to_string())]),
            })?;
        }
    }

    debug!("连接SQLite文件数据库: {}", path);
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create_if_missing)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(FILE_POOL_MAX_CONNECTIONS)
        .connect_with(options)
        .await
        .map_err(|e| BridgeError::ConnectionError {
            message: crate::i18n::tf("error.sqlite_connection_failed", &[("message", &e.to_string())]),
        })?;
    info!("SQLite数据库连接成功: {}", path);
    Ok(DatabaseConnection::SQLite(pool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_connection_is_shared() {
        let connection = connect(&ConnectionConfig::SQLite {
            path: ":memory:".to_string(),
            create_if_missing: true,
        })
        .await
        .unwrap();
        let DatabaseConnection::SQLite(pool) = &connection;
        sqlx::query("CREATE TABLE t (x INTEGER)").execute(pool).await.unwrap();
        sqlx::query("INSERT INTO t VALUES (1)").execute(pool).await.unwrap();
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM t").fetch_one(pool).await.unwrap();
        assert_eq!(n, 1);
        connection.close().await;
        assert!(connection.is_closed());
    }

    #[tokio::test]
    async fn test_missing_file_without_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.db");
        let result = connect(&ConnectionConfig::SQLite {
            path: path.to_string_lossy().to_string(),
            create_if_missing: false,
        })
        .await;
        assert!(matches!(result, Err(BridgeError::ConnectionError { .. })));
    }

    #[tokio::test]
    async fn test_file_connection_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("app.db");
        let connection = connect(&ConnectionConfig::SQLite {
            path: path.to_string_lossy().to_string(),
            create_if_missing: true,
        })
        .await
        .unwrap();
        assert!(path.exists());
        connection.close().await;
    }
}
