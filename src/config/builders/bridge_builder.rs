//! # 桥接配置构建器模块

use crate::config::core::{BridgeConfig, LoggingConfig};
use crate::error::BridgeResult;
use crate::types::ConnectionConfig;
use indexmap::IndexMap;
use rat_logger::info;

/// 桥接配置构建器
///
/// 提供链式配置接口，所有选项都必须显式设置
#[derive(Debug, Default)]
pub struct BridgeConfigBuilder {
    connections: IndexMap<String, String>,
    generate_schemas: Option<bool>,
    logging: Option<LoggingConfig>,
}

impl BridgeConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加数据库连接
    ///
    /// # 参数
    ///
    /// * `alias` - 连接别名，启动时使用 `default`
    /// * `db_url` - 数据库URL
    pub fn connection<A: Into<String>, U: Into<String>>(mut self, alias: A, db_url: U) -> Self {
        self.connections.insert(alias.into(), db_url.into());
        self
    }

    /// 设置启动时是否生成表结构
    pub fn generate_schemas(mut self, generate: bool) -> Self {
        self.generate_schemas = Some(generate);
        self
    }

    /// 设置日志配置
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// 构建配置
    ///
    /// # 错误
    ///
    /// 缺少必需项、或连接URL无法解析时返回错误
    pub fn build(self) -> BridgeResult<BridgeConfig> {
        if self.connections.is_empty() {
            return Err(crate::bridge_error!(config, "至少需要配置一个数据库连接"));
        }
        for (alias, url) in &self.connections {
            ConnectionConfig::from_url(url).map_err(|e| {
                crate::bridge_error!(config, format!("连接 {} 的URL无效: {}", alias, e))
            })?;
        }
        let generate_schemas = self
            .generate_schemas
            .ok_or_else(|| crate::bridge_error!(config, "是否生成表结构必须设置"))?;
        let logging = self
            .logging
            .ok_or_else(|| crate::bridge_error!(config, "日志配置必须设置"))?;

        info!(
            "创建桥接配置: 连接数量={}, 生成表结构={}",
            self.connections.len(),
            generate_schemas
        );

        Ok(BridgeConfig {
            connections: self.connections,
            generate_schemas,
            logging,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use crate::error::BridgeError;

    fn logging() -> LoggingConfig {
        LoggingConfig::builder()
            .level(LogLevel::Info)
            .console(false)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_every_option() {
        let missing = BridgeConfig::builder()
            .connection("default", "sqlite://:memory:")
            .logging(logging())
            .build();
        assert!(matches!(missing, Err(BridgeError::ConfigError { .. })));

        assert!(BridgeConfig::builder()
            .generate_schemas(true)
            .logging(logging())
            .build()
            .is_err());

        assert!(LoggingConfig::builder().level(LogLevel::Debug).build().is_err());
    }

    #[test]
    fn test_builder_rejects_unsupported_url() {
        let result = BridgeConfig::builder()
            .connection("default", "postgres://localhost/app")
            .generate_schemas(true)
            .logging(logging())
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_success() {
        let config = BridgeConfig::builder()
            .connection("default", "sqlite://:memory:")
            .generate_schemas(true)
            .logging(logging())
            .build()
            .unwrap();
        assert_eq!(config.default_db_url(), "sqlite://:memory:");
        assert!(config.generate_schemas);
    }
}
