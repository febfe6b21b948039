//! # 配置管理模块 - 核心配置类型
//!
//! 所有配置项必须显式设置，构建器不提供隐式默认值

use crate::error::{BridgeError, BridgeResult};
use crate::types::DEFAULT_DB_URL;
use indexmap::IndexMap;
use rat_logger::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 桥接配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// 连接映射 (别名 -> 数据库URL)
    pub connections: IndexMap<String, String>,
    /// 启动时是否生成表结构（安全模式）
    pub generate_schemas: bool,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,
    /// 是否输出到控制台
    pub console: bool,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> rat_logger::LevelFilter {
        match self {
            LogLevel::Error => rat_logger::LevelFilter::Error,
            LogLevel::Warn => rat_logger::LevelFilter::Warn,
            LogLevel::Info => rat_logger::LevelFilter::Info,
            LogLevel::Debug => rat_logger::LevelFilter::Debug,
            LogLevel::Trace => rat_logger::LevelFilter::Trace,
        }
    }
}

impl BridgeConfig {
    /// 创建配置构建器
    pub fn builder() -> super::builders::BridgeConfigBuilder {
        super::builders::BridgeConfigBuilder::new()
    }

    /// 从配置文件加载配置，`.toml` 按 TOML 解析，其余按 JSON 解析
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> BridgeResult<Self> {
        let path = config_path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let config: BridgeConfig = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&content)
                .map_err(|e| crate::bridge_error!(config, format!("解析TOML配置文件失败: {}", e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| crate::bridge_error!(config, format!("解析JSON配置文件失败: {}", e)))?
        };

        info!("从文件加载配置: {:?}", path);
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, config_path: P) -> BridgeResult<()> {
        let path = config_path.as_ref();
        let content = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::to_string_pretty(self)
                .map_err(|e| crate::bridge_error!(config, format!("序列化TOML配置失败: {}", e)))?
        } else {
            serde_json::to_string_pretty(self)?
        };
        std::fs::write(path, content)?;

        info!("保存配置到文件: {:?}", path);
        Ok(())
    }

    /// 获取指定别名的数据库URL
    pub fn connection(&self, alias: &str) -> BridgeResult<&str> {
        self.connections
            .get(alias)
            .map(String::as_str)
            .ok_or_else(|| crate::bridge_error!(config, format!("找不到数据库连接: {}", alias)))
    }

    /// `default` 连接的URL，未配置时使用内存数据库
    pub fn default_db_url(&self) -> &str {
        self.connections
            .get("default")
            .map(String::as_str)
            .unwrap_or(DEFAULT_DB_URL)
    }
}

/// 按日志配置初始化 rat_logger
///
/// 库本身从不初始化日志，由调用方决定是否调用
pub fn init_logging(config: &LoggingConfig) -> BridgeResult<()> {
    let mut builder = rat_logger::LoggerBuilder::new().with_level(config.level.to_level_filter());
    if config.console {
        builder = builder.add_terminal_with_config(rat_logger::handler::term::TermConfig::default());
    }
    builder.init().map_err(|e| BridgeError::ConfigError {
        message: format!("日志初始化失败: {:?}", e),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
generate_schemas = true

[connections]
default = "sqlite://./polls.db"

[logging]
level = "Debug"
console = false
"#
        )
        .unwrap();

        let config = BridgeConfig::from_file(file.path()).unwrap();
        assert!(config.generate_schemas);
        assert_eq!(config.default_db_url(), "sqlite://./polls.db");
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_json_save_and_fallback_url() {
        let file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let config = BridgeConfig {
            connections: IndexMap::new(),
            generate_schemas: false,
            logging: LoggingConfig {
                level: LogLevel::Info,
                console: true,
            },
        };
        config.save_to_file(file.path()).unwrap();

        let loaded = BridgeConfig::from_file(file.path()).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.default_db_url(), DEFAULT_DB_URL);
        assert!(loaded.connection("default").is_err());
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "generate_schemas = \"yes\"").unwrap();
        assert!(matches!(
            BridgeConfig::from_file(file.path()),
            Err(BridgeError::ConfigError { .. })
        ));
    }
}
