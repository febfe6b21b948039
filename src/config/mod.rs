//! # 配置管理模块
//!
//! 提供统一的配置管理系统，支持构建器模式和链式配置
//! 所有配置项必须显式设置，缺失时构建失败

pub mod builders;
pub mod core;

pub use builders::{BridgeConfigBuilder, LoggingConfigBuilder};
pub use core::{init_logging, BridgeConfig, LogLevel, LoggingConfig};
