//! rat_ormbridge - 同步ORM模型到异步ODM的桥接库
//!
//! 把同步ORM声明的模型翻译为异步ODM的模型声明，并在每个翻译成功的模型上
//! 挂载查询代理，让原有代码通过异步接口访问同一份数据

// 导出所有公共模块
pub mod activation;
pub mod adapter;
pub mod bridge;
pub mod config;
pub mod error;
pub mod i18n;
pub mod lifecycle;
pub mod model;
pub mod odm;
pub mod pool;
pub mod proxy;
pub mod registry;
pub mod security;
pub mod source;
pub mod translator;
pub mod types;

// 重新导出常用类型和函数
pub use activation::{activate, activate_async, patch_model, Activation};
pub use adapter::{create_adapter, DatabaseAdapter};
pub use bridge::run_blocking;
pub use config::{init_logging, BridgeConfig, BridgeConfigBuilder, LogLevel, LoggingConfig, LoggingConfigBuilder};
pub use error::{BridgeError, BridgeResult};
pub use lifecycle::{Dispatch, LifespanEvent, LifespanWrapper};
pub use model::{DefaultValue, FieldDefinition, FieldKind, FieldOptions, FieldType, ModelMeta, Record};
pub use odm::{Criteria, OdmRuntime};
pub use pool::DatabaseConnection;
pub use proxy::{ObjectManager, QuerySet};
pub use registry::{ModelRegistry, Schema, DEFAULT_NAMESPACE};
pub use source::{ModelCatalog, RelationKind, RelationTarget, SourceField, SourceFieldKind, SourceModel};
pub use translator::{
    default_related_name, translate_all, translate_field, translate_model, TranslationOutcome, TranslationReport,
};
pub use types::*;

// 条件编译调试宏 - 只有在 debug 模式下才输出调试信息
#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        rat_logger::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        // 在 release 模式下不输出调试信息
    };
}

/// 初始化rat_ormbridge库
///
/// 注册多语言错误消息。日志系统由调用者自行初始化，见 [`config::init_logging`]
pub fn init() {
    i18n::ErrorMessageI18n::init();
}

/// 库版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库名称
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// 获取库信息
pub fn get_info() -> String {
    format!("{} v{}", NAME, VERSION)
}
