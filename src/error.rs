//! 错误类型定义
//!
//! 翻译期错误在编排边界被捕获并记入报告，运行期查询错误原样返回给调用者

use thiserror::Error;

/// rat_ormbridge 统一错误类型
#[derive(Error, Debug)]
pub enum BridgeError {
    /// 数据库连接错误
    #[error("数据库连接失败: {message}")]
    ConnectionError { message: String },

    /// 查询执行错误
    #[error("查询执行失败: {message}")]
    QueryError { message: String },

    /// 字段或数据验证错误
    #[error("验证失败: {field} - {message}")]
    ValidationError { field: String, message: String },

    /// 配置错误
    #[error("配置错误: {message}")]
    ConfigError { message: String },

    /// 序列化错误
    #[error("数据序列化失败: {message}")]
    SerializationError { message: String },

    /// 不支持的数据库类型
    #[error("不支持的数据库类型: {db_type}")]
    UnsupportedDatabase { db_type: String },

    /// 关系目标无法解析
    #[error("模型 {model} 的关系字段 {field} 无法解析目标: {message}")]
    UnresolvedRelation {
        model: String,
        field: String,
        message: String,
    },

    /// 模型未注册
    #[error("模型 '{model}' 未注册")]
    ModelNotFound { model: String },

    /// get 没有匹配的记录
    #[error("{model} 没有匹配的记录")]
    DoesNotExist { model: String },

    /// get 匹配到多条记录
    #[error("{model} 匹配到 {count} 条记录，期望恰好一条")]
    MultipleObjectsReturned { model: String, count: usize },

    /// 在不允许重入的运行时中阻塞等待
    #[error("无法在当前运行时中阻塞等待异步操作: {message}")]
    ReentrantBlocking { message: String },

    /// IO 错误
    #[error("IO错误: {0}")]
    IoError(#[from] std::io::Error),
}

/// rat_ormbridge 结果类型
pub type BridgeResult<T> = Result<T, BridgeError>;

/// 快速构造常用错误
#[macro_export]
macro_rules! bridge_error {
    (connection, $msg:expr) => {
        $crate::error::BridgeError::ConnectionError {
            message: $msg.to_string(),
        }
    };
    (query, $msg:expr) => {
        $crate::error::BridgeError::QueryError {
            message: $msg.to_string(),
        }
    };
    (validation, $field:expr, $msg:expr) => {
        $crate::error::BridgeError::ValidationError {
            field: $field.to_string(),
            message: $msg.to_string(),
        }
    };
    (config, $msg:expr) => {
        $crate::error::BridgeError::ConfigError {
            message: $msg.to_string(),
        }
    };
    (serialization, $msg:expr) => {
        $crate::error::BridgeError::SerializationError {
            message: $msg.to_string(),
        }
    };
    (unsupported_db, $db_type:expr) => {
        $crate::error::BridgeError::UnsupportedDatabase {
            db_type: $db_type.to_string(),
        }
    };
    (model_not_found, $model:expr) => {
        $crate::error::BridgeError::ModelNotFound {
            model: $model.to_string(),
        }
    };
}

impl From<sqlx::Error> for BridgeError {
    fn from(err: sqlx::Error) -> Self {
        BridgeError::QueryError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::SerializationError {
            message: err.to_string(),
        }
    }
}
