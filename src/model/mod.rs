//! 目标模型定义模块
//!
//! 提供目标映射器的字段类型、构造参数验证、模型元数据和记录类型

pub mod field_types;
pub mod record;

pub use field_types::{
    DefaultProducer, DefaultValue, FieldDefinition, FieldKind, FieldOptions, FieldType, ModelMeta,
};
pub use record::Record;
