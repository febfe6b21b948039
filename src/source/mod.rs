//! 源ORM模型声明
//!
//! 同步ORM通过此模块提供字段元数据，翻译器只读取这些声明

pub mod field;
pub mod model;

pub use field::{BaseKind, Relation, RelationKind, RelationTarget, SourceField, SourceFieldKind};
pub use model::{ModelCatalog, SourceModel};
