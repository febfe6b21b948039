//! 模型翻译模块
//!
//! 字段翻译器是叶子组件；模型翻译器在其上处理关系和注册表登记

pub mod field;
pub mod model;
pub mod report;

pub use field::{target_kind, translate_field};
pub use model::{default_related_name, translate_all, translate_model};
pub use report::{TranslationOutcome, TranslationReport};
