//! 字段翻译器
//!
//! 把源字段声明转换成目标映射器的字段定义。未知种类返回 `None`，由调用方跳过

use crate::error::BridgeResult;
use crate::model::{FieldDefinition, FieldKind, FieldOptions};
use crate::source::{BaseKind, SourceField, SourceFieldKind};
use rat_logger::debug;

/// 基础种类到目标字段构造器的映射表
const KIND_MAPPING: &[(BaseKind, FieldKind)] = &[
    (BaseKind::Char, FieldKind::Char),
    (BaseKind::Integer, FieldKind::Int),
    (BaseKind::Boolean, FieldKind::Boolean),
    (BaseKind::Text, FieldKind::Text),
    (BaseKind::Float, FieldKind::Float),
    (BaseKind::Decimal, FieldKind::Decimal),
    (BaseKind::DateTime, FieldKind::Datetime),
    (BaseKind::Date, FieldKind::Date),
    (BaseKind::AutoId, FieldKind::Int),
];

/// 查映射表
pub fn target_kind(kind: &SourceFieldKind) -> Option<FieldKind> {
    let base = kind.base_kind()?;
    KIND_MAPPING
        .iter()
        .find(|(b, _)| *b == base)
        .map(|(_, target)| *target)
}

/// 翻译单个字段
///
/// - `Ok(None)`：种类没有映射，或者是关系字段（由模型翻译器处理）
/// - `Err`：目标字段构造器拒绝了参数
pub fn translate_field(field: &SourceField) -> BridgeResult<Option<FieldDefinition>> {
    if field.is_relation() {
        debug!("字段 {} 是关系字段，交由模型翻译器处理", field.name);
        return Ok(None);
    }

    let Some(kind) = target_kind(&field.kind) else {
        debug!("字段 {} 的类型 {} 没有映射，跳过", field.name, field.kind.class_name());
        return Ok(None);
    };

    let mut options = FieldOptions {
        null: field.null,
        default: field.default.clone(),
        ..Default::default()
    };

    match &field.kind {
        SourceFieldKind::DateTime {
            auto_now,
            auto_now_add,
        }
        | SourceFieldKind::Date {
            auto_now,
            auto_now_add,
        } => {
            options.auto_now = *auto_now;
            options.auto_now_add = *auto_now_add;
        }
        SourceFieldKind::Decimal {
            max_digits,
            decimal_places,
        } => {
            options.max_digits = *max_digits;
            options.decimal_places = *decimal_places;
        }
        // 大小整数自增字段同样属于自增主键
        SourceFieldKind::Auto | SourceFieldKind::BigAuto | SourceFieldKind::SmallAuto => options.primary_key = true,
        other => options.max_length = other.max_length(),
    }

    let definition = FieldDefinition::construct(kind, options)?;
    debug!(
        "字段 {} 翻译完成: {} -> {}",
        field.name,
        field.kind.class_name(),
        definition.field_type.type_name()
    );
    Ok(Some(definition))
}
