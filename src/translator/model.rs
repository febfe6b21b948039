//! 模型翻译器
//!
//! 遍历源模型的普通字段、单值关系和多对多字段，组装目标模型元数据并登记到注册表

use super::field::translate_field;
use super::report::{TranslationOutcome, TranslationReport};
use crate::error::{BridgeError, BridgeResult};
use crate::model::{FieldDefinition, FieldKind, FieldOptions, ModelMeta};
use crate::registry::ModelRegistry;
use crate::source::{ModelCatalog, Relation, RelationKind, RelationTarget, SourceField, SourceModel};
use rat_logger::debug;

/// 未声明反向访问名时的默认约定：`{小写模型名}_set`
pub fn default_related_name(model_name: &str) -> String {
    format!("{}_set", model_name.to_lowercase())
}

/// 推导关系目标的模型名
///
/// 已解析的模型取对象名；点分引用取最后一段
fn relation_target_name(model: &SourceModel, field: &SourceField, relation: &Relation) -> BridgeResult<String> {
    let name = match &relation.target {
        RelationTarget::Model(name) => Some(name.as_str()),
        RelationTarget::Reference(reference) => reference.rsplit('.').next(),
        RelationTarget::Unresolved => None,
    };

    match name.map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(BridgeError::UnresolvedRelation {
            model: model.name.clone(),
            field: field.name.clone(),
            message: format!("{:?}", relation.target),
        }),
    }
}

fn related_name(model: &SourceModel, relation: &Relation) -> String {
    relation
        .related_name
        .clone()
        .unwrap_or_else(|| default_related_name(&model.name))
}

/// 翻译单个模型并登记到注册表
///
/// 任何一步失败都返回错误，注册表不会留下该模型的条目
pub fn translate_model(model: &SourceModel, registry: &mut ModelRegistry) -> BridgeResult<ModelMeta> {
    debug!("开始翻译模型: {} (表 {})", model.name, model.db_table);
    let namespace = registry.namespace().to_string();
    let mut meta = ModelMeta::new(&model.name, &namespace, &model.db_table);

    for field in &model.fields {
        if let Some(relation) = &field.relation {
            match relation.kind {
                RelationKind::ForeignKey | RelationKind::OneToOne => {
                    let target = relation_target_name(model, field, relation)?;
                    let reference = format!("{}.{}", namespace, target);
                    let definition = FieldDefinition::foreign_key(
                        &reference,
                        &related_name(model, relation),
                        field.null,
                    )?;
                    debug!("外键 {}.{} -> {}", model.name, field.name, reference);
                    meta.fields.insert(field.name.clone(), definition);
                }
                RelationKind::ManyToMany | RelationKind::Other(_) => {
                    debug!("跳过关系字段 {}.{} ({:?})", model.name, field.name, relation.kind);
                }
            }
            continue;
        }

        if let Some(mut definition) = translate_field(field)? {
            if field.primary_key {
                definition.primary_key = true;
            }
            meta.fields.insert(field.name.clone(), definition);
        }
    }

    for field in &model.many_to_many {
        let Some(relation) = &field.relation else {
            continue;
        };
        let target = relation_target_name(model, field, relation)?;
        let reference = format!("{}.{}", namespace, target);
        let definition = FieldDefinition::many_to_many(&reference, &related_name(model, relation), None)?;
        debug!("多对多 {}.{} -> {}", model.name, field.name, reference);
        meta.fields.insert(field.name.clone(), definition);
    }

    if meta.pk_field().is_none() {
        // 目标映射器为没有主键的模型补上隐式 id
        let id = FieldDefinition::construct(
            FieldKind::Int,
            FieldOptions {
                primary_key: true,
                ..Default::default()
            },
        )?;
        meta.fields.shift_insert(0, "id".to_string(), id);
    }

    registry.register(meta.clone());
    Ok(meta)
}

/// 批量翻译目录中的全部模型，失败的模型记为跳过并继续
///
/// 报告按目录顺序为每个源模型记录一条结果；失败的模型不写注册表，
/// 同名的较早成功条目保持不变
pub fn translate_all(catalog: &ModelCatalog, registry: &mut ModelRegistry) -> TranslationReport {
    let mut report = TranslationReport::new();
    for model in catalog.models() {
        let outcome = match translate_model(model, registry) {
            Ok(_) => TranslationOutcome::Translated {
                name: model.name.clone(),
            },
            Err(e) => TranslationOutcome::Skipped {
                name: model.name.clone(),
                reason: e.to_string(),
            },
        };
        report.push(outcome);
    }
    report
}
