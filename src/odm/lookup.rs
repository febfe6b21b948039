//! # 查找条件解析
//!
//! 把 `field__lookup = value` 形式的条件解析成列级查询条件

use crate::error::{BridgeError, BridgeResult};
use crate::model::ModelMeta;
use crate::types::*;

/// 按键合并的查询条件，同名键后写覆盖
pub type Criteria = Vec<(String, DataValue)>;

/// 合并条件：相同键替换原值并保持首次出现的位置
pub fn merge_criteria(base: &mut Criteria, extra: Criteria) {
    for (key, value) in extra {
        match base.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => base.push((key, value)),
        }
    }
}

/// 解析查询条件为列级条件
pub(crate) fn resolve_conditions(meta: &ModelMeta, criteria: &[(String, DataValue)]) -> BridgeResult<Vec<QueryCondition>> {
    criteria
        .iter()
        .map(|(key, value)| resolve_condition(meta, key, value.clone()))
        .collect()
}

fn resolve_condition(meta: &ModelMeta, key: &str, value: DataValue) -> BridgeResult<QueryCondition> {
    let mut condition = QueryCondition::from_lookup(key, value)?;
    let (name, def) = meta.resolve_field(&condition.field).ok_or_else(|| BridgeError::ValidationError {
        field: key.to_string(),
        message: format!("模型 {} 没有字段 {}", meta.name, condition.field),
    })?;

    if def.is_many_to_many() {
        return Err(BridgeError::ValidationError {
            field: key.to_string(),
            message: "多对多字段不能作为过滤条件，请使用关联查询".to_string(),
        });
    }

    condition.value = match condition.operator {
        QueryOperator::IsNull | QueryOperator::IsNotNull => DataValue::Null,
        QueryOperator::In => match condition.value {
            DataValue::Array(values) => DataValue::Array(
                values
                    .into_iter()
                    .map(|v| def.coerce_value(v, name))
                    .collect::<BridgeResult<Vec<_>>>()?,
            ),
            other => other,
        },
        QueryOperator::Contains | QueryOperator::StartsWith | QueryOperator::EndsWith => condition.value,
        _ => def.coerce_value(condition.value, name)?,
    };
    condition.field = meta.column_name(name);
    Ok(condition)
}

/// 解析排序表达式为列级排序，`pk` 指向主键
pub(crate) fn resolve_ordering(meta: &ModelMeta, ordering: &[SortConfig]) -> BridgeResult<Vec<SortConfig>> {
    ordering
        .iter()
        .map(|sort| {
            let (name, def) = meta.resolve_field(&sort.field).ok_or_else(|| BridgeError::ValidationError {
                field: sort.field.clone(),
                message: format!("模型 {} 没有可排序的字段 {}", meta.name, sort.field),
            })?;
            if def.is_many_to_many() {
                return Err(BridgeError::ValidationError {
                    field: sort.field.clone(),
                    message: "不能按多对多字段排序".to_string(),
                });
            }
            Ok(SortConfig {
                field: meta.column_name(name),
                direction: sort.direction,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldDefinition, FieldKind, FieldOptions};

    fn choice_meta() -> ModelMeta {
        let mut meta = ModelMeta::new("Choice", "models", "polls_choice");
        meta.fields.insert(
            "id".to_string(),
            FieldDefinition::construct(
                FieldKind::Int,
                FieldOptions {
                    primary_key: true,
                    ..Default::default()
                },
            )
            .unwrap(),
        );
        meta.fields.insert(
            "votes".to_string(),
            FieldDefinition::construct(FieldKind::Float, FieldOptions::default()).unwrap(),
        );
        meta.fields.insert(
            "question".to_string(),
            FieldDefinition::foreign_key("models.Question", "choice_set", false).unwrap(),
        );
        meta
    }

    #[test]
    fn test_resolve_foreign_key_and_pk() {
        let meta = choice_meta();
        let criteria = vec![
            ("question".to_string(), DataValue::Int(1)),
            ("pk__in".to_string(), DataValue::from(vec![1, 2])),
            ("votes__gt".to_string(), DataValue::Int(3)),
        ];
        let conditions = resolve_conditions(&meta, &criteria).unwrap();
        assert_eq!(conditions[0].field, "question_id");
        assert_eq!(conditions[1].field, "id");
        assert_eq!(conditions[2].value, DataValue::Float(3.0));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let meta = choice_meta();
        let criteria = vec![("missing".to_string(), DataValue::Int(1))];
        assert!(resolve_conditions(&meta, &criteria).is_err());
    }

    #[test]
    fn test_merge_last_write_wins() {
        let mut base = vec![("text".to_string(), DataValue::from("A"))];
        merge_criteria(
            &mut base,
            vec![
                ("text".to_string(), DataValue::from("B")),
                ("votes".to_string(), DataValue::Int(1)),
            ],
        );
        assert_eq!(base.len(), 2);
        assert_eq!(base[0].1, DataValue::from("B"));
    }

    #[test]
    fn test_ordering_by_pk_alias() {
        let meta = choice_meta();
        let sort = resolve_ordering(&meta, &[SortConfig::parse("-pk")]).unwrap();
        assert_eq!(sort[0].field, "id");
        assert_eq!(sort[0].direction, SortDirection::Desc);
    }
}
