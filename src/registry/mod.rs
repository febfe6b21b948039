//! 模型注册表与模式
//!
//! 第一阶段：`ModelRegistry` 收集翻译出的模型元数据（同名后写覆盖）。
//! 第二阶段：`Schema::build` 一次性解析所有关系引用，生成反向关系和多对多中间表，
//! 之后只读共享。

use crate::error::{BridgeError, BridgeResult};
use crate::model::{FieldType, ModelMeta};
use crate::translator::TranslationOutcome;
use indexmap::{IndexMap, IndexSet};
use rat_logger::{debug, warn};

/// 默认注册命名空间
pub const DEFAULT_NAMESPACE: &str = "models";

/// 模型注册表（第一阶段）
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    namespace: String,
    models: IndexMap<String, ModelMeta>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::with_namespace(DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            models: IndexMap::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// 登记模型，同名模型被覆盖
    pub fn register(&mut self, meta: ModelMeta) {
        if self.models.contains_key(&meta.name) {
            debug!("模型已存在，将覆盖元数据: {}", meta.name);
        }
        debug!("注册模型元数据: 模型={}, 字段数量={}", meta.name, meta.fields.len());
        self.models.insert(meta.name.clone(), meta);
    }

    pub fn get(&self, name: &str) -> Option<&ModelMeta> {
        self.models.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelMeta> {
        self.models.values()
    }
}

/// 关系种类（模式层）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationType {
    ForeignKey,
    ManyToMany,
}

/// 目标模型上的反向关系
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseRelation {
    /// 声明关系的模型
    pub model: String,
    /// 声明关系的字段
    pub field: String,
    pub kind: RelationType,
}

/// 多对多中间表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinTable {
    pub table: String,
    pub source_model: String,
    pub source_field: String,
    pub target_model: String,
    pub source_column: String,
    pub target_column: String,
}

/// 模式中的单个模型
#[derive(Debug, Clone)]
pub struct ModelSchema {
    pub meta: ModelMeta,
    /// 反向访问名 -> 反向关系
    pub reverse: IndexMap<String, ReverseRelation>,
}

/// 解析完成的只读模式（第二阶段）
#[derive(Debug, Clone, Default)]
pub struct Schema {
    namespace: String,
    models: IndexMap<String, ModelSchema>,
    join_tables: Vec<JoinTable>,
}

impl Schema {
    /// 批量解析注册表
    ///
    /// 引用未知模型、或反向访问名与目标模型已有字段/反向关系冲突的模型被排除；
    /// 排除会使依赖它的模型继续被排除，直到不再变化
    pub fn build(registry: &ModelRegistry) -> (Schema, Vec<TranslationOutcome>) {
        let mut included: IndexSet<String> = registry.names().map(str::to_string).collect();
        let mut excluded = Vec::new();

        loop {
            match Self::find_violation(registry, &included) {
                Some((name, reason)) => {
                    warn!("模型 {} 在模式构建时被排除: {}", name, reason);
                    included.shift_remove(&name);
                    excluded.push(TranslationOutcome::Skipped { name, reason });
                }
                None => break,
            }
        }

        let mut models: IndexMap<String, ModelSchema> = included
            .iter()
            .filter_map(|name| registry.get(name))
            .map(|meta| {
                (
                    meta.name.clone(),
                    ModelSchema {
                        meta: meta.clone(),
                        reverse: IndexMap::new(),
                    },
                )
            })
            .collect();

        let mut join_tables = Vec::new();
        for name in &included {
            let Some(meta) = registry.get(name) else { continue };
            for (field, def) in meta.relation_fields() {
                let (Some(target), Some(related)) = (def.field_type.target_model(), def.field_type.related_name())
                else {
                    continue;
                };
                let kind = if def.is_many_to_many() {
                    RelationType::ManyToMany
                } else {
                    RelationType::ForeignKey
                };
                if kind == RelationType::ManyToMany {
                    if let Some(target_meta) = registry.get(target) {
                        join_tables.push(Self::join_table(meta, field, target_meta));
                    }
                }
                if let Some(target_schema) = models.get_mut(target) {
                    target_schema.reverse.insert(
                        related.to_string(),
                        ReverseRelation {
                            model: meta.name.clone(),
                            field: field.clone(),
                            kind,
                        },
                    );
                }
            }
        }

        debug!(
            "模式构建完成: {} 个模型, {} 个中间表, 排除 {} 个",
            models.len(),
            join_tables.len(),
            excluded.len()
        );

        (
            Schema {
                namespace: registry.namespace().to_string(),
                models,
                join_tables,
            },
            excluded,
        )
    }

    /// 找出第一个违反约束的模型
    fn find_violation(registry: &ModelRegistry, included: &IndexSet<String>) -> Option<(String, String)> {
        // 目标模型 -> 已占用的反向访问名
        let mut claimed: IndexMap<&str, IndexSet<&str>> = IndexMap::new();
        let mut tables: IndexSet<String> = included
            .iter()
            .filter_map(|n| registry.get(n))
            .map(|m| m.table.clone())
            .collect();

        for name in included {
            let meta = registry.get(name)?;
            for (field, def) in meta.relation_fields() {
                let reference = match &def.field_type {
                    FieldType::ForeignKey { reference, .. } | FieldType::ManyToMany { reference, .. } => reference,
                    _ => continue,
                };
                let Some((namespace, target)) = reference.split_once('.') else {
                    return Some((name.clone(), format!("关系字段 {} 的引用无效: {}", field, reference)));
                };
                if namespace != registry.namespace() {
                    return Some((
                        name.clone(),
                        format!("关系字段 {} 引用了其他命名空间: {}", field, reference),
                    ));
                }
                if !included.contains(target) {
                    return Some((name.clone(), format!("关系字段 {} 引用了未注册的模型 {}", field, target)));
                }
                let Some(target_meta) = registry.get(target) else {
                    return Some((name.clone(), format!("关系字段 {} 引用了未注册的模型 {}", field, target)));
                };
                let related = def.field_type.related_name().unwrap_or_default();
                if target_meta.resolve_field(related).is_some() {
                    return Some((
                        name.clone(),
                        format!("反向访问名 {} 与模型 {} 的字段冲突", related, target),
                    ));
                }
                if !claimed.entry(target_meta.name.as_str()).or_default().insert(related) {
                    return Some((
                        name.clone(),
                        format!("反向访问名 {} 在模型 {} 上重复", related, target),
                    ));
                }
                if def.is_many_to_many() {
                    let join = Self::join_table(meta, field, target_meta);
                    if !tables.insert(join.table.clone()) {
                        return Some((name.clone(), format!("多对多中间表 {} 与已有表重名", join.table)));
                    }
                }
            }
        }
        None
    }

    fn join_table(source: &ModelMeta, field: &str, target: &ModelMeta) -> JoinTable {
        let source_lower = source.name.to_lowercase();
        let target_lower = target.name.to_lowercase();
        let (source_column, target_column) = if source_lower == target_lower {
            (format!("from_{}_id", source_lower), format!("to_{}_id", target_lower))
        } else {
            (format!("{}_id", source_lower), format!("{}_id", target_lower))
        };
        JoinTable {
            table: format!("{}_{}", source.table, target.table),
            source_model: source.name.clone(),
            source_field: field.to_string(),
            target_model: target.name.clone(),
            source_column,
            target_column,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn get(&self, name: &str) -> Option<&ModelSchema> {
        self.models.get(name)
    }

    /// 获取模型元数据，不存在时返回 `ModelNotFound`
    pub fn model(&self, name: &str) -> BridgeResult<&ModelMeta> {
        self.models
            .get(name)
            .map(|s| &s.meta)
            .ok_or_else(|| BridgeError::ModelNotFound {
                model: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelSchema> {
        self.models.values()
    }

    pub fn join_tables(&self) -> &[JoinTable] {
        &self.join_tables
    }

    /// 查找某个模型某个多对多字段的中间表
    pub fn join_table_for(&self, model: &str, field: &str) -> Option<&JoinTable> {
        self.join_tables
            .iter()
            .find(|j| j.source_model == model && j.source_field == field)
    }

    pub fn reverse_relation(&self, model: &str, related_name: &str) -> Option<&ReverseRelation> {
        self.models.get(model)?.reverse.get(related_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldDefinition, FieldKind, FieldOptions};

    fn meta(name: &str, table: &str) -> ModelMeta {
        let mut meta = ModelMeta::new(name, DEFAULT_NAMESPACE, table);
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
        meta
    }

    #[test]
    fn test_register_last_write_wins() {
        let mut registry = ModelRegistry::new();
        registry.register(meta("Question", "polls_question"));
        registry.register(meta("Question", "polls_question_v2"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("Question").unwrap().table, "polls_question_v2");
    }

    #[test]
    fn test_build_resolves_reverse_and_join_tables() {
        let mut registry = ModelRegistry::new();
        let mut post = meta("Post", "blog_post");
        post.fields.insert(
            "tags".to_string(),
            FieldDefinition::many_to_many("models.Tag", "post_set", None).unwrap(),
        );
        registry.register(post);
        registry.register(meta("Tag", "blog_tag"));

        let (schema, excluded) = Schema::build(&registry);
        assert!(excluded.is_empty());
        let reverse = schema.reverse_relation("Tag", "post_set").unwrap();
        assert_eq!(reverse.model, "Post");
        assert_eq!(reverse.kind, RelationType::ManyToMany);
        let join = schema.join_table_for("Post", "tags").unwrap();
        assert_eq!(join.table, "blog_post_blog_tag");
        assert_eq!(join.source_column, "post_id");
        assert_eq!(join.target_column, "tag_id");
    }

    #[test]
    fn test_build_excludes_dangling_chain() {
        let mut registry = ModelRegistry::new();
        let mut choice = meta("Choice", "polls_choice");
        choice.fields.insert(
            "question".to_string(),
            FieldDefinition::foreign_key("models.Question", "choice_set", false).unwrap(),
        );
        let mut vote = meta("Vote", "polls_vote");
        vote.fields.insert(
            "choice".to_string(),
            FieldDefinition::foreign_key("models.Choice", "vote_set", false).unwrap(),
        );
        registry.register(choice);
        registry.register(vote);

        let (schema, excluded) = Schema::build(&registry);
        let names: Vec<_> = excluded.iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["Choice", "Vote"]);
        assert!(!schema.contains("Vote"));
    }

    #[test]
    fn test_build_excludes_related_name_collision() {
        let mut registry = ModelRegistry::new();
        let mut person = meta("Person", "app_person");
        person.fields.insert(
            "pets".to_string(),
            FieldDefinition::construct(FieldKind::Text, FieldOptions::default()).unwrap(),
        );
        let mut dog = meta("Dog", "app_dog");
        dog.fields.insert(
            "owner".to_string(),
            FieldDefinition::foreign_key("models.Person", "pets", false).unwrap(),
        );
        registry.register(person);
        registry.register(dog);

        let (schema, excluded) = Schema::build(&registry);
        assert_eq!(excluded.len(), 1);
        assert!(schema.contains("Person"));
        assert!(!schema.contains("Dog"));
    }
}
