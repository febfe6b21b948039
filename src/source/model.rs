//! 源模型声明与模型目录

use super::field::{RelationKind, SourceField};
use crate::proxy::ObjectManager;
use arc_swap::ArcSwapOption;
use std::sync::Arc;

/// 源ORM的模型声明
pub struct SourceModel {
    pub name: String,
    pub app_label: String,
    pub module: String,
    pub db_table: String,
    /// 普通字段和单值关系字段，保持声明顺序
    pub fields: Vec<SourceField>,
    /// 多对多字段单独存放
    pub many_to_many: Vec<SourceField>,
    objects: ArcSwapOption<ObjectManager>,
}

impl SourceModel {
    /// 创建模型，并像源ORM一样预置隐式 `id` 自增主键
    pub fn new(app_label: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            app_label: app_label.to_string(),
            module: format!("{}.models", app_label),
            db_table: format!("{}_{}", app_label, name.to_lowercase()),
            fields: vec![SourceField::auto("id")],
            many_to_many: Vec::new(),
            objects: ArcSwapOption::empty(),
        }
    }

    /// 移除隐式主键，由调用方自行声明
    pub fn without_implicit_id(mut self) -> Self {
        self.fields.retain(|f| !(f.name == "id" && f.primary_key));
        self
    }

    pub fn db_table(mut self, table: &str) -> Self {
        self.db_table = table.to_string();
        self
    }

    /// 追加字段，多对多字段放入独立列表
    pub fn field(mut self, field: SourceField) -> Self {
        let is_m2m = matches!(
            field.relation.as_ref().map(|r| &r.kind),
            Some(RelationKind::ManyToMany)
        );
        self.fields.retain(|f| f.name != field.name);
        if field.primary_key {
            // 显式主键取代隐式 id
            self.fields.retain(|f| !f.primary_key);
        }
        if is_m2m {
            self.many_to_many.push(field);
        } else {
            self.fields.push(field);
        }
        self
    }

    /// 已挂载的数据访问管理器，未翻译成功时为 `None`
    pub fn objects(&self) -> Option<Arc<ObjectManager>> {
        self.objects.load_full()
    }

    pub fn is_patched(&self) -> bool {
        self.objects.load().is_some()
    }

    pub(crate) fn attach_manager(&self, manager: ObjectManager) {
        self.objects.store(Some(Arc::new(manager)));
    }

    pub(crate) fn detach_manager(&self) {
        self.objects.store(None);
    }
}

impl std::fmt::Debug for SourceModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceModel")
            .field("name", &self.name)
            .field("app_label", &self.app_label)
            .field("db_table", &self.db_table)
            .field("fields", &self.fields)
            .field("many_to_many", &self.many_to_many)
            .field("patched", &self.is_patched())
            .finish()
    }
}

/// 发现的源模型目录，按注册顺序枚举
#[derive(Debug, Default)]
pub struct ModelCatalog {
    models: Vec<Arc<SourceModel>>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册模型，返回可共享的句柄
    pub fn register(&mut self, model: SourceModel) -> Arc<SourceModel> {
        let model = Arc::new(model);
        self.models.push(model.clone());
        model
    }

    pub fn models(&self) -> &[Arc<SourceModel>] {
        &self.models
    }

    /// 按模型名查找，同名时取最后注册的
    pub fn get(&self, name: &str) -> Option<&Arc<SourceModel>> {
        self.models.iter().rev().find(|m| m.name == name)
    }

    /// 某个应用下的模型
    pub fn app_models<'a>(&'a self, app_label: &'a str) -> impl Iterator<Item = &'a Arc<SourceModel>> {
        self.models.iter().filter(move |m| m.app_label == app_label)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
