//! # 激活模块
//!
//! 进程启动时的一次性编排：翻译全部源模型、构建模式、初始化运行时、
//! 可选地生成表结构，最后为翻译成功的源模型挂载数据访问管理器

use crate::bridge::run_blocking;
use crate::error::BridgeResult;
use crate::odm::OdmRuntime;
use crate::proxy::ObjectManager;
use crate::registry::{ModelRegistry, Schema};
use crate::source::{ModelCatalog, SourceModel};
use crate::translator::{translate_all, translate_model, TranslationOutcome, TranslationReport};
use rat_logger::{info, warn};
use std::sync::Arc;

/// 激活结果句柄
#[derive(Debug)]
pub struct Activation {
    report: TranslationReport,
    runtime: Arc<OdmRuntime>,
}

impl Activation {
    /// 每个源模型的翻译结果
    pub fn report(&self) -> &TranslationReport {
        &self.report
    }

    pub fn runtime(&self) -> &Arc<OdmRuntime> {
        &self.runtime
    }

    pub fn schema(&self) -> &Arc<Schema> {
        self.runtime.schema()
    }

    /// 按模型名获取管理器，模型被跳过时为 `None`
    pub fn objects(&self, model: &str) -> Option<ObjectManager> {
        self.runtime
            .schema()
            .contains(model)
            .then(|| ObjectManager::new(self.runtime.clone(), model))
    }

    /// 关闭数据库连接
    pub async fn shutdown(&self) {
        self.runtime.close_connections().await;
    }
}

/// 异步激活
pub async fn activate_async(catalog: &ModelCatalog, db_url: &str, generate_schemas: bool) -> BridgeResult<Activation> {
    info!("🚀 开始激活: {} 个源模型, 数据库={}", catalog.len(), db_url);

    let mut registry = ModelRegistry::new();
    let mut report = translate_all(catalog, &mut registry);

    let (schema, excluded) = Schema::build(&registry);
    for outcome in excluded {
        if let TranslationOutcome::Skipped { name, reason } = outcome {
            report.exclude(&name, &reason);
        }
    }
    report.log();

    let runtime = Arc::new(OdmRuntime::init(db_url, Arc::new(schema)).await?);
    if generate_schemas {
        runtime.generate_schemas(true).await?;
    }

    let mut patched = 0;
    // 报告与目录一一对应，逐条决定挂载
    for (model, outcome) in catalog.models().iter().zip(report.outcomes()) {
        if outcome.is_translated() && runtime.schema().contains(&model.name) {
            model.attach_manager(ObjectManager::new(runtime.clone(), &model.name));
            patched += 1;
        } else {
            model.detach_manager();
        }
    }
    info!("✅ 激活完成: 已挂载 {} 个模型管理器", patched);

    Ok(Activation { report, runtime })
}

/// 同步激活，通过同步桥接驱动 [`activate_async`]
pub fn activate(catalog: &ModelCatalog, db_url: &str, generate_schemas: bool) -> BridgeResult<Activation> {
    run_blocking(activate_async(catalog, db_url, generate_schemas))?
}

/// 翻译单个模型并写入注册表
///
/// 失败时返回 `false`，不写注册表，同名的已有条目保持不变，源模型保持未挂载
pub fn patch_model(model: &SourceModel, registry: &mut ModelRegistry) -> bool {
    match translate_model(model, registry) {
        Ok(_) => true,
        Err(e) => {
            warn!("模型 {} 翻译失败，保持原样: {}", model.name, e);
            model.detach_manager();
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{RelationTarget, SourceField};

    #[test]
    fn test_patch_model_failure_leaves_registry_clean() {
        let mut registry = ModelRegistry::new();
        let broken = SourceModel::new("shop", "Item").field(SourceField::foreign_key("owner", RelationTarget::Unresolved));
        assert!(!patch_model(&broken, &mut registry));
        assert!(!registry.contains("Item"));
        assert!(!broken.is_patched());

        let ok = SourceModel::new("shop", "Owner").field(SourceField::char("name", 50));
        assert!(patch_model(&ok, &mut registry));
        assert!(registry.contains("Owner"));

        let clash = SourceModel::new("other", "Owner").field(SourceField::foreign_key("shop", RelationTarget::Unresolved));
        assert!(!patch_model(&clash, &mut registry));
        assert_eq!(registry.get("Owner").map(|m| m.table.as_str()), Some("shop_owner"));
    }

    #[tokio::test]
    async fn test_activate_attaches_managers() {
        let mut catalog = ModelCatalog::new();
        let question = catalog.register(SourceModel::new("polls", "Question").field(SourceField::char("text", 200)));
        let orphan = catalog.register(
            SourceModel::new("polls", "Orphan")
                .field(SourceField::foreign_key("target", RelationTarget::Reference("other.Missing".to_string()))),
        );

        let activation = activate_async(&catalog, "sqlite://:memory:", true).await.unwrap();

        assert!(question.is_patched());
        assert!(!orphan.is_patched());
        assert!(activation.report().is_translated("Question"));
        assert!(activation.report().skipped_reason("Orphan").is_some());
        assert!(activation.objects("Orphan").is_none());
        assert!(activation.runtime().table_exists("Question").await.unwrap());

        activation.shutdown().await;
        assert!(activation.runtime().is_closed());
    }
}
