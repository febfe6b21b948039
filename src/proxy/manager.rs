use super::QuerySet;
use crate::error::BridgeResult;
use crate::model::Record;
use crate::odm::{Criteria, OdmRuntime};
use crate::types::DataValue;
use std::sync::Arc;

/// 模型级数据访问管理器
///
/// 挂载在翻译成功的源模型上，取代其原有的 `objects`
#[derive(Clone)]
pub struct ObjectManager {
    runtime: Arc<OdmRuntime>,
    model: String,
}

impl ObjectManager {
    pub fn new(runtime: Arc<OdmRuntime>, model: &str) -> Self {
        Self {
            runtime,
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn runtime(&self) -> &Arc<OdmRuntime> {
        &self.runtime
    }

    fn query(&self) -> QuerySet {
        QuerySet::new(self.runtime.clone(), &self.model)
    }

    pub async fn create(&self, values: Criteria) -> BridgeResult<Record> {
        self.runtime.create(&self.model, values).await
    }

    pub fn all(&self) -> QuerySet {
        self.query()
    }

    pub fn filter(&self, criteria: Criteria) -> QuerySet {
        self.query().filter(criteria)
    }

    pub fn order_by(&self, fields: &[&str]) -> QuerySet {
        self.query().order_by(fields)
    }

    pub async fn count(&self) -> BridgeResult<u64> {
        self.query().count().await
    }

    pub async fn get(&self, criteria: Criteria) -> BridgeResult<Record> {
        self.query().get(criteria).await
    }

    pub async fn first(&self) -> BridgeResult<Option<Record>> {
        self.query().first().await
    }

    /// 为多对多关系添加关联，`instance` 可以是记录或主键值
    pub async fn add_related<I, T>(&self, instance: I, name: &str, targets: T) -> BridgeResult<()>
    where
        I: Into<DataValue>,
        T: IntoIterator,
        T::Item: Into<DataValue>,
    {
        let targets: Vec<DataValue> = targets.into_iter().map(Into::into).collect();
        self.runtime
            .add_related(&self.model, name, &instance.into(), &targets)
            .await
    }

    /// 读取关联记录，`name` 为正向字段名或反向访问名
    pub async fn related<I: Into<DataValue>>(&self, instance: I, name: &str) -> BridgeResult<Vec<Record>> {
        self.runtime.fetch_related(&self.model, name, &instance.into()).await
    }
}

impl std::fmt::Debug for ObjectManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectManager").field("model", &self.model).finish()
    }
}
