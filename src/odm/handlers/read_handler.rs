//! # 读取操作处理器

use crate::error::BridgeResult;
use crate::model::Record;
use crate::odm::lookup::{resolve_conditions, resolve_ordering};
use crate::odm::runtime::OdmRuntime;
use crate::types::*;
use rat_logger::debug;

impl OdmRuntime {
    /// 按条件查询记录
    pub async fn find(
        &self,
        model: &str,
        criteria: &[(String, DataValue)],
        options: &QueryOptions,
    ) -> BridgeResult<Vec<Record>> {
        let meta = self.model(model)?;
        let conditions = resolve_conditions(meta, criteria)?;
        let options = QueryOptions {
            sort: resolve_ordering(meta, &options.sort)?,
            pagination: options.pagination.clone(),
        };
        debug!("处理查询请求: model={}, 条件数={}", model, conditions.len());

        let rows = self
            .adapter
            .find(&self.connection, meta, &conditions, &options)
            .await?;
        Ok(rows.into_iter().map(|row| Self::to_record(meta, row)).collect())
    }

    /// 按条件统计记录
    pub async fn count(&self, model: &str, criteria: &[(String, DataValue)]) -> BridgeResult<u64> {
        let meta = self.model(model)?;
        let conditions = resolve_conditions(meta, criteria)?;
        debug!("处理计数请求: model={}, 条件数={}", model, conditions.len());
        self.adapter.count(&self.connection, &meta.table, &conditions).await
    }
}
