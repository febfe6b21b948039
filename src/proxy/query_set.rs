use crate::bridge::run_blocking;
use crate::error::{BridgeError, BridgeResult};
use crate::model::Record;
use crate::odm::lookup::merge_criteria;
use crate::odm::{Criteria, OdmRuntime};
use crate::types::*;
use futures::future::BoxFuture;
use futures::stream::{self, BoxStream, StreamExt};
use rat_logger::debug;
use std::future::IntoFuture;
use std::sync::Arc;

/// get 最多读取的记录数，用于报告多条匹配
const MAX_GET_RESULTS: u64 = 21;

/// 查询代理
///
/// 不可变构建器：`filter` / `order_by` / `all` 返回新值，
/// 直到 `count` / `first` / `get` / `.await` / `stream` 时才执行查询
#[derive(Clone)]
pub struct QuerySet {
    runtime: Arc<OdmRuntime>,
    model: String,
    criteria: Criteria,
    ordering: Vec<String>,
}

impl QuerySet {
    pub fn new(runtime: Arc<OdmRuntime>, model: &str) -> Self {
        Self {
            runtime,
            model: model.to_string(),
            criteria: Vec::new(),
            ordering: Vec::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn criteria(&self) -> &[(String, DataValue)] {
        &self.criteria
    }

    pub fn ordering(&self) -> &[String] {
        &self.ordering
    }

    /// 追加过滤条件，同名键后写覆盖
    pub fn filter(&self, criteria: Criteria) -> Self {
        let mut next = self.clone();
        merge_criteria(&mut next.criteria, criteria);
        next
    }

    /// 追加排序字段，`-field` 为降序
    pub fn order_by(&self, fields: &[&str]) -> Self {
        let mut next = self.clone();
        next.ordering.extend(fields.iter().map(|f| f.to_string()));
        next
    }

    pub fn all(&self) -> Self {
        self.clone()
    }

    fn options(&self) -> QueryOptions {
        QueryOptions::new().with_sort(self.ordering.iter().map(|f| SortConfig::parse(f)).collect())
    }

    /// 执行查询并返回全部结果
    pub async fn fetch(&self) -> BridgeResult<Vec<Record>> {
        self.runtime.find(&self.model, &self.criteria, &self.options()).await
    }

    pub async fn count(&self) -> BridgeResult<u64> {
        self.runtime.count(&self.model, &self.criteria).await
    }

    /// 第一条记录，未指定排序时按主键升序
    pub async fn first(&self) -> BridgeResult<Option<Record>> {
        let mut options = self.options();
        if options.sort.is_empty() {
            options.sort.push(SortConfig::parse("pk"));
        }
        let records = self
            .runtime
            .find(&self.model, &self.criteria, &options.with_limit(1))
            .await?;
        Ok(records.into_iter().next())
    }

    /// 合并条件后获取恰好一条记录
    pub async fn get(&self, criteria: Criteria) -> BridgeResult<Record> {
        let query = self.filter(criteria);
        let options = query.options().with_limit(MAX_GET_RESULTS);
        let mut records = self.runtime.find(&query.model, &query.criteria, &options).await?;
        debug!("get 查询 {} 返回 {} 条记录", self.model, records.len());
        match records.len() {
            0 => Err(BridgeError::DoesNotExist {
                model: self.model.clone(),
            }),
            1 => Ok(records.remove(0)),
            count => Err(BridgeError::MultipleObjectsReturned {
                model: self.model.clone(),
                count,
            }),
        }
    }

    /// 异步迭代：先读取完整结果集，再按顺序逐条产出
    pub fn stream(&self) -> BoxStream<'static, BridgeResult<Record>> {
        let query = self.clone();
        stream::once(async move { query.fetch().await }).flat_map(|result| {
            let items: Vec<BridgeResult<Record>> = match result {
                Ok(records) => records.into_iter().map(Ok).collect(),
                Err(e) => vec![Err(e)],
            };
            stream::iter(items)
        })
        .boxed()
    }

    /// 同步迭代，供非异步调用方使用
    ///
    /// 通过同步桥接阻塞到结果全部读取完成，不是真正的流式读取
    pub fn iter_blocking(&self) -> BridgeResult<std::vec::IntoIter<Record>> {
        let records = run_blocking(self.fetch())??;
        Ok(records.into_iter())
    }
}

impl IntoFuture for QuerySet {
    type Output = BridgeResult<Vec<Record>>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.fetch().await })
    }
}

impl std::fmt::Debug for QuerySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuerySet")
            .field("model", &self.model)
            .field("criteria", &self.criteria)
            .field("ordering", &self.ordering)
            .finish()
    }
}
