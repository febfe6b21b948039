//! # ODM运行时核心实现

use crate::adapter::{create_adapter, DatabaseAdapter, Row};
use crate::error::BridgeResult;
use crate::model::{ModelMeta, Record};
use crate::pool::{self, DatabaseConnection};
use crate::registry::Schema;
use crate::types::ConnectionConfig;
use rat_logger::{debug, info};
use std::sync::Arc;

/// 异步ODM运行时
///
/// 持有只读模式和数据库连接，代理层的所有终结操作都经过这里
pub struct OdmRuntime {
    pub(crate) schema: Arc<Schema>,
    pub(crate) connection: DatabaseConnection,
    pub(crate) adapter: Box<dyn DatabaseAdapter>,
    db_url: String,
}

impl OdmRuntime {
    /// 按数据库URL初始化运行时
    pub async fn init(db_url: &str, schema: Arc<Schema>) -> BridgeResult<Self> {
        let config = ConnectionConfig::from_url(db_url)?;
        let adapter = create_adapter(&config.db_type())?;
        let connection = pool::connect(&config).await?;
        info!(
            "ODM运行时初始化完成: url={}, 命名空间={}, 模型数量={}",
            db_url,
            schema.namespace(),
            schema.models().count()
        );
        Ok(Self {
            schema,
            connection,
            adapter,
            db_url: db_url.to_string(),
        })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn db_url(&self) -> &str {
        &self.db_url
    }

    /// 为所有模型和多对多中间表建表
    ///
    /// `safe` 为真时使用 `IF NOT EXISTS`，从不删除已有结构
    pub async fn generate_schemas(&self, safe: bool) -> BridgeResult<()> {
        for model in self.schema.models() {
            self.adapter
                .create_table(&self.connection, &model.meta, &self.schema, safe)
                .await?;
        }
        for join in self.schema.join_tables() {
            self.adapter
                .create_join_table(&self.connection, join, &self.schema, safe)
                .await?;
        }
        info!("模式生成完成 (safe={})", safe);
        Ok(())
    }

    /// 检查模型的表是否已存在
    pub async fn table_exists(&self, model: &str) -> BridgeResult<bool> {
        let meta = self.schema.model(model)?;
        self.adapter.table_exists(&self.connection, &meta.table).await
    }

    /// 数据库版本
    pub async fn server_version(&self) -> BridgeResult<String> {
        self.adapter.get_server_version(&self.connection).await
    }

    /// 关闭连接
    pub async fn close_connections(&self) {
        self.connection.close().await;
        info!("数据库连接已关闭: {}", self.db_url);
    }

    pub fn is_closed(&self) -> bool {
        self.connection.is_closed()
    }

    pub(crate) fn model(&self, name: &str) -> BridgeResult<&ModelMeta> {
        self.schema.model(name)
    }

    pub(crate) fn to_record(meta: &ModelMeta, row: Row) -> Record {
        debug!("构造记录: 模型={}, 列数={}", meta.name, row.len());
        Record::new(&meta.name, meta.pk_name(), row)
    }
}

impl std::fmt::Debug for OdmRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OdmRuntime")
            .field("db_url", &self.db_url)
            .field("namespace", &self.schema.namespace())
            .field("closed", &self.is_closed())
            .finish()
    }
}
