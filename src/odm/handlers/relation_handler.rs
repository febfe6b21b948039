//! # 关系操作处理器
//!
//! 正向外键、正向多对多、以及目标模型上的反向访问

use crate::error::{BridgeError, BridgeResult};
use crate::model::Record;
use crate::odm::runtime::OdmRuntime;
use crate::registry::{JoinTable, RelationType};
use crate::types::*;
use rat_logger::{debug, info};

/// 中间表的访问方向
struct LinkSide<'a> {
    join: &'a JoinTable,
    /// 当前记录所在列
    own_column: &'a str,
    /// 关联记录所在列
    other_column: &'a str,
    /// 关联记录的模型
    other_model: &'a str,
}

impl OdmRuntime {
    /// 为多对多关系添加关联，`name` 可以是正向字段名或反向访问名
    pub async fn add_related(&self, model: &str, name: &str, pk: &DataValue, targets: &[DataValue]) -> BridgeResult<()> {
        let side = self.link_side(model, name)?;
        let other_meta = self.model(side.other_model)?;
        let other_pk = other_meta.pk_name();

        for target in targets {
            let target = other_meta
                .field(other_pk)
                .map(|def| def.coerce_value(target.clone(), other_pk))
                .transpose()?
                .unwrap_or_else(|| target.clone());
            let (source, target) = if side.own_column == side.join.source_column {
                (pk, &target)
            } else {
                (&target, pk)
            };
            self.adapter.insert_link(&self.connection, side.join, source, target).await?;
        }
        info!("🔗 已为 {}.{} 添加 {} 条关联", model, name, targets.len());
        Ok(())
    }

    /// 读取关联记录
    ///
    /// 正向外键返回至多一条记录；其余关系返回全部关联记录，按主键升序
    pub async fn fetch_related(&self, model: &str, name: &str, pk: &DataValue) -> BridgeResult<Vec<Record>> {
        let meta = self.model(model)?;
        let pk_key = meta.pk_name().to_string();
        debug!("读取关联: {}.{} (pk={})", model, name, pk);

        let ordering = |target: &str| -> BridgeResult<QueryOptions> {
            let target_pk = self.model(target)?.pk_name().to_string();
            Ok(QueryOptions::new().with_sort(vec![SortConfig::parse(&target_pk)]))
        };

        if let Some(def) = meta.field(name).filter(|def| def.is_foreign_key()) {
            let target = def.field_type.target_model().unwrap_or_default();
            let source = self.find(model, &[(pk_key, pk.clone())], &QueryOptions::new().with_limit(1)).await?;
            let Some(value) = source.first().and_then(|record| record.get(name)).filter(|v| !v.is_null()) else {
                return Ok(Vec::new());
            };
            return self
                .find(target, &[("pk".to_string(), value.clone())], &QueryOptions::new().with_limit(1))
                .await;
        }

        if let Some(reverse) = self.schema.reverse_relation(model, name) {
            if reverse.kind == RelationType::ForeignKey {
                let source_model = reverse.model.clone();
                let options = ordering(&source_model)?;
                return self.find(&source_model, &[(reverse.field.clone(), pk.clone())], &options).await;
            }
        }

        let side = self.link_side(model, name)?;
        let linked = self
            .adapter
            .linked_values(&self.connection, side.join, side.own_column, pk, side.other_column)
            .await?;
        if linked.is_empty() {
            return Ok(Vec::new());
        }
        let options = ordering(side.other_model)?;
        self.find(side.other_model, &[("pk__in".to_string(), DataValue::Array(linked))], &options)
            .await
    }

    /// 定位多对多关系的中间表和访问方向
    fn link_side(&self, model: &str, name: &str) -> BridgeResult<LinkSide<'_>> {
        if let Some(join) = self.schema.join_table_for(model, name) {
            return Ok(LinkSide {
                join,
                own_column: &join.source_column,
                other_column: &join.target_column,
                other_model: &join.target_model,
            });
        }
        let reverse = self
            .schema
            .reverse_relation(model, name)
            .filter(|r| r.kind == RelationType::ManyToMany);
        if let Some(join) = reverse.and_then(|r| self.schema.join_table_for(&r.model, &r.field)) {
            return Ok(LinkSide {
                join,
                own_column: &join.target_column,
                other_column: &join.source_column,
                other_model: &join.source_model,
            });
        }
        Err(BridgeError::ValidationError {
            field: name.to_string(),
            message: format!("模型 {} 上没有名为 {} 的关系", model, name),
        })
    }
}
