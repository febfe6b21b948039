//! SQLite适配器核心结构

use rat_logger::debug;
use tokio::sync::{Mutex, MutexGuard};

/// SQLite适配器
#[derive(Default)]
pub struct SqliteAdapter {
    /// 建表锁，串行执行DDL
    creation_lock: Mutex<()>,
}

impl SqliteAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取建表锁，守卫释放时解除
    pub(crate) async fn acquire_table_lock(&self, table: &str) -> MutexGuard<'_, ()> {
        let guard = self.creation_lock.lock().await;
        debug!("🔒 获取表 {} 的创建锁", table);
        guard
    }
}
