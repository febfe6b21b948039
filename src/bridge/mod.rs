//! # 同步桥接模块
//!
//! 在非异步代码中把异步操作驱动到完成

use crate::error::{BridgeError, BridgeResult};
use crate::i18n::t;
use once_cell::sync::OnceCell;
use rat_logger::debug;
use std::future::Future;
use tokio::runtime::{Builder, Handle, Runtime, RuntimeFlavor};

/// 进程级共享运行时，首次在运行时之外阻塞调用时创建
///
/// 连接池及其后台任务绑定在这里，多次同步调用之间保持可用
static SHARED_RUNTIME: OnceCell<Runtime> = OnceCell::new();

fn shared_runtime() -> BridgeResult<&'static Runtime> {
    SHARED_RUNTIME.get_or_try_init(|| {
        debug!("创建同步桥接共享运行时");
        Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("rat-ormbridge")
            .enable_all()
            .build()
            .map_err(|e| BridgeError::ConnectionError {
                message: format!("创建运行时失败: {}", e),
            })
    })
}

/// 阻塞执行异步操作
///
/// - 当前线程没有运行时：在进程级共享运行时上执行
/// - 处于多线程运行时中：通过 `block_in_place` 重入调用方的运行时
/// - 处于单线程运行时中：无法重入，返回 `ReentrantBlocking`
///
/// 重入期间调用方运行时上的其他任务会继续被调度，调用方不能假设隔离
pub fn run_blocking<F>(future: F) -> BridgeResult<F::Output>
where
    F: Future,
{
    match Handle::try_current() {
        Err(_) => Ok(shared_runtime()?.block_on(future)),
        Ok(handle) => match handle.runtime_flavor() {
            RuntimeFlavor::CurrentThread => Err(BridgeError::ReentrantBlocking {
                message: t("error.reentrant_blocking"),
            }),
            _ => {
                debug!("在多线程运行时中重入执行");
                Ok(tokio::task::block_in_place(|| handle.block_on(future)))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_runtime() {
        let value = run_blocking(async { 40 + 2 }).unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_reentry_on_multi_thread_runtime() {
        let value = run_blocking(async {
            tokio::task::yield_now().await;
            "done"
        })
        .unwrap();
        assert_eq!(value, "done");
    }

    #[tokio::test]
    async fn test_current_thread_runtime_rejected() {
        let result = run_blocking(async { 1 });
        assert!(matches!(result, Err(BridgeError::ReentrantBlocking { .. })));
    }

    #[test]
    fn test_spawned_work_survives_between_calls() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        run_blocking(async move {
            tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                let _ = tx.send(7);
            });
        })
        .unwrap();
        assert_eq!(run_blocking(rx).unwrap().unwrap(), 7);
    }

    #[test]
    fn test_nested_inside_blocked_runtime() {
        let result = tokio_test::block_on(async { run_blocking(async { 1 }) });
        assert!(matches!(result, Err(BridgeError::ReentrantBlocking { .. })));
    }
}
