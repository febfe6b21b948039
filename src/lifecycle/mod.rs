//! # 生命周期包装模块
//!
//! 处理进程的启动/关闭事件：启动时完成激活后才回报就绪，
//! 关闭时先关闭连接再回报完成，其他事件原样透传

use crate::activation::{activate_async, Activation};
use crate::config::BridgeConfig;
use crate::i18n::tf;
use crate::source::ModelCatalog;
use rat_logger::{error, info};
use std::sync::Arc;
use tokio::sync::mpsc;

/// 生命周期事件，`Other` 携带与本模块无关的事件
#[derive(Debug, Clone, PartialEq)]
pub enum LifespanEvent<T> {
    Startup,
    Shutdown,
    Other(T),
}

/// 事件处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch<T> {
    StartupComplete,
    StartupFailed { message: String },
    ShutdownComplete,
    PassThrough(T),
}

/// 生命周期包装器
pub struct LifespanWrapper {
    catalog: Arc<ModelCatalog>,
    config: BridgeConfig,
    activation: Option<Activation>,
}

impl LifespanWrapper {
    pub fn new(catalog: Arc<ModelCatalog>, config: BridgeConfig) -> Self {
        Self {
            catalog,
            config,
            activation: None,
        }
    }

    /// 启动成功后的激活句柄
    pub fn activation(&self) -> Option<&Activation> {
        self.activation.as_ref()
    }

    /// 处理单个事件
    pub async fn dispatch<T>(&mut self, event: LifespanEvent<T>) -> Dispatch<T> {
        match event {
            LifespanEvent::Startup => {
                let db_url = self.config.default_db_url().to_string();
                info!("🚀 生命周期启动: {}", db_url);
                match activate_async(&self.catalog, &db_url, self.config.generate_schemas).await {
                    Ok(activation) => {
                        self.activation = Some(activation);
                        Dispatch::StartupComplete
                    }
                    Err(e) => {
                        let message = tf("error.lifespan_startup", &[("message", &e.to_string())]);
                        error!("{}", message);
                        Dispatch::StartupFailed { message }
                    }
                }
            }
            LifespanEvent::Shutdown => {
                if let Some(activation) = self.activation.take() {
                    activation.shutdown().await;
                }
                info!("生命周期关闭完成");
                Dispatch::ShutdownComplete
            }
            LifespanEvent::Other(payload) => Dispatch::PassThrough(payload),
        }
    }

    /// 循环处理事件，处理完关闭事件或输入端关闭后返回
    pub async fn serve<T>(mut self, mut receiver: mpsc::Receiver<LifespanEvent<T>>, sender: mpsc::Sender<Dispatch<T>>) {
        while let Some(event) = receiver.recv().await {
            let is_shutdown = matches!(event, LifespanEvent::Shutdown);
            let dispatch = self.dispatch(event).await;
            if sender.send(dispatch).await.is_err() {
                break;
            }
            if is_shutdown {
                return;
            }
        }
        if let Some(activation) = self.activation.take() {
            activation.shutdown().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogLevel, LoggingConfig};
    use crate::source::{SourceField, SourceModel};

    fn config(db_url: &str) -> BridgeConfig {
        BridgeConfig::builder()
            .connection("default", db_url)
            .generate_schemas(true)
            .logging(LoggingConfig {
                level: LogLevel::Info,
                console: false,
            })
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_other_events_pass_through() {
        let mut wrapper = LifespanWrapper::new(Arc::new(ModelCatalog::new()), config("sqlite://:memory:"));
        let result = wrapper.dispatch(LifespanEvent::Other("http.request")).await;
        assert_eq!(result, Dispatch::PassThrough("http.request"));
        assert!(wrapper.activation().is_none());
    }

    #[tokio::test]
    async fn test_serve_startup_then_shutdown() {
        let mut catalog = ModelCatalog::new();
        let note = catalog.register(SourceModel::new("notes", "Note").field(SourceField::text("body")));
        let wrapper = LifespanWrapper::new(Arc::new(catalog), config("sqlite://:memory:"));

        let (event_tx, event_rx) = mpsc::channel(4);
        let (reply_tx, mut reply_rx) = mpsc::channel(4);
        let server = tokio::spawn(wrapper.serve::<u32>(event_rx, reply_tx));

        event_tx.send(LifespanEvent::Startup).await.unwrap();
        assert_eq!(reply_rx.recv().await, Some(Dispatch::StartupComplete));
        assert!(note.is_patched());

        event_tx.send(LifespanEvent::Other(7)).await.unwrap();
        assert_eq!(reply_rx.recv().await, Some(Dispatch::PassThrough(7)));

        event_tx.send(LifespanEvent::Shutdown).await.unwrap();
        assert_eq!(reply_rx.recv().await, Some(Dispatch::ShutdownComplete));
        server.await.unwrap();
    }
}
