//! # 异步ODM运行时模块
//!
//! 目标映射器的运行时：连接初始化、建表、记录读写和关系访问。
//! 按职责分离为查找解析和各类请求处理器

pub mod handlers;
pub mod lookup;
pub mod runtime;

pub use lookup::Criteria;
pub use runtime::OdmRuntime;
