//! # 请求处理器模块

pub mod create_handler;
pub mod read_handler;
pub mod relation_handler;
