//! # 查询代理模块
//!
//! 每个模型一个轻量门面：构建方法只累积条件，终结操作才访问存储

mod manager;
mod query_set;

pub use manager::ObjectManager;
pub use query_set::QuerySet;

/// 构造查询条件
///
/// ```ignore
/// let criteria = criteria! { "text" => "Hello", "votes__gte" => 3 };
/// ```
#[macro_export]
macro_rules! criteria {
    () => {
        ::std::vec::Vec::<(::std::string::String, $crate::types::DataValue)>::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        ::std::vec![$((::std::string::String::from($key), $crate::types::DataValue::from($value))),+]
    };
}
