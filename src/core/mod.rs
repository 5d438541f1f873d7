//! 核心类型：数据值与统一错误

pub mod error;
pub mod value;

pub use error::{FuseError, FuseResult};
pub use value::Value;
