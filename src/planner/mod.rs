//! 流水线计划与优化
//!
//! - `plan`: 计划节点模型与参考求值器
//! - `rewrite`: 融合规则与重写驱动

pub mod plan;
pub mod rewrite;
