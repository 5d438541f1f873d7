//! 计划节点模型
//!
//! - `operator`: 算子（共享闭包 + 描述信息）
//! - `node`: 计划节点、节点种类与纯度
//! - `chain`: 不可变的节点序列
//! - `eval`: 参考求值器

pub mod chain;
pub mod eval;
pub mod node;
pub mod operator;

pub use chain::{NodeDescription, Plan};
pub use eval::{run_plan, PlanRunner};
pub use node::{NodeKind, Operation, PlanNode, Purity};
pub use operator::{FilterMapFn, FlatMapFn, MapFn, Operator, OperatorMeta, Predicate, ScanFn};
