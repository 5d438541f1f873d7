//! 计划重写模块
//!
//! 基于纯度的融合规则与不动点重写驱动。所有规则都是语义保持的，
//! 外部效应节点在任何规则下都不会被合并或移动。
//!
//! # 模块结构
//!
//! - `boundary`: 融合边界分类与静态效应检查
//! - `pattern`: 按节点种类匹配的模式
//! - `context`: 单次优化的步数预算与轨迹
//! - `result`: 重写错误与轨迹记录
//! - `rule`: 融合规则 trait 定义
//! - `macros`: 两节点融合规则宏
//! - `merge`: 具体融合规则
//! - `rule_enum`: 静态分发规则枚举与注册表
//! - `plan_rewriter`: 不动点重写驱动
//! - `reorder`: 相邻阶段独立性分析
//!
//! # 使用示例
//!
//! ```rust
//! use streamfuse::core::Value;
//! use streamfuse::planner::plan::{MapFn, Plan, PlanNode, Purity};
//! use streamfuse::planner::rewrite::{optimize, DEFAULT_MAX_DEPTH};
//!
//! let inc = PlanNode::map(MapFn::new("x+1", |x| Value::Int(x.as_int().unwrap_or(0) + 1)), Purity::Pure);
//! let plan = Plan::new().then(inc.clone()).then(inc);
//! let optimized = optimize(&plan, DEFAULT_MAX_DEPTH);
//! assert_eq!(optimized.len(), 1);
//! ```

#[macro_use]
mod macros;

pub mod boundary;
pub mod context;
pub mod merge;
pub mod pattern;
pub mod plan_rewriter;
pub mod reorder;
pub mod result;
pub mod rule;
pub mod rule_enum;

/// 默认的最大重写步数
pub const DEFAULT_MAX_DEPTH: usize = 100;

pub use boundary::{can_fuse, classify, Boundary, BoundaryClassifier, EffectInspector};
pub use context::RewriteContext;
pub use pattern::{MatchNode, Pattern};
pub use plan_rewriter::{can_optimize, optimize, OptimizationReport, OptimizedPlan, PlanRewriter};
pub use reorder::{independent, independent_pairs};
pub use result::{RewriteError, RewriteResult, RuleTrace};
pub use rule::{FusionRule, MergeRule};
pub use rule_enum::{FusionRuleEnum, RuleRegistry};

pub use merge::{
    FilterFilterFusionRule, FilterMapChainFusionRule, FilterMapFusionRule, FlatMapMapFusionRule,
    MapFilterFusionRule, MapMapFusionRule, PureSegmentFusionRule, ScanMapFusionRule,
    ScanScanFusionRule,
};
