//! StreamFuse - a purity-aware fusion optimizer for stream pipelines
//!
//! A pipeline is an immutable chain of stages (`Map`, `Filter`, `FilterMap`,
//! `Scan`, `FlatMap`, `Compose`, `Parallel`), each tagged with a declared purity.
//! The optimizer rewrites adjacent stages into fewer, fused stages while never
//! merging or moving a stage that performs an external effect.
//!
//! ```rust
//! use streamfuse::core::Value;
//! use streamfuse::planner::plan::{run_plan, MapFn, Plan, PlanNode, Predicate, Purity};
//! use streamfuse::optimize;
//!
//! let int = |x: &Value| x.as_int().unwrap_or(0);
//! let plan = Plan::new()
//!     .then(PlanNode::filter(Predicate::new("x>0", move |x| int(x) > 0), Purity::Pure))
//!     .then(PlanNode::map(MapFn::new("x*2", move |x| Value::Int(int(x) * 2)), Purity::Pure));
//!
//! let optimized = optimize(&plan, 100);
//! assert_eq!(optimized.len(), 1);
//! assert_eq!(
//!     run_plan(&optimized, vec![Value::Int(-1), Value::Int(3)]),
//!     vec![Value::Int(6)]
//! );
//! ```

pub mod config;
pub mod core;
pub mod planner;
pub mod utils;

pub use crate::config::{Config, LogConfig, OptimizerConfig};
pub use crate::core::{FuseError, FuseResult, Value};
pub use crate::planner::plan::{Plan, PlanNode, Purity};
pub use crate::planner::rewrite::{
    can_fuse, can_optimize, classify, independent, optimize, Boundary, OptimizedPlan,
    PlanRewriter,
};
