//! 融合规则
//!
//! 合并相邻节点，减少阶段数和中间结果。
//! 所有规则都受 `can_fuse` 约束，外部效应节点永远不会被合并。

pub mod filter_filter;
pub mod filter_map;
pub mod filter_map_chain;
pub mod flat_map_map;
pub mod map_filter;
pub mod map_map;
pub mod pure_segment;
pub mod scan_map;
pub mod scan_scan;

#[cfg(test)]
pub(crate) mod fixtures;

pub use filter_filter::FilterFilterFusionRule;
pub use filter_map::FilterMapFusionRule;
pub use filter_map_chain::FilterMapChainFusionRule;
pub use flat_map_map::FlatMapMapFusionRule;
pub use map_filter::MapFilterFusionRule;
pub use map_map::MapMapFusionRule;
pub use pure_segment::PureSegmentFusionRule;
pub use scan_map::ScanMapFusionRule;
pub use scan_scan::ScanScanFusionRule;

use crate::planner::plan::PlanNode;
use crate::planner::rewrite::boundary::BoundaryClassifier;
use crate::planner::rewrite::result::RewriteError;

/// 两个节点都可融合且都是完全纯的
pub(crate) fn both_pure(classifier: &BoundaryClassifier, first: &PlanNode, second: &PlanNode) -> bool {
    classifier.can_fuse(first, second)
        && classifier.is_fully_fusable(first)
        && classifier.is_fully_fusable(second)
}

/// 节点种类与规则不符
pub(crate) fn shape_mismatch(rule: &str, first: &PlanNode, second: &PlanNode) -> RewriteError {
    RewriteError::unsupported_node_type(format!("{}: {} -> {}", rule, first.name(), second.name()))
}
