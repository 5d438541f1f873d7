//! 合并两个连续 Map 的规则

use std::sync::Arc;

use crate::core::Value;
use crate::planner::plan::operator::MapFunc;
use crate::planner::plan::{MapFn, Operation, OperatorMeta, PlanNode};
use crate::planner::rewrite::boundary::BoundaryClassifier;
use crate::planner::rewrite::merge::{both_pure, shape_mismatch};
use crate::planner::rewrite::result::RewriteResult;
use crate::planner::rewrite::rule::MergeRule;

define_merge_rule! {
    /// 合并两个连续 Map 的规则
    ///
    /// # 转换示例
    ///
    /// Before:
    /// ```text
    ///   Map(x+1) -> Map(x*2)
    /// ```
    ///
    /// After:
    /// ```text
    ///   Map(x+1 >> x*2)
    /// ```
    ///
    /// # 适用条件
    ///
    /// - 两个节点都是 Map
    /// - 两个节点都是完全可融合的
    name: MapMapFusionRule,
    pattern: (Map, Map),
    description: "Map(f) → Map(g) 合并为 Map(g ∘ f)"
}

impl MergeRule for MapMapFusionRule {
    fn can_merge(&self, classifier: &BoundaryClassifier, first: &PlanNode, second: &PlanNode) -> bool {
        first.is_map() && second.is_map() && both_pure(classifier, first, second)
    }

    fn create_merged_node(&self, first: &PlanNode, second: &PlanNode) -> RewriteResult<PlanNode> {
        let (f, g) = match (first.op(), second.op()) {
            (Operation::Map(f), Operation::Map(g)) => (f, g),
            _ => return Err(shape_mismatch("MapMapFusionRule", first, second)),
        };

        let (fa, ga) = (Arc::clone(f.func()), Arc::clone(g.func()));
        let func: Arc<MapFunc> = Arc::new(move |x: &Value| ga(&fa(x)));
        let meta = OperatorMeta::fuse(f.meta(), g.meta(), " >> ");

        Ok(PlanNode::map(
            MapFn::from_parts(func, meta),
            first.purity().join(second.purity()),
        ))
    }
}
