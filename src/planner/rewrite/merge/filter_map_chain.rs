//! 合并两个连续 FilterMap 的规则

use std::sync::Arc;

use crate::core::Value;
use crate::planner::plan::operator::FilterMapFunc;
use crate::planner::plan::{FilterMapFn, Operation, OperatorMeta, PlanNode};
use crate::planner::rewrite::boundary::BoundaryClassifier;
use crate::planner::rewrite::merge::{both_pure, shape_mismatch};
use crate::planner::rewrite::result::RewriteResult;
use crate::planner::rewrite::rule::MergeRule;

define_merge_rule! {
    /// 合并两个连续 FilterMap 的规则
    ///
    /// 第一个算子丢弃元素时，第二个算子不会被调用。
    name: FilterMapChainFusionRule,
    pattern: (FilterMap, FilterMap),
    description: "FilterMap(f) → FilterMap(g) 合并为 FilterMap(x ↦ f(x).and_then(g))"
}

impl MergeRule for FilterMapChainFusionRule {
    fn can_merge(&self, classifier: &BoundaryClassifier, first: &PlanNode, second: &PlanNode) -> bool {
        matches!(
            (first.op(), second.op()),
            (Operation::FilterMap(_), Operation::FilterMap(_))
        ) && both_pure(classifier, first, second)
    }

    fn create_merged_node(&self, first: &PlanNode, second: &PlanNode) -> RewriteResult<PlanNode> {
        let (f, g) = match (first.op(), second.op()) {
            (Operation::FilterMap(f), Operation::FilterMap(g)) => (f, g),
            _ => return Err(shape_mismatch("FilterMapChainFusionRule", first, second)),
        };

        let (fa, ga) = (Arc::clone(f.func()), Arc::clone(g.func()));
        let func: Arc<FilterMapFunc> = Arc::new(move |x: &Value| fa(x).and_then(|y| ga(&y)));
        let meta = OperatorMeta::fuse(f.meta(), g.meta(), " >> ");

        Ok(PlanNode::filter_map(
            FilterMapFn::from_parts(func, meta),
            first.purity().join(second.purity()),
        ))
    }
}
