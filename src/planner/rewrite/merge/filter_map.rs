//! Filter 后接 Map 的融合规则

use std::sync::Arc;

use crate::core::Value;
use crate::planner::plan::operator::FilterMapFunc;
use crate::planner::plan::{FilterMapFn, Operation, OperatorMeta, PlanNode};
use crate::planner::rewrite::boundary::BoundaryClassifier;
use crate::planner::rewrite::merge::{both_pure, shape_mismatch};
use crate::planner::rewrite::result::RewriteResult;
use crate::planner::rewrite::rule::MergeRule;

define_merge_rule! {
    /// Filter 后接 Map 的融合规则
    ///
    /// # 转换示例
    ///
    /// Before:
    /// ```text
    ///   Filter(x>0) -> Map(x*2)
    /// ```
    ///
    /// After:
    /// ```text
    ///   FilterMap(x>0 ?> x*2)
    /// ```
    name: FilterMapFusionRule,
    pattern: (Filter, Map),
    description: "Filter(p) → Map(f) 合并为 FilterMap(x ↦ p(x) ? f(x) : ∅)"
}

impl MergeRule for FilterMapFusionRule {
    fn can_merge(&self, classifier: &BoundaryClassifier, first: &PlanNode, second: &PlanNode) -> bool {
        first.is_filter() && second.is_map() && both_pure(classifier, first, second)
    }

    fn create_merged_node(&self, first: &PlanNode, second: &PlanNode) -> RewriteResult<PlanNode> {
        let (p, f) = match (first.op(), second.op()) {
            (Operation::Filter(p), Operation::Map(f)) => (p, f),
            _ => return Err(shape_mismatch("FilterMapFusionRule", first, second)),
        };

        let (pa, fa) = (Arc::clone(p.func()), Arc::clone(f.func()));
        let func: Arc<FilterMapFunc> = Arc::new(move |x: &Value| if pa(x) { Some(fa(x)) } else { None });
        let meta = OperatorMeta::fuse(p.meta(), f.meta(), " ?> ");

        Ok(PlanNode::filter_map(
            FilterMapFn::from_parts(func, meta),
            first.purity().join(second.purity()),
        ))
    }
}
