//! FlatMap 后接 Map 的融合规则

use std::sync::Arc;

use crate::core::Value;
use crate::planner::plan::operator::FlatMapFunc;
use crate::planner::plan::{FlatMapFn, Operation, OperatorMeta, PlanNode};
use crate::planner::rewrite::boundary::BoundaryClassifier;
use crate::planner::rewrite::merge::{both_pure, shape_mismatch};
use crate::planner::rewrite::result::RewriteResult;
use crate::planner::rewrite::rule::MergeRule;

define_merge_rule! {
    /// FlatMap 后接 Map 的融合规则
    ///
    /// 把纯变换作用到每个子流元素上，省去一个阶段。
    name: FlatMapMapFusionRule,
    pattern: (FlatMap, Map),
    description: "FlatMap(f) → Map(g) 合并为 FlatMap(x ↦ f(x).map(g))"
}

impl MergeRule for FlatMapMapFusionRule {
    fn can_merge(&self, classifier: &BoundaryClassifier, first: &PlanNode, second: &PlanNode) -> bool {
        matches!(first.op(), Operation::FlatMap(_))
            && second.is_map()
            && both_pure(classifier, first, second)
    }

    fn create_merged_node(&self, first: &PlanNode, second: &PlanNode) -> RewriteResult<PlanNode> {
        let (f, g) = match (first.op(), second.op()) {
            (Operation::FlatMap(f), Operation::Map(g)) => (f, g),
            _ => return Err(shape_mismatch("FlatMapMapFusionRule", first, second)),
        };

        let (fa, ga) = (Arc::clone(f.func()), Arc::clone(g.func()));
        let func: Arc<FlatMapFunc> =
            Arc::new(move |x: &Value| -> Vec<Value> { fa(x).iter().map(|y| ga(y)).collect() });
        let meta = OperatorMeta::fuse(f.meta(), g.meta(), " >> ");

        Ok(PlanNode::flat_map(
            FlatMapFn::from_parts(func, meta),
            first.purity().join(second.purity()),
        ))
    }
}
