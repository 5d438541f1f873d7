//! Map 后接 Filter 的融合规则

use std::sync::Arc;

use crate::core::Value;
use crate::planner::plan::operator::FilterMapFunc;
use crate::planner::plan::{FilterMapFn, Operation, OperatorMeta, PlanNode};
use crate::planner::rewrite::boundary::BoundaryClassifier;
use crate::planner::rewrite::merge::{both_pure, shape_mismatch};
use crate::planner::rewrite::result::RewriteResult;
use crate::planner::rewrite::rule::MergeRule;

define_merge_rule! {
    /// Map 后接 Filter 的融合规则
    ///
    /// # 转换示例
    ///
    /// Before:
    /// ```text
    ///   Map(x*2) -> Filter(x<100)
    /// ```
    ///
    /// After:
    /// ```text
    ///   FilterMap(x*2 ?> x<100)
    /// ```
    ///
    /// 变换只求值一次，谓词作用在变换结果上。
    name: MapFilterFusionRule,
    pattern: (Map, Filter),
    description: "Map(f) → Filter(p) 合并为 FilterMap(x ↦ p(f(x)) ? f(x) : ∅)"
}

impl MergeRule for MapFilterFusionRule {
    fn can_merge(&self, classifier: &BoundaryClassifier, first: &PlanNode, second: &PlanNode) -> bool {
        first.is_map() && second.is_filter() && both_pure(classifier, first, second)
    }

    fn create_merged_node(&self, first: &PlanNode, second: &PlanNode) -> RewriteResult<PlanNode> {
        let (f, p) = match (first.op(), second.op()) {
            (Operation::Map(f), Operation::Filter(p)) => (f, p),
            _ => return Err(shape_mismatch("MapFilterFusionRule", first, second)),
        };

        let (fa, pa) = (Arc::clone(f.func()), Arc::clone(p.func()));
        let func: Arc<FilterMapFunc> = Arc::new(move |x: &Value| {
            let y = fa(x);
            if pa(&y) {
                Some(y)
            } else {
                None
            }
        });
        let meta = OperatorMeta::fuse(f.meta(), p.meta(), " ?> ");

        Ok(PlanNode::filter_map(
            FilterMapFn::from_parts(func, meta),
            first.purity().join(second.purity()),
        ))
    }
}
