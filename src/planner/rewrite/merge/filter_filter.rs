//! 合并两个连续 Filter 的规则

use std::sync::Arc;

use crate::core::Value;
use crate::planner::plan::operator::PredicateFunc;
use crate::planner::plan::{Operation, OperatorMeta, PlanNode, Predicate};
use crate::planner::rewrite::boundary::BoundaryClassifier;
use crate::planner::rewrite::merge::{both_pure, shape_mismatch};
use crate::planner::rewrite::result::RewriteResult;
use crate::planner::rewrite::rule::MergeRule;

define_merge_rule! {
    /// 合并两个连续 Filter 的规则
    ///
    /// # 转换示例
    ///
    /// Before:
    /// ```text
    ///   Filter(x>0) -> Filter(x<100)
    /// ```
    ///
    /// After:
    /// ```text
    ///   Filter(x>0 && x<100)
    /// ```
    ///
    /// 第一个谓词为假时不再求值第二个谓词。
    name: FilterFilterFusionRule,
    pattern: (Filter, Filter),
    description: "Filter(p) → Filter(q) 合并为 Filter(p ∧ q)"
}

impl MergeRule for FilterFilterFusionRule {
    fn can_merge(&self, classifier: &BoundaryClassifier, first: &PlanNode, second: &PlanNode) -> bool {
        first.is_filter() && second.is_filter() && both_pure(classifier, first, second)
    }

    fn create_merged_node(&self, first: &PlanNode, second: &PlanNode) -> RewriteResult<PlanNode> {
        let (p, q) = match (first.op(), second.op()) {
            (Operation::Filter(p), Operation::Filter(q)) => (p, q),
            _ => return Err(shape_mismatch("FilterFilterFusionRule", first, second)),
        };

        let (pa, qa) = (Arc::clone(p.func()), Arc::clone(q.func()));
        let func: Arc<PredicateFunc> = Arc::new(move |x: &Value| pa(x) && qa(x));
        let meta = OperatorMeta::fuse(p.meta(), q.meta(), " && ");

        Ok(PlanNode::filter(
            Predicate::from_parts(func, meta),
            first.purity().join(second.purity()),
        ))
    }
}
