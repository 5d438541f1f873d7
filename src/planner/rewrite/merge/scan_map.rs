//! Scan 后接 Map 的融合规则

use std::sync::Arc;

use crate::core::Value;
use crate::planner::plan::operator::ScanFunc;
use crate::planner::plan::{Operation, OperatorMeta, PlanNode, ScanFn};
use crate::planner::rewrite::boundary::BoundaryClassifier;
use crate::planner::rewrite::merge::shape_mismatch;
use crate::planner::rewrite::result::RewriteResult;
use crate::planner::rewrite::rule::MergeRule;

define_merge_rule! {
    /// Scan 后接 Map 的融合规则
    ///
    /// 把纯变换推入状态转移函数，Scan 的输出直接就是映射后的值。
    ///
    /// # 转换示例
    ///
    /// Before:
    /// ```text
    ///   Scan((s,x) ↦ (s+x, s+x)) -> Map(y ↦ y.to_string())
    /// ```
    ///
    /// After:
    /// ```text
    ///   Scan((s,x) ↦ let (s',y) = ... in (s', y.to_string()))
    /// ```
    ///
    /// # 适用条件
    ///
    /// - Scan 最多是 Staged
    /// - Map 是完全可融合的
    name: ScanMapFusionRule,
    pattern: (Scan, Map),
    description: "Scan(s) → Map(f) 合并为输出已映射的 Scan"
}

impl MergeRule for ScanMapFusionRule {
    fn can_merge(&self, classifier: &BoundaryClassifier, first: &PlanNode, second: &PlanNode) -> bool {
        first.is_scan()
            && second.is_map()
            && classifier.can_fuse(first, second)
            && classifier.is_fully_fusable(second)
    }

    fn create_merged_node(&self, first: &PlanNode, second: &PlanNode) -> RewriteResult<PlanNode> {
        let (init, step, f) = match (first.op(), second.op()) {
            (Operation::Scan { init, step }, Operation::Map(f)) => (init, step, f),
            _ => return Err(shape_mismatch("ScanMapFusionRule", first, second)),
        };

        let (sa, fa) = (Arc::clone(step.func()), Arc::clone(f.func()));
        let func: Arc<ScanFunc> = Arc::new(move |state: &Value, x: &Value| {
            let (next, y) = sa(state, x);
            (next, fa(&y))
        });
        let meta = OperatorMeta::fuse(step.meta(), f.meta(), " >> ");

        Ok(PlanNode::scan(
            init.clone(),
            ScanFn::from_parts(func, meta),
            first.purity().join(second.purity()),
        ))
    }
}
