//! 合并两个连续 Scan 的规则

use std::sync::Arc;

use crate::core::Value;
use crate::planner::plan::operator::ScanFunc;
use crate::planner::plan::{Operation, OperatorMeta, PlanNode, ScanFn};
use crate::planner::rewrite::boundary::BoundaryClassifier;
use crate::planner::rewrite::merge::shape_mismatch;
use crate::planner::rewrite::result::RewriteResult;
use crate::planner::rewrite::rule::MergeRule;

define_merge_rule! {
    /// 合并两个连续 Scan 的规则
    ///
    /// 融合后的状态是二元组 `[s1, s2]`。每个元素先经过第一个状态转移，
    /// 其输出再送入第二个状态转移，两个状态按原顺序推进。
    name: ScanScanFusionRule,
    pattern: (Scan, Scan),
    description: "Scan(s1) → Scan(s2) 合并为顺序组合两个状态转移的 Scan"
}

impl MergeRule for ScanScanFusionRule {
    fn can_merge(&self, classifier: &BoundaryClassifier, first: &PlanNode, second: &PlanNode) -> bool {
        first.is_scan() && second.is_scan() && classifier.can_fuse(first, second)
    }

    fn create_merged_node(&self, first: &PlanNode, second: &PlanNode) -> RewriteResult<PlanNode> {
        let ((init1, step1), (init2, step2)) = match (first.op(), second.op()) {
            (
                Operation::Scan { init: i1, step: s1 },
                Operation::Scan { init: i2, step: s2 },
            ) => ((i1, s1), (i2, s2)),
            _ => return Err(shape_mismatch("ScanScanFusionRule", first, second)),
        };

        let (s1, s2) = (Arc::clone(step1.func()), Arc::clone(step2.func()));
        let func: Arc<ScanFunc> = Arc::new(move |state: &Value, x: &Value| {
            let (a, b) = state.clone().into_pair();
            let (a_next, y) = s1(&a, x);
            let (b_next, z) = s2(&b, &y);
            (Value::pair(a_next, b_next), z)
        });
        let meta = OperatorMeta::fuse(step1.meta(), step2.meta(), " ; ");

        Ok(PlanNode::scan(
            Value::pair(init1.clone(), init2.clone()),
            ScanFn::from_parts(func, meta),
            first.purity().join(second.purity()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::plan::{NodeKind, Plan, PlanRunner, Purity};
    use crate::planner::rewrite::merge::fixtures::*;
    use crate::planner::rewrite::rule::FusionRule;

    #[test]
    fn test_sequential_state_threading() {
        let span = [running_sum(), indexed()];
        let fused = ScanScanFusionRule::new().rewrite(&span).expect("应用规则失败");
        assert_eq!(fused.kind(), NodeKind::Scan);
        assert_eq!(fused.purity(), Purity::Stateful);

        let inputs = ints(&[5, 1, 4]);
        let mut original = PlanRunner::new(&Plan::from(span.to_vec()));
        let mut optimized = PlanRunner::new(&Plan::from(vec![fused]));
        assert_eq!(optimized.run(inputs.clone()), original.run(inputs));

        let original_states = original.states();
        let fused_state = optimized.states().remove(0).into_pair();
        assert_eq!(original_states, vec![fused_state.0, fused_state.1]);
        assert_eq!(original_states, ints(&[10, 3]));
    }

    #[test]
    fn test_opaque_scan_not_merged() {
        let classifier = BoundaryClassifier::default();
        let rule = ScanScanFusionRule::new();
        assert!(rule.matches(&classifier, &[running_sum(), running_sum()]));
        assert!(!rule.matches(&classifier, &[running_sum(), with_purity(running_sum(), Purity::Async)]));
    }

    #[test]
    fn test_purity_join() {
        let fused = ScanScanFusionRule::new()
            .rewrite(&[with_purity(running_sum(), Purity::Pure), running_sum()])
            .expect("应用规则失败");
        assert_eq!(fused.purity(), Purity::Stateful);
    }
}
