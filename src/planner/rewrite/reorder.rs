//! 基于纯度的重排序分析
//!
//! 判断两个相邻阶段之间是否存在状态或效应依赖。
//! 这里只回答"能否交换而不影响状态与效应"，值上的依赖（`g ∘ f` 与 `f ∘ g`）
//! 不在判断范围内，因此重写器不会据此自动交换节点。

use crate::planner::plan::{NodeKind, Plan, PlanNode};
use crate::planner::rewrite::boundary::BoundaryClassifier;

/// 可参与重排序的节点种类
fn is_stateless_stage(node: &PlanNode) -> bool {
    matches!(node.kind(), NodeKind::Map | NodeKind::Filter | NodeKind::FilterMap)
}

/// 两个阶段之间是否没有状态或效应依赖
///
/// Scan、外部效应节点、FlatMap 以及分支节点一律视为有依赖。
pub fn independent(a: &PlanNode, b: &PlanNode) -> bool {
    independent_with(&BoundaryClassifier::default(), a, b)
}

/// 使用指定分类器判断独立性
pub fn independent_with(classifier: &BoundaryClassifier, a: &PlanNode, b: &PlanNode) -> bool {
    is_stateless_stage(a)
        && is_stateless_stage(b)
        && classifier.is_fully_fusable(a)
        && classifier.is_fully_fusable(b)
}

/// 相邻且相互独立的位置 `i`（即 `plan[i]` 与 `plan[i + 1]`）
pub fn independent_pairs(plan: &Plan) -> Vec<usize> {
    let classifier = BoundaryClassifier::default();
    plan.windows(2)
        .enumerate()
        .filter(|(_, pair)| independent_with(&classifier, &pair[0], &pair[1]))
        .map(|(i, _)| i)
        .collect()
}
