//! 纯片段融合规则
//!
//! 把一段连续的纯 Map/Filter/FilterMap 节点折叠成单个节点。
//! 两两融合规则未覆盖的组合（如 Map → FilterMap）都由它处理。

use std::sync::Arc;

use crate::core::Value;
use crate::planner::plan::operator::{FilterMapFunc, MapFunc, PredicateFunc};
use crate::planner::plan::{
    FilterMapFn, MapFn, NodeKind, Operation, OperatorMeta, PlanNode, Predicate, Purity,
};
use crate::planner::rewrite::boundary::BoundaryClassifier;
use crate::planner::rewrite::pattern::{MatchNode, Pattern};
use crate::planner::rewrite::result::{RewriteError, RewriteResult};
use crate::planner::rewrite::rule::FusionRule;

/// 片段内的单步
#[derive(Clone)]
enum SegmentStep {
    Map(Arc<MapFunc>),
    Filter(Arc<PredicateFunc>),
    FilterMap(Arc<FilterMapFunc>),
}

impl SegmentStep {
    fn apply(&self, x: Value) -> Option<Value> {
        match self {
            SegmentStep::Map(f) => Some(f(&x)),
            SegmentStep::Filter(p) => p(&x).then_some(x),
            SegmentStep::FilterMap(f) => f(&x),
        }
    }
}

/// 纯片段融合规则
///
/// # 转换示例
///
/// Before:
/// ```text
///   Map(x+1) -> FilterMap(even/2) -> Filter(x<10)
/// ```
///
/// After:
/// ```text
///   FilterMap(x+1 >> even/2 >> x<10)
/// ```
///
/// 全部是 Map 时结果为 Map，全部是 Filter 时结果为 Filter，否则为 FilterMap。
#[derive(Debug)]
pub struct PureSegmentFusionRule;

impl PureSegmentFusionRule {
    /// 创建规则实例
    pub fn new() -> Self {
        Self
    }

    fn segment_kinds() -> MatchNode {
        MatchNode::Multi(vec![NodeKind::Map, NodeKind::Filter, NodeKind::FilterMap])
    }

    fn fuse_maps(span: &[PlanNode]) -> RewriteResult<Operation> {
        let mut funcs = Vec::with_capacity(span.len());
        let mut metas = Vec::with_capacity(span.len());
        for node in span {
            match node.op() {
                Operation::Map(f) => {
                    funcs.push(Arc::clone(f.func()));
                    metas.push(f.meta());
                }
                _ => return Err(RewriteError::unsupported_node_type(node.name())),
            }
        }
        let func: Arc<MapFunc> = Arc::new(move |x: &Value| {
            let mut current = x.clone();
            for f in &funcs {
                current = f(&current);
            }
            current
        });
        Ok(Operation::Map(MapFn::from_parts(func, OperatorMeta::fuse_all(metas, " >> "))))
    }

    fn fuse_filters(span: &[PlanNode]) -> RewriteResult<Operation> {
        let mut funcs = Vec::with_capacity(span.len());
        let mut metas = Vec::with_capacity(span.len());
        for node in span {
            match node.op() {
                Operation::Filter(p) => {
                    funcs.push(Arc::clone(p.func()));
                    metas.push(p.meta());
                }
                _ => return Err(RewriteError::unsupported_node_type(node.name())),
            }
        }
        let func: Arc<PredicateFunc> = Arc::new(move |x: &Value| funcs.iter().all(|p| p(x)));
        Ok(Operation::Filter(Predicate::from_parts(func, OperatorMeta::fuse_all(metas, " && "))))
    }

    fn fuse_mixed(span: &[PlanNode]) -> RewriteResult<Operation> {
        let mut steps = Vec::with_capacity(span.len());
        let mut metas = Vec::with_capacity(span.len());
        for node in span {
            match node.op() {
                Operation::Map(f) => {
                    steps.push(SegmentStep::Map(Arc::clone(f.func())));
                    metas.push(f.meta());
                }
                Operation::Filter(p) => {
                    steps.push(SegmentStep::Filter(Arc::clone(p.func())));
                    metas.push(p.meta());
                }
                Operation::FilterMap(f) => {
                    steps.push(SegmentStep::FilterMap(Arc::clone(f.func())));
                    metas.push(f.meta());
                }
                _ => return Err(RewriteError::unsupported_node_type(node.name())),
            }
        }
        let func: Arc<FilterMapFunc> = Arc::new(move |x: &Value| {
            steps
                .iter()
                .try_fold(x.clone(), |current, step| step.apply(current))
        });
        Ok(Operation::FilterMap(FilterMapFn::from_parts(
            func,
            OperatorMeta::fuse_all(metas, " >> "),
        )))
    }
}

impl Default for PureSegmentFusionRule {
    fn default() -> Self {
        Self::new()
    }
}

impl FusionRule for PureSegmentFusionRule {
    fn name(&self) -> &'static str {
        "PureSegmentFusionRule"
    }

    fn description(&self) -> &'static str {
        "连续 ≥2 个纯 Map/Filter/FilterMap 合并为单个节点"
    }

    fn pattern(&self) -> Pattern {
        Pattern::with_node(Self::segment_kinds())
            .then_node(Self::segment_kinds())
            .repeated()
    }

    fn admits(&self, classifier: &BoundaryClassifier, span: &[PlanNode]) -> bool {
        span.len() >= 2 && span.iter().all(|node| classifier.is_fully_fusable(node))
    }

    /// 模式按种类贪婪匹配，再截取最长的全纯前缀
    fn match_span(&self, classifier: &BoundaryClassifier, window: &[PlanNode]) -> Option<usize> {
        let kind_span = self.pattern().match_span(window)?;
        let pure_len = window[..kind_span]
            .iter()
            .take_while(|node| classifier.is_fully_fusable(node))
            .count();
        (pure_len >= 2).then_some(pure_len)
    }

    fn rewrite(&self, span: &[PlanNode]) -> RewriteResult<PlanNode> {
        if span.len() < 2 {
            return Err(RewriteError::invalid_plan_structure(format!(
                "PureSegmentFusionRule 需要至少 2 个节点，实际为 {}",
                span.len()
            )));
        }

        let purity = span
            .iter()
            .map(PlanNode::purity)
            .fold(Purity::Pure, Purity::join);

        let op = if span.iter().all(PlanNode::is_map) {
            Self::fuse_maps(span)?
        } else if span.iter().all(PlanNode::is_filter) {
            Self::fuse_filters(span)?
        } else {
            Self::fuse_mixed(span)?
        };
        Ok(PlanNode::new(op, purity))
    }
}
