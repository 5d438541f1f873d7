//! 融合规则 trait 定义
//!
//! 规则由名称、描述、模式、匹配条件和重写函数组成。
//! 规则是不可变配置，不持有任何可变状态。

use std::fmt;

use crate::planner::plan::PlanNode;
use crate::planner::rewrite::boundary::BoundaryClassifier;
use crate::planner::rewrite::pattern::Pattern;
use crate::planner::rewrite::result::RewriteResult;

/// 融合规则 trait
///
/// 驱动器先调用 `match_span` 确认片段，再把同一片段交给 `rewrite`。
/// `rewrite` 只会收到 `match_span` 已经验证过的片段。
///
/// # 示例
/// ```rust
/// use streamfuse::planner::plan::{NodeKind, PlanNode};
/// use streamfuse::planner::rewrite::{BoundaryClassifier, FusionRule, Pattern, RewriteError, RewriteResult};
///
/// #[derive(Debug)]
/// struct NeverRule;
///
/// impl FusionRule for NeverRule {
///     fn name(&self) -> &'static str { "NeverRule" }
///     fn description(&self) -> &'static str { "从不匹配" }
///     fn pattern(&self) -> Pattern { Pattern::new_with_kind(NodeKind::FlatMap) }
///     fn admits(&self, _: &BoundaryClassifier, _: &[PlanNode]) -> bool { false }
///     fn rewrite(&self, _: &[PlanNode]) -> RewriteResult<PlanNode> {
///         Err(RewriteError::rewrite_failed("NeverRule"))
///     }
/// }
/// ```
pub trait FusionRule: fmt::Debug + Send + Sync {
    /// 规则名称
    fn name(&self) -> &'static str;

    /// 规则说明
    fn description(&self) -> &'static str;

    /// 按节点种类匹配的模式
    fn pattern(&self) -> Pattern;

    /// 模式命中后的附加条件，例如纯度和融合边界
    fn admits(&self, classifier: &BoundaryClassifier, span: &[PlanNode]) -> bool;

    /// 生成替换整个片段的单个节点
    fn rewrite(&self, span: &[PlanNode]) -> RewriteResult<PlanNode>;

    /// 返回从 `window[0]` 起可被重写的片段长度
    fn match_span(&self, classifier: &BoundaryClassifier, window: &[PlanNode]) -> Option<usize> {
        let len = self.pattern().match_span(window)?;
        if self.admits(classifier, &window[..len]) {
            Some(len)
        } else {
            None
        }
    }

    fn matches(&self, classifier: &BoundaryClassifier, window: &[PlanNode]) -> bool {
        self.match_span(classifier, window).is_some()
    }
}

/// 合并规则 trait
///
/// 用于合并两个相邻节点的规则
pub trait MergeRule: FusionRule {
    /// 检查是否可以合并
    fn can_merge(&self, classifier: &BoundaryClassifier, first: &PlanNode, second: &PlanNode) -> bool;

    /// 创建合并后的节点
    fn create_merged_node(&self, first: &PlanNode, second: &PlanNode) -> RewriteResult<PlanNode>;
}
