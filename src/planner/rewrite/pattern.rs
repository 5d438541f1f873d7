//! 模式匹配定义
//!
//! 模式只按节点种类匹配从当前位置开始的一段相邻节点。
//! 纯度和边界等条件由规则自己检查。

use crate::planner::plan::{NodeKind, PlanNode};

/// 单个位置的匹配条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchNode {
    Single(NodeKind),
    Multi(Vec<NodeKind>),
}

impl MatchNode {
    pub fn matches(&self, kind: NodeKind) -> bool {
        match self {
            MatchNode::Single(k) => *k == kind,
            MatchNode::Multi(kinds) => kinds.contains(&kind),
        }
    }
}

/// 相邻节点模式
///
/// `repeat_last` 为真时最后一个条件可以贪婪地重复匹配，
/// 模式长度即为最短匹配长度。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    steps: Vec<MatchNode>,
    repeat_last: bool,
}

impl Pattern {
    /// 创建空模式（不匹配任何片段）
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(node: MatchNode) -> Self {
        Self {
            steps: vec![node],
            repeat_last: false,
        }
    }

    pub fn new_with_kind(kind: NodeKind) -> Self {
        Self::with_node(MatchNode::Single(kind))
    }

    /// 两个相邻节点的模式
    pub fn pair(first: NodeKind, second: NodeKind) -> Self {
        Self::new_with_kind(first).then(second)
    }

    pub fn then(self, kind: NodeKind) -> Self {
        self.then_node(MatchNode::Single(kind))
    }

    pub fn then_node(mut self, node: MatchNode) -> Self {
        self.steps.push(node);
        self
    }

    /// 最后一个条件可重复匹配
    pub fn repeated(mut self) -> Self {
        self.repeat_last = true;
        self
    }

    /// 从 `window[0]` 开始匹配，返回匹配到的片段长度
    pub fn match_span(&self, window: &[PlanNode]) -> Option<usize> {
        let last = self.steps.last()?;
        if window.len() < self.steps.len() {
            return None;
        }

        let heads_match = self
            .steps
            .iter()
            .zip(window)
            .all(|(step, node)| step.matches(node.kind()));
        if !heads_match {
            return None;
        }

        let mut len = self.steps.len();
        if self.repeat_last {
            while len < window.len() && last.matches(window[len].kind()) {
                len += 1;
            }
        }
        Some(len)
    }

    pub fn matches(&self, window: &[PlanNode]) -> bool {
        self.match_span(window).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::plan::{MapFn, Predicate, Purity};

    fn map() -> PlanNode {
        PlanNode::map(MapFn::new("f", |x| x.clone()), Purity::Pure)
    }

    fn filter() -> PlanNode {
        PlanNode::filter(Predicate::new("p", |_| true), Purity::Pure)
    }

    #[test]
    fn test_pair_pattern() {
        let pattern = Pattern::pair(NodeKind::Map, NodeKind::Filter);
        assert_eq!(pattern.match_span(&[map(), filter(), map()]), Some(2));
        assert_eq!(pattern.match_span(&[filter(), map()]), None);
        assert_eq!(pattern.match_span(&[map()]), None);
    }

    #[test]
    fn test_empty_pattern_matches_nothing() {
        assert!(!Pattern::new().matches(&[map()]));
    }

    #[test]
    fn test_repeated_pattern_is_greedy() {
        let segment = MatchNode::Multi(vec![NodeKind::Map, NodeKind::Filter]);
        let pattern = Pattern::with_node(segment.clone()).then_node(segment).repeated();
        assert_eq!(pattern.match_span(&[map(), filter(), map(), filter()]), Some(4));
        assert_eq!(pattern.match_span(&[map(), filter()]), Some(2));
        assert_eq!(pattern.match_span(&[map()]), None);
    }

    #[test]
    fn test_match_node() {
        assert!(MatchNode::Single(NodeKind::Scan).matches(NodeKind::Scan));
        assert!(!MatchNode::Single(NodeKind::Scan).matches(NodeKind::Map));
        assert!(MatchNode::Multi(vec![NodeKind::Map, NodeKind::Filter]).matches(NodeKind::Filter));
    }
}
