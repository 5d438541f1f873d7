//! 计划链
//!
//! `Plan` 是节点的显式不可变序列。重写总是构造新的 `Plan`，
//! 不在原计划上打补丁。

use std::fmt;
use std::ops::Deref;

use serde::Serialize;

use super::node::{NodeKind, PlanNode, Purity};

/// 节点序列
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Plan {
    nodes: Vec<PlanNode>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加节点，返回新计划
    pub fn then(mut self, node: PlanNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn nodes(&self) -> &[PlanNode] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<PlanNode> {
        self.nodes
    }

    /// 计划中的节点总数（含子计划）
    pub fn total_nodes(&self) -> usize {
        self.nodes
            .iter()
            .map(|node| match node.children() {
                Some((left, right)) => 1 + left.total_nodes() + right.total_nodes(),
                None => 1,
            })
            .sum()
    }

    /// 文本形式：`Map[f] -> Filter[p]`
    pub fn explain(&self) -> String {
        if self.nodes.is_empty() {
            return "<empty>".to_string();
        }
        self.nodes
            .iter()
            .map(PlanNode::label)
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// 可序列化的计划摘要
    pub fn describe(&self) -> Vec<NodeDescription> {
        self.nodes.iter().map(NodeDescription::from).collect()
    }
}

impl Deref for Plan {
    type Target = [PlanNode];

    fn deref(&self) -> &Self::Target {
        &self.nodes
    }
}

impl From<Vec<PlanNode>> for Plan {
    fn from(nodes: Vec<PlanNode>) -> Self {
        Self { nodes }
    }
}

impl FromIterator<PlanNode> for Plan {
    fn from_iter<I: IntoIterator<Item = PlanNode>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.explain())
    }
}

/// 节点摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDescription {
    pub kind: NodeKind,
    pub purity: Purity,
    pub label: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub calls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<Vec<NodeDescription>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<Vec<NodeDescription>>,
}

impl From<&PlanNode> for NodeDescription {
    fn from(node: &PlanNode) -> Self {
        let (left, right) = match node.children() {
            Some((l, r)) => (Some(l.describe()), Some(r.describe())),
            None => (None, None),
        };
        Self {
            kind: node.kind(),
            purity: node.purity(),
            label: node.label(),
            calls: node.calls().to_vec(),
            left,
            right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use crate::planner::plan::operator::{MapFn, Predicate};

    fn inc() -> PlanNode {
        PlanNode::map(MapFn::new("x+1", |x| Value::Int(x.as_int().unwrap_or(0) + 1)), Purity::Pure)
    }

    #[test]
    fn test_explain() {
        let plan = Plan::new()
            .then(inc())
            .then(PlanNode::filter(Predicate::new("x>0", |_| true), Purity::Pure));
        assert_eq!(plan.explain(), "Map[x+1] -> Filter[x>0]");
        assert_eq!(Plan::new().explain(), "<empty>");
    }

    #[test]
    fn test_total_nodes_counts_children() {
        let inner = Plan::new().then(inc()).then(inc());
        let plan = Plan::new()
            .then(inc())
            .then(PlanNode::compose(inner, Plan::new().then(inc()), Purity::Pure));
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.total_nodes(), 5);
    }

    #[test]
    fn test_describe_serializes() {
        let plan = Plan::new().then(inc());
        let json = serde_json::to_string(&plan.describe()).expect("序列化失败");
        assert!(json.contains("\"kind\":\"Map\""));
        assert!(json.contains("\"purity\":\"Pure\""));
        assert!(!json.contains("calls"));
    }

    #[test]
    fn test_clone_is_equal() {
        let plan = Plan::new().then(inc());
        assert_eq!(plan.clone(), plan);
    }
}
