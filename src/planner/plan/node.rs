//! 计划节点定义
//!
//! 每个节点是一个和类型：每种操作只携带自身需要的数据，
//! "只有一个算子槽被填充"由类型系统保证。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::chain::Plan;
use super::operator::{FilterMapFn, FlatMapFn, MapFn, Predicate, ScanFn};
use crate::core::Value;

/// 声明的效应分类
///
/// 全序 `Pure < Stateful < IO < Async`，融合后的纯度取最大值
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Purity {
    Pure,
    Stateful,
    IO,
    Async,
}

impl Purity {
    /// 融合两个节点后的纯度，只会变严格不会降级
    pub fn join(self, other: Purity) -> Purity {
        self.max(other)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Purity::Pure => "Pure",
            Purity::Stateful => "Stateful",
            Purity::IO => "IO",
            Purity::Async => "Async",
        }
    }
}

impl fmt::Display for Purity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 节点种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Map,
    Filter,
    FilterMap,
    Scan,
    FlatMap,
    Compose,
    Parallel,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Map => "Map",
            NodeKind::Filter => "Filter",
            NodeKind::FilterMap => "FilterMap",
            NodeKind::Scan => "Scan",
            NodeKind::FlatMap => "FlatMap",
            NodeKind::Compose => "Compose",
            NodeKind::Parallel => "Parallel",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 节点操作
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Map(MapFn),
    Filter(Predicate),
    FilterMap(FilterMapFn),
    Scan { init: Value, step: ScanFn },
    FlatMap(FlatMapFn),
    /// 先执行 left，再把输出送入 right
    Compose { left: Plan, right: Plan },
    /// 每个输入分别送入 left 和 right，先输出 left 的结果
    Parallel { left: Plan, right: Plan },
}

impl Operation {
    pub fn kind(&self) -> NodeKind {
        match self {
            Operation::Map(_) => NodeKind::Map,
            Operation::Filter(_) => NodeKind::Filter,
            Operation::FilterMap(_) => NodeKind::FilterMap,
            Operation::Scan { .. } => NodeKind::Scan,
            Operation::FlatMap(_) => NodeKind::FlatMap,
            Operation::Compose { .. } => NodeKind::Compose,
            Operation::Parallel { .. } => NodeKind::Parallel,
        }
    }
}

/// 计划节点
#[derive(Debug, Clone, PartialEq)]
pub struct PlanNode {
    op: Operation,
    purity: Purity,
}

impl PlanNode {
    pub fn new(op: Operation, purity: Purity) -> Self {
        Self { op, purity }
    }

    pub fn map(f: MapFn, purity: Purity) -> Self {
        Self::new(Operation::Map(f), purity)
    }

    pub fn filter(p: Predicate, purity: Purity) -> Self {
        Self::new(Operation::Filter(p), purity)
    }

    pub fn filter_map(f: FilterMapFn, purity: Purity) -> Self {
        Self::new(Operation::FilterMap(f), purity)
    }

    pub fn scan(init: Value, step: ScanFn, purity: Purity) -> Self {
        Self::new(Operation::Scan { init, step }, purity)
    }

    pub fn flat_map(f: FlatMapFn, purity: Purity) -> Self {
        Self::new(Operation::FlatMap(f), purity)
    }

    pub fn compose(left: Plan, right: Plan, purity: Purity) -> Self {
        Self::new(Operation::Compose { left, right }, purity)
    }

    pub fn parallel(left: Plan, right: Plan, purity: Purity) -> Self {
        Self::new(Operation::Parallel { left, right }, purity)
    }

    pub fn op(&self) -> &Operation {
        &self.op
    }

    pub fn purity(&self) -> Purity {
        self.purity
    }

    pub fn kind(&self) -> NodeKind {
        self.op.kind()
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn is_map(&self) -> bool {
        matches!(self.op, Operation::Map(_))
    }

    pub fn is_filter(&self) -> bool {
        matches!(self.op, Operation::Filter(_))
    }

    pub fn is_scan(&self) -> bool {
        matches!(self.op, Operation::Scan { .. })
    }

    /// 是否包含子计划
    pub fn is_branching(&self) -> bool {
        matches!(self.op, Operation::Compose { .. } | Operation::Parallel { .. })
    }

    /// 子计划 (left, right)，仅 Compose/Parallel 存在
    pub fn children(&self) -> Option<(&Plan, &Plan)> {
        match &self.op {
            Operation::Compose { left, right } | Operation::Parallel { left, right } => {
                Some((left, right))
            }
            _ => None,
        }
    }

    /// 用新的子计划构造同类节点
    ///
    /// 非分支节点返回自身的克隆
    pub fn with_children(&self, left: Plan, right: Plan) -> PlanNode {
        match &self.op {
            Operation::Compose { .. } => PlanNode::compose(left, right, self.purity),
            Operation::Parallel { .. } => PlanNode::parallel(left, right, self.purity),
            _ => self.clone(),
        }
    }

    /// 节点上声明的函数调用（分支节点不含子计划）
    pub fn calls(&self) -> &[String] {
        match &self.op {
            Operation::Map(f) => f.calls(),
            Operation::Filter(p) => p.calls(),
            Operation::FilterMap(f) => f.calls(),
            Operation::Scan { step, .. } => step.calls(),
            Operation::FlatMap(f) => f.calls(),
            Operation::Compose { .. } | Operation::Parallel { .. } => &[],
        }
    }

    /// 节点的可读描述
    pub fn label(&self) -> String {
        match &self.op {
            Operation::Map(f) => format!("Map[{}]", f.label()),
            Operation::Filter(p) => format!("Filter[{}]", p.label()),
            Operation::FilterMap(f) => format!("FilterMap[{}]", f.label()),
            Operation::Scan { init, step } => format!("Scan[{}; init={}]", step.label(), init),
            Operation::FlatMap(f) => format!("FlatMap[{}]", f.label()),
            Operation::Compose { left, right } => {
                format!("Compose({} ; {})", left.explain(), right.explain())
            }
            Operation::Parallel { left, right } => {
                format!("Parallel({} | {})", left.explain(), right.explain())
            }
        }
    }
}

impl fmt::Display for PlanNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}>", self.label(), self.purity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purity_join_is_monotonic() {
        assert_eq!(Purity::Pure.join(Purity::Pure), Purity::Pure);
        assert_eq!(Purity::Pure.join(Purity::Stateful), Purity::Stateful);
        assert_eq!(Purity::IO.join(Purity::Pure), Purity::IO);
        assert_eq!(Purity::Stateful.join(Purity::Async), Purity::Async);
    }

    #[test]
    fn test_node_kind() {
        let node = PlanNode::filter(Predicate::new("x>0", |_| true), Purity::Pure);
        assert_eq!(node.kind(), NodeKind::Filter);
        assert!(node.is_filter());
        assert!(!node.is_branching());
        assert!(node.children().is_none());
    }

    #[test]
    fn test_with_children_keeps_kind_and_purity() {
        let node = PlanNode::parallel(Plan::new(), Plan::new(), Purity::Stateful);
        let leaf = PlanNode::map(MapFn::new("id", |x| x.clone()), Purity::Pure);
        let rebuilt = node.with_children(Plan::from(vec![leaf]), Plan::new());

        assert_eq!(rebuilt.kind(), NodeKind::Parallel);
        assert_eq!(rebuilt.purity(), Purity::Stateful);
        let (left, right) = rebuilt.children().expect("应有子计划");
        assert_eq!(left.len(), 1);
        assert!(right.is_empty());
    }

    #[test]
    fn test_label() {
        let node = PlanNode::scan(
            Value::Int(0),
            ScanFn::new("sum", |s, x| (s.clone(), x.clone())),
            Purity::Stateful,
        );
        assert_eq!(node.label(), "Scan[sum; init=0]");
        assert_eq!(node.to_string(), "Scan[sum; init=0]<Stateful>");
    }
}
