//! 规则单元测试共用的节点构造函数

use crate::core::Value;
use crate::planner::plan::{FilterMapFn, FlatMapFn, MapFn, PlanNode, Predicate, Purity, ScanFn};

pub fn int(x: &Value) -> i64 {
    x.as_int().unwrap_or(0)
}

pub fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().map(|v| Value::Int(*v)).collect()
}

pub fn add(n: i64) -> PlanNode {
    PlanNode::map(MapFn::new(format!("x+{}", n), move |x| Value::Int(int(x) + n)), Purity::Pure)
}

pub fn mul(n: i64) -> PlanNode {
    PlanNode::map(MapFn::new(format!("x*{}", n), move |x| Value::Int(int(x) * n)), Purity::Pure)
}

pub fn gt(n: i64) -> PlanNode {
    PlanNode::filter(Predicate::new(format!("x>{}", n), move |x| int(x) > n), Purity::Pure)
}

pub fn lt(n: i64) -> PlanNode {
    PlanNode::filter(Predicate::new(format!("x<{}", n), move |x| int(x) < n), Purity::Pure)
}

/// 偶数减半，奇数丢弃
pub fn half_even() -> PlanNode {
    PlanNode::filter_map(
        FilterMapFn::new("even/2", |x| {
            let v = int(x);
            (v % 2 == 0).then(|| Value::Int(v / 2))
        }),
        Purity::Pure,
    )
}

/// 累加和，输出新的和
pub fn running_sum() -> PlanNode {
    PlanNode::scan(
        Value::Int(0),
        ScanFn::new("sum", |s, x| {
            let next = Value::Int(int(s) + int(x));
            (next.clone(), next)
        }),
        Purity::Stateful,
    )
}

/// 计数器，输出 (序号, 值)
pub fn indexed() -> PlanNode {
    PlanNode::scan(
        Value::Int(0),
        ScanFn::new("index", |s, x| {
            let n = int(s);
            (Value::Int(n + 1), Value::List(vec![Value::Int(n), x.clone()]))
        }),
        Purity::Stateful,
    )
}

pub fn repeat(times: usize) -> PlanNode {
    PlanNode::flat_map(
        FlatMapFn::new(format!("repeat{}", times), move |x| vec![x.clone(); times]),
        Purity::Pure,
    )
}

/// 声明了 IO 的 Map
pub fn io_map() -> PlanNode {
    PlanNode::map(MapFn::new("println", |x| x.clone()), Purity::IO)
}

pub fn with_purity(node: PlanNode, purity: Purity) -> PlanNode {
    PlanNode::new(node.op().clone(), purity)
}
