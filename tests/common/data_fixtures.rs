//! 测试数据构造模块
//!
//! 提供常用的计划节点，标签与调用列表都贴近真实流水线

use streamfuse::planner::plan::{FilterMapFn, FlatMapFn, MapFn, Plan, PlanNode, Predicate, ScanFn};
use streamfuse::{Purity, Value};

fn int(x: &Value) -> i64 {
    x.as_int().unwrap_or(0)
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

/// 累加和 `(s, x) ↦ (s+x, s+x)`，初始状态 0
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

/// 运行最大值
pub fn running_max() -> PlanNode {
    PlanNode::scan(
        Value::Int(i64::MIN),
        ScanFn::new("max", |s, x| {
            let next = Value::Int(int(s).max(int(x)));
            (next.clone(), next)
        }),
        Purity::Stateful,
    )
}

pub fn to_string() -> PlanNode {
    PlanNode::map(MapFn::new("to_string", |y| Value::String(y.to_string())), Purity::Pure)
}

/// `x ↦ [x, -x]`
pub fn mirror() -> PlanNode {
    PlanNode::flat_map(
        FlatMapFn::new("mirror", |x| vec![x.clone(), Value::Int(-int(x))]),
        Purity::Pure,
    )
}

/// 声明为 IO 的日志输出
pub fn io_log() -> PlanNode {
    PlanNode::map(MapFn::new("log", |x| x.clone()), Purity::IO)
}

/// 声明为纯，但调用了 IO 函数
pub fn disguised_print() -> PlanNode {
    PlanNode::map(
        MapFn::new("debug print", |x| x.clone()).with_calls(["std::io::println"]),
        Purity::Pure,
    )
}

/// 声明为纯，但调用了配置中的自定义效应函数
pub fn db_lookup() -> PlanNode {
    PlanNode::map(
        MapFn::new("lookup", |x| x.clone()).with_calls(["db_fetch_user"]),
        Purity::Pure,
    )
}

pub fn async_fetch() -> PlanNode {
    PlanNode::map(MapFn::new("fetch", |x| x.clone()), Purity::Async)
}

pub fn chain(nodes: Vec<PlanNode>) -> Plan {
    Plan::from(nodes)
}
