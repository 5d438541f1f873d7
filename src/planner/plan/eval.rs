//! 参考求值器
//!
//! 把 `Plan` 编译成带状态的阶段序列，逐个元素推进。
//! 它只用于验证优化前后计划的输入输出一致，不追求执行性能。

use super::chain::Plan;
use super::node::Operation;
use super::operator::{FilterMapFn, FlatMapFn, MapFn, Predicate, ScanFn};
use crate::core::Value;

#[derive(Debug)]
enum Stage {
    Map(MapFn),
    Filter(Predicate),
    FilterMap(FilterMapFn),
    Scan { state: Value, step: ScanFn },
    FlatMap(FlatMapFn),
    Compose(Box<PlanRunner>, Box<PlanRunner>),
    Parallel(Box<PlanRunner>, Box<PlanRunner>),
}

impl Stage {
    fn compile(op: &Operation) -> Stage {
        match op {
            Operation::Map(f) => Stage::Map(f.clone()),
            Operation::Filter(p) => Stage::Filter(p.clone()),
            Operation::FilterMap(f) => Stage::FilterMap(f.clone()),
            Operation::Scan { init, step } => Stage::Scan {
                state: init.clone(),
                step: step.clone(),
            },
            Operation::FlatMap(f) => Stage::FlatMap(f.clone()),
            Operation::Compose { left, right } => Stage::Compose(
                Box::new(PlanRunner::new(left)),
                Box::new(PlanRunner::new(right)),
            ),
            Operation::Parallel { left, right } => Stage::Parallel(
                Box::new(PlanRunner::new(left)),
                Box::new(PlanRunner::new(right)),
            ),
        }
    }

    fn feed(&mut self, x: Value, out: &mut Vec<Value>) {
        match self {
            Stage::Map(f) => out.push(f.call(&x)),
            Stage::Filter(p) => {
                if p.call(&x) {
                    out.push(x);
                }
            }
            Stage::FilterMap(f) => out.extend(f.call(&x)),
            Stage::Scan { state, step } => {
                let (next, y) = step.call(state, &x);
                *state = next;
                out.push(y);
            }
            Stage::FlatMap(f) => out.extend(f.call(&x)),
            Stage::Compose(left, right) => {
                for y in left.push(x) {
                    out.extend(right.push(y));
                }
            }
            Stage::Parallel(left, right) => {
                out.extend(left.push(x.clone()));
                out.extend(right.push(x));
            }
        }
    }

    fn collect_states(&self, states: &mut Vec<Value>) {
        match self {
            Stage::Scan { state, .. } => states.push(state.clone()),
            Stage::Compose(left, right) | Stage::Parallel(left, right) => {
                states.extend(left.states());
                states.extend(right.states());
            }
            _ => {}
        }
    }
}

/// 计划执行器
#[derive(Debug)]
pub struct PlanRunner {
    stages: Vec<Stage>,
}

impl PlanRunner {
    pub fn new(plan: &Plan) -> Self {
        Self {
            stages: plan.iter().map(|node| Stage::compile(node.op())).collect(),
        }
    }

    /// 推入一个元素，返回该元素产生的全部输出
    pub fn push(&mut self, input: Value) -> Vec<Value> {
        let mut current = vec![input];
        for stage in &mut self.stages {
            let mut next = Vec::with_capacity(current.len());
            for v in current {
                stage.feed(v, &mut next);
            }
            current = next;
            if current.is_empty() {
                break;
            }
        }
        current
    }

    /// 按顺序推入全部元素
    pub fn run<I: IntoIterator<Item = Value>>(&mut self, inputs: I) -> Vec<Value> {
        inputs.into_iter().flat_map(|x| self.push(x)).collect()
    }

    /// 所有 Scan 阶段的当前状态（深度优先顺序）
    pub fn states(&self) -> Vec<Value> {
        let mut states = Vec::new();
        for stage in &self.stages {
            stage.collect_states(&mut states);
        }
        states
    }
}

/// 一次性执行计划
pub fn run_plan<I: IntoIterator<Item = Value>>(plan: &Plan, inputs: I) -> Vec<Value> {
    PlanRunner::new(plan).run(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::plan::node::{PlanNode, Purity};

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().map(|v| Value::Int(*v)).collect()
    }

    fn running_sum() -> PlanNode {
        PlanNode::scan(
            Value::Int(0),
            ScanFn::new("sum", |s, x| {
                let next = Value::Int(s.as_int().unwrap_or(0) + x.as_int().unwrap_or(0));
                (next.clone(), next)
            }),
            Purity::Stateful,
        )
    }

    #[test]
    fn test_run_scan_tracks_state() {
        let plan = Plan::new().then(running_sum());
        let mut runner = PlanRunner::new(&plan);
        assert_eq!(runner.run(ints(&[1, 2, 3])), ints(&[1, 3, 6]));
        assert_eq!(runner.states(), ints(&[6]));
    }

    #[test]
    fn test_run_filter_and_flat_map() {
        let plan = Plan::new()
            .then(PlanNode::filter(
                Predicate::new("odd", |x| x.as_int().unwrap_or(0) % 2 == 1),
                Purity::Pure,
            ))
            .then(PlanNode::flat_map(
                FlatMapFn::new("dup", |x| vec![x.clone(), x.clone()]),
                Purity::Pure,
            ));
        assert_eq!(run_plan(&plan, ints(&[1, 2, 3])), ints(&[1, 1, 3, 3]));
    }

    #[test]
    fn test_run_compose_and_parallel() {
        let double = PlanNode::map(
            MapFn::new("x*2", |x| Value::Int(x.as_int().unwrap_or(0) * 2)),
            Purity::Pure,
        );
        let neg = PlanNode::map(
            MapFn::new("-x", |x| Value::Int(-x.as_int().unwrap_or(0))),
            Purity::Pure,
        );

        let compose = Plan::new().then(PlanNode::compose(
            Plan::new().then(double.clone()),
            Plan::new().then(neg.clone()),
            Purity::Pure,
        ));
        assert_eq!(run_plan(&compose, ints(&[1, 2])), ints(&[-2, -4]));

        let parallel = Plan::new().then(PlanNode::parallel(
            Plan::new().then(double),
            Plan::new().then(neg),
            Purity::Pure,
        ));
        assert_eq!(run_plan(&parallel, ints(&[1, 2])), ints(&[2, -1, 4, -2]));
    }

    #[test]
    fn test_empty_plan_is_identity() {
        assert_eq!(run_plan(&Plan::new(), ints(&[4, 5])), ints(&[4, 5]));
    }
}
