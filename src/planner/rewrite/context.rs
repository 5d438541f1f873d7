//! 重写上下文定义
//!
//! 管理一次优化过程中的步数预算、嵌套深度和规则应用轨迹。
//! 每次 `optimize` 调用都有独立的上下文，优化器本身不持有可变状态。
//!
//! 预算分两层：每个位置各自有 `max_depth` 步，位置前移或进入子计划时重新计数；
//! 整个优化过程另有一个总上限，只在规则不收敛时兜底。

use crate::planner::plan::{Plan, PlanNode};
use crate::planner::rewrite::result::RuleTrace;

/// 重写上下文
#[derive(Debug)]
pub struct RewriteContext {
    /// 单个位置允许的最大重写步数
    max_depth: usize,
    /// 当前位置已执行的重写步数
    local_steps: usize,
    /// 整个优化过程允许的最大重写步数
    max_total: usize,
    /// 已执行的重写步数
    steps: usize,
    /// 当前所在子计划的嵌套深度
    depth: usize,
    /// 是否记录轨迹
    enable_trace: bool,
    trace: Vec<RuleTrace>,
}

impl RewriteContext {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            local_steps: 0,
            max_total: max_depth,
            steps: 0,
            depth: 0,
            enable_trace: false,
            trace: Vec::new(),
        }
    }

    /// 设置整个优化过程的总步数上限
    pub fn with_total_cap(mut self, max_total: usize) -> Self {
        self.max_total = max_total;
        self
    }

    pub fn with_trace(mut self, enable: bool) -> Self {
        self.enable_trace = enable;
        self
    }

    /// 当前位置的预算是否耗尽
    pub fn is_local_exhausted(&self) -> bool {
        self.local_steps >= self.max_depth
    }

    /// 总步数上限是否耗尽
    pub fn is_exhausted(&self) -> bool {
        self.steps >= self.max_total
    }

    /// 为新的位置重新开始计数
    pub fn reset_local(&mut self) {
        self.local_steps = 0;
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn enter_child(&mut self) {
        self.depth += 1;
    }

    pub fn leave_child(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// 记录一次规则应用
    pub fn record_rewrite(&mut self, rule_name: &'static str, span: &[PlanNode], replacement: &PlanNode) {
        self.local_steps += 1;
        self.steps += 1;
        if self.enable_trace {
            self.trace.push(RuleTrace {
                rule_name,
                depth: self.depth,
                before: Plan::from(span.to_vec()).explain(),
                after: replacement.label(),
            });
        }
    }

    pub fn into_trace(self) -> Vec<RuleTrace> {
        self.trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::plan::{MapFn, Purity};

    fn node() -> PlanNode {
        PlanNode::map(MapFn::new("f", |x| x.clone()), Purity::Pure)
    }

    #[test]
    fn test_local_budget_resets_per_position() {
        let mut ctx = RewriteContext::new(2).with_total_cap(10);
        ctx.record_rewrite("A", &[node()], &node());
        ctx.record_rewrite("B", &[node()], &node());
        assert!(ctx.is_local_exhausted());
        assert!(!ctx.is_exhausted());

        ctx.reset_local();
        assert!(!ctx.is_local_exhausted());
        assert_eq!(ctx.steps(), 2);
    }

    #[test]
    fn test_total_cap() {
        let mut ctx = RewriteContext::new(1).with_total_cap(3);
        for _ in 0..3 {
            assert!(!ctx.is_exhausted());
            ctx.reset_local();
            ctx.record_rewrite("A", &[node()], &node());
        }
        assert!(ctx.is_exhausted());
        assert_eq!(ctx.steps(), 3);
    }

    #[test]
    fn test_zero_budget_is_exhausted() {
        let ctx = RewriteContext::new(0);
        assert!(ctx.is_local_exhausted());
        assert!(ctx.is_exhausted());
    }

    #[test]
    fn test_trace_only_when_enabled() {
        let mut ctx = RewriteContext::new(10);
        ctx.record_rewrite("A", &[node(), node()], &node());
        assert!(ctx.into_trace().is_empty());

        let mut ctx = RewriteContext::new(10).with_trace(true);
        ctx.enter_child();
        ctx.record_rewrite("A", &[node(), node()], &node());
        ctx.leave_child();
        let trace = ctx.into_trace();
        assert_eq!(trace.len(), 1);
        assert_eq!(trace[0].depth, 1);
        assert_eq!(trace[0].before, "Map[f] -> Map[f]");
    }
}
