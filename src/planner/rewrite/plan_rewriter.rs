//! 计划重写器实现
//!
//! 按注册表顺序把融合规则反复应用到计划链上，直到不动点或总步数上限耗尽。
//! 每个位置各有 `max_depth` 步预算，超出后本轮跳到下一个位置，剩余的融合留给下一轮。
//! 子计划（Compose/Parallel）在所在位置没有规则命中时递归优化。

use log::{debug, warn};
use serde::Serialize;

use crate::config::OptimizerConfig;
use crate::core::FuseResult;
use crate::planner::plan::{NodeDescription, Plan, PlanNode};
use crate::planner::rewrite::boundary::{BoundaryClassifier, EffectInspector};
use crate::planner::rewrite::context::RewriteContext;
use crate::planner::rewrite::result::RuleTrace;
use crate::planner::rewrite::rule::FusionRule;
use crate::planner::rewrite::rule_enum::RuleRegistry;
use crate::planner::rewrite::DEFAULT_MAX_DEPTH;

/// 优化结果
#[derive(Debug, Clone)]
pub struct OptimizedPlan {
    /// 优化后的计划
    pub plan: Plan,
    /// 执行的遍历轮数
    pub iterations: usize,
    /// 规则应用次数
    pub rules_applied: usize,
    /// 步数预算耗尽时仍有规则可以命中
    pub exhausted: bool,
    /// 规则应用轨迹，仅在启用时记录
    pub trace: Vec<RuleTrace>,
}

/// 可序列化的优化报告
#[derive(Debug, Serialize)]
pub struct OptimizationReport<'a> {
    pub explain: String,
    pub nodes: Vec<NodeDescription>,
    pub iterations: usize,
    pub rules_applied: usize,
    pub exhausted: bool,
    pub trace: &'a [RuleTrace],
}

impl OptimizedPlan {
    pub fn report(&self) -> OptimizationReport<'_> {
        OptimizationReport {
            explain: self.plan.explain(),
            nodes: self.plan.describe(),
            iterations: self.iterations,
            rules_applied: self.rules_applied,
            exhausted: self.exhausted,
            trace: &self.trace,
        }
    }

    /// 以 JSON 形式输出报告
    pub fn to_json(&self) -> FuseResult<String> {
        Ok(serde_json::to_string_pretty(&self.report())?)
    }
}

/// 计划重写器
///
/// 持有不可变的规则集与边界分类器，可以在多次优化之间共享。
#[derive(Debug)]
pub struct PlanRewriter {
    registry: RuleRegistry,
    classifier: BoundaryClassifier,
    max_depth: usize,
    enable_trace: bool,
}

impl PlanRewriter {
    /// 使用默认规则集创建重写器
    pub fn new() -> Self {
        Self::with_registry(RuleRegistry::default())
    }

    pub fn with_registry(registry: RuleRegistry) -> Self {
        Self {
            registry,
            classifier: BoundaryClassifier::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            enable_trace: false,
        }
    }

    /// 按配置创建重写器
    ///
    /// 禁用的规则从默认规则集中移除，自定义效应模式编译失败时返回配置错误
    pub fn from_config(config: &OptimizerConfig) -> FuseResult<Self> {
        let inspector = if config.effect_patterns.is_empty() {
            EffectInspector::new()
        } else {
            EffectInspector::with_patterns(config.effect_patterns.as_slice())?
        };

        Ok(Self {
            registry: RuleRegistry::from_config(config),
            classifier: BoundaryClassifier::with_inspector(inspector),
            max_depth: config.max_depth,
            enable_trace: config.enable_trace,
        })
    }

    pub fn with_classifier(mut self, classifier: BoundaryClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_trace(mut self, enable: bool) -> Self {
        self.enable_trace = enable;
        self
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn classifier(&self) -> &BoundaryClassifier {
        &self.classifier
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// 优化计划，输入计划保持不变
    pub fn optimize(&self, plan: &Plan) -> Plan {
        self.optimize_with_report(plan).plan
    }

    /// 优化计划并返回统计信息
    pub fn optimize_with_report(&self, plan: &Plan) -> OptimizedPlan {
        let total_cap = self.max_depth.saturating_mul(plan.total_nodes().max(1));
        let mut ctx = RewriteContext::new(self.max_depth)
            .with_total_cap(total_cap)
            .with_trace(self.enable_trace);
        let mut current = plan.clone();
        let mut iterations = 0;

        while !ctx.is_exhausted() {
            iterations += 1;
            let next = self.rewrite_chain(&current, &mut ctx);
            if next == current {
                debug!("第 {} 轮未发生变化，已到达不动点", iterations);
                break;
            }
            current = next;
        }

        let exhausted = ctx.is_exhausted() && self.can_optimize(&current);
        if exhausted {
            warn!(
                "重写总步数上限 {} 已耗尽，返回当前最优计划: {}",
                total_cap,
                current.explain()
            );
        }

        OptimizedPlan {
            plan: current,
            iterations,
            rules_applied: ctx.steps(),
            exhausted,
            trace: ctx.into_trace(),
        }
    }

    /// 计划中是否存在可命中的规则（含子计划）
    pub fn can_optimize(&self, plan: &Plan) -> bool {
        (0..plan.len()).any(|i| {
            self.first_match(&plan[i..]).is_some()
                || plan[i]
                    .children()
                    .map(|(left, right)| self.can_optimize(left) || self.can_optimize(right))
                    .unwrap_or(false)
        })
    }

    /// 对一条链做一遍从左到右的重写
    fn rewrite_chain(&self, plan: &Plan, ctx: &mut RewriteContext) -> Plan {
        let mut nodes: Vec<PlanNode> = plan.nodes().to_vec();
        let mut pos = 0;
        ctx.reset_local();

        while pos < nodes.len() && !ctx.is_exhausted() {
            if ctx.is_local_exhausted() {
                debug!("位置 {} (深度 {}) 的重写预算已用完，留待下一轮", pos, ctx.depth());
            } else if let Some((rule_name, len, replacement)) = self.try_rewrite_at(&nodes[pos..]) {
                debug!(
                    "应用规则 {} 于位置 {} (深度 {}): {} 个节点 -> {}",
                    rule_name,
                    pos,
                    ctx.depth(),
                    len,
                    replacement
                );
                ctx.record_rewrite(rule_name, &nodes[pos..pos + len], &replacement);
                nodes.splice(pos..pos + len, std::iter::once(replacement));
                continue;
            }

            let rebuilt = match nodes[pos].children() {
                Some((left, right)) => {
                    ctx.enter_child();
                    let new_left = self.rewrite_chain(left, ctx);
                    let new_right = self.rewrite_chain(right, ctx);
                    ctx.leave_child();
                    if new_left != *left || new_right != *right {
                        Some(nodes[pos].with_children(new_left, new_right))
                    } else {
                        None
                    }
                }
                None => None,
            };
            if let Some(node) = rebuilt {
                nodes[pos] = node;
            }
            pos += 1;
            ctx.reset_local();
        }

        Plan::from(nodes)
    }

    /// 在窗口起点尝试全部规则，返回第一条重写成功的规则
    fn try_rewrite_at(&self, window: &[PlanNode]) -> Option<(&'static str, usize, PlanNode)> {
        for rule in self.registry.iter() {
            let len = match rule.match_span(&self.classifier, window) {
                Some(len) => len,
                None => continue,
            };
            match rule.rewrite(&window[..len]) {
                Ok(node) => return Some((rule.name(), len, node)),
                Err(e) => warn!("规则 {} 重写失败，视为未命中: {}", rule.name(), e),
            }
        }
        None
    }

    fn first_match(&self, window: &[PlanNode]) -> Option<&'static str> {
        self.registry
            .iter()
            .find(|rule| rule.matches(&self.classifier, window))
            .map(|rule| rule.name())
    }
}

impl Default for PlanRewriter {
    fn default() -> Self {
        Self::new()
    }
}

/// 使用默认规则集优化计划
pub fn optimize(plan: &Plan, max_depth: usize) -> Plan {
    PlanRewriter::new().with_max_depth(max_depth).optimize(plan)
}

/// 默认规则集能否改写计划
pub fn can_optimize(plan: &Plan) -> bool {
    PlanRewriter::new().can_optimize(plan)
}
