//! 融合规则枚举 - 静态分发实现
//!
//! 所有规则都作为枚举变体，通过 match 进行分发，
//! 驱动器按注册表顺序逐条尝试。
//!
//! # 使用示例
//!
//! ```rust
//! use streamfuse::planner::rewrite::{FusionRule, RuleRegistry};
//!
//! let registry = RuleRegistry::default();
//! for rule in registry.iter() {
//!     assert!(rule.name().ends_with("Rule"));
//! }
//! ```

use crate::config::OptimizerConfig;
use crate::planner::plan::PlanNode;
use crate::planner::rewrite::boundary::BoundaryClassifier;
use crate::planner::rewrite::merge;
use crate::planner::rewrite::pattern::Pattern;
use crate::planner::rewrite::result::RewriteResult;
use crate::planner::rewrite::rule::FusionRule;

macro_rules! define_fusion_rules {
    (
        $(#[$enum_meta:meta])*
        pub enum $enum_name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant_name:ident($rule_type:ty)
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug)]
        pub enum $enum_name {
            $(
                $(#[$variant_meta])*
                $variant_name($rule_type),
            )+
        }

        impl FusionRule for $enum_name {
            fn name(&self) -> &'static str {
                match self {
                    $(
                        $enum_name::$variant_name(rule) => rule.name(),
                    )+
                }
            }

            fn description(&self) -> &'static str {
                match self {
                    $(
                        $enum_name::$variant_name(rule) => rule.description(),
                    )+
                }
            }

            fn pattern(&self) -> Pattern {
                match self {
                    $(
                        $enum_name::$variant_name(rule) => rule.pattern(),
                    )+
                }
            }

            fn admits(&self, classifier: &BoundaryClassifier, span: &[PlanNode]) -> bool {
                match self {
                    $(
                        $enum_name::$variant_name(rule) => rule.admits(classifier, span),
                    )+
                }
            }

            fn rewrite(&self, span: &[PlanNode]) -> RewriteResult<PlanNode> {
                match self {
                    $(
                        $enum_name::$variant_name(rule) => rule.rewrite(span),
                    )+
                }
            }

            fn match_span(
                &self,
                classifier: &BoundaryClassifier,
                window: &[PlanNode],
            ) -> Option<usize> {
                match self {
                    $(
                        $enum_name::$variant_name(rule) => rule.match_span(classifier, window),
                    )+
                }
            }
        }
    };
}

define_fusion_rules! {
    pub enum FusionRuleEnum {
        // ==================== 两节点融合 ====================
        MapMap(merge::MapMapFusionRule),
        FilterFilter(merge::FilterFilterFusionRule),
        MapFilter(merge::MapFilterFusionRule),
        FilterMap(merge::FilterMapFusionRule),
        FilterMapChain(merge::FilterMapChainFusionRule),

        // ==================== 有状态融合 ====================
        ScanMap(merge::ScanMapFusionRule),
        ScanScan(merge::ScanScanFusionRule),
        FlatMapMap(merge::FlatMapMapFusionRule),

        // ==================== 片段融合 ====================
        PureSegment(merge::PureSegmentFusionRule),
    }
}

#[derive(Debug)]
pub struct RuleRegistry {
    rules: Vec<FusionRuleEnum>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// 默认规则集去掉配置中禁用的规则
    pub fn from_config(config: &OptimizerConfig) -> Self {
        let mut registry = Self::default();
        registry
            .rules
            .retain(|rule| !config.disabled_rules.iter().any(|name| name == rule.name()));
        registry
    }

    pub fn add(&mut self, rule: FusionRuleEnum) {
        self.rules.push(rule);
    }

    pub fn iter(&self) -> impl Iterator<Item = &FusionRuleEnum> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

}

impl Default for RuleRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.add(FusionRuleEnum::MapMap(merge::MapMapFusionRule::new()));
        registry.add(FusionRuleEnum::FilterFilter(merge::FilterFilterFusionRule::new()));
        registry.add(FusionRuleEnum::MapFilter(merge::MapFilterFusionRule::new()));
        registry.add(FusionRuleEnum::FilterMap(merge::FilterMapFusionRule::new()));
        registry.add(FusionRuleEnum::FilterMapChain(merge::FilterMapChainFusionRule::new()));
        registry.add(FusionRuleEnum::ScanMap(merge::ScanMapFusionRule::new()));
        registry.add(FusionRuleEnum::ScanScan(merge::ScanScanFusionRule::new()));
        registry.add(FusionRuleEnum::FlatMapMap(merge::FlatMapMapFusionRule::new()));
        registry.add(FusionRuleEnum::PureSegment(merge::PureSegmentFusionRule::new()));
        registry
    }
}
