//! 融合规则宏定义
//!
//! 为两节点合并规则生成 `FusionRule` 实现，减少样板代码。

/// 基于 `MergeRule` 实现两节点融合规则
///
/// 自动生成 `new()`、`Default` 和 `FusionRule` 实现，
/// 匹配与重写都转发给 `MergeRule` 的 `can_merge` / `create_merged_node`。
///
/// # 示例
/// ```rust,ignore
/// define_merge_rule! {
///     /// Map → Map 融合
///     name: MapMapFusionRule,
///     pattern: (Map, Map),
///     description: "Map(f) → Map(g) 合并为 Map(g ∘ f)"
/// }
/// ```
macro_rules! define_merge_rule {
    (
        $(#[$meta:meta])*
        name: $name:ident,
        pattern: ($first:ident, $second:ident),
        description: $desc:expr
    ) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name;

        impl $name {
            /// 创建规则实例
            pub fn new() -> Self {
                Self
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $crate::planner::rewrite::rule::FusionRule for $name {
            fn name(&self) -> &'static str {
                stringify!($name)
            }

            fn description(&self) -> &'static str {
                $desc
            }

            fn pattern(&self) -> $crate::planner::rewrite::pattern::Pattern {
                $crate::planner::rewrite::pattern::Pattern::pair(
                    $crate::planner::plan::NodeKind::$first,
                    $crate::planner::plan::NodeKind::$second,
                )
            }

            fn admits(
                &self,
                classifier: &$crate::planner::rewrite::boundary::BoundaryClassifier,
                span: &[$crate::planner::plan::PlanNode],
            ) -> bool {
                match span {
                    [first, second] => {
                        $crate::planner::rewrite::rule::MergeRule::can_merge(self, classifier, first, second)
                    }
                    _ => false,
                }
            }

            fn rewrite(
                &self,
                span: &[$crate::planner::plan::PlanNode],
            ) -> $crate::planner::rewrite::result::RewriteResult<$crate::planner::plan::PlanNode> {
                match span {
                    [first, second] => {
                        $crate::planner::rewrite::rule::MergeRule::create_merged_node(self, first, second)
                    }
                    _ => Err($crate::planner::rewrite::result::RewriteError::invalid_plan_structure(
                        format!("{} 需要 2 个节点，实际为 {}", stringify!($name), span.len()),
                    )),
                }
            }
        }
    };
}
