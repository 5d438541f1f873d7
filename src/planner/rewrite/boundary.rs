//! 融合边界分类
//!
//! 为每个节点计算安全级别 `FullyFusable < Staged < OpaqueEffect`。
//! 证据来源有两处：
//! - 构建者声明的纯度
//! - 对算子声明调用的静态检查
//!
//! 分类器总是取所有证据中最严格的一个。边界每次现算，不缓存在节点内。

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::FuseResult;
use crate::planner::plan::{PlanNode, Purity};

/// 融合边界
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Boundary {
    /// 无副作用，可与任意可融合邻居合并
    FullyFusable,
    /// 携带状态，只能参与保持状态顺序的融合
    Staged,
    /// 外部效应，任何规则都不得跨越
    OpaqueEffect,
}

impl Boundary {
    pub fn from_purity(purity: Purity) -> Boundary {
        match purity {
            Purity::Pure => Boundary::FullyFusable,
            Purity::Stateful => Boundary::Staged,
            Purity::IO | Purity::Async => Boundary::OpaqueEffect,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Boundary::FullyFusable => "FullyFusable",
            Boundary::Staged => "Staged",
            Boundary::OpaqueEffect => "OpaqueEffect",
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 算子效应检查
///
/// 根据算子声明的调用推断边界。内置名单使用编译期静态匹配，
/// 配置中的额外模式编译为正则，命中即视为外部效应。
#[derive(Debug, Clone, Default)]
pub struct EffectInspector {
    patterns: Vec<Regex>,
}

impl EffectInspector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 附加额外的效应模式
    pub fn with_patterns<S: AsRef<str>>(patterns: &[S]) -> FuseResult<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// 单个调用名对应的边界
    pub fn call_boundary(&self, call: &str) -> Boundary {
        let base = call
            .rsplit(|c: char| c == ':' || c == '.')
            .next()
            .unwrap_or(call)
            .to_ascii_lowercase();

        let builtin = match base.as_str() {
            // IO
            "print" | "println" | "eprint" | "eprintln" | "log" | "write" | "read" | "flush"
            | "open" | "fetch" | "send" | "recv" | "query" => Boundary::OpaqueEffect,

            // 非确定性
            "now" | "current_time" | "current_timestamp" | "rand" | "random" | "uuid" => {
                Boundary::OpaqueEffect
            }

            // 异步
            "await" | "spawn" | "sleep" | "yield" => Boundary::OpaqueEffect,

            // 隐藏状态
            "counter" | "accumulate" | "cache" | "memo" | "memoize" => Boundary::Staged,

            _ => Boundary::FullyFusable,
        };

        if builtin == Boundary::OpaqueEffect {
            return builtin;
        }
        if self.patterns.iter().any(|re| re.is_match(call)) {
            return Boundary::OpaqueEffect;
        }
        builtin
    }

    /// 节点自身声明调用的最严格边界（不含子计划）
    pub fn inspect(&self, node: &PlanNode) -> Boundary {
        node.calls()
            .iter()
            .map(|call| self.call_boundary(call))
            .max()
            .unwrap_or(Boundary::FullyFusable)
    }
}

/// 边界分类器
#[derive(Debug, Clone)]
pub struct BoundaryClassifier {
    inspector: Option<EffectInspector>,
}

impl BoundaryClassifier {
    /// 使用内置静态检查的分类器
    pub fn new() -> Self {
        Self {
            inspector: Some(EffectInspector::new()),
        }
    }

    /// 只信任声明纯度的分类器
    pub fn without_inspection() -> Self {
        Self { inspector: None }
    }

    pub fn with_inspector(inspector: EffectInspector) -> Self {
        Self {
            inspector: Some(inspector),
        }
    }

    /// 计算节点边界，取全部证据的最大值
    pub fn classify(&self, node: &PlanNode) -> Boundary {
        let mut boundary = Boundary::from_purity(node.purity());

        if let Some(inspector) = &self.inspector {
            boundary = boundary.max(inspector.inspect(node));
        }

        if let Some((left, right)) = node.children() {
            for child in left.iter().chain(right.iter()) {
                if boundary == Boundary::OpaqueEffect {
                    break;
                }
                boundary = boundary.max(self.classify(child));
            }
        }

        boundary
    }

    /// 两个节点都不是外部效应时才允许融合
    pub fn can_fuse(&self, a: &PlanNode, b: &PlanNode) -> bool {
        self.classify(a) < Boundary::OpaqueEffect && self.classify(b) < Boundary::OpaqueEffect
    }

    pub fn is_fully_fusable(&self, node: &PlanNode) -> bool {
        self.classify(node) == Boundary::FullyFusable
    }
}

impl Default for BoundaryClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// 使用默认分类器计算边界
pub fn classify(node: &PlanNode) -> Boundary {
    BoundaryClassifier::default().classify(node)
}

/// 使用默认分类器判断两个节点能否融合
pub fn can_fuse(a: &PlanNode, b: &PlanNode) -> bool {
    BoundaryClassifier::default().can_fuse(a, b)
}
