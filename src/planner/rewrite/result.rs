//! 重写结果定义
//!
//! 定义重写规则的错误类型与规则应用轨迹。

use serde::Serialize;

/// 重写错误类型
///
/// 规则的匹配谓词与重写函数不一致时产生，属于编程错误。
/// 驱动器遇到它会记录警告并把该规则视为未匹配。
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("重写失败: {0}")]
    RewriteFailed(String),

    #[error("不支持的节点类型: {0}")]
    UnsupportedNodeType(String),

    #[error("无效的计划结构: {0}")]
    InvalidPlanStructure(String),
}

impl RewriteError {
    pub fn rewrite_failed(msg: impl Into<String>) -> Self {
        Self::RewriteFailed(msg.into())
    }

    pub fn unsupported_node_type(name: impl Into<String>) -> Self {
        Self::UnsupportedNodeType(name.into())
    }

    pub fn invalid_plan_structure(msg: impl Into<String>) -> Self {
        Self::InvalidPlanStructure(msg.into())
    }
}

/// 重写结果类型
pub type RewriteResult<T> = std::result::Result<T, RewriteError>;

/// 单次规则应用的轨迹
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleTrace {
    /// 规则名称
    pub rule_name: &'static str,
    /// 嵌套深度（0 为顶层链）
    pub depth: usize,
    /// 被替换片段的文本形式
    pub before: String,
    /// 替换节点的文本形式
    pub after: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_error() {
        let err = RewriteError::unsupported_node_type("Scan");
        assert!(err.to_string().contains("Scan"));

        let err = RewriteError::invalid_plan_structure("片段长度为 1");
        assert!(err.to_string().contains("片段长度"));
    }

    #[test]
    fn test_trace_serializes() {
        let trace = RuleTrace {
            rule_name: "MapMapFusionRule",
            depth: 0,
            before: "Map[f] -> Map[g]".to_string(),
            after: "Map[f >> g]".to_string(),
        };
        let json = serde_json::to_string(&trace).expect("序列化失败");
        assert!(json.contains("MapMapFusionRule"));
    }
}
