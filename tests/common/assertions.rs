//! 自定义断言辅助模块
//!
//! 提供优化前后语义等价性相关的断言函数

use streamfuse::planner::plan::{Plan, PlanRunner};
use streamfuse::Value;

/// 断言结果成功，返回内部值
pub fn assert_ok<T, E: std::fmt::Debug>(result: Result<T, E>) -> T {
    result.expect("操作应该成功")
}

/// 断言结果失败并匹配错误消息
pub fn assert_err_with<T: std::fmt::Debug, E: std::fmt::Display>(result: Result<T, E>, expected_msg: &str) {
    let err = result.expect_err("操作应该失败");
    let err_str = err.to_string();
    assert!(
        err_str.contains(expected_msg),
        "错误消息应包含 '{}', 实际是 '{}'",
        expected_msg,
        err_str
    );
}

/// 断言两个计划对同一输入产生相同的输出序列
pub fn assert_equivalent(original: &Plan, optimized: &Plan, inputs: &[Value]) {
    let mut before = PlanRunner::new(original);
    let mut after = PlanRunner::new(optimized);

    // 逐个元素比较，保证输出的交错顺序也一致
    for (i, x) in inputs.iter().enumerate() {
        assert_eq!(
            before.push(x.clone()),
            after.push(x.clone()),
            "第 {} 个输入 {} 的输出不一致\n原计划: {}\n优化后: {}",
            i,
            x,
            original.explain(),
            optimized.explain()
        );
    }
}

/// 断言计划阶段数
pub fn assert_stages(plan: &Plan, expected: usize) {
    assert_eq!(
        plan.len(),
        expected,
        "阶段数量不匹配: 期望 {}, 实际 {} ({})",
        expected,
        plan.len(),
        plan.explain()
    );
}
