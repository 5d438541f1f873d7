//! 算子定义
//!
//! 每个算子由一个共享闭包和描述信息组成。闭包通过 `Arc` 共享，
//! 融合时只组合引用，不会复制或修改已有算子。
//!
//! 算子相等性按身份判定：同一个 `Arc` 且描述信息相同才视为相等，
//! 因此"计划是否发生变化"可以直接用 `==` 比较。

use std::fmt;
use std::sync::Arc;

use crate::core::Value;

/// 算子描述信息
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OperatorMeta {
    /// 可读标签，用于 explain 输出
    pub label: String,
    /// 算子体内调用的函数名，由构建者声明，供静态检查使用
    pub calls: Vec<String>,
}

impl OperatorMeta {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            calls: Vec::new(),
        }
    }

    /// 合并两个算子的描述信息
    ///
    /// 调用列表按顺序拼接，融合后的节点仍保留全部静态证据
    pub fn fuse(first: &OperatorMeta, second: &OperatorMeta, sep: &str) -> OperatorMeta {
        let mut calls = first.calls.clone();
        calls.extend(second.calls.iter().cloned());
        OperatorMeta {
            label: format!("{}{}{}", first.label, sep, second.label),
            calls,
        }
    }

    /// 合并任意多个描述信息
    pub fn fuse_all<'a>(metas: impl IntoIterator<Item = &'a OperatorMeta>, sep: &str) -> OperatorMeta {
        let mut labels = Vec::new();
        let mut calls = Vec::new();
        for meta in metas {
            labels.push(meta.label.as_str());
            calls.extend(meta.calls.iter().cloned());
        }
        OperatorMeta {
            label: labels.join(sep),
            calls,
        }
    }
}

/// 通用算子
pub struct Operator<F: ?Sized> {
    func: Arc<F>,
    meta: OperatorMeta,
}

pub type MapFunc = dyn Fn(&Value) -> Value + Send + Sync;
pub type PredicateFunc = dyn Fn(&Value) -> bool + Send + Sync;
pub type FilterMapFunc = dyn Fn(&Value) -> Option<Value> + Send + Sync;
pub type ScanFunc = dyn Fn(&Value, &Value) -> (Value, Value) + Send + Sync;
pub type FlatMapFunc = dyn Fn(&Value) -> Vec<Value> + Send + Sync;

/// 一元变换 `x -> y`
pub type MapFn = Operator<MapFunc>;
/// 谓词 `x -> bool`
pub type Predicate = Operator<PredicateFunc>;
/// 可选变换 `x -> Option<y>`
pub type FilterMapFn = Operator<FilterMapFunc>;
/// 状态转移 `(state, x) -> (state', y)`
pub type ScanFn = Operator<ScanFunc>;
/// 子流变换 `x -> [y]`
pub type FlatMapFn = Operator<FlatMapFunc>;

impl<F: ?Sized> Operator<F> {
    pub fn from_parts(func: Arc<F>, meta: OperatorMeta) -> Self {
        Self { func, meta }
    }

    pub fn func(&self) -> &Arc<F> {
        &self.func
    }

    pub fn meta(&self) -> &OperatorMeta {
        &self.meta
    }

    pub fn label(&self) -> &str {
        &self.meta.label
    }

    pub fn calls(&self) -> &[String] {
        &self.meta.calls
    }

    /// 声明算子体内调用的函数
    pub fn with_calls<I, S>(mut self, calls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta.calls.extend(calls.into_iter().map(Into::into));
        self
    }
}

impl<F: ?Sized> Clone for Operator<F> {
    fn clone(&self) -> Self {
        Self {
            func: Arc::clone(&self.func),
            meta: self.meta.clone(),
        }
    }
}

impl<F: ?Sized> PartialEq for Operator<F> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func) && self.meta == other.meta
    }
}

impl<F: ?Sized> fmt::Debug for Operator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("label", &self.meta.label)
            .field("calls", &self.meta.calls)
            .finish()
    }
}

impl MapFn {
    pub fn new(label: impl Into<String>, f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        let func: Arc<MapFunc> = Arc::new(f);
        Self::from_parts(func, OperatorMeta::new(label))
    }

    pub fn call(&self, x: &Value) -> Value {
        (self.func)(x)
    }
}

impl Predicate {
    pub fn new(label: impl Into<String>, f: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        let func: Arc<PredicateFunc> = Arc::new(f);
        Self::from_parts(func, OperatorMeta::new(label))
    }

    pub fn call(&self, x: &Value) -> bool {
        (self.func)(x)
    }
}

impl FilterMapFn {
    pub fn new(
        label: impl Into<String>,
        f: impl Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    ) -> Self {
        let func: Arc<FilterMapFunc> = Arc::new(f);
        Self::from_parts(func, OperatorMeta::new(label))
    }

    pub fn call(&self, x: &Value) -> Option<Value> {
        (self.func)(x)
    }
}

impl ScanFn {
    pub fn new(
        label: impl Into<String>,
        f: impl Fn(&Value, &Value) -> (Value, Value) + Send + Sync + 'static,
    ) -> Self {
        let func: Arc<ScanFunc> = Arc::new(f);
        Self::from_parts(func, OperatorMeta::new(label))
    }

    pub fn call(&self, state: &Value, x: &Value) -> (Value, Value) {
        (self.func)(state, x)
    }
}

impl FlatMapFn {
    pub fn new(
        label: impl Into<String>,
        f: impl Fn(&Value) -> Vec<Value> + Send + Sync + 'static,
    ) -> Self {
        let func: Arc<FlatMapFunc> = Arc::new(f);
        Self::from_parts(func, OperatorMeta::new(label))
    }

    pub fn call(&self, x: &Value) -> Vec<Value> {
        (self.func)(x)
    }
}
