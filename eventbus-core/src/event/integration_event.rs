use serde::Serialize;
use std::fmt;

/// 集成事件
///
/// 关联常量：
/// - `NAME`：事件的稳定类型名，用于日志、追踪与路由。避免依赖 `type_name::<T>()`。
pub trait IntegrationEvent: fmt::Debug + Serialize + Send + Sync + 'static {
    /// 事件的稳定名称（建议常量字符串，不随重构变化）
    const NAME: &'static str;
}
