//! 事件处理上下文（EventContext）
//!
//! 承载一次事件处理调用链所需的横切信息，并在各管道阶段之间显式传递：
//! - 业务语境：关联追踪 `correlation_id`、因果链 `causation_id`；
//! - 当前工作单元：由事务阶段在开启作用域时写入子上下文，用于检测嵌套调用。
//!
//! 当前工作单元只存在于调用链自身的上下文中，不存在进程级全局状态，
//! 因此并发处理的事件之间互不可见。
//!
use crate::unit_of_work::UnitOfWork;
use bon::Builder;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// 事件处理上下文
///
/// ```rust
/// use eventbus_core::context::EventContext;
///
/// let ctx = EventContext::builder()
///     .correlation_id("cor-123".into())
///     .causation_id("cau-abc".into())
///     .build();
/// assert!(ctx.unit_of_work().is_none());
/// ```
#[derive(Builder, Clone, Default)]
pub struct EventContext {
    /// 关联ID
    correlation_id: Option<String>,
    /// 因果ID
    causation_id: Option<String>,
    /// 当前调用链上的工作单元
    #[builder(skip)]
    unit_of_work: Option<Arc<dyn UnitOfWork>>,
}

impl EventContext {
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn causation_id(&self) -> Option<&str> {
        self.causation_id.as_deref()
    }

    pub fn unit_of_work(&self) -> Option<&Arc<dyn UnitOfWork>> {
        self.unit_of_work.as_ref()
    }

    /// 当前事务标识（若处于工作单元内）
    pub fn transaction_id(&self) -> Option<Uuid> {
        self.unit_of_work.as_ref().map(|uow| uow.id())
    }

    /// 派生一个以 `unit_of_work` 为当前工作单元的子上下文，原上下文保持不变
    pub fn with_unit_of_work(&self, unit_of_work: Arc<dyn UnitOfWork>) -> Self {
        Self {
            correlation_id: self.correlation_id.clone(),
            causation_id: self.causation_id.clone(),
            unit_of_work: Some(unit_of_work),
        }
    }
}

impl fmt::Debug for EventContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventContext")
            .field("correlation_id", &self.correlation_id)
            .field("causation_id", &self.causation_id)
            .field("transaction_id", &self.transaction_id())
            .finish()
    }
}
