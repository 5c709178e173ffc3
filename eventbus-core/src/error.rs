//! 事件管道统一错误定义
//!
//! 聚焦事件处理、工作单元（提交/回滚）、事件总线与提交后发布等最小必要集合，
//! 各阶段的失败均以 `EventBusError` 原样向上传播。
//!
use crate::unit_of_work::UnitOfWorkState;
use thiserror::Error;
use uuid::Uuid;

/// 工作单元错误（创建/提交/回滚/状态校验）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum UnitOfWorkError {
    #[error("unit of work creation failed: {reason}")]
    Create { reason: String },
    #[error("commit failed: transaction={transaction_id}, reason={reason}")]
    Commit { transaction_id: Uuid, reason: String },
    #[error("rollback failed: transaction={transaction_id}, reason={reason}")]
    Rollback { transaction_id: Uuid, reason: String },
    #[error(
        "invalid unit of work state: transaction={transaction_id}, state={state:?}, operation={operation}"
    )]
    InvalidState {
        transaction_id: Uuid,
        state: UnitOfWorkState,
        operation: &'static str,
    },
}

impl UnitOfWorkError {
    pub fn commit(transaction_id: Uuid, reason: impl Into<String>) -> Self {
        Self::Commit {
            transaction_id,
            reason: reason.into(),
        }
    }

    pub fn rollback(transaction_id: Uuid, reason: impl Into<String>) -> Self {
        Self::Rollback {
            transaction_id,
            reason: reason.into(),
        }
    }
}

/// 统一错误类型
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EventBusError {
    // --- 事件处理 ---
    #[error("event handler error: handler={handler}, reason={reason}")]
    EventHandler { handler: String, reason: String },
    #[error("operation cancelled")]
    Cancelled,

    // --- 工作单元 ---
    #[error("unit of work: {0}")]
    UnitOfWork(#[from] UnitOfWorkError),
    #[error("no active transaction for event {event_type}")]
    NoActiveTransaction { event_type: &'static str },

    // --- 事件总线/发布 ---
    #[error("event bus error: {reason}")]
    EventBus { reason: String },
    #[error("publish failed: transaction={transaction_id}, reason={reason}")]
    Publish { transaction_id: Uuid, reason: String },

    // --- 序列化 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },

    // --- 通用 ---
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EventBusError {
    pub fn event_handler(handler: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EventHandler {
            handler: handler.into(),
            reason: reason.into(),
        }
    }

    pub fn event_bus(reason: impl Into<String>) -> Self {
        Self::EventBus {
            reason: reason.into(),
        }
    }

    /// 是否由取消信号导致
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// 统一 Result 类型别名
pub type EventBusResult<T> = Result<T, EventBusError>;
