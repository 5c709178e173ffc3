//! 工作单元（UnitOfWork）协议
//!
//! 一个工作单元代表一次事务性作用域：同一作用域内产生的副作用要么整体提交，
//! 要么整体回滚。本模块仅定义协议，具体事务技术（数据库事务等）由基础设施实现。
//!
//! 状态机：`Open → Committed | RolledBack`，任意状态均可 `dispose` 至 `Disposed`。
//!
use crate::error::UnitOfWorkError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// 工作单元状态
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitOfWorkState {
    Open,
    Committed,
    RolledBack,
    Disposed,
}

impl UnitOfWorkState {
    /// 是否仍可提交或回滚
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

/// 工作单元：一次事务性作用域
///
/// - `id` 在创建时生成且不可变，作为事务标识；
/// - `commit` / `rollback` 仅在 `Open` 状态下允许，且各至多一次；
/// - `dispose` 幂等，在任意状态下释放底层资源（未提交即视为放弃）。
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// 事务标识
    fn id(&self) -> Uuid;

    /// 当前状态
    fn state(&self) -> UnitOfWorkState;

    /// 提交：`Open → Committed`
    async fn commit(&self, cancel: &CancellationToken) -> Result<(), UnitOfWorkError>;

    /// 回滚：`Open → RolledBack`
    ///
    /// 不接收取消信号：取消发生后仍需完成补偿。
    async fn rollback(&self) -> Result<(), UnitOfWorkError>;

    /// 释放底层资源，幂等
    fn dispose(&self);
}
