//! 工作单元作用域（UnitOfWorkScope）
//!
//! 持有一次事务作用域内创建的工作单元，保证：
//! - `commit` / `rollback` 各至多尝试一次，提交成功后不再允许回滚；
//! - 作用域结束（包括提前返回、错误与 future 被丢弃）时恰好释放一次工作单元；
//! - 既未提交也未回滚即结束时，记录一条放弃告警（由调用方记录，而非工作单元本身）。
//!
use eventbus_core::{UnitOfWork, UnitOfWorkError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use uuid::Uuid;

pub struct UnitOfWorkScope {
    unit_of_work: Arc<dyn UnitOfWork>,
    commit_attempted: bool,
    rollback_attempted: bool,
    committed: bool,
}

impl UnitOfWorkScope {
    pub fn new(unit_of_work: Arc<dyn UnitOfWork>) -> Self {
        Self {
            unit_of_work,
            commit_attempted: false,
            rollback_attempted: false,
            committed: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.unit_of_work.id()
    }

    pub fn unit_of_work(&self) -> &Arc<dyn UnitOfWork> {
        &self.unit_of_work
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    pub async fn commit(&mut self, cancel: &CancellationToken) -> Result<(), UnitOfWorkError> {
        if self.commit_attempted || self.rollback_attempted {
            return Err(self.refuse("commit"));
        }
        self.commit_attempted = true;
        self.unit_of_work.commit(cancel).await?;
        self.committed = true;
        Ok(())
    }

    pub async fn rollback(&mut self) -> Result<(), UnitOfWorkError> {
        if self.rollback_attempted || self.committed {
            return Err(self.refuse("rollback"));
        }
        self.rollback_attempted = true;
        self.unit_of_work.rollback().await
    }

    fn refuse(&self, operation: &'static str) -> UnitOfWorkError {
        UnitOfWorkError::InvalidState {
            transaction_id: self.id(),
            state: self.unit_of_work.state(),
            operation,
        }
    }
}

impl Drop for UnitOfWorkScope {
    fn drop(&mut self) {
        if !self.commit_attempted && !self.rollback_attempted {
            warn!(
                transaction_id = %self.id(),
                "unit of work abandoned without commit or rollback"
            );
        }
        self.unit_of_work.dispose();
    }
}
