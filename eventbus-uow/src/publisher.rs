//! 提交后发布钩子（PostCommitPublisher）
//!
//! 事务提交成功后，给基础设施（事件总线）一次发出事务期间累积事件的机会。
//! 钩子失败会返回给调用方，但不会导致已提交事务回滚。
//!
use async_trait::async_trait;
use eventbus_core::EventBusResult as Result;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[async_trait]
pub trait PostCommitPublisher: Send + Sync {
    /// 发布事务 `transaction_id` 期间累积的事件，仅在提交成功后调用
    async fn publish_events(&self, transaction_id: Uuid, cancel: &CancellationToken) -> Result<()>;

    /// 丢弃未提交事务累积的事件
    ///
    /// 回滚后以及处理 future 被丢弃时调用；后者发生在 `Drop` 中，因此为同步方法。
    fn discard_events(&self, _transaction_id: Uuid) -> Result<()> {
        Ok(())
    }
}

/// 默认钩子：不做任何事
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopPublisher;

#[async_trait]
impl PostCommitPublisher for NoopPublisher {
    async fn publish_events(
        &self,
        _transaction_id: Uuid,
        _cancel: &CancellationToken,
    ) -> Result<()> {
        Ok(())
    }
}
