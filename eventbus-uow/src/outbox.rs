//! 事务发件箱（TransactionalOutbox）
//!
//! 处理器在事务内登记需要对外发布的事件，按事务标识归集：
//! - 提交成功后由 `OutboxPublisher` 取出并经事件总线逐条发布，发布中断时未发出的
//!   事件留在发件箱中等待重试；
//! - 回滚或处理被放弃后由事务阶段通知丢弃，未提交的事件永不外发。
//!
use crate::publisher::PostCommitPublisher;
use async_trait::async_trait;
use dashmap::DashMap;
use eventbus_core::bus::EventBus;
use eventbus_core::{EventBusError, EventBusResult, EventContext, EventEnvelope, IntegrationEvent};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct TransactionalOutbox {
    pending: Arc<DashMap<Uuid, Vec<EventEnvelope>>>,
}

impl TransactionalOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在当前事务中登记事件，返回事件标识
    pub fn enqueue<E>(&self, ctx: &EventContext, event: &E) -> EventBusResult<Uuid>
    where
        E: IntegrationEvent,
    {
        let transaction_id = ctx
            .transaction_id()
            .ok_or(EventBusError::NoActiveTransaction { event_type: E::NAME })?;
        let envelope = EventEnvelope::new(event, ctx)?;
        let event_id = envelope.event_id();
        self.pending.entry(transaction_id).or_default().push(envelope);
        Ok(event_id)
    }

    /// 事务下待发布的事件数
    pub fn pending(&self, transaction_id: Uuid) -> usize {
        self.pending
            .get(&transaction_id)
            .map(|events| events.len())
            .unwrap_or(0)
    }

    /// 取出事务下的全部事件
    pub fn take(&self, transaction_id: Uuid) -> Vec<EventEnvelope> {
        self.pending
            .remove(&transaction_id)
            .map(|(_, events)| events)
            .unwrap_or_default()
    }

    /// 丢弃事务下的全部事件，返回丢弃数量
    pub fn discard(&self, transaction_id: Uuid) -> usize {
        self.take(transaction_id).len()
    }

    /// 将未发出的事件放回事务队列头部，保持原有顺序
    fn requeue(&self, transaction_id: Uuid, events: Vec<EventEnvelope>) {
        if events.is_empty() {
            return;
        }
        let mut pending = self.pending.entry(transaction_id).or_default();
        let later = std::mem::replace(pending.value_mut(), events);
        pending.extend(later);
    }
}

/// 提交后经事件总线发布发件箱事件
pub struct OutboxPublisher {
    outbox: TransactionalOutbox,
    bus: Arc<dyn EventBus>,
}

impl OutboxPublisher {
    pub fn new(outbox: TransactionalOutbox, bus: Arc<dyn EventBus>) -> Self {
        Self { outbox, bus }
    }

    pub fn outbox(&self) -> &TransactionalOutbox {
        &self.outbox
    }
}

#[async_trait]
impl PostCommitPublisher for OutboxPublisher {
    // 已提交的事件必须发出，因此不响应取消。
    // 逐条发布：失败时已发出的事件不再重复，其余事件放回发件箱，可再次调用本方法重试
    async fn publish_events(
        &self,
        transaction_id: Uuid,
        _cancel: &CancellationToken,
    ) -> EventBusResult<()> {
        let mut events = self.outbox.take(transaction_id).into_iter();
        let mut published = 0usize;

        while let Some(event) = events.next() {
            if let Err(err) = self.bus.publish(&event).await {
                let unsent: Vec<_> = std::iter::once(event).chain(events).collect();
                warn!(
                    %transaction_id,
                    published,
                    requeued = unsent.len(),
                    error = %err,
                    "outbox publish interrupted"
                );
                self.outbox.requeue(transaction_id, unsent);
                return Err(EventBusError::Publish {
                    transaction_id,
                    reason: err.to_string(),
                });
            }
            published += 1;
        }

        if published > 0 {
            debug!(%transaction_id, count = published, "published outbox events");
        }
        Ok(())
    }

    fn discard_events(&self, transaction_id: Uuid) -> EventBusResult<()> {
        let dropped = self.outbox.discard(transaction_id);
        if dropped > 0 {
            debug!(%transaction_id, count = dropped, "discarded outbox events");
        }
        Ok(())
    }
}
