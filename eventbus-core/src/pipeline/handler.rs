use crate::{context::EventContext, error::EventBusResult, event::IntegrationEvent};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// 事件处理器：管道末端，处理某一类型的集成事件
#[async_trait]
pub trait IntegrationEventHandler<E>: Send + Sync
where
    E: IntegrationEvent,
{
    async fn handle(
        &self,
        event: &E,
        ctx: &EventContext,
        cancel: &CancellationToken,
    ) -> EventBusResult<()>;
}
