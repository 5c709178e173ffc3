use super::Next;
use crate::{context::EventContext, error::EventBusResult, event::IntegrationEvent};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// 管道阶段：包裹下游处理，可在 `next` 前后执行逻辑
///
/// - `ctx`：当前调用链上下文，阶段可派生子上下文交给下游；
/// - `next`：继续处理动作，未调用即短路下游；
/// - 下游失败应原样向上传播。
#[async_trait]
pub trait PipelineBehavior<E>: Send + Sync
where
    E: IntegrationEvent,
{
    async fn handle(
        &self,
        event: &E,
        ctx: &EventContext,
        next: Next<'_, E>,
        cancel: &CancellationToken,
    ) -> EventBusResult<()>;
}
