use super::{IntegrationEventHandler, Next, PipelineBehavior};
use crate::{context::EventContext, error::EventBusResult, event::IntegrationEvent};
use async_trait::async_trait;
use bon::Builder;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 事件处理管道：按注册顺序执行阶段，最终交由处理器
///
/// 先注册的阶段位于外层，例如 `[事务, 审计]` 时事务包裹审计与处理器。
#[derive(Builder)]
pub struct PipelineChain<E>
where
    E: IntegrationEvent,
{
    handler: Arc<dyn IntegrationEventHandler<E>>,
    #[builder(default)]
    behaviors: Vec<Arc<dyn PipelineBehavior<E>>>,
}

impl<E> PipelineChain<E>
where
    E: IntegrationEvent,
{
    pub fn new(handler: Arc<dyn IntegrationEventHandler<E>>) -> Self {
        Self {
            handler,
            behaviors: Vec::new(),
        }
    }

    /// 追加一个阶段（位于已注册阶段的内层）
    pub fn with_behavior(mut self, behavior: Arc<dyn PipelineBehavior<E>>) -> Self {
        self.behaviors.push(behavior);
        self
    }

    pub fn behaviors(&self) -> &[Arc<dyn PipelineBehavior<E>>] {
        &self.behaviors
    }

    /// 分发事件
    pub async fn dispatch(
        &self,
        event: &E,
        ctx: &EventContext,
        cancel: &CancellationToken,
    ) -> EventBusResult<()> {
        Next::new(event, &self.behaviors, self.handler.as_ref())
            .run(ctx, cancel)
            .await
    }
}

impl<E> Clone for PipelineChain<E>
where
    E: IntegrationEvent,
{
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            behaviors: self.behaviors.clone(),
        }
    }
}

// 管道本身也可作为处理器，嵌入到另一条管道的末端
#[async_trait]
impl<E> IntegrationEventHandler<E> for PipelineChain<E>
where
    E: IntegrationEvent,
{
    async fn handle(
        &self,
        event: &E,
        ctx: &EventContext,
        cancel: &CancellationToken,
    ) -> EventBusResult<()> {
        self.dispatch(event, ctx, cancel).await
    }
}
