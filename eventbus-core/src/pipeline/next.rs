use super::{IntegrationEventHandler, PipelineBehavior};
use crate::{context::EventContext, error::EventBusResult, event::IntegrationEvent};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 继续处理动作
///
/// 持有剩余阶段与末端处理器；`run` 按值消费，保证每个阶段至多调用一次下游。
pub struct Next<'a, E>
where
    E: IntegrationEvent,
{
    event: &'a E,
    behaviors: &'a [Arc<dyn PipelineBehavior<E>>],
    handler: &'a dyn IntegrationEventHandler<E>,
}

impl<'a, E> Next<'a, E>
where
    E: IntegrationEvent,
{
    pub fn new(
        event: &'a E,
        behaviors: &'a [Arc<dyn PipelineBehavior<E>>],
        handler: &'a dyn IntegrationEventHandler<E>,
    ) -> Self {
        Self {
            event,
            behaviors,
            handler,
        }
    }

    /// 剩余阶段数（不含末端处理器）
    pub fn remaining(&self) -> usize {
        self.behaviors.len()
    }

    /// 执行剩余阶段，最终交由处理器处理
    pub async fn run(self, ctx: &EventContext, cancel: &CancellationToken) -> EventBusResult<()> {
        match self.behaviors.split_first() {
            Some((behavior, rest)) => {
                let next = Next::new(self.event, rest, self.handler);
                behavior.handle(self.event, ctx, next, cancel).await
            }
            None => self.handler.handle(self.event, ctx, cancel).await,
        }
    }
}
