use crate::{error::EventBusResult as Result, event::EventEnvelope};
use async_trait::async_trait;
use futures_core::stream::BoxStream;

/// 事件总线：负责分发事件信封与订阅事件流
///
/// 投递语义为“至少尝试一次”：`publish` 返回 `Ok` 即表示总线已接收该事件，
/// 返回错误时该事件未被接收，由调用方决定是否重试。
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: &EventEnvelope) -> Result<()>;

    /// 按顺序批量发布
    ///
    /// 非原子：遇到首个失败即返回该错误，此前的事件已被接收，失败事件及其后的事件
    /// 均未发布。需要精确重试的调用方应逐条调用 `publish` 并记录进度
    /// （参见 `eventbus-uow` 的发件箱发布者）。
    async fn publish_batch(&self, events: &[EventEnvelope]) -> Result<()> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }

    /// 返回一个 'static 生命周期的事件流，便于在 tokio::spawn 中使用
    async fn subscribe(&self) -> BoxStream<'static, Result<EventEnvelope>>;
}
