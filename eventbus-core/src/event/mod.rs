//! 集成事件（Integration Event）与事件信封
//!
//! 定义进入管道的事件需要实现的最小接口（`IntegrationEvent`），以及将事件与
//! 上下文、事务标识一同序列化后的 `EventEnvelope`，供总线与发件箱使用。

mod envelope;
mod integration_event;

pub use envelope::EventEnvelope;
pub use integration_event::IntegrationEvent;
