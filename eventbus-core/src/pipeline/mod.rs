//! 事件处理管道（pipeline）
//!
//! 以可组合的阶段（`PipelineBehavior`）包裹事件处理：
//! - `IntegrationEventHandler`：管道末端的事件处理器；
//! - `PipelineBehavior`：可在下游处理前后执行逻辑的阶段（事务、审计等）；
//! - `Next`：“继续处理”动作，按值消费，每次调用至多执行一次；
//! - `PipelineChain`：按顺序组合阶段与处理器并分发事件。
//!
//! 该模块不涉及事件路由、序列化或重试，仅定义阶段之间的调用契约。
//!
mod behavior;
mod chain;
mod handler;
mod next;

pub use behavior::PipelineBehavior;
pub use chain::PipelineChain;
pub use handler::IntegrationEventHandler;
pub use next::Next;
