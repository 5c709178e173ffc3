//! 事件管道基础库（eventbus-core）
//!
//! 提供事件处理管道的通用协议与构件：
//! - 集成事件（`event`）与事件信封
//! - 调用链上下文（`context`），显式承载当前工作单元
//! - 管道（`pipeline`）：阶段、继续动作与处理器
//! - 事件总线（`bus`）及其内存实现
//! - 工作单元协议（`unit_of_work`）与统一错误（`error`）
//!
//! 本 crate 不绑定事务技术与消息中间件，仅定义契约；事务阶段等实现位于
//! `eventbus-uow`。
//!
pub mod bus;
pub mod context;
pub mod error;
pub mod event;
pub mod pipeline;
pub mod unit_of_work;

pub use context::EventContext;
pub use error::{EventBusError, EventBusResult, UnitOfWorkError};
pub use event::{EventEnvelope, IntegrationEvent};
pub use pipeline::{IntegrationEventHandler, Next, PipelineBehavior, PipelineChain};
pub use unit_of_work::{UnitOfWork, UnitOfWorkState};
