//! 事件总线（EventBus）
//!
//! 定义事件发布与订阅的统一抽象；事务阶段只在提交成功后通过提交后发布钩子
//! 间接使用总线，本模块不绑定具体传输实现。
//!
mod event_bus;
#[cfg(feature = "inmemory")]
mod inmemory;

pub use event_bus::EventBus;
#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryEventBus;
