//! 事务管道阶段（eventbus-uow）
//!
//! 以工作单元包裹一次事件处理：提交或回滚由开启作用域的那一层负责，
//! 嵌套调用加入已有事务。同时提供：
//! - `UnitOfWorkProvider`：工作单元的创建与当前单元查询；
//! - `UnitOfWorkScope`：保证提交/回滚至多一次、释放恰好一次的作用域守卫；
//! - `PostCommitPublisher`：提交后发布钩子及事务发件箱实现；
//! - 内存版工作单元，便于测试与本地开发。
//!
pub mod behavior;
pub mod in_memory;
pub mod outbox;
pub mod provider;
pub mod publisher;
pub mod scope;

pub use behavior::{UnitOfWorkBehavior, UnitOfWorkBehaviorConfig};
pub use in_memory::{InMemoryStore, InMemoryUnitOfWork, InMemoryUnitOfWorkProvider};
pub use outbox::{OutboxPublisher, TransactionalOutbox};
pub use provider::UnitOfWorkProvider;
pub use publisher::{NoopPublisher, PostCommitPublisher};
pub use scope::UnitOfWorkScope;
