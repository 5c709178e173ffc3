use async_trait::async_trait;
use eventbus_core::{EventContext, UnitOfWork, UnitOfWorkError};
use std::sync::Arc;

/// 工作单元提供者
///
/// - `create`：创建新的工作单元，但不会将其设为当前单元，设为当前由开启事务作用域的
///   阶段负责；
/// - `current`：读取调用链上的当前工作单元，默认从上下文获取；已结束（非 `Open`）的单元
///   视为不存在，即便上下文在作用域结束后仍被保留（例如 `ctx.clone()` 后另行分发）。
///
/// 自定义工作单元的创建方式（例如绑定连接池、设置隔离级别）即实现本 trait。
#[async_trait]
pub trait UnitOfWorkProvider: Send + Sync {
    async fn create(&self) -> Result<Arc<dyn UnitOfWork>, UnitOfWorkError>;

    fn current(&self, ctx: &EventContext) -> Option<Arc<dyn UnitOfWork>> {
        ctx.unit_of_work()
            .filter(|unit_of_work| unit_of_work.state().is_open())
            .cloned()
    }
}
