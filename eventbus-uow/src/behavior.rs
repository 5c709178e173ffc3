//! 事务阶段（UnitOfWorkBehavior）
//!
//! 将一次事件处理包裹在工作单元中：
//! - 调用链上已有当前工作单元时（嵌套调用），直接执行下游并返回，由外层负责提交/回滚；
//! - 否则创建新的工作单元并设为子上下文的当前单元，执行下游后提交；
//!   下游失败、提交失败或收到取消信号时回滚，并原样返回最初的错误；
//! - 无论成功与否，作用域结束时恢复上下文并释放工作单元；
//! - 仅在提交成功后调用提交后发布钩子，钩子失败不会回滚已提交的事务。
//!
use crate::provider::UnitOfWorkProvider;
use crate::publisher::{NoopPublisher, PostCommitPublisher};
use crate::scope::UnitOfWorkScope;
use async_trait::async_trait;
use bon::Builder;
use eventbus_core::{
    EventBusError, EventBusResult, EventContext, IntegrationEvent, Next, PipelineBehavior,
    UnitOfWork,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, field, info, info_span, warn};
use uuid::Uuid;

/// 事务阶段配置
#[derive(Clone, Copy, Debug)]
pub struct UnitOfWorkBehaviorConfig {
    /// 开启事务时是否在日志中输出事件内容（`Debug` 格式）
    pub log_payload: bool,
}

impl Default for UnitOfWorkBehaviorConfig {
    fn default() -> Self {
        Self { log_payload: true }
    }
}

/// 事务管道阶段
///
/// ```rust,no_run
/// use eventbus_uow::{InMemoryUnitOfWorkProvider, UnitOfWorkBehavior, UnitOfWorkBehaviorConfig};
/// use std::sync::Arc;
///
/// let behavior = UnitOfWorkBehavior::builder()
///     .provider(Arc::new(InMemoryUnitOfWorkProvider::default()))
///     .config(UnitOfWorkBehaviorConfig { log_payload: false })
///     .build();
/// ```
#[derive(Builder)]
pub struct UnitOfWorkBehavior {
    provider: Arc<dyn UnitOfWorkProvider>,
    #[builder(default = Arc::new(NoopPublisher) as Arc<dyn PostCommitPublisher>)]
    publisher: Arc<dyn PostCommitPublisher>,
    #[builder(default)]
    config: UnitOfWorkBehaviorConfig,
}

impl UnitOfWorkBehavior {
    pub fn new(provider: Arc<dyn UnitOfWorkProvider>) -> Self {
        Self {
            provider,
            publisher: Arc::new(NoopPublisher),
            config: UnitOfWorkBehaviorConfig::default(),
        }
    }

    pub fn config(&self) -> &UnitOfWorkBehaviorConfig {
        &self.config
    }

    async fn handle_in_transaction<E>(
        &self,
        event: &E,
        ctx: &EventContext,
        next: Next<'_, E>,
        cancel: &CancellationToken,
    ) -> EventBusResult<()>
    where
        E: IntegrationEvent,
    {
        let unit_of_work = match self.provider.create().await {
            Ok(unit_of_work) => unit_of_work,
            Err(err) => {
                let err = EventBusError::from(err);
                self.report_failure(event, None, &err);
                return Err(err);
            }
        };

        let transaction_id = unit_of_work.id();
        let span = info_span!("transaction", %transaction_id, event_type = E::NAME);

        let outcome = match self
            .execute_scope(event, ctx, next, cancel, unit_of_work)
            .instrument(span.clone())
            .await
        {
            Ok(()) => self
                .publisher
                .publish_events(transaction_id, cancel)
                .instrument(span)
                .await
                .inspect_err(|err| {
                    error!(
                        %transaction_id,
                        event_type = E::NAME,
                        error = %err,
                        "post-commit publish failed"
                    );
                }),
            Err(err) => Err(err),
        };

        if let Err(err) = &outcome {
            self.report_failure(event, Some(transaction_id), err);
        }
        outcome
    }

    /// 在作用域内执行下游并提交，失败时回滚；返回时子上下文与工作单元均已释放
    async fn execute_scope<E>(
        &self,
        event: &E,
        ctx: &EventContext,
        next: Next<'_, E>,
        cancel: &CancellationToken,
        unit_of_work: Arc<dyn UnitOfWork>,
    ) -> EventBusResult<()>
    where
        E: IntegrationEvent,
    {
        let transaction_id = unit_of_work.id();
        let mut scope = UnitOfWorkScope::new(unit_of_work);
        // 声明在作用域之后：先丢弃待发事件，再释放工作单元
        let mut pending = PendingEvents::new(self.publisher.as_ref(), transaction_id);
        let scoped_ctx = ctx.with_unit_of_work(scope.unit_of_work().clone());

        if self.config.log_payload {
            info!(%transaction_id, event_type = E::NAME, payload = ?event, "begin transaction");
        } else {
            info!(%transaction_id, event_type = E::NAME, "begin transaction");
        }

        let outcome = match run_next(next, &scoped_ctx, cancel).await {
            Ok(()) => {
                info!(%transaction_id, event_type = E::NAME, "commit transaction");
                scope.commit(cancel).await.map_err(EventBusError::from)
            }
            Err(err) => Err(err),
        };

        if let Err(err) = outcome {
            if let Err(rollback_err) = scope.rollback().await {
                error!(
                    %transaction_id,
                    event_type = E::NAME,
                    error = %rollback_err,
                    original_error = %err,
                    "rollback failed"
                );
            }
            return Err(err);
        }

        pending.keep();
        debug!(%transaction_id, event_type = E::NAME, "transaction committed");
        Ok(())
    }

    /// 记录逃逸出本阶段的失败；事务标识未知时省略该字段
    fn report_failure<E>(&self, event: &E, transaction_id: Option<Uuid>, err: &EventBusError)
    where
        E: IntegrationEvent,
    {
        error!(
            transaction_id = transaction_id.map(field::display),
            event_type = E::NAME,
            payload = self.config.log_payload.then(|| field::debug(event)),
            error = %err,
            "error handling transaction"
        );
    }
}

/// 未提交事务的待发事件守卫：除非提交成功后调用 `keep`，否则在释放时通知发布钩子丢弃，
/// 包括处理 future 被中途丢弃的情况
struct PendingEvents<'a> {
    publisher: &'a dyn PostCommitPublisher,
    transaction_id: Uuid,
    committed: bool,
}

impl<'a> PendingEvents<'a> {
    fn new(publisher: &'a dyn PostCommitPublisher, transaction_id: Uuid) -> Self {
        Self {
            publisher,
            transaction_id,
            committed: false,
        }
    }

    fn keep(&mut self) {
        self.committed = true;
    }
}

impl Drop for PendingEvents<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(err) = self.publisher.discard_events(self.transaction_id) {
            warn!(
                transaction_id = %self.transaction_id,
                error = %err,
                "failed to discard pending events"
            );
        }
    }
}

#[async_trait]
impl<E> PipelineBehavior<E> for UnitOfWorkBehavior
where
    E: IntegrationEvent,
{
    async fn handle(
        &self,
        event: &E,
        ctx: &EventContext,
        next: Next<'_, E>,
        cancel: &CancellationToken,
    ) -> EventBusResult<()> {
        match self.provider.current(ctx) {
            Some(current) => {
                let transaction_id = current.id();
                debug!(%transaction_id, event_type = E::NAME, "joining existing transaction");
                next.run(ctx, cancel)
                    .await
                    .inspect_err(|err| self.report_failure(event, Some(transaction_id), err))
            }
            None => self.handle_in_transaction(event, ctx, next, cancel).await,
        }
    }
}

/// 执行下游；取消信号优先，下游成功后若已取消同样视为取消
async fn run_next<E>(
    next: Next<'_, E>,
    ctx: &EventContext,
    cancel: &CancellationToken,
) -> EventBusResult<()>
where
    E: IntegrationEvent,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(EventBusError::Cancelled),
        outcome = next.run(ctx, cancel) => match outcome {
            Ok(()) if cancel.is_cancelled() => Err(EventBusError::Cancelled),
            other => other,
        },
    }
}
