/// 事务管道（内存版）示例
/// 展示 事务阶段 -> 处理器暂存记录并登记发件箱事件 -> 提交 -> 经总线发布 的闭环，
/// 以及处理失败时的回滚与事件丢弃
use async_trait::async_trait;
use eventbus_core::bus::{EventBus, InMemoryEventBus};
use eventbus_core::{
    EventBusError, EventBusResult, EventContext, IntegrationEvent, IntegrationEventHandler,
    PipelineChain,
};
use eventbus_uow::{
    InMemoryStore, InMemoryUnitOfWorkProvider, OutboxPublisher, TransactionalOutbox,
    UnitOfWorkBehavior, UnitOfWorkBehaviorConfig,
};
use futures_util::StreamExt;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Serialize)]
struct PaymentReceived {
    order_id: u32,
    amount: u64,
}

impl IntegrationEvent for PaymentReceived {
    const NAME: &'static str = "PaymentReceived";
}

#[derive(Debug, Serialize)]
struct OrderPaid {
    order_id: u32,
}

impl IntegrationEvent for OrderPaid {
    const NAME: &'static str = "OrderPaid";
}

struct PaymentHandler {
    provider: InMemoryUnitOfWorkProvider,
    outbox: TransactionalOutbox,
}

#[async_trait]
impl IntegrationEventHandler<PaymentReceived> for PaymentHandler {
    async fn handle(
        &self,
        event: &PaymentReceived,
        ctx: &EventContext,
        _cancel: &CancellationToken,
    ) -> EventBusResult<()> {
        let unit = self
            .provider
            .resolve(ctx)
            .ok_or(EventBusError::NoActiveTransaction {
                event_type: PaymentReceived::NAME,
            })?;

        unit.stage(event)?;
        self.outbox.enqueue(
            ctx,
            &OrderPaid {
                order_id: event.order_id,
            },
        )?;

        if event.amount == 0 {
            return Err(EventBusError::event_handler("payment", "zero amount"));
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let store = InMemoryStore::new();
    let provider = InMemoryUnitOfWorkProvider::new(store.clone());
    let outbox = TransactionalOutbox::new();
    let bus = Arc::new(InMemoryEventBus::new(16));
    let mut stream = bus.subscribe().await;

    let behavior = UnitOfWorkBehavior::builder()
        .provider(Arc::new(provider.clone()))
        .publisher(Arc::new(OutboxPublisher::new(outbox.clone(), bus.clone())))
        .config(UnitOfWorkBehaviorConfig { log_payload: true })
        .build();
    let chain = PipelineChain::<PaymentReceived>::new(Arc::new(PaymentHandler {
        provider,
        outbox,
    }))
    .with_behavior(Arc::new(behavior));

    let ctx = EventContext::builder()
        .correlation_id("cor-1".into())
        .build();
    let cancel = CancellationToken::new();

    chain
        .dispatch(
            &PaymentReceived {
                order_id: 1,
                amount: 100,
            },
            &ctx,
            &cancel,
        )
        .await?;

    if let Err(err) = chain
        .dispatch(
            &PaymentReceived {
                order_id: 2,
                amount: 0,
            },
            &ctx,
            &cancel,
        )
        .await
    {
        println!("payment 2 rolled back: {err}");
    }

    if let Some(published) = stream.next().await {
        let published = published?;
        println!(
            "published {} for transaction {:?}: {}",
            published.event_type(),
            published.transaction_id(),
            published.payload()
        );
    }
    println!("committed records: {:?}", store.records());

    Ok(())
}
