//! 集成测试公共设施：可编排故障的 Spy 工作单元/提供者/发布钩子/处理器，
//! 以及捕获 tracing 日志的 Layer。
#![allow(dead_code)]

use async_trait::async_trait;
use eventbus_core::{
    EventBusError, EventBusResult, EventContext, IntegrationEvent, IntegrationEventHandler,
    UnitOfWork, UnitOfWorkError, UnitOfWorkState,
};
use eventbus_uow::{PostCommitPublisher, UnitOfWorkProvider};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Registry;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use uuid::Uuid;

// ============================================================================
// 事件
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct OrderPlaced {
    pub order_id: u32,
}

impl IntegrationEvent for OrderPlaced {
    const NAME: &'static str = "OrderPlaced";
}

#[derive(Debug, Clone, Serialize)]
pub struct StockReserved {
    pub order_id: u32,
}

impl IntegrationEvent for StockReserved {
    const NAME: &'static str = "StockReserved";
}

// ============================================================================
// 调用日志与故障编排
// ============================================================================

/// 按调用顺序记录 create/next/commit/rollback/dispose/publish/discard
#[derive(Clone, Default)]
pub struct Journal {
    inner: Arc<Mutex<Vec<&'static str>>>,
}

impl Journal {
    pub fn push(&self, entry: &'static str) {
        self.inner.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<&'static str> {
        self.inner.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .filter(|e| **e == entry)
            .count()
    }
}

#[derive(Clone, Copy, Default)]
pub struct Faults {
    pub create: Option<&'static str>,
    pub commit: Option<&'static str>,
    pub rollback: Option<&'static str>,
    pub publish: Option<&'static str>,
}

// ============================================================================
// Spy 工作单元与提供者
// ============================================================================

pub struct SpyUnitOfWork {
    id: Uuid,
    journal: Journal,
    faults: Faults,
    state: Mutex<UnitOfWorkState>,
}

impl SpyUnitOfWork {
    pub fn new(journal: Journal, faults: Faults) -> Self {
        Self {
            id: Uuid::new_v4(),
            journal,
            faults,
            state: Mutex::new(UnitOfWorkState::Open),
        }
    }
}

#[async_trait]
impl UnitOfWork for SpyUnitOfWork {
    fn id(&self) -> Uuid {
        self.id
    }

    fn state(&self) -> UnitOfWorkState {
        *self.state.lock().unwrap()
    }

    async fn commit(&self, _cancel: &CancellationToken) -> Result<(), UnitOfWorkError> {
        self.journal.push("commit");
        if let Some(reason) = self.faults.commit {
            return Err(UnitOfWorkError::commit(self.id, reason));
        }
        *self.state.lock().unwrap() = UnitOfWorkState::Committed;
        Ok(())
    }

    async fn rollback(&self) -> Result<(), UnitOfWorkError> {
        self.journal.push("rollback");
        if let Some(reason) = self.faults.rollback {
            return Err(UnitOfWorkError::rollback(self.id, reason));
        }
        *self.state.lock().unwrap() = UnitOfWorkState::RolledBack;
        Ok(())
    }

    fn dispose(&self) {
        self.journal.push("dispose");
        *self.state.lock().unwrap() = UnitOfWorkState::Disposed;
    }
}

pub struct SpyProvider {
    journal: Journal,
    faults: Faults,
    created: Mutex<Vec<Uuid>>,
}

impl SpyProvider {
    pub fn new(journal: &Journal, faults: Faults) -> Arc<Self> {
        Arc::new(Self {
            journal: journal.clone(),
            faults,
            created: Mutex::new(Vec::new()),
        })
    }

    pub fn created(&self) -> Vec<Uuid> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl UnitOfWorkProvider for SpyProvider {
    async fn create(&self) -> Result<Arc<dyn UnitOfWork>, UnitOfWorkError> {
        self.journal.push("create");
        if let Some(reason) = self.faults.create {
            return Err(UnitOfWorkError::Create {
                reason: reason.into(),
            });
        }
        let unit = SpyUnitOfWork::new(self.journal.clone(), self.faults);
        self.created.lock().unwrap().push(unit.id);
        Ok(Arc::new(unit))
    }
}

// ============================================================================
// Spy 提交后发布钩子
// ============================================================================

pub struct SpyPublisher {
    journal: Journal,
    faults: Faults,
    published: Mutex<Vec<Uuid>>,
}

impl SpyPublisher {
    pub fn new(journal: &Journal, faults: Faults) -> Arc<Self> {
        Arc::new(Self {
            journal: journal.clone(),
            faults,
            published: Mutex::new(Vec::new()),
        })
    }

    pub fn published(&self) -> Vec<Uuid> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl PostCommitPublisher for SpyPublisher {
    async fn publish_events(
        &self,
        transaction_id: Uuid,
        _cancel: &CancellationToken,
    ) -> EventBusResult<()> {
        self.journal.push("publish");
        self.published.lock().unwrap().push(transaction_id);
        if let Some(reason) = self.faults.publish {
            return Err(EventBusError::Publish {
                transaction_id,
                reason: reason.into(),
            });
        }
        Ok(())
    }

    fn discard_events(&self, _transaction_id: Uuid) -> EventBusResult<()> {
        self.journal.push("discard");
        Ok(())
    }
}

// ============================================================================
// 处理器
// ============================================================================

#[derive(Clone, Copy)]
pub enum Script {
    Succeed,
    Fail(&'static str),
    /// 永不完成，用于取消与 future 丢弃场景
    Hang,
    /// 触发取消信号后仍然成功返回
    CancelThenSucceed,
}

/// 记录调用并按脚本返回的末端处理器
pub struct ScriptedHandler {
    journal: Journal,
    script: Script,
    seen: Mutex<Vec<Option<Uuid>>>,
}

impl ScriptedHandler {
    pub fn new(journal: &Journal, script: Script) -> Arc<Self> {
        Arc::new(Self {
            journal: journal.clone(),
            script,
            seen: Mutex::new(Vec::new()),
        })
    }

    /// 每次调用时上下文中的事务标识
    pub fn seen(&self) -> Vec<Option<Uuid>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl<E> IntegrationEventHandler<E> for ScriptedHandler
where
    E: IntegrationEvent,
{
    async fn handle(
        &self,
        _event: &E,
        ctx: &EventContext,
        cancel: &CancellationToken,
    ) -> EventBusResult<()> {
        self.journal.push("next");
        self.seen.lock().unwrap().push(ctx.transaction_id());
        match self.script {
            Script::Succeed => Ok(()),
            Script::Fail(reason) => Err(EventBusError::event_handler("scripted", reason)),
            Script::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
            Script::CancelThenSucceed => {
                cancel.cancel();
                Ok(())
            }
        }
    }
}

// ============================================================================
// 日志捕获
// ============================================================================

#[derive(Clone, Debug)]
pub struct LogRecord {
    pub level: Level,
    pub fields: HashMap<String, String>,
}

impl LogRecord {
    pub fn message(&self) -> &str {
        self.field("message").unwrap_or_default()
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[derive(Clone, Default)]
pub struct CapturedLogs {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl CapturedLogs {
    /// 安装为当前线程的默认订阅者，guard 释放后恢复
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        tracing::subscriber::set_default(Registry::default().with(self.clone()))
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn with_message(&self, message: &str) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.message() == message)
            .collect()
    }
}

struct FieldVisitor<'a>(&'a mut HashMap<String, String>);

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

impl<S> Layer<S> for CapturedLogs
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        event.record(&mut FieldVisitor(&mut fields));
        self.records.lock().unwrap().push(LogRecord {
            level: *event.metadata().level(),
            fields,
        });
    }
}
