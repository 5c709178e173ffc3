//! 内存版工作单元（InMemoryUnitOfWork）
//!
//! 记录以 JSON 形式暂存在工作单元内，提交时整体写入共享的 `InMemoryStore`，
//! 回滚或放弃时丢弃。典型用途：测试环境、示例与本地开发。
//!
use crate::provider::UnitOfWorkProvider;
use async_trait::async_trait;
use dashmap::DashMap;
use eventbus_core::{
    EventBusResult, EventContext, UnitOfWork, UnitOfWorkError, UnitOfWorkState,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

type ActiveUnits = Arc<DashMap<Uuid, Weak<InMemoryUnitOfWork>>>;

/// 已提交记录的共享存储
#[derive(Clone, Default)]
pub struct InMemoryStore {
    records: Arc<Mutex<Vec<Value>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已提交记录快照
    pub fn records(&self) -> Vec<Value> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn apply(&self, batch: Vec<Value>) {
        self.lock().extend(batch);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Value>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct Inner {
    state: UnitOfWorkState,
    staged: Vec<Value>,
}

pub struct InMemoryUnitOfWork {
    id: Uuid,
    store: InMemoryStore,
    active: Option<ActiveUnits>,
    inner: Mutex<Inner>,
}

impl InMemoryUnitOfWork {
    pub fn new(store: InMemoryStore) -> Self {
        Self::with_registry(store, None)
    }

    fn with_registry(store: InMemoryStore, active: Option<ActiveUnits>) -> Self {
        Self {
            id: Uuid::new_v4(),
            store,
            active,
            inner: Mutex::new(Inner {
                state: UnitOfWorkState::Open,
                staged: Vec::new(),
            }),
        }
    }

    /// 暂存一条记录，提交时统一写入存储
    pub fn stage<T>(&self, record: &T) -> EventBusResult<()>
    where
        T: Serialize,
    {
        let value = serde_json::to_value(record)?;
        let mut inner = self.lock();
        self.ensure_open(&inner, "stage")?;
        inner.staged.push(value);
        Ok(())
    }

    pub fn staged_len(&self) -> usize {
        self.lock().staged.len()
    }

    fn ensure_open(&self, inner: &Inner, operation: &'static str) -> Result<(), UnitOfWorkError> {
        if inner.state.is_open() {
            Ok(())
        } else {
            Err(UnitOfWorkError::InvalidState {
                transaction_id: self.id,
                state: inner.state,
                operation,
            })
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn id(&self) -> Uuid {
        self.id
    }

    fn state(&self) -> UnitOfWorkState {
        self.lock().state
    }

    async fn commit(&self, _cancel: &CancellationToken) -> Result<(), UnitOfWorkError> {
        let mut inner = self.lock();
        self.ensure_open(&inner, "commit")?;
        let staged = std::mem::take(&mut inner.staged);
        self.store.apply(staged);
        inner.state = UnitOfWorkState::Committed;
        Ok(())
    }

    async fn rollback(&self) -> Result<(), UnitOfWorkError> {
        let mut inner = self.lock();
        self.ensure_open(&inner, "rollback")?;
        inner.staged.clear();
        inner.state = UnitOfWorkState::RolledBack;
        Ok(())
    }

    fn dispose(&self) {
        let mut inner = self.lock();
        if inner.state == UnitOfWorkState::Disposed {
            return;
        }
        inner.staged.clear();
        inner.state = UnitOfWorkState::Disposed;
        if let Some(active) = &self.active {
            active.remove(&self.id);
        }
    }
}

/// 内存版工作单元提供者：所有工作单元共享同一存储
#[derive(Clone, Default)]
pub struct InMemoryUnitOfWorkProvider {
    store: InMemoryStore,
    active: ActiveUnits,
    created: Arc<AtomicUsize>,
}

impl InMemoryUnitOfWorkProvider {
    pub fn new(store: InMemoryStore) -> Self {
        Self {
            store,
            ..Default::default()
        }
    }

    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }

    /// 累计创建的工作单元数
    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    /// 尚未释放的工作单元数
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// 取得上下文当前事务对应的内存工作单元，用于在处理器中暂存记录
    pub fn resolve(&self, ctx: &EventContext) -> Option<Arc<InMemoryUnitOfWork>> {
        let transaction_id = ctx.transaction_id()?;
        self.active.get(&transaction_id).and_then(|unit| unit.upgrade())
    }
}

#[async_trait]
impl UnitOfWorkProvider for InMemoryUnitOfWorkProvider {
    async fn create(&self) -> Result<Arc<dyn UnitOfWork>, UnitOfWorkError> {
        let unit = Arc::new(InMemoryUnitOfWork::with_registry(
            self.store.clone(),
            Some(self.active.clone()),
        ));
        self.active.insert(unit.id, Arc::downgrade(&unit));
        self.created.fetch_add(1, Ordering::Relaxed);
        Ok(unit)
    }
}
