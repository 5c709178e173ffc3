use super::IntegrationEvent;
use crate::{context::EventContext, error::EventBusResult};
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// 事件信封：事件在总线/发件箱中的标准形态
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// 事件唯一标识符
    event_id: Uuid,
    /// 事件类型，取自 `IntegrationEvent::NAME`
    event_type: String,
    /// 事件发生时间
    occurred_at: DateTime<Utc>,
    /// 关联 ID，用于将多个事件关联到同一个业务操作
    correlation_id: Option<String>,
    /// 因果 ID，用于表示事件的触发来源
    causation_id: Option<String>,
    /// 产生该事件的事务
    transaction_id: Option<Uuid>,
    /// 事件负载
    payload: Value,
}

impl EventEnvelope {
    /// 序列化事件，并从上下文复制关联信息与当前事务标识
    pub fn new<E>(event: &E, ctx: &EventContext) -> EventBusResult<Self>
    where
        E: IntegrationEvent,
    {
        Ok(Self {
            event_id: Uuid::new_v4(),
            event_type: E::NAME.to_string(),
            occurred_at: Utc::now(),
            correlation_id: ctx.correlation_id().map(str::to_string),
            causation_id: ctx.causation_id().map(str::to_string),
            transaction_id: ctx.transaction_id(),
            payload: serde_json::to_value(event)?,
        })
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn causation_id(&self) -> Option<&str> {
        self.causation_id.as_deref()
    }

    pub fn transaction_id(&self) -> Option<Uuid> {
        self.transaction_id
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }
}
