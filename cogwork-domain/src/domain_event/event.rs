use super::{EventPayload, EventPriority, EventStatus};
use crate::error::{DomainError, DomainResult};
use bon::bon;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// 事件默认的最大重试次数
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// 领域事件：描述某个聚合上已经发生的事实
///
/// 除生命周期状态外不可变；状态标记（`mark_as_*`/`with_retry`）总是返回新的副本，
/// 已写入事件存储的原件不会被修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    /// 事件唯一标识，创建时分配
    event_id: String,
    /// 事件语义类型
    event_type: String,
    /// 聚合 ID
    aggregate_id: String,
    /// 聚合类型
    aggregate_type: String,
    /// 聚合事件流中的版本，由生产方负责递增
    version: u64,
    /// 事件发生时间，创建时确定
    occurred_on: DateTime<Utc>,
    /// 直接导致本事件的事件 ID
    causation_id: Option<String>,
    /// 同一业务操作内所有事件共享的关联 ID
    correlation_id: Option<String>,
    priority: EventPriority,
    status: EventStatus,
    retry_count: u32,
    max_retries: u32,
    /// 生产方提供的上下文信息
    metadata: Map<String, Value>,
    /// 事件载荷（具体事件的业务字段）
    payload: Value,
}

#[bon]
impl DomainEvent {
    /// 构造新事件
    ///
    /// 若未提供 `correlation_id` 而提供了 `causation_id`，则关联 ID 继承因果 ID，
    /// 从而自动建立关联链。
    #[builder]
    pub fn new(
        #[builder(into)] event_type: String,
        #[builder(into)] aggregate_id: String,
        #[builder(into)] aggregate_type: String,
        #[builder(default = 1)] version: u64,
        #[builder(into)] causation_id: Option<String>,
        #[builder(into)] correlation_id: Option<String>,
        #[builder(default)] priority: EventPriority,
        #[builder(default = DEFAULT_MAX_RETRIES)] max_retries: u32,
        #[builder(default)] metadata: Map<String, Value>,
        #[builder(default)] payload: Value,
        occurred_on: Option<DateTime<Utc>>,
    ) -> Self {
        let correlation_id = correlation_id.or_else(|| causation_id.clone());

        Self {
            event_id: Uuid::new_v4().to_string(),
            event_type,
            aggregate_id,
            aggregate_type,
            version,
            occurred_on: occurred_on.unwrap_or_else(Utc::now),
            causation_id,
            correlation_id,
            priority,
            status: EventStatus::Created,
            retry_count: 0,
            max_retries,
            metadata,
            payload,
        }
    }
}

impl DomainEvent {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn aggregate_id(&self) -> &str {
        &self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn occurred_on(&self) -> DateTime<Utc> {
        self.occurred_on
    }

    pub fn causation_id(&self) -> Option<&str> {
        self.causation_id.as_deref()
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn priority(&self) -> EventPriority {
        self.priority
    }

    pub fn status(&self) -> EventStatus {
        self.status
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// 按具体载荷类型解码，事件类型不一致时返回 `TypeMismatch`
    pub fn payload_as<P: EventPayload>(&self) -> DomainResult<P> {
        if self.event_type != P::EVENT_TYPE {
            return Err(DomainError::TypeMismatch {
                expected: P::EVENT_TYPE.to_string(),
                found: self.event_type.clone(),
            });
        }
        Ok(serde_json::from_value(self.payload.clone())?)
    }

    /// 是否仍可重试（`retry_count < max_retries`）
    pub fn can_retry(&self) -> bool {
        self.retry_count < self.max_retries
    }

    pub fn mark_as_published(&self) -> DomainResult<Self> {
        self.transition(EventStatus::Published)
    }

    pub fn mark_as_processed(&self) -> DomainResult<Self> {
        self.transition(EventStatus::Processed)
    }

    pub fn mark_as_failed(&self) -> DomainResult<Self> {
        self.transition(EventStatus::Failed)
    }

    /// 返回重试计数 +1、状态为 `Retrying` 的副本
    pub fn with_retry(&self) -> DomainResult<Self> {
        if !self.can_retry() {
            return Err(DomainError::RetryLimitReached {
                event_id: self.event_id.clone(),
                max_retries: self.max_retries,
            });
        }
        let mut next = self.transition(EventStatus::Retrying)?;
        next.retry_count += 1;
        Ok(next)
    }

    fn transition(&self, next: EventStatus) -> DomainResult<Self> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                event_id: self.event_id.clone(),
                from: self.status,
                to: next,
            });
        }
        Ok(Self {
            status: next,
            ..self.clone()
        })
    }

    /// 补全缺失的追踪字段；已有的因果/关联 ID 保持不变
    pub fn with_trace(mut self, causation_id: Option<&str>, correlation_id: Option<&str>) -> Self {
        if self.causation_id.is_none() {
            self.causation_id = causation_id.map(str::to_string);
        }
        if self.correlation_id.is_none() {
            self.correlation_id = correlation_id
                .map(str::to_string)
                .or_else(|| self.causation_id.clone());
        }
        self
    }

    pub fn to_json(&self) -> DomainResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> DomainResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
