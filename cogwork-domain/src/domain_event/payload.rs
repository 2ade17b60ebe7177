use super::DomainEvent;
use crate::error::DomainResult;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// 强类型事件载荷
///
/// 通常由 `#[event_payload]` 宏生成实现，`EVENT_TYPE` 默认取结构体名称。
pub trait EventPayload: Serialize + DeserializeOwned + Send + Sync {
    /// 事件类型（如 `ProjectCreated`）
    const EVENT_TYPE: &'static str;

    /// 以当前载荷构造一个新事件
    fn to_event(
        &self,
        aggregate_id: impl Into<String>,
        aggregate_type: impl Into<String>,
    ) -> DomainResult<DomainEvent> {
        Ok(DomainEvent::builder()
            .event_type(Self::EVENT_TYPE)
            .aggregate_id(aggregate_id)
            .aggregate_type(aggregate_type)
            .payload(serde_json::to_value(self)?)
            .build())
    }

    /// 构造由 `parent` 直接引发的后续事件：因果 ID 指向父事件，关联 ID 沿用父事件的关联链
    fn caused_by(
        &self,
        parent: &DomainEvent,
        aggregate_id: impl Into<String>,
        aggregate_type: impl Into<String>,
    ) -> DomainResult<DomainEvent> {
        Ok(DomainEvent::builder()
            .event_type(Self::EVENT_TYPE)
            .aggregate_id(aggregate_id)
            .aggregate_type(aggregate_type)
            .causation_id(parent.event_id())
            .maybe_correlation_id(parent.correlation_id())
            .payload(serde_json::to_value(self)?)
            .build())
    }
}
