use crate::{domain_event::DomainEvent, error::DomainResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// `get_events_by_type` 的默认条数上限
pub const DEFAULT_TYPE_QUERY_LIMIT: usize = 100;

/// 只追加的事件存储
///
/// 查询结果总是按追加顺序返回；没有匹配时返回空集合而不是错误。
#[async_trait]
pub trait EventStore: Send + Sync {
    /// 追加一条事件
    async fn append(&self, event: DomainEvent) -> DomainResult<()>;

    /// 获取指定聚合 `version > since_version` 的事件
    async fn get_events_for_aggregate(
        &self,
        aggregate_id: &str,
        aggregate_type: &str,
        since_version: u64,
    ) -> DomainResult<Vec<DomainEvent>>;

    /// 获取共享同一关联 ID 的全部事件
    async fn get_events_by_correlation_id(
        &self,
        correlation_id: &str,
    ) -> DomainResult<Vec<DomainEvent>>;

    /// 获取指定类型、发生时间不早于 `since` 的事件，保留最近的 `limit` 条（0 表示不限）
    async fn get_events_by_type(
        &self,
        event_type: &str,
        since: Option<DateTime<Utc>>,
        limit: usize,
    ) -> DomainResult<Vec<DomainEvent>>;
}

#[async_trait]
impl<T> EventStore for Arc<T>
where
    T: EventStore + ?Sized,
{
    async fn append(&self, event: DomainEvent) -> DomainResult<()> {
        (**self).append(event).await
    }

    async fn get_events_for_aggregate(
        &self,
        aggregate_id: &str,
        aggregate_type: &str,
        since_version: u64,
    ) -> DomainResult<Vec<DomainEvent>> {
        (**self)
            .get_events_for_aggregate(aggregate_id, aggregate_type, since_version)
            .await
    }

    async fn get_events_by_correlation_id(
        &self,
        correlation_id: &str,
    ) -> DomainResult<Vec<DomainEvent>> {
        (**self).get_events_by_correlation_id(correlation_id).await
    }

    async fn get_events_by_type(
        &self,
        event_type: &str,
        since: Option<DateTime<Utc>>,
        limit: usize,
    ) -> DomainResult<Vec<DomainEvent>> {
        (**self).get_events_by_type(event_type, since, limit).await
    }
}
