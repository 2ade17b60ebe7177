//! 内存版事件存储（InMemoryEventStore）
//!
//! 以追加顺序保存进程生命周期内的全部事件，满足 `EventStore` 协议；
//! 典型用途：默认总线后端、测试与本地开发。进程重启后数据不保留。

use crate::domain_event::DomainEvent;
use crate::error::DomainResult;
use crate::persist::EventStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: RwLock<Vec<DomainEvent>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }

    /// 全量事件快照（按追加顺序）
    pub async fn all_events(&self) -> Vec<DomainEvent> {
        self.events.read().await.clone()
    }

    async fn filter<F>(&self, predicate: F) -> Vec<DomainEvent>
    where
        F: Fn(&DomainEvent) -> bool + Send,
    {
        self.events
            .read()
            .await
            .iter()
            .filter(|e| predicate(e))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, event: DomainEvent) -> DomainResult<()> {
        tracing::debug!(
            event_id = %event.event_id(),
            event_type = %event.event_type(),
            aggregate_id = %event.aggregate_id(),
            "event appended"
        );
        self.events.write().await.push(event);
        Ok(())
    }

    async fn get_events_for_aggregate(
        &self,
        aggregate_id: &str,
        aggregate_type: &str,
        since_version: u64,
    ) -> DomainResult<Vec<DomainEvent>> {
        Ok(self
            .filter(|e| {
                e.aggregate_id() == aggregate_id
                    && e.aggregate_type() == aggregate_type
                    && e.version() > since_version
            })
            .await)
    }

    async fn get_events_by_correlation_id(
        &self,
        correlation_id: &str,
    ) -> DomainResult<Vec<DomainEvent>> {
        Ok(self
            .filter(|e| e.correlation_id() == Some(correlation_id))
            .await)
    }

    async fn get_events_by_type(
        &self,
        event_type: &str,
        since: Option<DateTime<Utc>>,
        limit: usize,
    ) -> DomainResult<Vec<DomainEvent>> {
        let mut matched = self
            .filter(|e| e.event_type() == event_type && since.is_none_or(|s| e.occurred_on() >= s))
            .await;

        // 仅保留最近追加的 `limit` 条
        if limit > 0 && matched.len() > limit {
            matched.drain(..matched.len() - limit);
        }
        Ok(matched)
    }
}
