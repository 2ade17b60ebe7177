//! 聚合待发布事件（PendingEvents）
//!
//! 聚合在执行业务操作时记录产生的事件，由应用层在持久化后统一提交：
//! `record` 追加、`take` 取出并清空、`commit` 通过 `publish_batch` 按记录顺序发布。
//!
use crate::domain_event::DomainEvent;
use crate::error::DomainResult;
use crate::eventing::{EventBus, PublishReport};

#[derive(Debug, Clone, Default)]
pub struct PendingEvents {
    events: Vec<DomainEvent>,
}

impl PendingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: DomainEvent) {
        self.events.push(event);
    }

    /// 取出全部待发布事件并清空
    pub fn take(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DomainEvent> {
        self.events.iter()
    }

    /// 发布并清空；没有待发布事件时不调用总线
    pub async fn commit(&mut self, bus: &dyn EventBus) -> DomainResult<Vec<PublishReport>> {
        let events = self.take();
        if events.is_empty() {
            return Ok(Vec::new());
        }
        bus.publish_batch(events).await
    }
}
