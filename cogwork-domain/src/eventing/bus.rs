//! 事件总线（EventBus）协议
//!
//! 统一发布/订阅抽象：发布即写入事件存储并按优先级同步分发给订阅者。
//! 处理器失败在总线内部隔离，不会传播给发布方。
//!
use super::{EventHandler, PublishReport};
use crate::domain_event::{DomainEvent, EventPayload};
use crate::{error::DomainResult as Result, persist::EventStore};
use async_trait::async_trait;
use std::sync::Arc;

/// 事件总线：负责存储事件并分发给订阅的处理器
#[async_trait]
pub trait EventBus: Send + Sync {
    /// 发布单个事件；仅在事件存储写入失败时返回错误
    async fn publish(&self, event: DomainEvent) -> Result<PublishReport>;

    /// 按顺序逐个发布；与其他 `publish_batch` 调用互斥，但不保证原子性
    ///
    /// 处理器在同一调用链中再次批量发布（提交事务、`PendingEvents::commit`）时，
    /// 实现不得等待外层持有的锁。`InMemoryEventBus` 以任务本地标记识别这种嵌套；
    /// 处理器若在另一个任务中批量发布并等待其完成，仍会与外层批次互相等待。
    async fn publish_batch(&self, events: Vec<DomainEvent>) -> Result<Vec<PublishReport>> {
        let mut reports = Vec::with_capacity(events.len());
        for event in events {
            reports.push(self.publish(event).await?);
        }
        Ok(reports)
    }

    /// 以 `event_type` 及处理器声明的 `supported_events` 注册处理器（幂等）
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>);

    /// 订阅的逆操作；未订阅时为空操作
    fn unsubscribe(&self, event_type: &str, handler: &Arc<dyn EventHandler>);

    /// 底层事件存储，用于重放与审计
    fn event_store(&self) -> Arc<dyn EventStore>;
}

/// 基于强类型载荷的订阅便捷方法
pub trait EventBusExt: EventBus {
    /// 以 `P::EVENT_TYPE` 作为主订阅类型注册处理器
    fn subscribe_to<P: EventPayload>(&self, handler: Arc<dyn EventHandler>) {
        self.subscribe(P::EVENT_TYPE, handler);
    }

    fn unsubscribe_from<P: EventPayload>(&self, handler: &Arc<dyn EventHandler>) {
        self.unsubscribe(P::EVENT_TYPE, handler);
    }
}

impl<T> EventBusExt for T where T: EventBus + ?Sized {}
