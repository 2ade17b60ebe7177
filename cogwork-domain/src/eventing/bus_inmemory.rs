//! 内存版事件总线（InMemoryEventBus）
//!
//! 满足 `EventBus` 协议的进程内实现：
//! - `publish`：先无条件写入事件存储，再以 `Published` 副本按优先级（高 → 低）
//!   依次调用订阅的处理器，每个处理器调用都包裹在重试策略中；
//! - 处理器的最终失败只记录日志与投递报告，不影响后续处理器，也不会抛给发布方；
//! - `publish_batch`：持有总线级互斥锁顺序发布，避免与其他批量发布交错；
//!   处理器在分发过程中再次调用同一总线的 `publish_batch`（如提交自己的事务）时，
//!   沿用外层已持有的锁直接发布。
//!
//! 注意：同一次 `publish` 内处理器严格串行，退避等待只挂起当前分发流程。

use super::{Delivery, EventBus, EventHandler, PublishReport, RetryPolicy};
use crate::domain_event::{DomainEvent, EventStatus};
use crate::error::DomainResult as Result;
use crate::persist::{EventStore, InMemoryEventStore};
use async_trait::async_trait;
use bon::Builder;
use dashmap::DashMap;
use std::cmp::Reverse;
use std::sync::Arc;
use tokio::sync::Mutex;

tokio::task_local! {
    /// 当前任务调用链上已持有批量锁的总线地址
    static HELD_BATCH_LOCKS: Vec<usize>;
}

#[derive(Builder)]
pub struct InMemoryEventBus {
    #[builder(skip)]
    handlers: DashMap<String, Vec<Arc<dyn EventHandler>>>,
    #[builder(default = Arc::new(InMemoryEventStore::new()) as Arc<dyn EventStore>)]
    event_store: Arc<dyn EventStore>,
    #[builder(default)]
    retry_policy: RetryPolicy,
    #[builder(skip)]
    batch_lock: Mutex<()>,
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以自定义存储后端创建总线
    pub fn with_store(event_store: Arc<dyn EventStore>) -> Self {
        Self::builder().event_store(event_store).build()
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// 当前订阅 `event_type` 的处理器数量
    pub fn handler_count(&self, event_type: &str) -> usize {
        self.handlers.get(event_type).map_or(0, |list| list.len())
    }

    /// 按优先级降序排列的处理器快照；同优先级保持订阅顺序
    fn handlers_for(&self, event_type: &str) -> Vec<Arc<dyn EventHandler>> {
        let mut handlers = self
            .handlers
            .get(event_type)
            .map(|list| list.clone())
            .unwrap_or_default();
        handlers.sort_by_key(|h| Reverse(h.priority()));
        handlers
    }

    async fn publish_in_order(&self, events: Vec<DomainEvent>) -> Result<Vec<PublishReport>> {
        let mut reports = Vec::with_capacity(events.len());
        for event in events {
            reports.push(self.publish(event).await?);
        }
        Ok(reports)
    }

    /// 单个处理器的重试包装
    async fn deliver(&self, handler: &Arc<dyn EventHandler>, event: &DomainEvent) -> Delivery {
        let policy = self.retry_policy.for_handler(handler.retry_on());
        let name = handler.handler_name().to_string();
        let mut current = event.clone();
        let mut retries: u32 = 0;

        loop {
            let err = match handler.handle(&current).await {
                Ok(()) => {
                    tracing::debug!(
                        handler = %name,
                        event_id = %event.event_id(),
                        attempts = retries + 1,
                        "event processed"
                    );
                    return Delivery {
                        handler: name,
                        attempts: retries + 1,
                        status: EventStatus::Processed,
                        error: None,
                    };
                }
                Err(err) => err,
            };

            // 两道上限：总线策略（含错误白名单）与事件自身的 max_retries
            let next = if policy.should_retry(&err, retries) {
                current.with_retry().ok()
            } else {
                None
            };

            let Some(next) = next else {
                tracing::error!(
                    handler = %name,
                    event_id = %event.event_id(),
                    event_type = %event.event_type(),
                    attempts = retries + 1,
                    error = %format!("{err:#}"),
                    "event handler failed"
                );
                return Delivery {
                    handler: name,
                    attempts: retries + 1,
                    status: EventStatus::Failed,
                    error: Some(format!("{err:#}")),
                };
            };

            retries += 1;
            let delay = policy.get_delay(retries);
            tracing::warn!(
                handler = %name,
                event_id = %event.event_id(),
                attempt = retries,
                max_retries = policy.max_retries(),
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "event handler failed, retrying"
            );
            tokio::time::sleep(delay).await;
            current = next;
        }
    }
}

fn same_handler(a: &Arc<dyn EventHandler>, b: &Arc<dyn EventHandler>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

fn registration_types(event_type: &str, handler: &Arc<dyn EventHandler>) -> Vec<String> {
    let mut types = vec![event_type.to_string()];
    for t in handler.supported_events() {
        if !types.contains(&t) {
            types.push(t);
        }
    }
    types
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, event: DomainEvent) -> Result<PublishReport> {
        self.event_store.append(event.clone()).await?;

        let published = match event.mark_as_published() {
            Ok(published) => published,
            Err(err) => {
                tracing::warn!(event_id = %event.event_id(), error = %err, "dispatching event as-is");
                event.clone()
            }
        };
        let mut report = PublishReport::new(event);

        let handlers = self.handlers_for(published.event_type());
        if handlers.is_empty() {
            tracing::debug!(event_type = %published.event_type(), "no handlers registered");
            return Ok(report);
        }

        for handler in &handlers {
            let delivery = self.deliver(handler, &published).await;
            report.deliveries.push(delivery);
        }

        Ok(report)
    }

    async fn publish_batch(&self, events: Vec<DomainEvent>) -> Result<Vec<PublishReport>> {
        let bus_id = std::ptr::from_ref(self) as usize;
        let mut held = HELD_BATCH_LOCKS
            .try_with(|ids| ids.clone())
            .unwrap_or_default();
        if held.contains(&bus_id) {
            tracing::debug!(events = events.len(), "nested batch publish, reusing held lock");
            return self.publish_in_order(events).await;
        }

        let _guard = self.batch_lock.lock().await;
        held.push(bus_id);
        HELD_BATCH_LOCKS
            .scope(held, self.publish_in_order(events))
            .await
    }

    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        for t in registration_types(event_type, &handler) {
            let mut list = self.handlers.entry(t.clone()).or_default();
            if list.iter().any(|h| same_handler(h, &handler)) {
                continue;
            }
            list.push(handler.clone());
            tracing::debug!(handler = %handler.handler_name(), event_type = %t, "handler subscribed");
        }
    }

    fn unsubscribe(&self, event_type: &str, handler: &Arc<dyn EventHandler>) {
        for t in registration_types(event_type, handler) {
            if let Some(mut list) = self.handlers.get_mut(&t) {
                let before = list.len();
                list.retain(|h| !same_handler(h, handler));
                if list.len() != before {
                    tracing::debug!(handler = %handler.handler_name(), event_type = %t, "handler unsubscribed");
                }
            }
            self.handlers.remove_if(&t, |_, list| list.is_empty());
        }
    }

    fn event_store(&self) -> Arc<dyn EventStore> {
        self.event_store.clone()
    }
}
