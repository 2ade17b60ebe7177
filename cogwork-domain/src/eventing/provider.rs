//! 事件总线提供者（EventBusProvider）
//!
//! 以显式上下文对象代替进程级单例：首次访问时惰性构建默认总线（及其内存存储），
//! 也可通过 `configure_event_bus` 整体替换，便于组合自定义存储或注入测试替身。
//! 每个测试创建独立的 provider 即可获得隔离。

use super::{EventBus, InMemoryEventBus, RetryPolicy};
use crate::persist::{EventStore, InMemoryEventStore};
use bon::Builder;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Builder)]
pub struct EventBusProvider {
    /// 默认总线使用的存储；缺省时惰性创建内存存储
    store: Option<Arc<dyn EventStore>>,
    /// 默认总线使用的重试策略
    #[builder(default)]
    retry_policy: RetryPolicy,
    #[builder(skip)]
    bus: RwLock<Option<Arc<dyn EventBus>>>,
}

impl Default for EventBusProvider {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl EventBusProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: Arc<dyn EventStore>) -> Self {
        Self::builder().store(store).build()
    }

    /// 当前总线；首次调用时构建默认的 `InMemoryEventBus`
    pub fn event_bus(&self) -> Arc<dyn EventBus> {
        if let Some(bus) = self.bus.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
            return bus.clone();
        }

        let mut slot = self.bus.write().unwrap_or_else(PoisonError::into_inner);
        // 读锁释放后可能已被其他线程初始化
        slot.get_or_insert_with(|| {
            let store = self
                .store
                .clone()
                .unwrap_or_else(|| Arc::new(InMemoryEventStore::new()) as Arc<dyn EventStore>);
            tracing::debug!("initializing default event bus");
            let bus = InMemoryEventBus::builder()
                .event_store(store)
                .retry_policy(self.retry_policy.clone())
                .build();
            Arc::new(bus) as Arc<dyn EventBus>
        })
        .clone()
    }

    /// 当前总线背后的事件存储
    pub fn event_store(&self) -> Arc<dyn EventStore> {
        self.event_bus().event_store()
    }

    /// 替换当前总线；之后的 `event_bus()` 均返回新实例
    pub fn configure_event_bus(&self, bus: Arc<dyn EventBus>) {
        *self.bus.write().unwrap_or_else(PoisonError::into_inner) = Some(bus);
        tracing::debug!("event bus configured");
    }
}
