//! 事件事务上下文
//!
//! 在业务代码执行期间累积待发布的事件，只有在其正常结束时才一次性交给
//! `publish_batch`；中途失败则一个事件也不发布。
//!
//! 两种用法：
//! - `EventTransaction`：显式 `begin` / `record` / `commit` / `rollback`；
//! - `transaction(bus, |events| async { .. })`：作用域式封装，闭包返回 `Err` 即回滚。
//!
//! 注意：“全有或全无”只针对是否交给总线；`publish_batch` 本身逐个发布，非原子。
//! 处理器内部可以直接提交自己的事务，嵌套批次在外层批次的锁内完成。

use super::{EventBus, PublishReport};
use crate::domain_event::DomainEvent;
use crate::error::{DomainError, DomainResult};
use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

/// 显式事务：未提交即丢弃的事件会在 drop 时记录告警
pub struct EventTransaction {
    bus: Arc<dyn EventBus>,
    events: Vec<DomainEvent>,
    finished: bool,
}

impl EventTransaction {
    pub fn begin(bus: Arc<dyn EventBus>) -> Self {
        Self {
            bus,
            events: Vec::new(),
            finished: false,
        }
    }

    pub fn record(&mut self, event: DomainEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[DomainEvent] {
        &self.events
    }

    /// 按记录顺序批量发布全部事件
    pub async fn commit(mut self) -> DomainResult<Vec<PublishReport>> {
        self.finished = true;
        let events = std::mem::take(&mut self.events);
        if events.is_empty() {
            return Ok(Vec::new());
        }
        self.bus.publish_batch(events).await
    }

    /// 放弃全部已记录事件
    pub fn rollback(mut self, reason: impl Display) {
        self.finished = true;
        tracing::error!(
            events = self.events.len(),
            reason = %reason,
            "event transaction rolled back"
        );
        self.events.clear();
    }
}

impl Drop for EventTransaction {
    fn drop(&mut self) {
        if !self.finished && !self.events.is_empty() {
            tracing::warn!(
                events = self.events.len(),
                "event transaction dropped without commit, events discarded"
            );
        }
    }
}

/// 作用域事务中供业务代码追加事件的句柄（只能追加）
#[derive(Clone, Default)]
pub struct TransactionEvents {
    inner: Arc<Mutex<Vec<DomainEvent>>>,
}

impl TransactionEvents {
    pub fn push(&self, event: DomainEvent) {
        self.lock().push(event);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn take(&self) -> Vec<DomainEvent> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<DomainEvent>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 在事务中执行 `body`：`Ok` 时批量发布累积的事件，`Err` 时原样返回且不发布任何事件
pub async fn transaction<T, E, F, Fut>(bus: &dyn EventBus, body: F) -> Result<T, E>
where
    F: FnOnce(TransactionEvents) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: From<DomainError> + Display,
{
    let events = TransactionEvents::default();

    match body(events.clone()).await {
        Ok(value) => {
            let batch = events.take();
            if !batch.is_empty() {
                bus.publish_batch(batch).await?;
            }
            Ok(value)
        }
        Err(err) => {
            tracing::error!(
                events = events.len(),
                error = %err,
                "event transaction failed, no events published"
            );
            Err(err)
        }
    }
}
