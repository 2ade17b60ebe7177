//! 事件发布端口（EventPublisher）
//!
//! 应用服务通过该端口发布领域事件，发布前以 `AppContext` 补全事件缺失的
//! 因果/关联 ID，使一次应用层调用产生的事件共享同一条关联链。
//!
use crate::{context::AppContext, error::AppError};
use async_trait::async_trait;
use cogwork_domain::domain_event::DomainEvent;
use cogwork_domain::eventing::{EventBus, PublishReport};
use std::sync::Arc;

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish_event(
        &self,
        ctx: &AppContext,
        event: DomainEvent,
    ) -> Result<PublishReport, AppError>;

    /// 同一批事件按顺序发布
    async fn publish_events(
        &self,
        ctx: &AppContext,
        events: Vec<DomainEvent>,
    ) -> Result<Vec<PublishReport>, AppError>;
}

/// 基于 `EventBus` 的默认发布器
pub struct DefaultEventPublisher {
    bus: Arc<dyn EventBus>,
}

impl DefaultEventPublisher {
    pub fn new(bus: Arc<dyn EventBus>) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &Arc<dyn EventBus> {
        &self.bus
    }

    fn stamp(ctx: &AppContext, event: DomainEvent) -> DomainEvent {
        event.with_trace(ctx.causation_id.as_deref(), ctx.correlation_id.as_deref())
    }
}

#[async_trait]
impl EventPublisher for DefaultEventPublisher {
    async fn publish_event(
        &self,
        ctx: &AppContext,
        event: DomainEvent,
    ) -> Result<PublishReport, AppError> {
        let event = Self::stamp(ctx, event);
        tracing::debug!(
            event_id = %event.event_id(),
            event_type = %event.event_type(),
            actor_id = ctx.actor_id.as_deref().unwrap_or("-"),
            "publishing event"
        );
        Ok(self.bus.publish(event).await?)
    }

    async fn publish_events(
        &self,
        ctx: &AppContext,
        events: Vec<DomainEvent>,
    ) -> Result<Vec<PublishReport>, AppError> {
        let events = events
            .into_iter()
            .map(|event| Self::stamp(ctx, event))
            .collect();
        Ok(self.bus.publish_batch(events).await?)
    }
}
