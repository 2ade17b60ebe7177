//! 事件处理器（EventHandler）
//!
//! 定义消费某类/多类事件的处理逻辑与元信息（名称、附加订阅类型、重试白名单、优先级）。
//!
use super::RetryOn;
use crate::domain_event::{DomainEvent, EventPriority};
use async_trait::async_trait;

/// 事件处理器：由总线按优先级调用
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// 处理器名称（用于日志与投递报告）
    fn handler_name(&self) -> &str;

    /// 除主订阅外额外注册的事件类型
    fn supported_events(&self) -> Vec<String> {
        Vec::new()
    }

    /// 触发重试的错误类型；为空时沿用总线策略
    fn retry_on(&self) -> Vec<RetryOn> {
        Vec::new()
    }

    /// 分发优先级，决定同一事件下与其他处理器的先后
    fn priority(&self) -> EventPriority {
        EventPriority::Normal
    }

    /// 处理事件
    async fn handle(&self, event: &DomainEvent) -> anyhow::Result<()>;
}
