//! 领域层统一错误定义
//!
//! 聚焦事件序列化、状态流转与事件存储的最小必要集合，
//! 便于在各实现层统一转换为 `DomainError`。
//!
//! 注意：处理器（handler）自身的失败以 `anyhow::Error` 表达，
//! 由总线内部的重试包装吸收，永远不会以 `DomainError` 的形式抛给发布方。
//!
use crate::domain_event::EventStatus;
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 序列化 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch { expected: String, found: String },

    // --- 事件生命周期 ---
    #[error("invalid status transition: event={event_id}, from={from}, to={to}")]
    InvalidTransition {
        event_id: String,
        from: EventStatus,
        to: EventStatus,
    },
    #[error("retry limit reached: event={event_id}, max_retries={max_retries}")]
    RetryLimitReached { event_id: String, max_retries: u32 },

    // --- 事件存储 ---
    // 供自定义存储后端报告写入/查询失败
    #[error("event store error: {reason}")]
    EventStore { reason: String },
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

