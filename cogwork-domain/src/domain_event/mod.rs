//! 领域事件（Domain Event）
//!
//! 定义事件记录本身（`DomainEvent`）、生命周期状态（`EventStatus`）、
//! 分发优先级（`EventPriority`）以及强类型载荷接口（`EventPayload`）。

mod event;
mod payload;
mod priority;
mod status;

pub use event::{DEFAULT_MAX_RETRIES, DomainEvent};
pub use payload::EventPayload;
pub use priority::EventPriority;
pub use status::EventStatus;
