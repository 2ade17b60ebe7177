//! Cognitive Workspace 应用层（cogwork-application）
//!
//! 连接应用服务与领域事件设施：
//! - `AppContext`：一次应用层调用的追踪与审计信息；
//! - `EventPublisher`：应用服务发布领域事件的端口，`DefaultEventPublisher` 为基于总线的默认实现；
//! - `AppError`：应用层错误。
//!
pub mod context;
pub mod error;
pub mod event_publisher;

pub use context::AppContext;
pub use error::AppError;
pub use event_publisher::{DefaultEventPublisher, EventPublisher};
