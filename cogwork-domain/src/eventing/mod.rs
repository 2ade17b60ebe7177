//! 事件子系统（eventing）
//!
//! 提供事件发布/订阅与处理的基础抽象与进程内运行时：
//! - `EventBus`：统一发布/订阅接口，`InMemoryEventBus` 为默认实现；
//! - `EventHandler`：消费事件的处理器，声明优先级与重试白名单；
//! - `RetryPolicy`：处理器失败时的指数退避重试策略；
//! - `EventTransaction` / `transaction`：全有或全无地累积并批量发布事件；
//! - `EventBusProvider`：惰性构建、可替换的总线上下文。
//!
pub mod bus;
#[cfg(feature = "eventing")]
pub mod bus_inmemory;
pub mod handler;
#[cfg(feature = "eventing")]
pub mod provider;
pub mod report;
pub mod retry;
pub mod transaction;

pub use bus::{EventBus, EventBusExt};
#[cfg(feature = "eventing")]
pub use bus_inmemory::InMemoryEventBus;
pub use handler::EventHandler;
#[cfg(feature = "eventing")]
pub use provider::EventBusProvider;
pub use report::{Delivery, PublishReport};
pub use retry::{RetryConfig, RetryOn, RetryPolicy};
pub use transaction::{EventTransaction, TransactionEvents, transaction};
