//! 事件持久化（persist）
//!
//! 定义只追加的事件存储协议（`EventStore`）及其进程内实现：
//! - 按聚合标识与起始版本查询（重放）；
//! - 按关联 ID 查询（跨聚合的业务操作链）；
//! - 按事件类型、时间下限与条数上限查询（审计/读侧）。
//!
//! 协议本身不提供修改与删除操作；持久化后端由上层实现并注入。
//!
mod event_store;
#[cfg(feature = "eventing")]
mod event_store_inmemory;

pub use event_store::{DEFAULT_TYPE_QUERY_LIMIT, EventStore};
#[cfg(feature = "eventing")]
pub use event_store_inmemory::InMemoryEventStore;
