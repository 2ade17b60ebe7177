//! Cognitive Workspace 领域事件基础库（cogwork-domain）
//!
//! 为各限界上下文提供统一的领域事件基础设施：
//! - 领域事件（`domain_event`）：事件记录、生命周期状态、分发优先级与强类型载荷
//! - 事件存储（`persist`）：只追加的事件日志与按聚合/关联链/类型的查询
//! - 事件系统（`eventing`）：总线、处理器、重试策略、事务上下文与总线提供者
//! - 聚合重建（`aggregate`）与待发布事件记录（`aggregate_root`）
//!
//! 本 crate 仅定义进程内的事件协议与默认的内存实现，
//! 持久化后端可通过实现 `EventStore` 接入。
//!
//! 典型用法：
//! 1. 以 `#[event_payload]` 定义事件载荷，`to_event` 构造事件；
//! 2. 实现 `EventHandler` 并订阅到 `EventBusProvider::event_bus()`；
//! 3. 在 `transaction` 中累积事件，业务成功后批量发布；
//! 4. 通过 `load_from_history` 从事件存储重建聚合状态。
//!
pub mod aggregate;
pub mod aggregate_root;
pub mod domain_event;
pub mod error;
pub mod eventing;
pub mod persist;

// 允许在本 crate 内部通过 ::cogwork_domain 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::cogwork_domain 路径。
extern crate self as cogwork_domain;
