//! Cognitive Workspace 过程宏（cogwork-macros）
//!
//! - `#[event_payload]`：把普通结构体/枚举声明为强类型事件载荷
//!
use proc_macro::TokenStream;

mod event_payload;
mod utils;

/// 事件载荷宏
/// - 合并/追加派生：Debug, Clone, PartialEq, Serialize, Deserialize
/// - 实现 `::cogwork_domain::domain_event::EventPayload`，事件类型默认取类型名
/// - 参数：`#[event_payload(event_type = "...")]` 覆写事件类型
#[proc_macro_attribute]
pub fn event_payload(attr: TokenStream, item: TokenStream) -> TokenStream {
    event_payload::expand(attr, item)
}
