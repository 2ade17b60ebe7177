use bon::Builder;
use cogwork_domain::domain_event::DomainEvent;
use serde::{Deserialize, Serialize};

/// 应用层上下文（Application Context）
///
/// 承载一次应用层调用所需的横切信息，例如：
/// - 关联追踪 `correlation_id`、因果链 `causation_id`；
/// - 执行者类型/ID（审计）；
/// - 幂等键（`idempotency_key`）：用于在基础设施层实现请求幂等（如 API 层重复提交保护）。
///
/// 典型用法：
/// ```rust
/// use cogwork_application::context::AppContext;
///
/// let ctx = AppContext::builder()
///     .correlation_id("cor-123")
///     .causation_id("cmd-abc")
///     .actor_type("user")
///     .actor_id("u-1")
///     .idempotency_key("idem-xyz")
///     .build();
/// assert_eq!(ctx.correlation_id.as_deref(), Some("cor-123"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct AppContext {
    #[builder(into)]
    pub correlation_id: Option<String>,
    #[builder(into)]
    pub causation_id: Option<String>,
    #[builder(into)]
    pub actor_type: Option<String>,
    #[builder(into)]
    pub actor_id: Option<String>,
    /// 幂等键（可选）：为空则由上层或基础设施决定是否参与幂等
    #[builder(into)]
    pub idempotency_key: Option<String>,
}

impl AppContext {
    /// 由某个事件触发的后续操作：因果指向该事件，关联沿用其关联链
    pub fn caused_by(&self, event: &DomainEvent) -> Self {
        Self {
            causation_id: Some(event.event_id().to_string()),
            correlation_id: event
                .correlation_id()
                .map(str::to_string)
                .or_else(|| Some(event.event_id().to_string())),
            ..self.clone()
        }
    }
}
