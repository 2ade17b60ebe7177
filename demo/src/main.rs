use anyhow::Result as AnyResult;
use async_trait::async_trait;
use cogwork_application::{AppContext, DefaultEventPublisher, EventPublisher};
use cogwork_domain::aggregate::{EventAppliers, load_from_history};
use cogwork_domain::aggregate_root::PendingEvents;
use cogwork_domain::domain_event::{DomainEvent, EventPayload, EventPriority};
use cogwork_domain::error::DomainError;
use cogwork_domain::eventing::{
    EventBusExt, EventBusProvider, EventHandler, RetryConfig, RetryOn, RetryPolicy, transaction,
};
use cogwork_domain::persist::EventStore;
use cogwork_macros::event_payload;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing_subscriber::EnvFilter;

// ============================================================================
// 事件载荷
// ============================================================================

#[event_payload]
struct ProjectCreated {
    name: String,
    owner_id: String,
    description: Option<String>,
}

#[event_payload]
struct ProjectMemberAdded {
    member_id: String,
    added_by: String,
}

#[event_payload]
struct ProjectStateChanged {
    previous_state: String,
    new_state: String,
    changed_by: String,
}

// ============================================================================
// 聚合
// ============================================================================

#[derive(Debug, thiserror::Error)]
enum ProjectError {
    #[error("{0} is already a member")]
    AlreadyMember(String),
    #[error("project is {0}")]
    InvalidState(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[derive(Debug, Default)]
struct Project {
    id: String,
    name: String,
    owner_id: String,
    members: Vec<String>,
    state: String,
    version: u64,
    pending: PendingEvents,
}

impl Project {
    const TYPE: &'static str = "Project";

    fn create(id: &str, name: &str, owner_id: &str) -> Result<Self, ProjectError> {
        let mut project = Project {
            id: id.to_string(),
            ..Default::default()
        };
        project.record(&ProjectCreated {
            name: name.to_string(),
            owner_id: owner_id.to_string(),
            description: None,
        })?;
        Ok(project)
    }

    fn add_member(&mut self, member_id: &str, added_by: &str) -> Result<(), ProjectError> {
        if self.members.iter().any(|m| m == member_id) {
            return Err(ProjectError::AlreadyMember(member_id.to_string()));
        }
        self.record(&ProjectMemberAdded {
            member_id: member_id.to_string(),
            added_by: added_by.to_string(),
        })
    }

    fn change_state(&mut self, new_state: &str, changed_by: &str) -> Result<(), ProjectError> {
        if self.state == "archived" {
            return Err(ProjectError::InvalidState(self.state.clone()));
        }
        self.record(&ProjectStateChanged {
            previous_state: self.state.clone(),
            new_state: new_state.to_string(),
            changed_by: changed_by.to_string(),
        })
    }

    /// 生成下一版本的事件，立即应用到自身并记录为待发布
    fn record<P: EventPayload + 'static>(&mut self, payload: &P) -> Result<(), ProjectError> {
        let priority = if P::EVENT_TYPE == ProjectStateChanged::EVENT_TYPE {
            EventPriority::High
        } else {
            EventPriority::Normal
        };
        let event = DomainEvent::builder()
            .event_type(P::EVENT_TYPE)
            .aggregate_id(self.id.clone())
            .aggregate_type(Self::TYPE)
            .version(self.version + 1)
            .priority(priority)
            .payload(serde_json::to_value(payload).map_err(DomainError::from)?)
            .build();
        Self::appliers().apply(self, &event)?;
        self.pending.record(event);
        Ok(())
    }

    fn appliers() -> EventAppliers<Project> {
        EventAppliers::<Project>::new()
            .on::<ProjectCreated, _>(|p, created, event| {
                p.id = event.aggregate_id().to_string();
                p.name = created.name;
                p.members.push(created.owner_id.clone());
                p.owner_id = created.owner_id;
                p.state = "draft".into();
                p.version = event.version();
            })
            .on::<ProjectMemberAdded, _>(|p, added, event| {
                p.members.push(added.member_id);
                p.version = event.version();
            })
            .on::<ProjectStateChanged, _>(|p, changed, event| {
                p.state = changed.new_state;
                p.version = event.version();
            })
    }
}

// ============================================================================
// 事件处理器
// ============================================================================

struct Notifier;

#[async_trait]
impl EventHandler for Notifier {
    fn handler_name(&self) -> &str {
        "notifier"
    }
    fn priority(&self) -> EventPriority {
        EventPriority::Critical
    }
    async fn handle(&self, event: &DomainEvent) -> AnyResult<()> {
        let added: ProjectMemberAdded = event.payload_as()?;
        tracing::info!(project = %event.aggregate_id(), member = %added.member_id, "notify new member");
        Ok(())
    }
}

struct AuditLog;

#[async_trait]
impl EventHandler for AuditLog {
    fn handler_name(&self) -> &str {
        "audit_log"
    }
    fn supported_events(&self) -> Vec<String> {
        vec![
            ProjectMemberAdded::EVENT_TYPE.to_string(),
            ProjectStateChanged::EVENT_TYPE.to_string(),
        ]
    }
    fn priority(&self) -> EventPriority {
        EventPriority::Low
    }
    async fn handle(&self, event: &DomainEvent) -> AnyResult<()> {
        tracing::info!(
            event_type = %event.event_type(),
            version = event.version(),
            correlation_id = event.correlation_id().unwrap_or("-"),
            "audit"
        );
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("search index unavailable")]
struct IndexUnavailable;

/// 前两次调用返回 `IndexUnavailable`
#[derive(Default)]
struct SearchIndexer {
    calls: AtomicU32,
}

#[async_trait]
impl EventHandler for SearchIndexer {
    fn handler_name(&self) -> &str {
        "search_indexer"
    }
    fn retry_on(&self) -> Vec<RetryOn> {
        vec![RetryOn::error::<IndexUnavailable>()]
    }
    async fn handle(&self, event: &DomainEvent) -> AnyResult<()> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < 2 {
            return Err(IndexUnavailable.into());
        }
        let created: ProjectCreated = event.payload_as()?;
        tracing::info!(project = %event.aggregate_id(), name = %created.name, "indexed");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let retry: RetryConfig = serde_json::from_str(r#"{"max_retries": 3, "initial_delay_secs": 0.1}"#)?;
    let provider = EventBusProvider::builder()
        .retry_policy(RetryPolicy::from(retry))
        .build();
    let bus = provider.event_bus();

    bus.subscribe_to::<ProjectCreated>(Arc::new(SearchIndexer::default()));
    bus.subscribe_to::<ProjectMemberAdded>(Arc::new(Notifier));
    bus.subscribe_to::<ProjectCreated>(Arc::new(AuditLog));

    let publisher = DefaultEventPublisher::new(bus.clone());
    let ctx = AppContext::builder()
        .correlation_id("op-create-atlas")
        .causation_id("cmd-create-project")
        .actor_type("user")
        .actor_id("u-1")
        .build();

    // 1. 创建项目并发布
    let mut project = Project::create("p-1", "atlas", "u-1")?;
    let reports = publisher.publish_events(&ctx, project.pending.take()).await?;
    for report in &reports {
        for d in &report.deliveries {
            tracing::info!(handler = %d.handler, attempts = d.attempts, status = %d.status, "delivery");
        }
    }

    // 2. 事务：成员加入与状态变更一起提交
    let pending = transaction(bus.as_ref(), |events| {
        let result = project
            .add_member("u-2", "u-1")
            .and_then(|_| project.add_member("u-3", "u-1"))
            .and_then(|_| project.change_state("active", "u-1"));
        for event in project.pending.take() {
            events.push(event.with_trace(ctx.causation_id.as_deref(), ctx.correlation_id.as_deref()));
        }
        async move { result }
    })
    .await;
    tracing::info!(ok = pending.is_ok(), "membership transaction finished");

    // 3. 事务失败：重复成员，不发布任何事件
    let mut copy = load_from_history(
        provider.event_store().as_ref(),
        "p-1",
        Project::TYPE,
        Project::default(),
        &Project::appliers(),
    )
    .await?;
    let failed = transaction(bus.as_ref(), |events| {
        let result = copy
            .add_member("u-4", "u-1")
            .and_then(|_| copy.add_member("u-2", "u-1"));
        for event in copy.pending.take() {
            events.push(event);
        }
        async move { result }
    })
    .await;
    if let Err(err) = failed {
        tracing::warn!(error = %err, "second transaction rolled back");
    }

    // 4. 从事件存储重建
    let rebuilt = load_from_history(
        provider.event_store().as_ref(),
        "p-1",
        Project::TYPE,
        Project::default(),
        &Project::appliers(),
    )
    .await?;
    tracing::info!(
        name = %rebuilt.name,
        owner = %rebuilt.owner_id,
        state = %rebuilt.state,
        members = ?rebuilt.members,
        version = rebuilt.version,
        "rebuilt project"
    );

    let chain = provider
        .event_store()
        .get_events_by_correlation_id("op-create-atlas")
        .await?;
    tracing::info!(events = chain.len(), "correlation chain op-create-atlas");
    Ok(())
}
