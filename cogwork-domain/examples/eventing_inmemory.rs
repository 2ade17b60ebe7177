/// 事件总线（内存版）示例
/// 展示 发布 -> 按优先级分发 -> 失败重试 -> 投递报告，以及事务内的批量发布
use anyhow::Result as AnyResult;
use cogwork_domain::domain_event::{DomainEvent, EventPayload, EventPriority};
use cogwork_domain::error::DomainError;
use cogwork_domain::eventing::{
    EventBus, EventBusExt, EventBusProvider, EventHandler, RetryPolicy, transaction,
};
use cogwork_domain::persist::EventStore;
use cogwork_macros::event_payload;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

#[event_payload]
struct ProjectCreated {
    name: String,
    owner_id: String,
}

#[event_payload]
struct ProjectMemberAdded {
    member_id: String,
    added_by: String,
}

// ============================================================================
// 示例处理器（EventHandler）
// ============================================================================

struct PrintHandler {
    name: &'static str,
    priority: EventPriority,
}

#[async_trait::async_trait]
impl EventHandler for PrintHandler {
    fn handler_name(&self) -> &str {
        self.name
    }

    fn supported_events(&self) -> Vec<String> {
        vec![ProjectMemberAdded::EVENT_TYPE.to_string()]
    }

    fn priority(&self) -> EventPriority {
        self.priority
    }

    async fn handle(&self, event: &DomainEvent) -> anyhow::Result<()> {
        println!(
            "handler={} type={} aggregate={} payload={}",
            self.name,
            event.event_type(),
            event.aggregate_id(),
            event.payload()
        );
        Ok(())
    }
}

/// 前两次调用失败，第三次成功
#[derive(Default)]
struct FlakyIndexer {
    calls: AtomicU32,
}

#[async_trait::async_trait]
impl EventHandler for FlakyIndexer {
    fn handler_name(&self) -> &str {
        "flaky_indexer"
    }

    async fn handle(&self, event: &DomainEvent) -> anyhow::Result<()> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n < 3 {
            anyhow::bail!("search index unavailable (attempt {n})");
        }
        println!(
            "handler=flaky_indexer indexed {} after {n} attempts (retry_count={})",
            event.event_id(),
            event.retry_count()
        );
        Ok(())
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> AnyResult<()> {
    println!("=== 事件总线（内存版）示例 ===\n");

    let provider = EventBusProvider::builder()
        .retry_policy(
            RetryPolicy::builder()
                .initial_delay(Duration::from_millis(50))
                .build(),
        )
        .build();
    let bus = provider.event_bus();

    bus.subscribe_to::<ProjectCreated>(Arc::new(PrintHandler {
        name: "audit",
        priority: EventPriority::Low,
    }));
    bus.subscribe_to::<ProjectCreated>(Arc::new(PrintHandler {
        name: "notifier",
        priority: EventPriority::Critical,
    }));
    bus.subscribe_to::<ProjectCreated>(Arc::new(FlakyIndexer::default()));

    let created = ProjectCreated {
        name: "atlas".into(),
        owner_id: "u-1".into(),
    }
    .to_event("p-1", "Project")?;

    let report = bus.publish(created.clone()).await?;
    for d in &report.deliveries {
        println!(
            "  delivery handler={} attempts={} status={}",
            d.handler, d.attempts, d.status
        );
    }
    println!("✅ ProjectCreated 已发布\n");

    // 事务：两个成员一起加入，任何一步失败都不发布
    transaction(bus.as_ref(), |events| async move {
        for member in ["u-2", "u-3"] {
            events.push(
                ProjectMemberAdded {
                    member_id: member.into(),
                    added_by: "u-1".into(),
                }
                .caused_by(&created, "p-1", "Project")?,
            );
        }
        Ok::<_, DomainError>(())
    })
    .await?;
    println!("✅ 事务提交完成\n");

    let chain = provider
        .event_store()
        .get_events_by_correlation_id(report.event_id())
        .await?;
    println!("关联链 {} 上的事件数: {}", report.event_id(), chain.len());
    Ok(())
}
