use anyhow::Result as AnyResult;
use cogwork_domain::domain_event::DomainEvent;
use cogwork_domain::error::{DomainError, DomainResult};
use cogwork_domain::eventing::{
    EventBus, EventHandler, EventTransaction, InMemoryEventBus, PublishReport, transaction,
};
use cogwork_domain::persist::{EventStore, InMemoryEventStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// 统计 `publish_batch` 调用次数的总线替身，实际发布委托给内存总线
struct SpyBus {
    inner: InMemoryEventBus,
    batches: AtomicUsize,
}

impl SpyBus {
    fn new(store: Arc<InMemoryEventStore>) -> Self {
        Self {
            inner: InMemoryEventBus::with_store(store),
            batches: AtomicUsize::new(0),
        }
    }

    fn batches(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EventBus for SpyBus {
    async fn publish(&self, event: DomainEvent) -> DomainResult<PublishReport> {
        self.inner.publish(event).await
    }

    async fn publish_batch(&self, events: Vec<DomainEvent>) -> DomainResult<Vec<PublishReport>> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        self.inner.publish_batch(events).await
    }

    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        self.inner.subscribe(event_type, handler);
    }

    fn unsubscribe(&self, event_type: &str, handler: &Arc<dyn EventHandler>) {
        self.inner.unsubscribe(event_type, handler);
    }

    fn event_store(&self) -> Arc<dyn EventStore> {
        self.inner.event_store()
    }
}

#[derive(Debug, thiserror::Error)]
enum ServiceError {
    #[error("member limit reached")]
    MemberLimit,
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// 处理 ProjectMemberAdded 时在自己的事务中发布欢迎事件
struct WelcomeMember {
    bus: Arc<dyn EventBus>,
}

#[async_trait::async_trait]
impl EventHandler for WelcomeMember {
    fn handler_name(&self) -> &str {
        "welcome_member"
    }

    async fn handle(&self, event: &DomainEvent) -> AnyResult<()> {
        let welcome = DomainEvent::builder()
            .event_type("MemberWelcomed")
            .aggregate_id(event.aggregate_id())
            .aggregate_type("Project")
            .build();
        transaction(self.bus.as_ref(), |events| async move {
            events.push(welcome);
            Ok::<_, DomainError>(())
        })
        .await?;
        Ok(())
    }
}

fn member_added(member: &str) -> DomainEvent {
    DomainEvent::builder()
        .event_type("ProjectMemberAdded")
        .aggregate_id("p-1")
        .aggregate_type("Project")
        .metadata(serde_json::Map::from_iter([(
            "member_id".to_string(),
            serde_json::json!(member),
        )]))
        .build()
}

#[tokio::test]
async fn failed_body_publishes_nothing() -> AnyResult<()> {
    let store = Arc::new(InMemoryEventStore::new());
    let bus = SpyBus::new(store.clone());

    let result: Result<(), ServiceError> = transaction(&bus, |events| async move {
        events.push(member_added("u-1"));
        events.push(member_added("u-2"));
        Err(ServiceError::MemberLimit)
    })
    .await;

    assert!(matches!(result, Err(ServiceError::MemberLimit)));
    assert_eq!(bus.batches(), 0);
    assert!(store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn successful_body_publishes_all_in_order() -> AnyResult<()> {
    let store = Arc::new(InMemoryEventStore::new());
    let bus = SpyBus::new(store.clone());

    let expected = transaction(&bus, |events| async move {
        let mut ids = Vec::new();
        for member in ["u-1", "u-2", "u-3"] {
            let event = member_added(member);
            ids.push(event.event_id().to_string());
            events.push(event);
        }
        assert_eq!(events.len(), 3);
        Ok::<_, ServiceError>(ids)
    })
    .await?;

    assert_eq!(bus.batches(), 1);
    let stored: Vec<_> = store
        .get_events_for_aggregate("p-1", "Project", 0)
        .await?
        .iter()
        .map(|e| e.event_id().to_string())
        .collect();
    assert_eq!(stored, expected);
    Ok(())
}

#[tokio::test]
async fn empty_transaction_skips_the_bus() -> AnyResult<()> {
    let store = Arc::new(InMemoryEventStore::new());
    let bus = SpyBus::new(store.clone());

    transaction(&bus, |_events| async { Ok::<_, ServiceError>(()) }).await?;
    EventTransaction::begin(Arc::new(SpyBus::new(store.clone())))
        .commit()
        .await?;

    assert_eq!(bus.batches(), 0);
    assert!(store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn explicit_transaction_commits_through_batch() -> AnyResult<()> {
    let store = Arc::new(InMemoryEventStore::new());
    let bus = Arc::new(SpyBus::new(store.clone()));

    let mut tx = EventTransaction::begin(bus.clone());
    tx.record(member_added("u-1"));
    tx.record(member_added("u-2"));
    assert_eq!(tx.events().len(), 2);
    let reports = tx.commit().await?;

    assert_eq!(reports.len(), 2);
    assert_eq!(bus.batches(), 1);
    assert_eq!(store.len().await, 2);
    Ok(())
}

#[tokio::test]
async fn handler_commits_its_own_transaction_inside_a_batch() -> AnyResult<()> {
    let store = Arc::new(InMemoryEventStore::new());
    let bus: Arc<dyn EventBus> = Arc::new(InMemoryEventBus::with_store(store.clone()));
    bus.subscribe(
        "ProjectMemberAdded",
        Arc::new(WelcomeMember { bus: bus.clone() }),
    );

    tokio::time::timeout(
        Duration::from_secs(2),
        transaction(bus.as_ref(), |events| async move {
            events.push(member_added("u-1"));
            Ok::<_, ServiceError>(())
        }),
    )
    .await??;

    let types: Vec<_> = store
        .all_events()
        .await
        .iter()
        .map(|e| e.event_type().to_string())
        .collect();
    assert_eq!(types, vec!["ProjectMemberAdded", "MemberWelcomed"]);
    Ok(())
}
