//! 聚合重建（Aggregate rebuild）
//!
//! 以组合代替继承：聚合状态由一张按事件类型索引的应用表（`EventAppliers`）
//! 从事件流重放得到：
//! - `on::<P>` 注册强类型载荷的应用函数；
//! - `rebuild` 依序应用事件，未登记的事件类型直接跳过；
//! - `load_from_history` 先从事件存储查询聚合事件流再重建。
//!
use crate::domain_event::{DomainEvent, EventPayload};
use crate::error::DomainResult;
use crate::persist::EventStore;
use std::collections::HashMap;
use std::fmt;

type Applier<A> = Box<dyn Fn(&mut A, &DomainEvent) -> DomainResult<()> + Send + Sync>;

/// 事件应用表
pub struct EventAppliers<A> {
    appliers: HashMap<String, Applier<A>>,
}

impl<A> Default for EventAppliers<A> {
    fn default() -> Self {
        Self {
            appliers: HashMap::new(),
        }
    }
}

impl<A> fmt::Debug for EventAppliers<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventAppliers")
            .field("event_types", &self.appliers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<A: 'static> EventAppliers<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记 `P::EVENT_TYPE` 的应用函数，载荷在调用前解码
    pub fn on<P, F>(mut self, apply: F) -> Self
    where
        P: EventPayload + 'static,
        F: Fn(&mut A, P, &DomainEvent) + Send + Sync + 'static,
    {
        self.appliers.insert(
            P::EVENT_TYPE.to_string(),
            Box::new(move |aggregate, event| {
                let payload = event.payload_as::<P>()?;
                apply(aggregate, payload, event);
                Ok(())
            }),
        );
        self
    }

    /// 以原始事件登记应用函数（载荷无需解码时使用）
    pub fn on_type<F>(mut self, event_type: impl Into<String>, apply: F) -> Self
    where
        F: Fn(&mut A, &DomainEvent) + Send + Sync + 'static,
    {
        self.appliers.insert(
            event_type.into(),
            Box::new(move |aggregate, event| {
                apply(aggregate, event);
                Ok(())
            }),
        );
        self
    }

    pub fn handles(&self, event_type: &str) -> bool {
        self.appliers.contains_key(event_type)
    }

    /// 应用单个事件；返回该事件类型是否已登记
    pub fn apply(&self, aggregate: &mut A, event: &DomainEvent) -> DomainResult<bool> {
        match self.appliers.get(event.event_type()) {
            Some(applier) => {
                applier(aggregate, event)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// 从 `initial` 开始依序应用 `events`
pub fn rebuild<A: 'static>(
    initial: A,
    events: &[DomainEvent],
    appliers: &EventAppliers<A>,
) -> DomainResult<A> {
    let mut aggregate = initial;
    for event in events {
        if !appliers.apply(&mut aggregate, event)? {
            tracing::debug!(event_type = %event.event_type(), "skipping unknown event type");
        }
    }
    Ok(aggregate)
}

/// 查询聚合的完整事件流并重建
pub async fn load_from_history<A: Send + 'static>(
    store: &dyn EventStore,
    aggregate_id: &str,
    aggregate_type: &str,
    initial: A,
    appliers: &EventAppliers<A>,
) -> DomainResult<A> {
    let events = store
        .get_events_for_aggregate(aggregate_id, aggregate_type, 0)
        .await?;
    rebuild(initial, &events, appliers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainError;
    use cogwork_macros::event_payload;

    #[event_payload]
    struct ProjectCreated {
        name: String,
        owner_id: String,
    }

    #[event_payload]
    struct ProjectStateChanged {
        previous_state: String,
        new_state: String,
        changed_by: String,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Project {
        name: String,
        owner_id: String,
        state: String,
        version: u64,
        touched: u32,
    }

    fn appliers() -> EventAppliers<Project> {
        EventAppliers::<Project>::new()
            .on::<ProjectCreated, _>(|p, created, event| {
                p.name = created.name;
                p.owner_id = created.owner_id;
                p.state = "draft".into();
                p.version = event.version();
            })
            .on::<ProjectStateChanged, _>(|p, changed, event| {
                p.state = changed.new_state;
                p.version = event.version();
            })
            .on_type("ProjectTouched", |p, _| p.touched += 1)
    }

    fn versioned<P: EventPayload>(payload: &P, version: u64) -> DomainEvent {
        let event = payload.to_event("p-1", "Project").unwrap();
        DomainEvent::builder()
            .event_type(event.event_type())
            .aggregate_id("p-1")
            .aggregate_type("Project")
            .version(version)
            .payload(event.payload().clone())
            .build()
    }

    #[test]
    fn rebuild_applies_events_in_order_and_skips_unknown() {
        let events = vec![
            versioned(
                &ProjectCreated {
                    name: "atlas".into(),
                    owner_id: "u-1".into(),
                },
                1,
            ),
            DomainEvent::builder()
                .event_type("SomethingElse")
                .aggregate_id("p-1")
                .aggregate_type("Project")
                .version(2)
                .build(),
            versioned(
                &ProjectStateChanged {
                    previous_state: "draft".into(),
                    new_state: "active".into(),
                    changed_by: "u-1".into(),
                },
                3,
            ),
            DomainEvent::builder()
                .event_type("ProjectTouched")
                .aggregate_id("p-1")
                .aggregate_type("Project")
                .version(4)
                .build(),
        ];

        let project = rebuild(Project::default(), &events, &appliers()).unwrap();
        assert_eq!(project.name, "atlas");
        assert_eq!(project.owner_id, "u-1");
        assert_eq!(project.state, "active");
        assert_eq!(project.version, 3);
        assert_eq!(project.touched, 1);
    }

    #[test]
    fn undecodable_payload_is_an_error() {
        let broken = DomainEvent::builder()
            .event_type("ProjectCreated")
            .aggregate_id("p-1")
            .aggregate_type("Project")
            .payload(serde_json::json!({"name": 1}))
            .build();

        let err = rebuild(Project::default(), &[broken], &appliers()).unwrap_err();
        assert!(matches!(err, DomainError::Serde { .. }));
    }

    #[cfg(feature = "eventing")]
    #[tokio::test]
    async fn load_from_history_reads_aggregate_stream() {
        use crate::persist::InMemoryEventStore;

        let store = InMemoryEventStore::new();
        store
            .append(versioned(
                &ProjectCreated {
                    name: "atlas".into(),
                    owner_id: "u-1".into(),
                },
                1,
            ))
            .await
            .unwrap();
        store
            .append(
                ProjectCreated {
                    name: "other".into(),
                    owner_id: "u-2".into(),
                }
                .to_event("p-2", "Project")
                .unwrap(),
            )
            .await
            .unwrap();

        let project = load_from_history(&store, "p-1", "Project", Project::default(), &appliers())
            .await
            .unwrap();
        assert_eq!(project.name, "atlas");
        assert_eq!(project.version, 1);
        assert!(appliers().handles("ProjectTouched"));
    }
}
