use cogwork_domain::domain_event::{DomainEvent, EventPayload};
use cogwork_domain::error::DomainError;
use cogwork_macros::event_payload;

#[event_payload]
struct ProjectMemberAdded {
    member_id: String,
    added_by: String,
}

#[event_payload(event_type = "project.deleted")]
#[serde(rename_all = "camelCase")]
struct ProjectDeleted {
    owner_id: String,
}

#[test]
fn payload_roundtrips_through_event() {
    let added = ProjectMemberAdded {
        member_id: "u-2".into(),
        added_by: "u-1".into(),
    };
    let event = added.to_event("p-1", "Project").unwrap();
    assert_eq!(event.event_type(), "ProjectMemberAdded");
    assert_eq!(event.payload()["member_id"], "u-2");

    let decoded: ProjectMemberAdded = event.payload_as().unwrap();
    assert_eq!(decoded, added);
}

#[test]
fn serde_attributes_are_preserved() {
    let event = ProjectDeleted {
        owner_id: "u-1".into(),
    }
    .to_event("p-1", "Project")
    .unwrap();
    assert_eq!(event.event_type(), "project.deleted");
    assert_eq!(event.payload()["ownerId"], "u-1");
}

#[test]
fn decoding_checks_event_type() {
    let event = DomainEvent::builder()
        .event_type("project.deleted")
        .aggregate_id("p-1")
        .aggregate_type("Project")
        .payload(serde_json::json!({"member_id": "u-2", "added_by": "u-1"}))
        .build();

    match event.payload_as::<ProjectMemberAdded>() {
        Err(DomainError::TypeMismatch { expected, found }) => {
            assert_eq!(expected, "ProjectMemberAdded");
            assert_eq!(found, "project.deleted");
        }
        other => panic!("unexpected {other:?}"),
    }
}
