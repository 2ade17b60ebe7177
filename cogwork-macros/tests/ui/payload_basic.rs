use cogwork_domain::domain_event::EventPayload;
use cogwork_macros::event_payload;

#[event_payload]
struct ProjectCreated {
    name: String,
    owner_id: String,
    description: Option<String>,
}

#[event_payload]
struct ProjectArchived;

fn main() {
    assert_eq!(ProjectCreated::EVENT_TYPE, "ProjectCreated");
    assert_eq!(ProjectArchived::EVENT_TYPE, "ProjectArchived");
}
