use cogwork_domain::domain_event::EventPayload;
use cogwork_macros::event_payload;
use serde::{Deserialize, Serialize};

#[event_payload(event_type = "project.state_changed")]
#[derive(Serialize, Deserialize, Eq)]
#[serde(rename_all = "camelCase")]
struct ProjectStateChanged {
    previous_state: String,
    new_state: String,
    changed_by: String,
}

#[event_payload(event_type = "agent.status")]
enum AgentStatus {
    Idle,
    Busy { task_id: String },
}

fn main() {
    assert_eq!(ProjectStateChanged::EVENT_TYPE, "project.state_changed");
    assert_eq!(AgentStatus::EVENT_TYPE, "agent.status");
}
