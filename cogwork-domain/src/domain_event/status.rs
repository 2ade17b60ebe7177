use serde::{Deserialize, Serialize};
use std::fmt;

/// 事件在处理生命周期中的状态
///
/// 流转：`Created → Published → Processed`，发布后的任意时刻可进入 `Failed`/`Retrying`。
/// `Processed` 与 `Failed` 为终态。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Created,
    Published,
    Processed,
    Failed,
    Retrying,
}

impl EventStatus {
    /// 是否允许从当前状态流转到 `next`
    ///
    /// `Retrying → Retrying` 允许重复出现，次数上限由事件的 `max_retries` 约束。
    pub fn can_transition_to(self, next: EventStatus) -> bool {
        use EventStatus::*;
        matches!(
            (self, next),
            (Created, Published)
                | (Published, Processed | Failed | Retrying)
                | (Retrying, Processed | Failed | Retrying)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Processed | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Published => "published",
            Self::Processed => "processed",
            Self::Failed => "failed",
            Self::Retrying => "retrying",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::EventStatus::*;

    #[test]
    fn forward_transitions_only() {
        assert!(Created.can_transition_to(Published));
        assert!(Published.can_transition_to(Processed));
        assert!(Published.can_transition_to(Retrying));
        assert!(Retrying.can_transition_to(Retrying));
        assert!(Retrying.can_transition_to(Failed));

        assert!(!Created.can_transition_to(Processed));
        assert!(!Published.can_transition_to(Created));
        assert!(!Processed.can_transition_to(Retrying));
        assert!(!Failed.can_transition_to(Published));
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Retrying).unwrap(), "\"retrying\"");
        assert!(Processed.is_terminal());
        assert!(!Published.is_terminal());
    }
}
