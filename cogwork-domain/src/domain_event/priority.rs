use serde::{Deserialize, Serialize};
use std::fmt;

/// 事件/处理器优先级：决定同一事件下多个处理器的分发顺序（不影响存储顺序）
///
/// 序列化为整数 `0..=3`（LOW..CRITICAL）。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum EventPriority {
    Low = 0,
    #[default]
    Normal = 1,
    High = 2,
    Critical = 3,
}

impl From<EventPriority> for u8 {
    fn from(value: EventPriority) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for EventPriority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Low),
            1 => Ok(Self::Normal),
            2 => Ok(Self::High),
            3 => Ok(Self::Critical),
            other => Err(format!("unknown event priority: {other}")),
        }
    }
}

impl fmt::Display for EventPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Critical => "critical",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_numeric_value() {
        let mut ps = vec![
            EventPriority::Normal,
            EventPriority::Critical,
            EventPriority::Low,
            EventPriority::High,
        ];
        ps.sort_by(|a, b| b.cmp(a));
        assert_eq!(
            ps,
            vec![
                EventPriority::Critical,
                EventPriority::High,
                EventPriority::Normal,
                EventPriority::Low
            ]
        );
    }

    #[test]
    fn serializes_as_integer() {
        assert_eq!(serde_json::to_string(&EventPriority::High).unwrap(), "2");
        let p: EventPriority = serde_json::from_str("3").unwrap();
        assert_eq!(p, EventPriority::Critical);
        assert!(serde_json::from_str::<EventPriority>("7").is_err());
    }
}
