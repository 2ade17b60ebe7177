//! 投递报告
//!
//! `publish` 不会因处理器失败而报错，处理结果通过报告（以及日志）暴露给调用方。
//!
use crate::domain_event::{DomainEvent, EventStatus};

/// 单个处理器对单个事件的投递结果
#[derive(Debug, Clone)]
pub struct Delivery {
    pub handler: String,
    /// 实际调用次数（首次 + 重试）
    pub attempts: u32,
    /// 终态：`Processed` 或 `Failed`
    pub status: EventStatus,
    /// 最后一次失败的原因
    pub error: Option<String>,
}

impl Delivery {
    pub fn is_processed(&self) -> bool {
        self.status == EventStatus::Processed
    }
}

/// 一次 `publish` 的结果：存储中的原始事件与各处理器的投递结果
#[derive(Debug, Clone)]
pub struct PublishReport {
    pub event: DomainEvent,
    pub deliveries: Vec<Delivery>,
}

impl PublishReport {
    pub fn new(event: DomainEvent) -> Self {
        Self {
            event,
            deliveries: Vec::new(),
        }
    }

    pub fn event_id(&self) -> &str {
        self.event.event_id()
    }

    pub fn failed(&self) -> impl Iterator<Item = &Delivery> {
        self.deliveries.iter().filter(|d| !d.is_processed())
    }

    pub fn all_processed(&self) -> bool {
        self.deliveries.iter().all(Delivery::is_processed)
    }
}
