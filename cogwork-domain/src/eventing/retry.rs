//! 重试策略（RetryPolicy）
//!
//! 纯策略对象：判断失败的处理器调用是否需要重试，以及下一次重试前的等待时长
//! （指数退避 + 上限）。
//!
use bon::Builder;
use serde::Deserialize;
use std::any::type_name;
use std::fmt;
use std::time::Duration;

/// 错误类型匹配器：当 `anyhow` 错误链中任意一层是 `E` 时命中
#[derive(Clone, Copy)]
pub struct RetryOn {
    name: &'static str,
    matches: fn(&anyhow::Error) -> bool,
}

impl RetryOn {
    pub fn error<E>() -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            name: type_name::<E>(),
            matches: chain_contains::<E>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn matches(&self, err: &anyhow::Error) -> bool {
        (self.matches)(err)
    }
}

fn chain_contains<E>(err: &anyhow::Error) -> bool
where
    E: std::error::Error + Send + Sync + 'static,
{
    err.chain().any(|cause| cause.is::<E>())
}

impl fmt::Debug for RetryOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RetryOn").field(&self.name).finish()
    }
}

/// 重试策略
///
/// - `max_retries`：首次调用之外允许的最大重试次数；
/// - `get_delay(n)`：第 `n` 次重试前的等待，`min(initial_delay * backoff_factor^n, max_delay)`；
/// - `retry_on`：错误白名单，为空表示任意错误都重试。
#[derive(Debug, Clone, Builder)]
pub struct RetryPolicy {
    #[builder(default = 3)]
    max_retries: u32,
    #[builder(default = 1.5)]
    backoff_factor: f64,
    #[builder(default = Duration::from_secs(1))]
    initial_delay: Duration,
    #[builder(default = Duration::from_secs(60))]
    max_delay: Duration,
    #[builder(default)]
    retry_on: Vec<RetryOn>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RetryPolicy {
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn backoff_factor(&self) -> f64 {
        self.backoff_factor
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    pub fn retry_on(&self) -> &[RetryOn] {
        &self.retry_on
    }

    /// `attempt` 为已经发生的重试次数；达到 `max_retries` 后不再重试
    pub fn should_retry(&self, err: &anyhow::Error, attempt: u32) -> bool {
        if attempt >= self.max_retries {
            return false;
        }
        self.retry_on.is_empty() || self.retry_on.iter().any(|m| m.matches(err))
    }

    pub fn get_delay(&self, attempt: u32) -> Duration {
        let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
        let delay = self.initial_delay.as_secs_f64() * self.backoff_factor.powi(exp);
        let capped = delay.min(self.max_delay.as_secs_f64()).max(0.0);

        if capped.is_finite() {
            Duration::from_secs_f64(capped)
        } else {
            self.max_delay
        }
    }

    /// 处理器声明了自己的错误白名单时，以其覆盖总线策略的白名单
    pub fn for_handler(&self, handler_retry_on: Vec<RetryOn>) -> RetryPolicy {
        if handler_retry_on.is_empty() {
            return self.clone();
        }
        RetryPolicy {
            retry_on: handler_retry_on,
            ..self.clone()
        }
    }
}

/// 可从配置文件加载的重试参数（时长以秒为单位）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub backoff_factor: f64,
    pub initial_delay_secs: f64,
    pub max_delay_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: 1.5,
            initial_delay_secs: 1.0,
            max_delay_secs: 60.0,
        }
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(cfg: RetryConfig) -> Self {
        RetryPolicy::builder()
            .max_retries(cfg.max_retries)
            .backoff_factor(cfg.backoff_factor)
            .initial_delay(secs(cfg.initial_delay_secs))
            .max_delay(secs(cfg.max_delay_secs))
            .build()
    }
}

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or_default()
}
