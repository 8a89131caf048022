//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap the upstream call with a response-head deadline
//! - Carry connect, response and shutdown-grace durations
//! - Cancel the upstream call cleanly on timeout
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - Timed-out requests return 504 Gateway Timeout
//! - Body streaming is not bounded; only the wait for the head is

use std::future::Future;
use std::time::Duration;

use crate::config::TimeoutConfig;
use crate::error::{classify_upstream, ProxyError};

#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub connect: Duration,
    pub upstream: Duration,
    pub shutdown_grace: Duration,
}

impl From<&TimeoutConfig> for Timeouts {
    fn from(config: &TimeoutConfig) -> Self {
        Self {
            connect: Duration::from_secs(config.connect_secs),
            upstream: Duration::from_secs(config.upstream_secs),
            shutdown_grace: Duration::from_secs(config.shutdown_grace_secs),
        }
    }
}

/// Await an upstream call, classifying transport errors and elapsed deadlines.
pub async fn upstream_call<F, T>(limit: Duration, call: F) -> Result<T, ProxyError>
where
    F: Future<Output = Result<T, hyper_util::client::legacy::Error>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(classify_upstream(e)),
        Err(_) => Err(ProxyError::UpstreamTimeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn elapsed_deadline_is_timeout() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, hyper_util::client::legacy::Error>(())
        };
        let err = upstream_call(Duration::from_secs(1), slow).await.unwrap_err();
        assert!(matches!(err, ProxyError::UpstreamTimeout(d) if d == Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn fast_call_passes_through() {
        let fast = async { Ok::<_, hyper_util::client::legacy::Error>(7) };
        assert_eq!(upstream_call(Duration::from_secs(1), fast).await.unwrap(), 7);
    }

    #[test]
    fn from_config() {
        let timeouts = Timeouts::from(&TimeoutConfig::default());
        assert_eq!(timeouts.connect, Duration::from_secs(5));
        assert_eq!(timeouts.upstream, Duration::from_secs(30));
        assert_eq!(timeouts.shutdown_grace, Duration::from_secs(10));
    }
}
