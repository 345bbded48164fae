use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use threads_core::ThreadsError;
use tokio::sync::RwLock;

/// The remote operations the client can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    GetUserBio,
    ExchangeToken,
    GetThreadInsights,
    GetConversation,
    ListThreads,
    CreateMediaContainer,
    PublishContainer,
    CreateCarouselContainer,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::GetUserBio => "get_user_bio",
            Operation::ExchangeToken => "exchange_token",
            Operation::GetThreadInsights => "get_thread_insights",
            Operation::GetConversation => "get_conversation",
            Operation::ListThreads => "list_threads",
            Operation::CreateMediaContainer => "create_media_container",
            Operation::PublishContainer => "publish_container",
            Operation::CreateCarouselContainer => "create_carousel_container",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a call ended, bucketed by failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    Succeeded,
    ClientError,
    ServerError,
    Transport,
    InvalidResponse,
}

impl CallOutcome {
    pub fn of<T>(result: &Result<T, ThreadsError>) -> Self {
        match result {
            Ok(_) => CallOutcome::Succeeded,
            Err(ThreadsError::RemoteCallFailed { status, .. }) if *status >= 500 => {
                CallOutcome::ServerError
            }
            Err(ThreadsError::RemoteCallFailed { .. }) => CallOutcome::ClientError,
            Err(ThreadsError::Transport(_)) => CallOutcome::Transport,
            Err(_) => CallOutcome::InvalidResponse,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationMetrics {
    pub calls: u64,
    pub succeeded: u64,
    pub client_errors: u64,
    pub server_errors: u64,
    pub transport_errors: u64,
    pub invalid_responses: u64,
    pub total_latency_ms: u64,
    pub max_latency_ms: u64,
}

impl OperationMetrics {
    fn record(&mut self, outcome: CallOutcome, latency: Duration) {
        let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.calls += 1;
        self.total_latency_ms = self.total_latency_ms.saturating_add(latency_ms);
        self.max_latency_ms = self.max_latency_ms.max(latency_ms);

        match outcome {
            CallOutcome::Succeeded => self.succeeded += 1,
            CallOutcome::ClientError => self.client_errors += 1,
            CallOutcome::ServerError => self.server_errors += 1,
            CallOutcome::Transport => self.transport_errors += 1,
            CallOutcome::InvalidResponse => self.invalid_responses += 1,
        }
    }

    pub fn failed(&self) -> u64 {
        self.calls - self.succeeded
    }
}

/// Per-operation call counts for one client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMetrics {
    pub operations: BTreeMap<Operation, OperationMetrics>,
}

impl ApiMetrics {
    pub fn total_calls(&self) -> u64 {
        self.operations.values().map(|m| m.calls).sum()
    }

    pub fn failed_calls(&self) -> u64 {
        self.operations.values().map(|m| m.failed()).sum()
    }

    pub fn get(&self, operation: Operation) -> Option<&OperationMetrics> {
        self.operations.get(&operation)
    }
}

#[derive(Debug, Default)]
pub struct MetricsCollector {
    metrics: Arc<RwLock<ApiMetrics>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, operation: Operation, outcome: CallOutcome, latency: Duration) {
        let mut metrics = self.metrics.write().await;
        metrics
            .operations
            .entry(operation)
            .or_default()
            .record(outcome, latency);
    }

    pub async fn snapshot(&self) -> ApiMetrics {
        self.metrics.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_classification() {
        let ok: Result<(), ThreadsError> = Ok(());
        assert_eq!(CallOutcome::of(&ok), CallOutcome::Succeeded);

        let not_found: Result<(), ThreadsError> = Err(ThreadsError::RemoteCallFailed {
            status: 404,
            body: json!({}),
        });
        assert_eq!(CallOutcome::of(&not_found), CallOutcome::ClientError);

        let unavailable: Result<(), ThreadsError> = Err(ThreadsError::RemoteCallFailed {
            status: 503,
            body: json!({}),
        });
        assert_eq!(CallOutcome::of(&unavailable), CallOutcome::ServerError);

        let garbled: Result<(), ThreadsError> = Err(ThreadsError::InvalidResponse {
            details: "not json".to_string(),
        });
        assert_eq!(CallOutcome::of(&garbled), CallOutcome::InvalidResponse);
    }

    #[tokio::test]
    async fn test_counts_per_operation() {
        let collector = MetricsCollector::new();
        collector
            .record(Operation::GetThreadInsights, CallOutcome::Succeeded, Duration::from_millis(100))
            .await;
        collector
            .record(Operation::GetThreadInsights, CallOutcome::ServerError, Duration::from_millis(300))
            .await;
        collector
            .record(Operation::ListThreads, CallOutcome::Succeeded, Duration::from_millis(20))
            .await;

        let metrics = collector.snapshot().await;
        assert_eq!(metrics.total_calls(), 3);
        assert_eq!(metrics.failed_calls(), 1);

        let insights = metrics.get(Operation::GetThreadInsights).unwrap();
        assert_eq!(insights.calls, 2);
        assert_eq!(insights.server_errors, 1);
        assert_eq!(insights.total_latency_ms, 400);
        assert_eq!(insights.max_latency_ms, 300);
        assert!(metrics.get(Operation::GetUserBio).is_none());
    }

    #[tokio::test]
    async fn test_snapshot_serializes_operation_names() {
        let collector = MetricsCollector::new();
        collector
            .record(Operation::PublishContainer, CallOutcome::ClientError, Duration::from_millis(5))
            .await;

        let value = serde_json::to_value(collector.snapshot().await).unwrap();
        assert_eq!(value["operations"]["publish_container"]["client_errors"], 1);
    }
}
