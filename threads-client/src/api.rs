use crate::metrics::{CallOutcome, MetricsCollector, Operation};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use threads_core::{ClientConfig, ThreadsError};
use tracing::{debug, error, info};

/// `{"data": [...]}` wrapper used by list-style endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightEntry {
    pub name: String,
    #[serde(default)]
    pub values: Vec<InsightValue>,
}

/// A single reported value. Kept loose so one odd entry (null, missing,
/// fractional) does not fail the whole response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightValue {
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

impl InsightValue {
    pub fn as_count(&self) -> Option<u64> {
        self.value.as_ref().and_then(|v| v.as_u64())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedObject {
    pub id: String,
}

/// Thin HTTP layer: joins paths onto the base URL, attaches the access token,
/// maps non-200 responses to `RemoteCallFailed` and records one outcome per
/// call.
#[derive(Debug)]
pub struct ApiTransport {
    http_client: Client,
    base_url: String,
    access_token: String,
    metrics: Arc<MetricsCollector>,
}

impl ApiTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ThreadsError> {
        let http_client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
            access_token: config.access_token.clone(),
            metrics: Arc::new(MetricsCollector::new()),
        })
    }

    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }

    /// Performs `operation` and decodes the `200 OK` body as `T`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        operation: Operation,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ThreadsError> {
        let start_time = Instant::now();
        let result = match self.make_request(operation, method, path, params).await {
            Ok(body) => parse_body(&body, operation),
            Err(e) => Err(e),
        };

        self.metrics
            .record(operation, CallOutcome::of(&result), start_time.elapsed())
            .await;
        result
    }

    /// Sends one request and returns the raw body of a `200 OK` response.
    async fn make_request(
        &self,
        operation: Operation,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<u8>, ThreadsError> {
        let url = format!("{}{}", self.base_url, path);

        let mut query: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        query.push(("access_token", self.access_token.as_str()));

        info!("Making Threads API request: {} {} ({})", method, path, operation);
        let response = self
            .http_client
            .request(method.clone(), &url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                error!("Network error for {} {}: {}", method, path, e);
                ThreadsError::Transport(e)
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            error!("Failed to read response body for {} {}: {}", method, path, e);
            ThreadsError::Transport(e)
        })?;

        if status != StatusCode::OK {
            let body = decode_error_body(&body);
            error!(
                "Request failed with status: {} for {} {}: {}",
                status, method, path, body
            );
            return Err(ThreadsError::RemoteCallFailed {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Request successful: {} {}", status, path);
        Ok(body.to_vec())
    }
}

fn parse_body<T: DeserializeOwned>(body: &[u8], operation: Operation) -> Result<T, ThreadsError> {
    serde_json::from_slice(body).map_err(|e| {
        error!("Failed to parse {} response: {}", operation, e);
        ThreadsError::InvalidResponse {
            details: format!("Failed to parse {} response: {}", operation, e),
        }
    })
}

// Error bodies are kept verbatim; a body that is not JSON is carried as a string.
fn decode_error_body(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(body).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_error_body() {
        let body = br#"{"error":{"message":"bad","code":100}}"#;
        assert_eq!(
            decode_error_body(body),
            json!({"error": {"message": "bad", "code": 100}})
        );
        assert_eq!(decode_error_body(b"Bad Gateway"), json!("Bad Gateway"));
    }

    #[test]
    fn test_insight_entries_tolerate_odd_values() {
        let envelope: DataEnvelope<InsightEntry> = serde_json::from_str(
            r#"{"data": [
                {"name": "views", "values": [{"value": 12}]},
                {"name": "likes", "values": [{"value": null}]},
                {"name": "replies", "values": [{"end_time": "2024-06-01"}]},
                {"name": "quotes", "values": [{"value": 1.5}]}
            ]}"#,
        )
        .unwrap();

        let counts: Vec<Option<u64>> = envelope
            .data
            .iter()
            .map(|e| e.values.first().and_then(InsightValue::as_count))
            .collect();
        assert_eq!(counts, vec![Some(12), None, None, None]);
    }

    #[test]
    fn test_data_envelope_defaults_to_empty() {
        let envelope: DataEnvelope<CreatedObject> = serde_json::from_str("{}").unwrap();
        assert!(envelope.data.is_empty());
    }

    #[test]
    fn test_parse_body_reports_invalid_response() {
        let err = parse_body::<CreatedObject>(br#"{"name": "x"}"#, Operation::PublishContainer)
            .unwrap_err();
        assert!(matches!(err, ThreadsError::InvalidResponse { .. }));
    }
}
