use crate::api::{ApiTransport, CreatedObject, DataEnvelope, InsightEntry};
use crate::clock::{Clock, SystemClock};
use crate::media::{MediaPayload, MediaType};
use crate::metrics::{ApiMetrics, Operation};
use chrono::{Duration, SecondsFormat};
use reqwest::Method;
use std::sync::Arc;
use threads_core::{
    ClientConfig, ConfigError, InsightMetric, LongLivedToken, Post, ThreadInsights, ThreadsError,
    UserBio,
};
use tracing::{debug, info};

/// Client for the Threads Graph API.
///
/// Every method is a single request/response exchange except
/// [`ThreadsClient::build_insight_report`], which chains a listing call with
/// one insights call per post.
#[derive(Debug)]
pub struct ThreadsClient {
    config: ClientConfig,
    transport: ApiTransport,
    clock: Arc<dyn Clock>,
}

impl ThreadsClient {
    pub fn new(config: ClientConfig) -> Result<Self, ThreadsError> {
        let transport = ApiTransport::new(&config)?;
        Ok(Self {
            config,
            transport,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn get_user_bio(&self) -> Result<UserBio, ThreadsError> {
        let params = [("fields", UserBio::FIELDS.join(","))];
        let bio: UserBio = self
            .transport
            .call(Operation::GetUserBio, Method::GET, "/me", &params)
            .await?;

        debug!("Retrieved bio for user {}", bio.id);
        Ok(bio)
    }

    /// Exchanges the configured short-lived token. The stored configuration is
    /// left untouched; persisting the new token is up to the caller.
    pub async fn get_long_lived_access_token(&self) -> Result<LongLivedToken, ThreadsError> {
        let app_secret = self
            .config
            .app_secret
            .clone()
            .ok_or_else(|| ConfigError::MissingField {
                field: "app_secret".to_string(),
            })?;

        let params = [
            ("grant_type", "th_exchange_token".to_string()),
            ("client_secret", app_secret),
        ];
        let token: LongLivedToken = self
            .transport
            .call(Operation::ExchangeToken, Method::GET, "/access_token", &params)
            .await?;

        info!("Exchanged access token (expires in {:?}s)", token.expires_in);
        Ok(token)
    }

    pub async fn get_thread_insights(&self, thread_id: &str) -> Result<ThreadInsights, ThreadsError> {
        info!("Fetching insights for thread {}", thread_id);
        let metrics = InsightMetric::THREAD_METRICS
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let params = [("metric", metrics)];

        let envelope: DataEnvelope<InsightEntry> = self
            .transport
            .call(
                Operation::GetThreadInsights,
                Method::GET,
                &format!("/{}/insights", thread_id),
                &params,
            )
            .await?;

        Ok(flatten_insights(envelope.data))
    }

    pub async fn get_conversation(&self, media_id: &str) -> Result<Vec<Post>, ThreadsError> {
        let params = [
            ("fields", Post::FIELDS.join(",")),
            ("threads-media-id", media_id.to_string()),
            ("limit", self.config.effective_limit().to_string()),
        ];

        let envelope: DataEnvelope<Post> = self
            .transport
            .call(
                Operation::GetConversation,
                Method::GET,
                &format!("/{}/conversation", media_id),
                &params,
            )
            .await?;

        info!("Retrieved {} replies for {}", envelope.data.len(), media_id);
        Ok(envelope.data)
    }

    /// Lists the account's posts created within the backfill window. The window
    /// start is recomputed on every call.
    pub async fn list_threads(&self) -> Result<Vec<Post>, ThreadsError> {
        let params = [
            ("fields", Post::FIELDS.join(",")),
            ("since", self.backfill_since()?),
            ("limit", self.config.effective_limit().to_string()),
        ];

        let envelope: DataEnvelope<Post> = self
            .transport
            .call(
                Operation::ListThreads,
                Method::GET,
                &format!("/{}/threads", self.config.account_id),
                &params,
            )
            .await?;

        info!("Retrieved {} threads", envelope.data.len());
        Ok(envelope.data)
    }

    /// ISO-8601 start of the backfill window, `now - backfill_days`. A window
    /// reaching past the representable date range is a config error.
    pub fn backfill_since(&self) -> Result<String, ThreadsError> {
        let days = self.config.backfill_days;
        let window = Duration::seconds(i64::from(days) * 86_400);
        let start = self
            .clock
            .now()
            .checked_sub_signed(window)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "backfill_days".to_string(),
                value: days.to_string(),
            })?;
        Ok(start.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    /// Creates a pending post container and returns its creation id.
    ///
    /// At most one of `image_url`, `video_url` and the carousel-item flag is
    /// sent, chosen by [`MediaPayload::select`]. A url whose media type does not
    /// match `media_type` is never sent.
    pub async fn create_media_container(
        &self,
        text: Option<&str>,
        media_type: MediaType,
        image_url: Option<&str>,
        video_url: Option<&str>,
        is_carousel_item: bool,
    ) -> Result<String, ThreadsError> {
        let payload = MediaPayload::select(media_type, image_url, video_url, is_carousel_item);

        let mut params = Vec::with_capacity(3);
        if let Some(text) = text {
            params.push(("text", text.to_string()));
        }
        params.push(("media_type", media_type.as_str().to_string()));
        if let Some(param) = payload.query_param() {
            params.push(param);
        }

        let created: CreatedObject = self
            .transport
            .call(
                Operation::CreateMediaContainer,
                Method::POST,
                &format!("/{}/threads", self.config.account_id),
                &params,
            )
            .await?;

        debug!("Created {} container {}", media_type, created.id);
        Ok(created.id)
    }

    /// Publishes a container and returns the live post id.
    pub async fn publish_container(&self, creation_id: &str) -> Result<String, ThreadsError> {
        let params = [("creation_id", creation_id.to_string())];

        let published: CreatedObject = self
            .transport
            .call(
                Operation::PublishContainer,
                Method::POST,
                &format!("/{}/threads_publish", self.config.account_id),
                &params,
            )
            .await?;

        info!("Published container {} as {}", creation_id, published.id);
        Ok(published.id)
    }

    pub async fn create_carousel_container<S: AsRef<str>>(
        &self,
        media_ids: &[S],
        text: Option<&str>,
    ) -> Result<String, ThreadsError> {
        let children = media_ids
            .iter()
            .map(|id| id.as_ref())
            .collect::<Vec<_>>()
            .join(",");

        let mut params = vec![
            ("media_type", MediaType::Carousel.as_str().to_string()),
            ("children", children),
        ];
        if let Some(text) = text {
            params.push(("text", text.to_string()));
        }

        let created: CreatedObject = self
            .transport
            .call(
                Operation::CreateCarouselContainer,
                Method::POST,
                &format!("/{}/threads", self.config.account_id),
                &params,
            )
            .await?;

        debug!(
            "Created carousel container {} with {} children",
            created.id,
            media_ids.len()
        );
        Ok(created.id)
    }

    /// Creates and publishes a text-only post in one go.
    pub async fn publish_text(&self, text: &str) -> Result<String, ThreadsError> {
        let creation_id = self
            .create_media_container(Some(text), MediaType::Text, None, None, false)
            .await?;
        self.publish_container(&creation_id).await
    }

    /// Call counts per operation since this client was created.
    pub async fn metrics(&self) -> ApiMetrics {
        self.transport.metrics().snapshot().await
    }
}

// Keeps the first reported value of each metric. Entries whose first value is
// absent or not a whole count are skipped.
fn flatten_insights(entries: Vec<InsightEntry>) -> ThreadInsights {
    entries
        .into_iter()
        .filter_map(|entry| {
            let first = entry.values.first()?.as_count()?;
            Some((entry.name, first))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::InsightValue;
    use serde_json::json;

    fn value(v: serde_json::Value) -> InsightValue {
        InsightValue { value: Some(v) }
    }

    #[test]
    fn test_flatten_insights_takes_first_value() {
        let entries = vec![
            InsightEntry {
                name: "views".to_string(),
                values: vec![value(json!(10)), value(json!(99))],
            },
            InsightEntry {
                name: "likes".to_string(),
                values: vec![value(json!(3))],
            },
            InsightEntry {
                name: "quotes".to_string(),
                values: vec![],
            },
            InsightEntry {
                name: "reposts".to_string(),
                values: vec![InsightValue { value: None }],
            },
        ];

        let insights = flatten_insights(entries);
        assert_eq!(insights.len(), 2);
        assert_eq!(insights.get(InsightMetric::Views), Some(10));
        assert_eq!(insights.get(InsightMetric::Likes), Some(3));
        assert_eq!(insights.get(InsightMetric::Quotes), None);
        assert_eq!(insights.get(InsightMetric::Reposts), None);
    }
}
