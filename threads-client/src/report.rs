use crate::client::ThreadsClient;
use futures::stream::{self, StreamExt, TryStreamExt};
use threads_core::{InsightReport, ReportRow, ThreadInsights, ThreadsError};
use tracing::info;

impl ThreadsClient {
    /// Lists recent threads, then fetches insights for each one in listing
    /// order and joins them into a report. One row per listed post.
    pub async fn build_insight_report(&self) -> Result<InsightReport, ThreadsError> {
        info!("Listing threads for insight report");
        let posts = self.list_threads().await?;

        info!("Fetching insights for {} threads", posts.len());
        let mut rows = Vec::with_capacity(posts.len());
        for post in posts {
            let insights = self.get_thread_insights(&post.id).await?;
            rows.push(ReportRow::new(post, &insights));
        }

        Ok(InsightReport::new(rows))
    }

    /// Same as [`ThreadsClient::build_insight_report`] but keeps up to
    /// `max_in_flight` insight requests running at once. Rows still come back
    /// in listing order, and the first failure aborts the whole report.
    pub async fn build_insight_report_concurrent(
        &self,
        max_in_flight: usize,
    ) -> Result<InsightReport, ThreadsError> {
        info!("Listing threads for insight report");
        let posts = self.list_threads().await?;

        info!(
            "Fetching insights for {} threads ({} at a time)",
            posts.len(),
            max_in_flight.max(1)
        );
        let insights: Vec<ThreadInsights> = stream::iter(posts.iter())
            .map(|post| self.get_thread_insights(&post.id))
            .buffered(max_in_flight.max(1))
            .try_collect()
            .await?;

        let rows = posts
            .into_iter()
            .zip(insights.iter())
            .map(|(post, insights)| ReportRow::new(post, insights))
            .collect();

        Ok(InsightReport::new(rows))
    }
}
