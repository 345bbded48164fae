use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io;

/// A single thread (or reply) as returned by the API. Fields are passed
/// through as-is; only the requested field set is modelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub permalink: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl Post {
    /// Field list requested for posts and conversation replies.
    pub const FIELDS: &'static [&'static str] = &["id", "permalink", "username", "timestamp", "text"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBio {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, rename = "threads_profile_picture_url")]
    pub profile_picture_url: Option<String>,
    #[serde(default, rename = "threads_biography")]
    pub biography: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl UserBio {
    pub const FIELDS: &'static [&'static str] = &[
        "id",
        "username",
        "threads_profile_picture_url",
        "threads_biography",
        "name",
    ];
}

/// Token exchange payload. Anything beyond the documented keys is kept in
/// `extra` so nothing the server sends is lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongLivedToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightMetric {
    Views,
    Likes,
    Replies,
    Reposts,
    Quotes,
    FollowersCount,
}

impl InsightMetric {
    /// Metrics requested from the per-thread insights endpoint.
    pub const THREAD_METRICS: [InsightMetric; 5] = [
        InsightMetric::Views,
        InsightMetric::Likes,
        InsightMetric::Replies,
        InsightMetric::Reposts,
        InsightMetric::Quotes,
    ];

    /// Columns added to every report row.
    pub const REPORT_COLUMNS: [InsightMetric; 6] = [
        InsightMetric::Views,
        InsightMetric::Likes,
        InsightMetric::Replies,
        InsightMetric::Reposts,
        InsightMetric::Quotes,
        InsightMetric::FollowersCount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InsightMetric::Views => "views",
            InsightMetric::Likes => "likes",
            InsightMetric::Replies => "replies",
            InsightMetric::Reposts => "reposts",
            InsightMetric::Quotes => "quotes",
            InsightMetric::FollowersCount => "followers_count",
        }
    }
}

impl fmt::Display for InsightMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flattened insights for one thread: metric name to its first reported value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadInsights {
    values: BTreeMap<String, u64>,
}

impl ThreadInsights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: u64) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, metric: InsightMetric) -> Option<u64> {
        self.values.get(metric.as_str()).copied()
    }

    pub fn get_named(&self, name: &str) -> Option<u64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, u64)> for ThreadInsights {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// A listed post with its insight columns attached. Missing metrics stay `None`
/// and serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    #[serde(flatten)]
    pub post: Post,
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub replies: Option<u64>,
    pub reposts: Option<u64>,
    pub quotes: Option<u64>,
    pub followers_count: Option<u64>,
}

impl ReportRow {
    pub fn new(post: Post, insights: &ThreadInsights) -> Self {
        Self {
            post,
            views: insights.get(InsightMetric::Views),
            likes: insights.get(InsightMetric::Likes),
            replies: insights.get(InsightMetric::Replies),
            reposts: insights.get(InsightMetric::Reposts),
            quotes: insights.get(InsightMetric::Quotes),
            followers_count: insights.get(InsightMetric::FollowersCount),
        }
    }

    pub fn metric(&self, metric: InsightMetric) -> Option<u64> {
        match metric {
            InsightMetric::Views => self.views,
            InsightMetric::Likes => self.likes,
            InsightMetric::Replies => self.replies,
            InsightMetric::Reposts => self.reposts,
            InsightMetric::Quotes => self.quotes,
            InsightMetric::FollowersCount => self.followers_count,
        }
    }
}

/// Ordered report rows, one per listed post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InsightReport {
    pub rows: Vec<ReportRow>,
}

impl InsightReport {
    pub fn new(rows: Vec<ReportRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn header() -> Vec<&'static str> {
        let mut header = Post::FIELDS.to_vec();
        header.extend(InsightMetric::REPORT_COLUMNS.iter().map(|m| m.as_str()));
        header
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(Self::header())?;

        for row in &self.rows {
            let mut record = vec![
                row.post.id.clone(),
                row.post.permalink.clone().unwrap_or_default(),
                row.post.username.clone().unwrap_or_default(),
                row.post.timestamp.clone().unwrap_or_default(),
                row.post.text.clone().unwrap_or_default(),
            ];
            record.extend(
                InsightMetric::REPORT_COLUMNS
                    .iter()
                    .map(|m| row.metric(*m).map(|v| v.to_string()).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn to_csv(&self) -> Result<String, csv::Error> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
