pub mod api;
pub mod client;
pub mod clock;
pub mod media;
pub mod metrics;
pub mod report;


pub use api::ApiTransport;
pub use client::ThreadsClient;
pub use clock::{Clock, FixedClock, SystemClock};
pub use media::{MediaPayload, MediaType};
pub use metrics::{ApiMetrics, CallOutcome, MetricsCollector, Operation, OperationMetrics};
