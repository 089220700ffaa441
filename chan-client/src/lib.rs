pub mod api;
pub mod metrics;


pub use api::{CatalogPage, CatalogThread, ChanApiClient, ThreadResponse};
pub use metrics::{ApiMetrics, EndpointMetrics, MetricsCollector, RequestMetrics};
