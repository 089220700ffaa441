use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct ApiMetrics {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub average_response_time: Duration,
    pub requests_by_endpoint: HashMap<String, EndpointMetrics>,
}

#[derive(Debug, Clone)]
pub struct EndpointMetrics {
    pub request_count: u64,
    pub success_count: u64,
    pub error_count: u64,
    pub total_response_time: Duration,
    pub min_response_time: Duration,
    pub max_response_time: Duration,
    pub status_codes: BTreeMap<u16, u64>,
    pub errors_by_type: BTreeMap<String, u64>,
}

/// One finished request. `endpoint` is the endpoint kind (`catalog`,
/// `thread`, `archive`), not the full path.
#[derive(Debug, Clone)]
pub struct RequestMetrics {
    pub endpoint: String,
    pub status_code: Option<u16>,
    pub response_time: Duration,
    pub success: bool,
    pub error_type: Option<String>,
}

impl EndpointMetrics {
    fn new() -> Self {
        Self {
            request_count: 0,
            success_count: 0,
            error_count: 0,
            total_response_time: Duration::from_millis(0),
            min_response_time: Duration::from_secs(u64::MAX),
            max_response_time: Duration::from_millis(0),
            status_codes: BTreeMap::new(),
            errors_by_type: BTreeMap::new(),
        }
    }

    fn update(&mut self, metrics: &RequestMetrics) {
        self.request_count += 1;
        self.total_response_time += metrics.response_time;

        if metrics.response_time < self.min_response_time {
            self.min_response_time = metrics.response_time;
        }
        if metrics.response_time > self.max_response_time {
            self.max_response_time = metrics.response_time;
        }

        if let Some(code) = metrics.status_code {
            *self.status_codes.entry(code).or_insert(0) += 1;
        }

        if metrics.success {
            self.success_count += 1;
        } else {
            self.error_count += 1;
            let kind = metrics.error_type.as_deref().unwrap_or("unknown");
            *self.errors_by_type.entry(kind.to_string()).or_insert(0) += 1;
        }
    }

    pub fn average_response_time(&self) -> Duration {
        if self.request_count == 0 {
            Duration::from_millis(0)
        } else {
            self.total_response_time / self.request_count as u32
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.request_count == 0 {
            0.0
        } else {
            self.success_count as f64 / self.request_count as f64
        }
    }

    fn summary(&self, endpoint: &str) -> String {
        let mut line = format!(
            "{}: {} requests, {:.0}% ok, avg {}ms (min {}ms, max {}ms)",
            endpoint,
            self.request_count,
            self.success_rate() * 100.0,
            self.average_response_time().as_millis(),
            self.min_response_time.as_millis(),
            self.max_response_time.as_millis()
        );

        if !self.status_codes.is_empty() {
            let codes: Vec<String> = self
                .status_codes
                .iter()
                .map(|(code, count)| format!("{}={}", code, count))
                .collect();
            line.push_str(&format!(", status {}", codes.join(" ")));
        }
        if !self.errors_by_type.is_empty() {
            let errors: Vec<String> = self
                .errors_by_type
                .iter()
                .map(|(kind, count)| format!("{}={}", kind, count))
                .collect();
            line.push_str(&format!(", errors {}", errors.join(" ")));
        }
        line
    }
}

impl ApiMetrics {
    /// One line per endpoint, sorted by endpoint name.
    pub fn endpoint_summaries(&self) -> Vec<String> {
        let mut endpoints: Vec<(&String, &EndpointMetrics)> =
            self.requests_by_endpoint.iter().collect();
        endpoints.sort_by(|a, b| a.0.cmp(b.0));
        endpoints
            .into_iter()
            .map(|(endpoint, metrics)| metrics.summary(endpoint))
            .collect()
    }

    pub fn log_summary(&self) {
        if self.total_requests == 0 {
            return;
        }
        info!(
            "API requests: {} total, {} ok, {} failed, avg {}ms",
            self.total_requests,
            self.successful_requests,
            self.failed_requests,
            self.average_response_time.as_millis()
        );
        for line in self.endpoint_summaries() {
            info!("  {}", line);
        }
    }
}

#[derive(Debug)]
pub struct MetricsCollector {
    metrics: Arc<RwLock<ApiMetrics>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(RwLock::new(ApiMetrics::default())),
        }
    }

    pub async fn record_request(&self, request_metrics: RequestMetrics) {
        let mut metrics = self.metrics.write().await;

        metrics.total_requests += 1;

        if request_metrics.success {
            metrics.successful_requests += 1;
        } else {
            metrics.failed_requests += 1;
        }

        // Running mean over all requests
        let total_time = metrics.average_response_time * (metrics.total_requests - 1) as u32
            + request_metrics.response_time;
        metrics.average_response_time = total_time / metrics.total_requests as u32;

        metrics
            .requests_by_endpoint
            .entry(request_metrics.endpoint.clone())
            .or_insert_with(EndpointMetrics::new)
            .update(&request_metrics);
    }

    pub async fn get_metrics(&self) -> ApiMetrics {
        self.metrics.read().await.clone()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
