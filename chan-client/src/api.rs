use crate::metrics::{ApiMetrics, MetricsCollector, RequestMetrics};
use chanwatch_core::{ChanApiError, ClientSettings, ConfigError, CoreError, RawPost};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogPage {
    pub page: u32,
    #[serde(default)]
    pub threads: Vec<CatalogThread>,
}

/// Thread stub as listed in the catalog. `time` is the OP's timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogThread {
    pub no: i64,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub replies: u32,
    #[serde(default)]
    pub images: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadResponse {
    #[serde(default)]
    pub posts: Vec<RawPost>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Catalog,
    Thread,
    Archive,
}

impl Endpoint {
    fn label(self) -> &'static str {
        match self {
            Endpoint::Catalog => "catalog",
            Endpoint::Thread => "thread",
            Endpoint::Archive => "archive",
        }
    }
}

#[derive(Debug)]
pub struct ChanApiClient {
    http_client: Client,
    metrics: Arc<MetricsCollector>,
    api_base: Url,
    user_agent: String,
}

impl ChanApiClient {
    pub fn new(settings: &ClientSettings) -> Result<Self, CoreError> {
        let api_base = Url::parse(&settings.api_base).map_err(|e| ConfigError::InvalidValue {
            field: "client.api_base".to_string(),
            value: format!("{} ({})", settings.api_base, e),
        })?;

        let http_client = Client::builder()
            .user_agent(&settings.user_agent)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            metrics: Arc::new(MetricsCollector::new()),
            api_base,
            user_agent: settings.user_agent.clone(),
        })
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base.as_str().trim_end_matches('/'), path)
    }

    async fn make_request(&self, kind: Endpoint, path: &str) -> Result<Response, CoreError> {
        let url = self.endpoint_url(path);
        let start_time = Instant::now();

        debug!("Requesting {}", url);
        let outcome = match self.http_client.get(&url).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    Ok(response)
                } else {
                    error!("Request failed with status: {} for {}", status, path);
                    Err(status_error(status, path))
                }
            }
            Err(e) => {
                error!("Network error for {}: {}", path, e);
                if e.is_timeout() {
                    Err(CoreError::ChanApi(ChanApiError::RequestTimeout))
                } else {
                    Err(CoreError::Network(e))
                }
            }
        };

        let request_metrics = RequestMetrics {
            endpoint: kind.label().to_string(),
            status_code: match &outcome {
                Ok(response) => Some(response.status().as_u16()),
                Err(CoreError::ChanApi(ChanApiError::ServerError { status_code }))
                | Err(CoreError::ChanApi(ChanApiError::UnexpectedStatus { status_code, .. })) => {
                    Some(*status_code)
                }
                Err(CoreError::ChanApi(ChanApiError::NotFound { .. })) => Some(404),
                Err(_) => None,
            },
            response_time: start_time.elapsed(),
            success: outcome.is_ok(),
            error_type: outcome.as_ref().err().map(error_type),
        };
        self.metrics.record_request(request_metrics).await;

        outcome
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        kind: Endpoint,
        path: &str,
    ) -> Result<T, CoreError> {
        let response = self.make_request(kind, path).await?;
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse {} response: {}", kind.label(), e);
            CoreError::ChanApi(ChanApiError::InvalidResponse {
                details: format!("Failed to parse {}: {}", path, e),
            })
        })
    }

    /// Active threads of a board, grouped by catalog page.
    pub async fn get_catalog(&self, board: &str) -> Result<Vec<CatalogPage>, CoreError> {
        let pages: Vec<CatalogPage> = self
            .get_json(Endpoint::Catalog, &format!("/{}/catalog.json", board))
            .await?;

        info!(
            "Retrieved {} catalog pages ({} threads) from /{}/",
            pages.len(),
            pages.iter().map(|p| p.threads.len()).sum::<usize>(),
            board
        );
        Ok(pages)
    }

    pub async fn get_thread(&self, board: &str, thread_no: i64) -> Result<ThreadResponse, CoreError> {
        let thread: ThreadResponse = self
            .get_json(
                Endpoint::Thread,
                &format!("/{}/thread/{}.json", board, thread_no),
            )
            .await?;

        debug!(
            "Retrieved {} posts from /{}/thread/{}",
            thread.posts.len(),
            board,
            thread_no
        );
        Ok(thread)
    }

    /// Numbers of archived threads, oldest first as the board lists them.
    pub async fn get_archive(&self, board: &str) -> Result<Vec<i64>, CoreError> {
        let threads: Vec<i64> = self
            .get_json(Endpoint::Archive, &format!("/{}/archive.json", board))
            .await
            .map_err(|e| match e {
                CoreError::ChanApi(ChanApiError::NotFound { .. }) => {
                    CoreError::ChanApi(ChanApiError::ArchiveUnavailable {
                        board: board.to_string(),
                    })
                }
                other => other,
            })?;

        info!("Retrieved {} archived threads from /{}/", threads.len(), board);
        Ok(threads)
    }

    /// Snapshot of every request made through this client so far.
    pub async fn get_metrics(&self) -> ApiMetrics {
        self.metrics.get_metrics().await
    }
}

fn status_error(status: StatusCode, path: &str) -> CoreError {
    let api_error = if status == StatusCode::NOT_FOUND {
        ChanApiError::NotFound {
            resource: path.to_string(),
        }
    } else if status.is_server_error() {
        ChanApiError::ServerError {
            status_code: status.as_u16(),
        }
    } else {
        ChanApiError::UnexpectedStatus {
            status_code: status.as_u16(),
            endpoint: path.to_string(),
        }
    };
    CoreError::ChanApi(api_error)
}

fn error_type(error: &CoreError) -> String {
    match error {
        CoreError::ChanApi(ChanApiError::NotFound { .. }) => "not_found",
        CoreError::ChanApi(ChanApiError::ServerError { .. }) => "server_error",
        CoreError::ChanApi(ChanApiError::RequestTimeout) => "timeout",
        CoreError::ChanApi(_) => "unexpected_status",
        _ => "network_error",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_client_creation() {
        let client = ChanApiClient::new(&ClientSettings::default()).unwrap();
        assert_eq!(client.user_agent(), "chanwatch/0.1");
        assert_eq!(
            client.endpoint_url("/pol/catalog.json"),
            "https://a.4cdn.org/pol/catalog.json"
        );
    }

    #[test]
    fn test_invalid_api_base() {
        let settings = ClientSettings {
            api_base: "not a url".to_string(),
            ..Default::default()
        };
        let err = ChanApiClient::new(&settings).unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "/pol/thread/1.json"),
            CoreError::ChanApi(ChanApiError::NotFound { .. })
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, "/pol/catalog.json"),
            CoreError::ChanApi(ChanApiError::ServerError { status_code: 502 })
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "/pol/catalog.json"),
            CoreError::ChanApi(ChanApiError::UnexpectedStatus { status_code: 403, .. })
        ));
    }

    #[test]
    fn test_catalog_deserialization() {
        let json = r#"[
            {"page": 1, "threads": [
                {"no": 100, "time": 1761000000, "sub": "General", "replies": 5, "images": 1, "com": "ignored"}
            ]},
            {"page": 2}
        ]"#;

        let pages: Vec<CatalogPage> = serde_json::from_str(json).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].threads[0].no, 100);
        assert_eq!(pages[0].threads[0].sub.as_deref(), Some("General"));
        assert!(pages[1].threads.is_empty());
    }
}
