//! The `search` tool adapter
//!
//! Sits between the untyped tool arguments coming from the MCP host and the
//! typed [`SearchService`]. Every outcome, failures included, becomes a
//! well-formed `CallToolResult`.

pub mod format;
pub mod params;

use rmcp::model::{CallToolResult, Content};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::sanitize::sanitize_error_message;
use crate::search::{SearchQuery, SearchService};

pub use format::{format_date, format_freshness, render_response};
pub use params::SearchParams;

/// Upper bound on a single tool invocation
pub const INVOKE_TIMEOUT: Duration = Duration::from_secs(30);

/// Adapter exposing a [`SearchService`] as the `search` tool
#[derive(Clone)]
pub struct SearchTool {
    service: Arc<dyn SearchService>,
    timeout: Duration,
}

impl SearchTool {
    pub fn new(service: Arc<dyn SearchService>) -> Self {
        Self {
            service,
            timeout: INVOKE_TIMEOUT,
        }
    }

    /// Override the invocation timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run one tool call
    ///
    /// Bad arguments never reach the service. The call is bounded by the
    /// adapter timeout as well as by `cancel`.
    pub async fn invoke(&self, cancel: CancellationToken, params: SearchParams) -> CallToolResult {
        let request = match params.into_request() {
            Ok(request) => request,
            Err(message) => {
                tracing::debug!(%message, "Rejected search arguments");
                return error_result(message);
            }
        };

        // Mirrors what the service will send, for rendering
        let query = match SearchQuery::try_from(request.clone()) {
            Ok(query) => query,
            Err(e) => return error_result(sanitize_error_message(&e.to_string())),
        };

        let search = self.service.search(&cancel, request);
        let outcome = match tokio::time::timeout(self.timeout, search).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(query = %query.query, "Search timed out");
                return error_result(format!(
                    "Search timed out after {} seconds",
                    self.timeout.as_secs()
                ));
            }
        };

        match outcome {
            Ok(response) => {
                tracing::info!(
                    query = %query.query,
                    results = response.results.len(),
                    backend = self.service.name(),
                    "Search completed"
                );
                CallToolResult::success(vec![Content::text(render_response(&query, &response))])
            }
            Err(e) => {
                let message = sanitize_error_message(&e.to_string());
                tracing::warn!(error = %message, "Search failed");
                error_result(format!("Search failed: {}", message))
            }
        }
    }
}

fn error_result(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{BochaResult, SearchError, SearchRequest, SearchResponse, SearchResult};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Scripted service recording the requests it receives
    struct FakeService {
        outcome: Box<dyn Fn() -> BochaResult<SearchResponse> + Send + Sync>,
        delay: Duration,
        calls: Mutex<Vec<SearchRequest>>,
    }

    impl FakeService {
        fn returning(
            outcome: impl Fn() -> BochaResult<SearchResponse> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                outcome: Box::new(outcome),
                delay: Duration::ZERO,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn hanging() -> Arc<Self> {
            Arc::new(Self {
                outcome: Box::new(|| Ok(SearchResponse::default())),
                delay: Duration::from_secs(3600),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SearchService for FakeService {
        fn name(&self) -> &str {
            "fake"
        }

        async fn search(
            &self,
            _cancel: &CancellationToken,
            request: SearchRequest,
        ) -> BochaResult<SearchResponse> {
            self.calls.lock().unwrap().push(request);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            (self.outcome)()
        }
    }

    fn params(args: serde_json::Value) -> SearchParams {
        serde_json::from_value(args).unwrap()
    }

    fn text_of(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|c| c.as_text().map(|t| t.text.clone()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn is_error(result: &CallToolResult) -> bool {
        result.is_error.unwrap_or(false)
    }

    #[tokio::test]
    async fn test_invoke_renders_results() {
        let service = FakeService::returning(|| {
            Ok(SearchResponse {
                results: vec![SearchResult {
                    title: "Result A".to_string(),
                    url: "https://a.example.org".to_string(),
                    description: "First".to_string(),
                    date_published: None,
                    site_name: None,
                    site_icon: None,
                    thumbnail: None,
                }],
                images: vec![],
                summary: Some("Sum".to_string()),
            })
        });
        let tool = SearchTool::new(service.clone());

        let result = tool
            .invoke(
                CancellationToken::new(),
                params(json!({"query": "ai news", "freshness": "day", "count": 5, "summary": true})),
            )
            .await;

        assert!(!is_error(&result));
        let text = text_of(&result);
        assert!(text.contains("Past 24 hours"));
        assert!(text.contains("Result A"));
        assert!(text.contains("Sum"));
        assert!(text.contains("Results: 1"));

        let calls = service.calls.lock().unwrap();
        assert_eq!(calls[0], SearchRequest::new("ai news").freshness("day").count(5).summary(true));
    }

    #[tokio::test]
    async fn test_empty_query_makes_no_call() {
        let service = FakeService::returning(|| Ok(SearchResponse::default()));
        let tool = SearchTool::new(service.clone());

        let result = tool
            .invoke(CancellationToken::new(), params(json!({"query": ""})))
            .await;

        assert!(is_error(&result));
        assert!(text_of(&result).contains("query"));
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn test_long_query_makes_no_call() {
        let service = FakeService::returning(|| Ok(SearchResponse::default()));
        let tool = SearchTool::new(service.clone());

        let result = tool
            .invoke(
                CancellationToken::new(),
                params(json!({"query": "y".repeat(1001)})),
            )
            .await;

        assert!(is_error(&result));
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn test_bad_freshness_makes_no_call() {
        let service = FakeService::returning(|| Ok(SearchResponse::default()));
        let tool = SearchTool::new(service.clone());

        let result = tool
            .invoke(
                CancellationToken::new(),
                params(json!({"query": "rust", "freshness": "fortnight"})),
            )
            .await;

        assert!(is_error(&result));
        assert!(text_of(&result).contains("fortnight"));
        assert_eq!(service.call_count(), 0);
    }

    #[tokio::test]
    async fn test_service_error_is_sanitized() {
        let service = FakeService::returning(|| {
            Err(SearchError::ProviderError {
                status: 401,
                message: Some("bad token Bearer sk-secret at https://api.internal/v1".to_string()),
            })
        });
        let tool = SearchTool::new(service);

        let result = tool
            .invoke(CancellationToken::new(), params(json!({"query": "rust"})))
            .await;

        assert!(is_error(&result));
        let text = text_of(&result);
        assert!(text.starts_with("Search failed:"));
        assert!(text.contains("401"));
        assert!(!text.contains("sk-secret"));
        assert!(!text.contains("api.internal"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_message() {
        let tool = SearchTool::new(FakeService::hanging());

        let result = tool
            .invoke(CancellationToken::new(), params(json!({"query": "rust"})))
            .await;

        assert!(is_error(&result));
        assert_eq!(text_of(&result), "Search timed out after 30 seconds");
    }

    #[tokio::test]
    async fn test_rate_limited_is_error_result() {
        let service = FakeService::returning(|| Err(SearchError::RateLimited));
        let tool = SearchTool::new(service);

        let result = tool
            .invoke(CancellationToken::new(), params(json!({"query": "rust"})))
            .await;

        assert!(is_error(&result));
        assert!(text_of(&result).contains("rate limit"));
    }
}
