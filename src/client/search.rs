// file: src/client/search.rs
// description: semantic search with adaptive similarity-threshold relaxation
// reference: GET /search contract of the embedding service

use crate::client::endpoint::Endpoint;
use crate::client::normalizer::normalize_all;
use crate::client::transport::Transport;
use crate::config::SearchConfig;
use crate::error::{ClientError, Result};
use crate::models::{RawSearchResponse, SearchQuery, UnifiedSearchResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Amount the threshold drops after an empty attempt.
pub const RELAX_STEP: f64 = 0.05;
pub const THRESHOLD_FLOOR: f64 = 0.0;

/// Emitted before each relaxed retry. Progress, not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct RelaxEvent {
    pub query: String,
    /// Number of the attempt that came back empty, starting at 1.
    pub attempt: usize,
    pub from: f64,
    pub to: f64,
}

pub trait SearchObserver: Send + Sync {
    fn on_relax(&self, event: &RelaxEvent);
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl SearchObserver for NoopObserver {
    fn on_relax(&self, _event: &RelaxEvent) {}
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub query: String,
    pub results: Vec<UnifiedSearchResult>,
    /// Threshold that produced `results`; may be lower than requested.
    pub threshold: f64,
    pub requested_threshold: f64,
    pub attempts: usize,
    /// Server-side time of the final attempt, when reported.
    pub time_taken: Option<f64>,
}

impl SearchOutcome {
    pub fn was_relaxed(&self) -> bool {
        self.threshold < self.requested_threshold
    }
}

/// Per-call relaxation state. Never shared between calls.
#[derive(Debug)]
struct SearchSession {
    threshold: f64,
    attempts: usize,
}

impl SearchSession {
    fn new(threshold: f64) -> Self {
        Self {
            threshold,
            attempts: 0,
        }
    }

    fn exhausted(&self) -> bool {
        self.threshold <= THRESHOLD_FLOOR
    }

    fn next_threshold(&self) -> f64 {
        // rounded so repeated steps land exactly on 0.45, 0.40, ...
        let next = ((self.threshold - RELAX_STEP) * 1e6).round() / 1e6;
        next.max(THRESHOLD_FLOOR).min(self.threshold)
    }
}

#[derive(Clone)]
pub struct SearchClient {
    endpoint: Endpoint,
    transport: Arc<dyn Transport>,
    limit: usize,
    default_threshold: f64,
    relax_delay: Duration,
}

impl SearchClient {
    pub fn new(endpoint: Endpoint, transport: Arc<dyn Transport>, config: &SearchConfig) -> Self {
        Self {
            endpoint,
            transport,
            limit: config.limit.max(1),
            default_threshold: config.score_threshold,
            relax_delay: config.relax_delay(),
        }
    }

    /// Same client asking for at most `limit` results per attempt.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub async fn search(&self, query: &str, threshold: Option<f64>) -> Result<SearchOutcome> {
        self.search_with(query, threshold, &NoopObserver).await
    }

    /// Searches at `threshold` (or the configured default). While nothing
    /// comes back the threshold is lowered by [`RELAX_STEP`] down to zero,
    /// notifying `observer` before each retry. Any failed attempt aborts the
    /// whole search.
    pub async fn search_with(
        &self,
        query: &str,
        threshold: Option<f64>,
        observer: &dyn SearchObserver,
    ) -> Result<SearchOutcome> {
        let requested = threshold
            .filter(|t| t.is_finite())
            .unwrap_or(self.default_threshold)
            .clamp(THRESHOLD_FLOOR, 1.0);

        info!("Searching for {:?} (threshold {:.2})", query, requested);
        let mut session = SearchSession::new(requested);

        loop {
            session.attempts += 1;
            let request = SearchQuery::new(query, self.limit, session.threshold);
            let (results, time_taken) = self.search_once(&request).await?;

            if !results.is_empty() || session.exhausted() {
                info!(
                    "Search returned {} results at threshold {:.2} after {} attempt(s)",
                    results.len(),
                    session.threshold,
                    session.attempts
                );
                return Ok(SearchOutcome {
                    query: query.to_string(),
                    results,
                    threshold: session.threshold,
                    requested_threshold: requested,
                    attempts: session.attempts,
                    time_taken,
                });
            }

            let next = session.next_threshold();
            debug!(
                "No results at threshold {:.2}, relaxing to {:.2}",
                session.threshold, next
            );
            observer.on_relax(&RelaxEvent {
                query: query.to_string(),
                attempt: session.attempts,
                from: session.threshold,
                to: next,
            });

            if !self.relax_delay.is_zero() {
                tokio::time::sleep(self.relax_delay).await;
            }
            session.threshold = next;
        }
    }

    async fn search_once(
        &self,
        request: &SearchQuery,
    ) -> Result<(Vec<UnifiedSearchResult>, Option<f64>)> {
        let base = self.endpoint.url_for("/search");
        let mut url = Url::parse(&base)
            .map_err(|e| ClientError::invalid_endpoint(self.endpoint.as_str(), e.to_string()))?;
        url.query_pairs_mut().extend_pairs(request.query_pairs());

        let response: RawSearchResponse = self
            .transport
            .get(url.as_str())
            .await?
            .into_json(url.as_str())?;

        let results = normalize_all(response.results)?;
        Ok((results, response.time_taken))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::TransportResponse;
    use crate::client::transport::stub::{Method, RecordedRequest, StubTransport};
    use crate::error::ErrorKind;
    use crate::models::UnifiedContent;
    use std::sync::Mutex;

    const EMPTY: &str = r#"{"query": "x", "results": [], "time_taken": 0.01}"#;
    const ONE_HIT: &str = r#"{"query": "x", "results": [
        {"id": "doc1", "score": 0.21, "source_type": "text", "content": {"text": "result 1"}}
    ], "time_taken": 0.02}"#;

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<RelaxEvent>>,
    }

    impl SearchObserver for RecordingObserver {
        fn on_relax(&self, event: &RelaxEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn config() -> SearchConfig {
        SearchConfig {
            limit: 10,
            score_threshold: 0.1,
            relax_delay_ms: 0,
        }
    }

    fn client(stub: Arc<StubTransport>) -> SearchClient {
        SearchClient::new(Endpoint::resolve("http://test").unwrap(), stub, &config())
    }

    fn threshold_of(req: &RecordedRequest) -> f64 {
        req.query_param("score_threshold").unwrap().parse().unwrap()
    }

    fn sent_thresholds(stub: &StubTransport) -> Vec<String> {
        stub.requests()
            .iter()
            .map(|r| r.query_param("score_threshold").unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_request_shape() {
        let stub = Arc::new(StubTransport::json(200, ONE_HIT));
        client(stub.clone()).search("test query", Some(0.5)).await.unwrap();

        let request = &stub.requests()[0];
        assert_eq!(request.method, Method::Get);
        assert!(request.url.starts_with("http://test/search?"));
        assert_eq!(request.query_param("query").as_deref(), Some("test query"));
        assert_eq!(request.query_param("limit").as_deref(), Some("10"));
        assert_eq!(request.query_param("score_threshold").as_deref(), Some("0.5"));
    }

    #[tokio::test]
    async fn test_first_attempt_hit_is_not_relaxed() {
        let stub = Arc::new(StubTransport::json(200, ONE_HIT));
        let observer = RecordingObserver::default();
        let outcome = client(stub)
            .search_with("x", Some(0.5), &observer)
            .await
            .unwrap();

        assert_eq!(outcome.threshold, 0.5);
        assert_eq!(outcome.attempts, 1);
        assert!(!outcome.was_relaxed());
        assert_eq!(outcome.time_taken, Some(0.02));
        assert!(observer.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_relaxes_until_results_appear() {
        let stub = Arc::new(StubTransport::new(|req| {
            let body = if threshold_of(req) > 0.2 { EMPTY } else { ONE_HIT };
            Ok(TransportResponse::new(200, body))
        }));
        let observer = RecordingObserver::default();

        let outcome = client(stub.clone())
            .search_with("x", Some(0.5), &observer)
            .await
            .unwrap();

        assert_eq!(outcome.threshold, 0.2);
        assert_eq!(outcome.requested_threshold, 0.5);
        assert!(outcome.was_relaxed());
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(
            outcome.results[0].content,
            UnifiedContent::Text {
                text: "result 1".to_string()
            }
        );
        assert_eq!(outcome.attempts, 7);
        assert_eq!(
            sent_thresholds(&stub),
            ["0.5", "0.45", "0.4", "0.35", "0.3", "0.25", "0.2"]
        );

        let events = observer.events.lock().unwrap();
        assert_eq!(events.len(), 6);
        assert_eq!(events[0].from, 0.5);
        assert_eq!(events[0].to, 0.45);
        assert_eq!(events[5].to, 0.2);
    }

    #[tokio::test]
    async fn test_always_empty_stops_at_zero_after_eleven_attempts() {
        let stub = Arc::new(StubTransport::json(200, EMPTY));
        let observer = RecordingObserver::default();

        let outcome = client(stub.clone())
            .search_with("x", Some(0.5), &observer)
            .await
            .unwrap();

        assert_eq!(outcome.threshold, 0.0);
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.attempts, 11);
        assert_eq!(
            sent_thresholds(&stub),
            ["0.5", "0.45", "0.4", "0.35", "0.3", "0.25", "0.2", "0.15", "0.1", "0.05", "0"]
        );
        assert_eq!(observer.events.lock().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_threshold_sequence_is_bounded_and_non_increasing() {
        let stub = Arc::new(StubTransport::json(200, EMPTY));
        let outcome = client(stub.clone()).search("x", Some(0.33)).await.unwrap();

        let sent: Vec<f64> = stub.requests().iter().map(threshold_of).collect();
        assert!(sent.windows(2).all(|w| w[1] < w[0]));
        assert!(sent.iter().all(|t| (0.0..=0.33).contains(t)));
        assert_eq!(*sent.last().unwrap(), 0.0);
        assert!(outcome.attempts <= (0.33f64 / RELAX_STEP).ceil() as usize + 1);
    }

    #[tokio::test]
    async fn test_zero_threshold_makes_a_single_attempt() {
        let stub = Arc::new(StubTransport::json(200, EMPTY));
        let outcome = client(stub.clone()).search("x", Some(0.0)).await.unwrap();
        assert_eq!(outcome.attempts, 1);
        assert_eq!(stub.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_default_threshold_used_when_none_given() {
        let stub = Arc::new(StubTransport::json(200, ONE_HIT));
        let outcome = client(stub.clone()).search("x", None).await.unwrap();
        assert_eq!(outcome.requested_threshold, 0.1);
        assert_eq!(sent_thresholds(&stub), ["0.1"]);
    }

    #[tokio::test]
    async fn test_transport_failure_aborts_without_retry() {
        let stub = Arc::new(StubTransport::new(|req| {
            if threshold_of(req) < 0.45 {
                Err(ClientError::transport(&req.url, "connection reset"))
            } else {
                Ok(TransportResponse::new(200, EMPTY))
            }
        }));

        let err = client(stub.clone()).search("x", Some(0.5)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(sent_thresholds(&stub), ["0.5", "0.45", "0.4"]);
    }

    #[tokio::test]
    async fn test_service_error_aborts() {
        let stub = Arc::new(StubTransport::json(503, "unavailable"));
        let err = client(stub.clone()).search("x", Some(0.5)).await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(stub.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_hit_is_reported() {
        let stub = Arc::new(StubTransport::json(
            200,
            r#"{"query": "x", "results": [{"id": "a", "score": 0.9, "source_type": "audio", "content": {}}]}"#,
        ));
        let err = client(stub).search("x", Some(0.5)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResult);
    }

    #[tokio::test]
    async fn test_concurrent_searches_do_not_interfere() {
        let stub = Arc::new(StubTransport::new(|req| {
            let query = req.query_param("query").unwrap();
            let body = if query == "found" || threshold_of(req) <= 0.4 {
                ONE_HIT
            } else {
                EMPTY
            };
            Ok(TransportResponse::new(200, body))
        }));
        let client = client(stub);

        let (a, b) = tokio::join!(
            client.search("found", Some(0.5)),
            client.search("rare", Some(0.5))
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!((a.threshold, a.attempts), (0.5, 1));
        assert_eq!((b.threshold, b.attempts), (0.4, 3));
    }

    #[tokio::test]
    async fn test_with_limit_changes_request_limit() {
        let stub = Arc::new(StubTransport::json(200, ONE_HIT));
        client(stub.clone()).with_limit(3).search("x", None).await.unwrap();
        assert_eq!(stub.requests()[0].query_param("limit").as_deref(), Some("3"));
    }

    #[test]
    fn test_session_steps_clamp_to_floor() {
        let session = SearchSession::new(0.03);
        assert_eq!(session.next_threshold(), 0.0);
        assert!(!session.exhausted());
        assert!(SearchSession::new(0.0).exhausted());
    }
}
