use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::provider::{
    Classification, ClassifierError, ClassifierLoader, SentimentClassifier, SentimentLabel,
};

/// Text sent once at load time to make sure the model answers.
const WARM_UP_TEXT: &str = "The match starts soon and fans are excited.";

/// Bounds on the pause between warm-up probes while the model is loading
const MIN_LOADING_RETRY: Duration = Duration::from_millis(250);
const DEFAULT_LOADING_RETRY: Duration = Duration::from_secs(5);

/// Sentiment classifier backed by a Hugging Face style inference endpoint.
/// Docs: <https://huggingface.co/docs/api-inference>
pub struct HuggingFaceClassifier {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl HuggingFaceClassifier {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClassifierError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(HuggingFaceClassifier {
            http,
            endpoint: endpoint(base_url, model),
            api_key,
            model: model.to_string(),
        })
    }
}

fn endpoint(base_url: &str, model: &str) -> String {
    format!("{}/models/{}", base_url.trim_end_matches('/'), model)
}

#[async_trait]
impl SentimentClassifier for HuggingFaceClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        debug!("Classifying {} chars with {}", text.len(), self.model);

        let mut req = self
            .http
            .post(&self.endpoint)
            .json(&serde_json::json!({ "inputs": text }));
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        let raw: serde_json::Value = resp.json().await?;
        parse_inference_response(&raw)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// A 503 carrying `{"error": "... is currently loading", "estimated_time": ..}`
/// is a cold model, not an unavailable one.
fn status_error(status: u16, body: String) -> ClassifierError {
    if status == 503 {
        if let Ok(raw) = serde_json::from_str::<serde_json::Value>(&body) {
            let loading = raw["error"]
                .as_str()
                .is_some_and(|e| e.contains("currently loading"));
            if loading {
                return ClassifierError::ModelLoading {
                    estimated_secs: raw["estimated_time"].as_f64(),
                };
            }
        }
    }
    ClassifierError::Status { status, body }
}

/// Pick the highest-scoring known label out of an inference response.
///
/// The endpoint answers either `[[{label, score}, ...]]` (one list per
/// input) or a flat `[{label, score}, ...]`; an `{"error": ...}` object is
/// reported as an invalid response.
fn parse_inference_response(raw: &serde_json::Value) -> Result<Classification, ClassifierError> {
    if let Some(err) = raw["error"].as_str() {
        return Err(ClassifierError::InvalidResponse(err.to_string()));
    }

    let outer = raw
        .as_array()
        .ok_or_else(|| ClassifierError::InvalidResponse(format!("expected array, got {}", raw)))?;
    let candidates = match outer.first() {
        Some(serde_json::Value::Array(inner)) => inner.as_slice(),
        _ => outer.as_slice(),
    };

    candidates
        .iter()
        .filter_map(|c| {
            let label = SentimentLabel::from_model_label(c["label"].as_str()?)?;
            let score = c["score"].as_f64()?;
            Some(Classification {
                label,
                score: score.clamp(0.0, 1.0),
            })
        })
        .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
        .ok_or_else(|| ClassifierError::InvalidResponse("no sentiment labels in response".into()))
}

/// Builds a [`HuggingFaceClassifier`] and probes it before handing it out,
/// so an unreachable model shows up as a load failure. A model that reports
/// it is still loading is probed again until `max_load_wait` runs out.
pub struct HuggingFaceLoader {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub max_load_wait: Duration,
}

impl HuggingFaceLoader {
    async fn probe(
        &self,
        classifier: &HuggingFaceClassifier,
    ) -> Result<Classification, ClassifierError> {
        let started = tokio::time::Instant::now();
        loop {
            match classifier.classify(WARM_UP_TEXT).await {
                Err(ClassifierError::ModelLoading { estimated_secs }) => {
                    let remaining = self.max_load_wait.saturating_sub(started.elapsed());
                    if remaining.is_zero() {
                        return Err(ClassifierError::ModelLoading { estimated_secs });
                    }
                    let wait = estimated_secs
                        .and_then(|s| Duration::try_from_secs_f64(s).ok())
                        .unwrap_or(DEFAULT_LOADING_RETRY)
                        .max(MIN_LOADING_RETRY)
                        .min(remaining);
                    warn!("Model {} is still loading, probing again in {:?}", self.model, wait);
                    tokio::time::sleep(wait).await;
                }
                other => return other,
            }
        }
    }
}

#[async_trait]
impl ClassifierLoader for HuggingFaceLoader {
    async fn load(&self) -> Result<Arc<dyn SentimentClassifier>, ClassifierError> {
        let classifier = HuggingFaceClassifier::new(
            &self.base_url,
            &self.model,
            self.api_key.clone(),
            self.timeout,
        )?;
        let probe = self
            .probe(&classifier)
            .await
            .map_err(|e| ClassifierError::Load(format!("{}: {}", self.model, e)))?;
        info!(
            "Model {} answered warm-up ({:?} {:.2})",
            self.model, probe.label, probe.score
        );
        Ok(Arc::new(classifier))
    }

    fn name(&self) -> &str {
        "huggingface"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use axum::extract::State;
    use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Local inference endpoint answering from a script and recording requests.
    #[derive(Default)]
    struct InferenceServer {
        replies: Mutex<VecDeque<(StatusCode, Value)>>,
        /// (authorization header, request body)
        seen: Mutex<Vec<(Option<String>, Value)>>,
    }

    async fn infer(
        State(server): State<Arc<InferenceServer>>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let auth = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        server.seen.lock().unwrap().push((auth, body));
        let (status, reply) = server
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "no reply"})));
        (status, Json(reply))
    }

    async fn serve(replies: Vec<(StatusCode, Value)>) -> (String, Arc<InferenceServer>) {
        let server = Arc::new(InferenceServer {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        });
        let app = Router::new()
            .route("/models/:model", post(infer))
            .with_state(server.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), server)
    }

    fn loading() -> (StatusCode, Value) {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            json!({"error": "Model sst2 is currently loading", "estimated_time": 0.01}),
        )
    }

    fn positive() -> (StatusCode, Value) {
        (StatusCode::OK, json!([[{"label": "POSITIVE", "score": 0.9}]]))
    }

    fn loader(base_url: &str, max_load_wait: Duration) -> HuggingFaceLoader {
        HuggingFaceLoader {
            base_url: base_url.to_string(),
            model: "sst2".into(),
            api_key: None,
            timeout: Duration::from_secs(5),
            max_load_wait,
        }
    }

    #[test]
    fn test_endpoint_joins_cleanly() {
        assert_eq!(
            endpoint("https://api-inference.huggingface.co/", "distilbert-sst2"),
            "https://api-inference.huggingface.co/models/distilbert-sst2"
        );
    }

    #[test]
    fn test_parse_nested_response() {
        let raw = json!([[
            {"label": "NEGATIVE", "score": 0.12},
            {"label": "POSITIVE", "score": 0.88}
        ]]);
        let c = parse_inference_response(&raw).unwrap();
        assert_eq!(c.label, SentimentLabel::Positive);
        assert_relative_eq!(c.score, 0.88, epsilon = 1e-9);
    }

    #[test]
    fn test_parse_flat_response() {
        let raw = json!([{"label": "NEGATIVE", "score": 0.97}]);
        let c = parse_inference_response(&raw).unwrap();
        assert_eq!(c.label, SentimentLabel::Negative);
    }

    #[test]
    fn test_parse_error_object() {
        let raw = json!({"error": "Model is currently loading", "estimated_time": 20.0});
        match parse_inference_response(&raw) {
            Err(ClassifierError::InvalidResponse(msg)) => assert!(msg.contains("loading")),
            other => panic!("expected InvalidResponse, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_unknown_labels_only() {
        let raw = json!([[{"label": "joy", "score": 0.9}]]);
        assert!(parse_inference_response(&raw).is_err());
    }

    #[test]
    fn test_status_error_detects_cold_model() {
        let body = json!({"error": "Model x is currently loading", "estimated_time": 20.5});
        match status_error(503, body.to_string()) {
            ClassifierError::ModelLoading { estimated_secs } => {
                assert_eq!(estimated_secs, Some(20.5))
            }
            other => panic!("expected ModelLoading, got {:?}", other),
        }
        assert!(matches!(
            status_error(503, "upstream down".into()),
            ClassifierError::Status { status: 503, .. }
        ));
    }

    #[tokio::test]
    async fn test_classify_sends_inputs_and_bearer_token() {
        let (url, server) = serve(vec![positive()]).await;
        let classifier =
            HuggingFaceClassifier::new(&url, "sst2", Some("hf_secret".into()), Duration::from_secs(5))
                .unwrap();

        let c = classifier.classify("Lakers look sharp").await.unwrap();
        assert_eq!(c.label, SentimentLabel::Positive);
        assert_relative_eq!(c.score, 0.9, epsilon = 1e-9);

        let seen = server.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0.as_deref(), Some("Bearer hf_secret"));
        assert_eq!(seen[0].1, json!({"inputs": "Lakers look sharp"}));
    }

    #[tokio::test]
    async fn test_classify_without_key_sends_no_auth() {
        let (url, server) = serve(vec![positive()]).await;
        let classifier = HuggingFaceClassifier::new(&url, "sst2", None, Duration::from_secs(5)).unwrap();
        classifier.classify("hello").await.unwrap();
        assert_eq!(server.seen.lock().unwrap()[0].0, None);
    }

    #[tokio::test]
    async fn test_classify_maps_error_status() {
        let (url, _server) = serve(vec![(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "boom"}),
        )])
        .await;
        let classifier = HuggingFaceClassifier::new(&url, "sst2", None, Duration::from_secs(5)).unwrap();
        match classifier.classify("hello").await {
            Err(ClassifierError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert!(body.contains("boom"));
            }
            other => panic!("expected Status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_loader_waits_out_cold_model() {
        use crate::analysis::lazy::{ClassifierStatus, LazyClassifier};

        let (url, server) = serve(vec![loading(), loading(), positive(), positive()]).await;
        let lazy = LazyClassifier::new(Arc::new(loader(&url, Duration::from_secs(10))));

        let classifier = lazy.get().await.expect("model should load once warm");
        assert_eq!(lazy.status(), ClassifierStatus::Ready);
        assert_eq!(server.seen.lock().unwrap().len(), 3);

        let c = classifier.classify("again").await.unwrap();
        assert_eq!(c.label, SentimentLabel::Positive);
    }

    #[tokio::test]
    async fn test_loader_gives_up_after_max_wait() {
        let replies = std::iter::repeat_with(loading).take(50).collect();
        let (url, server) = serve(replies).await;
        let result = loader(&url, Duration::from_millis(600)).load().await;

        assert!(matches!(result, Err(ClassifierError::Load(_))));
        let hits = server.seen.lock().unwrap().len();
        assert!((2..10).contains(&hits), "probed {} times", hits);
    }
}
