use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Polarity reported by a binary sentiment model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
}

impl SentimentLabel {
    /// Map a raw model label ("POSITIVE", "LABEL_0", ...) onto a polarity.
    pub fn from_model_label(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "POSITIVE" | "POS" | "LABEL_1" => Some(SentimentLabel::Positive),
            "NEGATIVE" | "NEG" | "LABEL_0" => Some(SentimentLabel::Negative),
            _ => None,
        }
    }
}

/// Top label of one classification call, `score` in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: SentimentLabel,
    pub score: f64,
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("inference endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Cold model still being brought up by the inference service
    #[error("model is still loading (estimated {estimated_secs:?}s)")]
    ModelLoading { estimated_secs: Option<f64> },

    #[error("invalid classifier response: {0}")]
    InvalidResponse(String),

    #[error("classifier failed to load: {0}")]
    Load(String),

    #[error("sentiment classifier disabled")]
    Disabled,
}

/// A loaded text-classification model.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Produces a ready classifier. Called at most once per process by
/// [`super::lazy::LazyClassifier`].
#[async_trait]
pub trait ClassifierLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn SentimentClassifier>, ClassifierError>;

    fn name(&self) -> &str;
}

/// Loader used when the model is switched off in configuration; every
/// narrative then takes the static path.
pub struct DisabledLoader;

#[async_trait]
impl ClassifierLoader for DisabledLoader {
    async fn load(&self) -> Result<Arc<dyn SentimentClassifier>, ClassifierError> {
        Err(ClassifierError::Disabled)
    }

    fn name(&self) -> &str {
        "disabled"
    }
}
