//! Process-wide, load-once handle to the sentiment classifier.
//!
//! The first caller of [`LazyClassifier::get`] runs the loader; concurrent
//! callers wait on the same initialisation and all receive the same
//! instance. A failed load is final: later calls see `Failed` and get `None`
//! without touching the loader again.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::provider::{ClassifierLoader, SentimentClassifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierStatus {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

pub struct LazyClassifier {
    loader: Arc<dyn ClassifierLoader>,
    /// `Some(None)` records a failed load
    cell: OnceCell<Option<Arc<dyn SentimentClassifier>>>,
    started: AtomicBool,
}

impl LazyClassifier {
    pub fn new(loader: Arc<dyn ClassifierLoader>) -> Self {
        LazyClassifier {
            loader,
            cell: OnceCell::new(),
            started: AtomicBool::new(false),
        }
    }

    pub fn status(&self) -> ClassifierStatus {
        match self.cell.get() {
            Some(Some(_)) => ClassifierStatus::Ready,
            Some(None) => ClassifierStatus::Failed,
            None if self.started.load(Ordering::Acquire) => ClassifierStatus::Loading,
            None => ClassifierStatus::Uninitialized,
        }
    }

    /// Resolve the classifier, loading it on first use. `None` means the
    /// model is unavailable for the rest of the process.
    pub async fn get(&self) -> Option<Arc<dyn SentimentClassifier>> {
        self.cell
            .get_or_init(|| async {
                self.started.store(true, Ordering::Release);
                info!("Loading sentiment classifier via '{}'", self.loader.name());
                match self.loader.load().await {
                    Ok(classifier) => {
                        info!("Sentiment classifier '{}' ready", classifier.name());
                        Some(classifier)
                    }
                    Err(e) => {
                        warn!("Sentiment classifier unavailable, using static insights: {}", e);
                        None
                    }
                }
            })
            .await
            .clone()
    }

    /// Non-blocking peek: the classifier if it is already loaded.
    pub fn ready(&self) -> Option<Arc<dyn SentimentClassifier>> {
        self.cell.get().cloned().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::provider::testing::{CountingLoader, FixedClassifier};
    use std::time::Duration;

    #[tokio::test]
    async fn test_ready_after_successful_load() {
        let loader = Arc::new(CountingLoader::ready(FixedClassifier::positive(0.9)));
        let lazy = LazyClassifier::new(loader.clone());
        assert_eq!(lazy.status(), ClassifierStatus::Uninitialized);
        assert!(lazy.ready().is_none());

        assert!(lazy.get().await.is_some());
        assert_eq!(lazy.status(), ClassifierStatus::Ready);
        assert!(lazy.ready().is_some());
        assert_eq!(loader.load_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_sticky() {
        let loader = Arc::new(CountingLoader::failing());
        let lazy = LazyClassifier::new(loader.clone());

        assert!(lazy.get().await.is_none());
        assert!(lazy.get().await.is_none());
        assert_eq!(lazy.status(), ClassifierStatus::Failed);
        assert_eq!(loader.load_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_load() {
        let loader = Arc::new(
            CountingLoader::ready(FixedClassifier::positive(0.9))
                .with_delay(Duration::from_millis(50)),
        );
        let lazy = Arc::new(LazyClassifier::new(loader.clone()));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let lazy = Arc::clone(&lazy);
                tokio::spawn(async move { lazy.get().await })
            })
            .collect();

        let mut resolved = Vec::new();
        for h in futures_util::future::join_all(handles).await {
            resolved.push(h.unwrap().unwrap());
        }

        assert_eq!(loader.load_count(), 1);
        assert!(resolved.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[tokio::test]
    async fn test_status_reports_loading_while_in_flight() {
        let loader = Arc::new(
            CountingLoader::ready(FixedClassifier::positive(0.9))
                .with_delay(Duration::from_millis(200)),
        );
        let lazy = Arc::new(LazyClassifier::new(loader));

        let pending = {
            let lazy = Arc::clone(&lazy);
            tokio::spawn(async move { lazy.get().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(lazy.status(), ClassifierStatus::Loading);

        pending.await.unwrap();
        assert_eq!(lazy.status(), ClassifierStatus::Ready);
    }
}
