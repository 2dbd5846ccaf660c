use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod analysis;
mod betting;
mod config;
mod dashboard;
mod registry;

use analysis::{Analyzer, ClassifierLoader, DisabledLoader, HuggingFaceLoader, LazyClassifier};
use betting::HistoryOptions;
use config::Config;
use dashboard::AppState;
use registry::Registry;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let registry = Arc::new(Registry::fixtures());
    info!(
        "Loaded {} matches ({} opted in) and {} settled bets",
        registry.matches().len(),
        registry.opted_in().count(),
        registry.history().len()
    );

    let loader: Arc<dyn ClassifierLoader> = if config.disable_classifier {
        info!("Classifier disabled, serving static analysis only");
        Arc::new(DisabledLoader)
    } else {
        info!(
            "Sentiment model {} via {}",
            config.classifier_model, config.classifier_url
        );
        Arc::new(HuggingFaceLoader {
            base_url: config.classifier_url.clone(),
            model: config.classifier_model.clone(),
            api_key: config.classifier_api_key.clone(),
            timeout: config.classifier_timeout(),
            max_load_wait: config.classifier_load_wait(),
        })
    };
    let analyzer = Analyzer::new(Arc::new(LazyClassifier::new(loader)));

    // Warm the model up in the background; the first request may still race it.
    {
        let analyzer = analyzer.clone();
        let registry = registry.clone();
        tokio::spawn(async move {
            let toast = analyzer.warm_up(registry.matches()).await;
            info!(
                "Warm-up finished ({:?}): {}",
                analyzer.classifier_status(),
                toast.title
            );
        });
    }

    let state = AppState {
        registry,
        analyzer,
        history: HistoryOptions {
            size: config.history_size,
            spacing_days: config.history_spacing_days,
        },
    };
    let app = dashboard::router(state);
    let addr: SocketAddr = config
        .dashboard_addr
        .parse()
        .with_context(|| format!("invalid dashboard address {}", config.dashboard_addr))?;
    info!("Dashboard listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    axum::serve(listener, app).await?;

    Ok(())
}
