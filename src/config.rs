use clap::Parser;
use std::time::Duration;
use url::Url;

/// Furthest back the synthetic history may reach, in days
pub const MAX_HISTORY_SPAN_DAYS: u64 = 36_500;

/// Sports betting insights dashboard
#[derive(Parser, Debug, Clone)]
#[command(name = "betting-insights", version, about)]
pub struct Config {
    /// Dashboard listen address
    #[arg(long, env = "DASHBOARD_ADDR", default_value = "0.0.0.0:8080")]
    pub dashboard_addr: String,

    /// Base URL of the hosted inference API serving the sentiment model
    #[arg(
        long,
        env = "CLASSIFIER_URL",
        default_value = "https://api-inference.huggingface.co"
    )]
    pub classifier_url: String,

    /// Sentiment model identifier
    #[arg(
        long,
        env = "CLASSIFIER_MODEL",
        default_value = "distilbert-base-uncased-finetuned-sst-2-english"
    )]
    pub classifier_model: String,

    /// Bearer token for the inference API
    #[arg(long, env = "CLASSIFIER_API_KEY")]
    pub classifier_api_key: Option<String>,

    /// Per-request classifier timeout in seconds
    #[arg(long, env = "CLASSIFIER_TIMEOUT_SECS", default_value = "10")]
    pub classifier_timeout_secs: u64,

    /// How long to keep probing a model that reports it is still loading
    #[arg(long, env = "CLASSIFIER_LOAD_WAIT_SECS", default_value = "60")]
    pub classifier_load_wait_secs: u64,

    /// Skip the model entirely and serve the static analysis templates
    #[arg(long, env = "DISABLE_CLASSIFIER", default_value = "false")]
    pub disable_classifier: bool,

    /// Number of synthetic head-to-head entries in the history modal
    #[arg(long, env = "HISTORY_SIZE", default_value = "8")]
    pub history_size: usize,

    /// Days between consecutive synthetic history entries
    #[arg(long, env = "HISTORY_SPACING_DAYS", default_value = "15")]
    pub history_spacing_days: u64,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = Url::parse(&self.classifier_url)
            .map_err(|e| anyhow::anyhow!("classifier_url {:?} is invalid: {}", self.classifier_url, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("classifier_url must be an http(s) URL");
        }
        if !(1..=100).contains(&self.history_size) {
            anyhow::bail!("history_size must be between 1 and 100");
        }
        if self.history_spacing_days == 0 {
            anyhow::bail!("history_spacing_days must be at least 1");
        }
        let span = (self.history_size as u64).checked_mul(self.history_spacing_days);
        if !matches!(span, Some(days) if days <= MAX_HISTORY_SPAN_DAYS) {
            anyhow::bail!(
                "history_size * history_spacing_days must not exceed {} days",
                MAX_HISTORY_SPAN_DAYS
            );
        }
        if self.classifier_timeout_secs == 0 {
            anyhow::bail!("classifier_timeout_secs must be at least 1");
        }
        Ok(())
    }

    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_secs(self.classifier_timeout_secs)
    }

    pub fn classifier_load_wait(&self) -> Duration {
        Duration::from_secs(self.classifier_load_wait_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["betting-insights"];
        argv.extend_from_slice(args);
        Config::parse_from(argv)
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = parse(&[]);
        assert_eq!(config.history_size, 8);
        assert_eq!(config.history_spacing_days, 15);
        assert_eq!(config.classifier_timeout(), Duration::from_secs(10));
        assert_eq!(config.classifier_load_wait(), Duration::from_secs(60));
        assert!(!config.disable_classifier);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_classifier_url() {
        assert!(parse(&["--classifier-url", "not a url"]).validate().is_err());
        assert!(parse(&["--classifier-url", "ftp://models.local"]).validate().is_err());
        assert!(parse(&["--classifier-url", "http://127.0.0.1:8000"]).validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_history() {
        assert!(parse(&["--history-size", "0"]).validate().is_err());
        assert!(parse(&["--history-size", "101"]).validate().is_err());
        assert!(parse(&["--history-spacing-days", "0"]).validate().is_err());
    }

    #[test]
    fn test_history_span_limit() {
        // 100 entries 365 days apart is exactly the limit
        assert!(parse(&["--history-size", "100", "--history-spacing-days", "365"])
            .validate()
            .is_ok());
        assert!(parse(&["--history-size", "100", "--history-spacing-days", "366"])
            .validate()
            .is_err());
        assert!(parse(&["--history-size", "100", "--history-spacing-days", "2000000"])
            .validate()
            .is_err());
        assert!(parse(&["--history-spacing-days", u64::MAX.to_string().as_str()])
            .validate()
            .is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        assert!(parse(&["--classifier-timeout-secs", "0"]).validate().is_err());
    }
}
