//! Match narrative generation.
//!
//! [`Analyzer::analyze_match`] always produces text. With the classifier
//! loaded it classifies a prompt built from the match and picks one of six
//! templates by (opted-in, label, confidence), then appends a social
//! sentiment comparison. Without a classifier, or if any step fails, it
//! falls back to a static template chosen from the opted-in flag and win
//! probability. Failures only reach the log.

pub mod huggingface;
pub mod insight;
pub mod lazy;
pub mod prompt;
pub mod provider;
pub mod sentiment;

pub use huggingface::HuggingFaceLoader;
pub use insight::quick_insight;
pub use lazy::{ClassifierStatus, LazyClassifier};
pub use provider::{ClassifierLoader, DisabledLoader};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::registry::models::{MatchRecord, MatchSentiment};
use prompt::{build_prompt, display_number};
use provider::{Classification, ClassifierError, SentimentLabel};

/// Model confidence above which a positive label reads as a strong signal
const CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Win probability above which an opted-in bet is a "Strong Position"
const STRONG_POSITION: f64 = 70.0;

/// Which path produced a narrative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeSource {
    Model,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Narrative {
    pub text: String,
    pub source: NarrativeSource,
}

/// Notification shown after the dashboard-wide analysis toggle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub title: String,
    pub description: String,
}

#[derive(Clone)]
pub struct Analyzer {
    classifier: Arc<LazyClassifier>,
}

impl Analyzer {
    pub fn new(classifier: Arc<LazyClassifier>) -> Self {
        Analyzer { classifier }
    }

    pub fn classifier_status(&self) -> ClassifierStatus {
        self.classifier.status()
    }

    /// Insight text for one match. Never fails, never empty.
    pub async fn analyze_match(&self, record: &MatchRecord) -> String {
        let mut rng = StdRng::from_entropy();
        self.analyze(record, &mut rng).await.text
    }

    pub async fn analyze<R: RngCore + Send + ?Sized>(
        &self,
        record: &MatchRecord,
        rng: &mut R,
    ) -> Narrative {
        match self.model_narrative(record, rng).await {
            Ok(Some(text)) => Narrative {
                text,
                source: NarrativeSource::Model,
            },
            Ok(None) => {
                debug!("No classifier for match {}, using static insight", record.id);
                Narrative {
                    text: static_analysis(record),
                    source: NarrativeSource::Fallback,
                }
            }
            Err(e) => {
                warn!("Analysis of match {} failed, using static insight: {}", record.id, e);
                Narrative {
                    text: static_analysis(record),
                    source: NarrativeSource::Fallback,
                }
            }
        }
    }

    async fn model_narrative<R: RngCore + Send + ?Sized>(
        &self,
        record: &MatchRecord,
        rng: &mut R,
    ) -> Result<Option<String>, ClassifierError> {
        let Some(classifier) = self.classifier.get().await else {
            return Ok(None);
        };

        let sentiment = sentiment::match_sentiment(record, Some(classifier.as_ref()), rng).await;
        let prompt = build_prompt(record, &sentiment);
        let verdict = classifier.classify(&prompt).await?;
        debug!(
            "Match {} classified {:?} ({:.2})",
            record.id, verdict.label, verdict.score
        );

        let mut text = model_template(record, verdict);
        text.push_str(&sentiment_clause(record, &sentiment));
        Ok(Some(text))
    }

    /// Per-team sentiment for a match, from the classifier when it is already
    /// loaded and random draws otherwise.
    pub async fn sentiment_for(&self, record: &MatchRecord) -> MatchSentiment {
        let classifier = self.classifier.ready();
        let mut rng = StdRng::from_entropy();
        sentiment::match_sentiment(record, classifier.as_deref(), &mut rng).await
    }

    /// Warm the model up on the first match and report back. The toast is
    /// success-flavoured whichever path answered.
    pub async fn warm_up(&self, matches: &[MatchRecord]) -> Toast {
        let source = match matches.first() {
            Some(sample) => {
                let mut rng = StdRng::from_entropy();
                self.analyze(sample, &mut rng).await.source
            }
            None => NarrativeSource::Fallback,
        };

        match source {
            NarrativeSource::Model => Toast {
                title: "AI Analysis Complete".into(),
                description:
                    "Local AI model has analyzed your betting opportunities with latest insights."
                        .into(),
            },
            NarrativeSource::Fallback => Toast {
                title: "Analysis Ready".into(),
                description: "Betting insights generated successfully.".into(),
            },
        }
    }
}

fn model_template(record: &MatchRecord, verdict: Classification) -> String {
    let a = &record.player_a;
    let b = &record.player_b;
    let p = display_number(record.win_probability_or_default());
    let positive = verdict.label == SentimentLabel::Positive;
    let confident = verdict.score > CONFIDENCE_THRESHOLD;

    match (record.opted_in, positive, confident) {
        (true, true, true) => format!(
            "🎯 AI Analysis: Strong positive indicators detected! Your bet on {} vs {} shows excellent potential with {}% win probability. Current conditions favor your position.",
            a, b, p
        ),
        (true, true, false) => format!(
            "📊 AI Analysis: Moderate positive signals for {} vs {}. With {}% win probability, this remains a solid choice despite some mixed indicators.",
            a, b, p
        ),
        (true, false, _) => format!(
            "⚠️ AI Analysis: Mixed signals detected for {} vs {}. While challenges exist, your {}% win probability still offers reasonable potential.",
            a, b, p
        ),
        (false, true, true) => format!(
            "🚀 AI Opportunity: Exceptional betting opportunity detected! {} vs {} showing strong positive indicators. {}% win probability with favorable conditions.",
            a, b, p
        ),
        (false, true, false) => format!(
            "💡 AI Insight: Promising opportunity for {} vs {}. Current analysis suggests good potential with {}% win probability.",
            a, b, p
        ),
        (false, false, _) => format!(
            "🔍 AI Alert: {} vs {} presents an interesting challenge. With {}% win probability, consider the current conditions carefully.",
            a, b, p
        ),
    }
}

/// Favour the side with the better social score; on a tie, call out
/// whoever is trending.
fn sentiment_clause(record: &MatchRecord, s: &MatchSentiment) -> String {
    let (a, b) = (&s.team_a, &s.team_b);
    if a.overall_score > b.overall_score {
        format!(
            " Social sentiment favors {} ({:+.2} vs {:+.2}).",
            record.player_a, a.overall_score, b.overall_score
        )
    } else if b.overall_score > a.overall_score {
        format!(
            " Social sentiment favors {} ({:+.2} vs {:+.2}).",
            record.player_b, b.overall_score, a.overall_score
        )
    } else if a.trending && b.trending {
        format!(
            " Both {} and {} are trending on social media.",
            record.player_a, record.player_b
        )
    } else if a.trending {
        format!(" {} is trending on social media.", record.player_a)
    } else if b.trending {
        format!(" {} is trending on social media.", record.player_b)
    } else {
        String::new()
    }
}

/// Deterministic narrative used whenever the model path is unavailable.
pub fn static_analysis(record: &MatchRecord) -> String {
    let win_prob = record.win_probability_or_default();
    let p = display_number(win_prob);
    if record.opted_in {
        if win_prob > STRONG_POSITION {
            return format!(
                "🎯 Strong Position: Your bet on {} vs {} looks excellent with {}% win probability!",
                record.player_a, record.player_b, p
            );
        }
        return format!(
            "📊 Solid Choice: {} vs {} shows good potential with {}% win probability.",
            record.player_a, record.player_b, p
        );
    }
    format!(
        "💡 Opportunity: {} vs {} presents interesting potential with {}% win probability.",
        record.player_a, record.player_b, p
    )
}
