//! Per-team social sentiment used when a match carries none.
//!
//! Preferred source is the classifier run over a handful of templated fan
//! posts. Without a classifier the split is drawn at random; if the random
//! source itself fails, a fixed 60/25/15 split with score +0.35 is used.

use rand::RngCore;
use tracing::warn;

use super::provider::{SentimentClassifier, SentimentLabel};
use crate::registry::models::{MatchRecord, MatchSentiment, SocialSentiment};

const SOCIAL_POSTS: [&str; 5] = [
    "{team} look unstoppable right now, what a squad!",
    "Not convinced {team} can handle the pressure in this one.",
    "Big night for {team}, can't wait to watch.",
    "{team} fans are buzzing after the latest training news.",
    "Worried about {team} lately, too many mistakes.",
];

/// Classifier confidence needed before a post counts as polar
const POLAR_CONFIDENCE: f64 = 0.6;

const TRENDING_PROBABILITY: f64 = 0.3;
const MIN_MENTIONS: f64 = 200.0;
const MENTION_SPAN: f64 = 4_800.0;

/// Last-resort split when no randomness is available.
pub fn fallback_sentiment() -> SocialSentiment {
    SocialSentiment {
        positive: 60.0,
        negative: 25.0,
        neutral: 15.0,
        overall_score: 0.35,
        total_mentions: 1_000,
        trending: false,
    }
}

/// The match's own sentiment if it has one, otherwise a synthesized pair.
pub async fn match_sentiment<R: RngCore + Send + ?Sized>(
    record: &MatchRecord,
    classifier: Option<&dyn SentimentClassifier>,
    rng: &mut R,
) -> MatchSentiment {
    if let Some(existing) = &record.social_sentiment {
        return existing.clone();
    }
    MatchSentiment {
        team_a: team_sentiment(&record.player_a, classifier, rng).await,
        team_b: team_sentiment(&record.player_b, classifier, rng).await,
    }
}

pub async fn team_sentiment<R: RngCore + Send + ?Sized>(
    team: &str,
    classifier: Option<&dyn SentimentClassifier>,
    rng: &mut R,
) -> SocialSentiment {
    if let Some(classifier) = classifier {
        match classified_split(team, classifier).await {
            Ok((positive, negative)) => {
                let (total_mentions, trending) = match mention_volume(rng) {
                    Ok(v) => v,
                    Err(e) => {
                        warn!("Random source failed for {} mention volume: {}", team, e);
                        let f = fallback_sentiment();
                        (f.total_mentions, f.trending)
                    }
                };
                return from_split(positive, negative, total_mentions, trending);
            }
            Err(e) => warn!(
                "Classifier failed on social posts for {}, drawing sentiment at random: {}",
                team, e
            ),
        }
    }

    match random_sentiment(rng) {
        Ok(s) => s,
        Err(e) => {
            warn!("Random source failed for {} sentiment, using fallback split: {}", team, e);
            fallback_sentiment()
        }
    }
}

/// Percent of posts classified confidently positive and negative.
async fn classified_split(
    team: &str,
    classifier: &dyn SentimentClassifier,
) -> Result<(f64, f64), super::provider::ClassifierError> {
    let mut positive = 0usize;
    let mut negative = 0usize;
    for template in SOCIAL_POSTS {
        let post = template.replace("{team}", team);
        let c = classifier.classify(&post).await?;
        if c.score >= POLAR_CONFIDENCE {
            match c.label {
                SentimentLabel::Positive => positive += 1,
                SentimentLabel::Negative => negative += 1,
            }
        }
    }
    let n = SOCIAL_POSTS.len() as f64;
    Ok((
        (positive as f64 / n * 100.0).round(),
        (negative as f64 / n * 100.0).round(),
    ))
}

fn from_split(positive: f64, negative: f64, total_mentions: u32, trending: bool) -> SocialSentiment {
    SocialSentiment {
        positive,
        negative,
        neutral: (100.0 - positive - negative).max(0.0),
        overall_score: ((positive - negative) / 100.0).clamp(-1.0, 1.0),
        total_mentions,
        trending,
    }
}

/// Positive share in [30, 70], negative in [10, 30], neutral the rest.
fn random_sentiment<R: RngCore + ?Sized>(rng: &mut R) -> Result<SocialSentiment, rand::Error> {
    let positive = (30.0 + unit(rng)? * 40.0).round();
    let negative = (10.0 + unit(rng)? * 20.0).round();
    let (total_mentions, trending) = mention_volume(rng)?;
    Ok(from_split(positive, negative, total_mentions, trending))
}

fn mention_volume<R: RngCore + ?Sized>(rng: &mut R) -> Result<(u32, bool), rand::Error> {
    let mentions = (MIN_MENTIONS + unit(rng)? * MENTION_SPAN) as u32;
    let trending = unit(rng)? < TRENDING_PROBABILITY;
    Ok((mentions, trending))
}

/// Uniform draw in [0, 1) that surfaces a failing random source.
fn unit<R: RngCore + ?Sized>(rng: &mut R) -> Result<f64, rand::Error> {
    let mut buf = [0u8; 8];
    rng.try_fill_bytes(&mut buf)?;
    Ok((u64::from_le_bytes(buf) >> 11) as f64 / (1u64 << 53) as f64)
}

#[cfg(test)]
pub(crate) mod testing {
    use rand::RngCore;

    /// A random source that is never able to produce bytes.
    pub struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new("entropy source unavailable"))
        }
    }
}
