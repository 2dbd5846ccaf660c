use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fitness of an individual participant going into a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    #[serde(alias = "well")]
    Healthy,
    Injured,
    Uncertain,
}

impl PlayerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerStatus::Healthy => "healthy",
            PlayerStatus::Injured => "injured",
            PlayerStatus::Uncertain => "uncertain",
        }
    }
}

/// Aggregate team-strength tier shown on the match card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamStrength {
    Strong,
    Average,
    Weak,
}

impl TeamStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamStrength::Strong => "strong",
            TeamStrength::Average => "average",
            TeamStrength::Weak => "weak",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Sunny,
    Cloudy,
    Rainy,
}

impl Weather {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weather::Sunny => "sunny",
            Weather::Cloudy => "cloudy",
            Weather::Rainy => "rainy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LastResult {
    Win,
    Loss,
    Draw,
}

/// Recent form of one side of a matchup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamHistory {
    pub recent_wins: u32,
    pub recent_losses: u32,
    pub head_to_head_wins: u32,
    pub head_to_head_losses: u32,
    pub average_score: f64,
    pub last_match_result: LastResult,
}

impl TeamHistory {
    /// Recent win rate in percent, `None` when no recent matches are recorded.
    pub fn recent_win_rate(&self) -> Option<f64> {
        rate(self.recent_wins, self.recent_losses)
    }

    /// Head-to-head win rate in percent, `None` when the sides never met.
    pub fn head_to_head_rate(&self) -> Option<f64> {
        rate(self.head_to_head_wins, self.head_to_head_losses)
    }
}

fn rate(wins: u32, losses: u32) -> Option<f64> {
    let total = wins + losses;
    if total == 0 {
        return None;
    }
    Some(wins as f64 / total as f64 * 100.0)
}

/// Social-media sentiment summary for one team.
///
/// `positive + negative + neutral` is 100 (percent) and `overall_score`
/// lies in [-1, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialSentiment {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
    pub overall_score: f64,
    pub total_mentions: u32,
    pub trending: bool,
}

impl SocialSentiment {
    pub fn is_consistent(&self) -> bool {
        let sum = self.positive + self.negative + self.neutral;
        (sum - 100.0).abs() <= 0.5
            && [self.positive, self.negative, self.neutral]
                .iter()
                .all(|v| *v >= 0.0)
            && (-1.0..=1.0).contains(&self.overall_score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSentiment {
    pub team_a: SocialSentiment,
    pub team_b: SocialSentiment,
}

/// An upcoming match the user has opted into or could opt into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: u32,
    pub player_a: String,
    pub player_b: String,
    /// USD staked, present only once the user has opted in
    pub bet_amount: Option<f64>,
    /// Decimal odds (> 0)
    pub odds: f64,
    pub player_a_status: PlayerStatus,
    pub player_b_status: PlayerStatus,
    pub team_status: TeamStrength,
    pub weather: Weather,
    pub opted_in: bool,
    pub sport: String,
    /// Local kick-off time, "HH:MM"
    pub start_time: String,
    /// Win probability in percent (0–100)
    pub win_probability: Option<f64>,
    pub team_a_history: Option<TeamHistory>,
    pub team_b_history: Option<TeamHistory>,
    pub social_sentiment: Option<MatchSentiment>,
}

/// Win probability used when a match carries none.
pub const DEFAULT_WIN_PROBABILITY: f64 = 50.0;

/// Above this win probability a card gets the "High Win Probability" badge.
pub const HIGH_WIN_PROBABILITY: f64 = 75.0;

impl MatchRecord {
    pub fn stake(&self) -> f64 {
        self.bet_amount.unwrap_or(0.0)
    }

    /// Stake × odds, 0 when nothing is staked
    pub fn potential_win(&self) -> f64 {
        self.stake() * self.odds
    }

    pub fn win_probability_or_default(&self) -> f64 {
        self.win_probability.unwrap_or(DEFAULT_WIN_PROBABILITY)
    }

    pub fn is_high_probability(&self) -> bool {
        self.win_probability
            .map(|p| p > HIGH_WIN_PROBABILITY)
            .unwrap_or(false)
    }
}

/// Settlement of a resolved bet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetResult {
    Win,
    Loss,
    Push,
}

impl BetResult {
    /// Amount returned for a bet: stake × odds on a win, nothing on a loss,
    /// the stake back on a push.
    pub fn payout(&self, stake: f64, odds: f64) -> f64 {
        match self {
            BetResult::Win => stake * odds,
            BetResult::Loss => 0.0,
            BetResult::Push => stake,
        }
    }
}

/// A resolved bet from the user's own history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: u32,
    pub player_a: String,
    pub player_b: String,
    pub stake: f64,
    pub odds: f64,
    pub result: BetResult,
    pub sport: String,
    pub date: NaiveDate,
    /// Whether `player_a` won the match
    pub winner_a: bool,
}

impl HistoryRecord {
    pub fn payout(&self) -> f64 {
        self.result.payout(self.stake, self.odds)
    }
}

/// Outcome of a past meeting between two participants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOutcome {
    Win,
    Loss,
    Draw,
}

impl From<MatchOutcome> for BetResult {
    fn from(outcome: MatchOutcome) -> Self {
        match outcome {
            MatchOutcome::Win => BetResult::Win,
            MatchOutcome::Loss => BetResult::Loss,
            MatchOutcome::Draw => BetResult::Push,
        }
    }
}

/// A bet placed on a synthetic past meeting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticBet {
    pub stake: f64,
    pub odds: f64,
}

/// One entry of a generated head-to-head history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalMatch {
    pub id: u32,
    pub date: NaiveDate,
    pub opponent: String,
    pub result: MatchOutcome,
    pub score: String,
    pub bet: Option<SyntheticBet>,
    /// Present exactly when `bet` is
    pub payout: Option<f64>,
    pub venue: String,
}
