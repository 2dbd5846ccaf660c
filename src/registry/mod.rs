//! Static in-memory match registry.
//!
//! The dashboard has no backing store: every record below is a fixture that
//! is rebuilt on start and never mutated.

use chrono::NaiveDate;

pub mod models;
use models::*;

#[derive(Debug, Clone)]
pub struct Registry {
    matches: Vec<MatchRecord>,
    history: Vec<HistoryRecord>,
}

impl Registry {
    pub fn new(matches: Vec<MatchRecord>, history: Vec<HistoryRecord>) -> Self {
        Registry { matches, history }
    }

    /// The mock slate shown on the dashboard: five opted-in matches, five
    /// open opportunities and the last five resolved bets.
    pub fn fixtures() -> Self {
        Registry::new(fixture_matches(), fixture_history())
    }

    pub fn matches(&self) -> &[MatchRecord] {
        &self.matches
    }

    pub fn history(&self) -> &[HistoryRecord] {
        &self.history
    }

    pub fn get(&self, id: u32) -> Option<&MatchRecord> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn opted_in(&self) -> impl Iterator<Item = &MatchRecord> {
        self.matches.iter().filter(|m| m.opted_in)
    }

    pub fn available(&self) -> impl Iterator<Item = &MatchRecord> {
        self.matches.iter().filter(|m| !m.opted_in)
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn card(
    id: u32,
    player_a: &str,
    player_b: &str,
    bet_amount: Option<f64>,
    odds: f64,
    statuses: (PlayerStatus, PlayerStatus),
    team_status: TeamStrength,
    weather: Weather,
    sport: &str,
    start_time: &str,
    win_probability: f64,
) -> MatchRecord {
    MatchRecord {
        id,
        player_a: player_a.into(),
        player_b: player_b.into(),
        bet_amount,
        odds,
        player_a_status: statuses.0,
        player_b_status: statuses.1,
        team_status,
        weather,
        opted_in: bet_amount.is_some(),
        sport: sport.into(),
        start_time: start_time.into(),
        win_probability: Some(win_probability),
        team_a_history: None,
        team_b_history: None,
        social_sentiment: None,
    }
}

fn form(
    recent: (u32, u32),
    head_to_head: (u32, u32),
    average_score: f64,
    last_match_result: LastResult,
) -> TeamHistory {
    TeamHistory {
        recent_wins: recent.0,
        recent_losses: recent.1,
        head_to_head_wins: head_to_head.0,
        head_to_head_losses: head_to_head.1,
        average_score,
        last_match_result,
    }
}

fn buzz(positive: f64, negative: f64, overall_score: f64, mentions: u32, trending: bool) -> SocialSentiment {
    SocialSentiment {
        positive,
        negative,
        neutral: 100.0 - positive - negative,
        overall_score,
        total_mentions: mentions,
        trending,
    }
}

fn fixture_matches() -> Vec<MatchRecord> {
    use PlayerStatus::{Healthy, Injured, Uncertain};

    let mut djokovic = card(
        1, "Djokovic", "Federer", Some(100.0), 2.5, (Healthy, Uncertain),
        TeamStrength::Strong, Weather::Sunny, "Tennis", "14:30", 75.0,
    );
    djokovic.team_a_history = Some(form((8, 2), (27, 23), 2.6, LastResult::Win));
    djokovic.team_b_history = Some(form((5, 5), (23, 27), 2.2, LastResult::Loss));

    let mut city = card(
        3, "Manchester City", "Arsenal", Some(150.0), 3.2, (Healthy, Injured),
        TeamStrength::Average, Weather::Rainy, "Football", "16:45", 80.0,
    );
    city.team_a_history = Some(form((7, 3), (13, 7), 2.3, LastResult::Draw));
    city.team_b_history = Some(form((6, 4), (7, 13), 1.7, LastResult::Win));

    let mut madrid = card(
        7, "Real Madrid", "Barcelona", None, 3.5, (Healthy, Healthy),
        TeamStrength::Strong, Weather::Cloudy, "Football", "21:00", 85.0,
    );
    madrid.social_sentiment = Some(MatchSentiment {
        team_a: buzz(64.0, 18.0, 0.46, 48_200, true),
        team_b: buzz(41.0, 37.0, 0.04, 45_900, true),
    });

    let mut leclerc = card(
        9, "Leclerc", "Norris", None, 2.7, (Healthy, Healthy),
        TeamStrength::Strong, Weather::Sunny, "F1", "14:00", 75.0,
    );
    leclerc.social_sentiment = Some(MatchSentiment {
        team_a: buzz(45.0, 30.0, 0.15, 9_800, false),
        team_b: buzz(45.0, 30.0, 0.15, 21_400, true),
    });

    vec![
        djokovic,
        card(
            2, "Lakers", "Warriors", Some(250.0), 1.8, (Healthy, Healthy),
            TeamStrength::Strong, Weather::Cloudy, "Basketball", "19:00", 65.0,
        ),
        city,
        card(
            4, "Hamilton", "Verstappen", Some(300.0), 4.1, (Uncertain, Healthy),
            TeamStrength::Strong, Weather::Sunny, "F1", "15:00", 45.0,
        ),
        card(
            5, "Curry", "James", Some(200.0), 2.8, (Healthy, Healthy),
            TeamStrength::Strong, Weather::Cloudy, "Basketball", "20:30", 70.0,
        ),
        card(
            6, "Nadal", "Murray", None, 2.1, (Healthy, Uncertain),
            TeamStrength::Average, Weather::Sunny, "Tennis", "13:15", 60.0,
        ),
        madrid,
        card(
            8, "Celtics", "Heat", None, 1.9, (Injured, Healthy),
            TeamStrength::Weak, Weather::Rainy, "Basketball", "18:30", 25.0,
        ),
        leclerc,
        card(
            10, "Osaka", "Williams", None, 4.2, (Uncertain, Injured),
            TeamStrength::Average, Weather::Cloudy, "Tennis", "17:30", 40.0,
        ),
    ]
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn fixture_history() -> Vec<HistoryRecord> {
    let settled = |id, a: &str, b: &str, stake, odds, result, sport: &str, date, winner_a| {
        HistoryRecord {
            id,
            player_a: a.into(),
            player_b: b.into(),
            stake,
            odds,
            result,
            sport: sport.into(),
            date,
            winner_a,
        }
    };

    vec![
        settled(1, "Djokovic", "Alcaraz", 150.0, 2.3, BetResult::Win, "Tennis", day(2024, 7, 19), true),
        settled(2, "Warriors", "Lakers", 200.0, 1.8, BetResult::Loss, "Basketball", day(2024, 7, 18), false),
        settled(3, "Liverpool", "Chelsea", 100.0, 2.1, BetResult::Win, "Football", day(2024, 7, 17), true),
        settled(4, "Verstappen", "Leclerc", 300.0, 1.6, BetResult::Loss, "F1", day(2024, 7, 16), false),
        settled(5, "Federer", "Nadal", 250.0, 3.2, BetResult::Win, "Tennis", day(2024, 7, 15), true),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_partition() {
        let reg = Registry::fixtures();
        assert_eq!(reg.matches().len(), 10);
        assert_eq!(reg.opted_in().count(), 5);
        assert_eq!(reg.available().count(), 5);
        assert!(reg.opted_in().all(|m| m.bet_amount.is_some()));
        assert!(reg.available().all(|m| m.bet_amount.is_none()));
    }

    #[test]
    fn test_fixture_invariants() {
        let reg = Registry::fixtures();
        for m in reg.matches() {
            assert!(m.odds > 0.0, "match {} has non-positive odds", m.id);
            assert!(m.stake() >= 0.0);
            if let Some(s) = &m.social_sentiment {
                assert!(s.team_a.is_consistent());
                assert!(s.team_b.is_consistent());
            }
        }
        for h in reg.history() {
            assert!(h.stake >= 0.0 && h.odds > 0.0);
        }
    }

    #[test]
    fn test_get_by_id() {
        let reg = Registry::fixtures();
        assert_eq!(reg.get(7).map(|m| m.player_a.as_str()), Some("Real Madrid"));
        assert!(reg.get(99).is_none());
    }

    #[test]
    fn test_high_probability_badge() {
        let reg = Registry::fixtures();
        let flagged: Vec<u32> = reg
            .matches()
            .iter()
            .filter(|m| m.is_high_probability())
            .map(|m| m.id)
            .collect();
        // 75% exactly does not qualify
        assert_eq!(flagged, vec![3, 7]);
    }
}
