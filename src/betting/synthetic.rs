//! Synthetic head-to-head history for the match history modal.
//!
//! Nothing here is persisted: a fresh history is drawn every time the modal
//! is opened. The random source is injected so tests can seed it; the
//! contract is the shape of the output, not particular values:
//!
//! - exactly `size` entries, most recent first, `spacing_days` apart
//!   (truncated if the span runs past the earliest representable date)
//! - result uniform over win/loss/draw
//! - a bet on ~60% of entries, odds in [1.5, 3.5], stake in [50, 350)
//! - payout present exactly when a bet is, settled from (result, stake, odds)

use chrono::{Days, NaiveDate};
use rand::Rng;
use tracing::debug;

use crate::registry::models::{BetResult, HistoricalMatch, MatchOutcome, SyntheticBet};

pub const VENUES: [&str; 5] = ["Stadium A", "Arena B", "Court C", "Track D", "Field E"];

const OUTCOMES: [MatchOutcome; 3] = [MatchOutcome::Win, MatchOutcome::Loss, MatchOutcome::Draw];

const WIN_SCORES: [&str; 5] = ["6-4, 6-3", "2-1", "112-108", "1st Place", "3-1"];
const LOSS_SCORES: [&str; 5] = ["4-6, 3-6", "1-2", "108-112", "3rd Place", "1-3"];
const DRAW_SCORES: [&str; 5] = ["6-6", "2-2", "110-110", "Draw", "2-2"];

const BET_PROBABILITY: f64 = 0.6;
const MIN_ODDS: f64 = 1.5;
const ODDS_SPAN: f64 = 2.0;
const MIN_STAKE: u32 = 50;
const MAX_STAKE: u32 = 350;

#[derive(Debug, Clone, Copy)]
pub struct HistoryOptions {
    pub size: usize,
    pub spacing_days: u64,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        HistoryOptions {
            size: 8,
            spacing_days: 15,
        }
    }
}

/// Draw a plausible past record of `player` against `opponent`, counting
/// back from `today`.
pub fn generate_history<R: Rng + ?Sized>(
    player: &str,
    opponent: &str,
    today: NaiveDate,
    opts: &HistoryOptions,
    rng: &mut R,
) -> Vec<HistoricalMatch> {
    debug!(
        "Generating {} synthetic meetings for {} vs {}",
        opts.size, player, opponent
    );

    // Stops early rather than repeat a date once the span leaves chrono's range
    (0..opts.size)
        .map_while(|i| {
            let back = opts.spacing_days.checked_mul(i as u64 + 1)?;
            let date = today.checked_sub_days(Days::new(back))?;
            let result = OUTCOMES[rng.gen_range(0..OUTCOMES.len())];

            let bet = rng.gen_bool(BET_PROBABILITY).then(|| {
                // One decimal, the way odds are quoted on the card
                let odds = ((MIN_ODDS + rng.gen::<f64>() * ODDS_SPAN) * 10.0).round() / 10.0;
                let stake = rng.gen_range(MIN_STAKE..MAX_STAKE) as f64;
                SyntheticBet { stake, odds }
            });
            let payout = bet.map(|b| BetResult::from(result).payout(b.stake, b.odds));

            Some(HistoricalMatch {
                id: i as u32 + 1,
                date,
                opponent: opponent.to_string(),
                result,
                score: score_for(result, rng).to_string(),
                bet,
                payout,
                venue: VENUES[rng.gen_range(0..VENUES.len())].to_string(),
            })
        })
        .collect()
}

fn score_for<R: Rng + ?Sized>(result: MatchOutcome, rng: &mut R) -> &'static str {
    let table = match result {
        MatchOutcome::Win => &WIN_SCORES,
        MatchOutcome::Loss => &LOSS_SCORES,
        MatchOutcome::Draw => &DRAW_SCORES,
    };
    table[rng.gen_range(0..table.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 20).unwrap()
    }

    fn draw(seed: u64) -> Vec<HistoricalMatch> {
        let mut rng = StdRng::seed_from_u64(seed);
        generate_history("Djokovic", "Federer", today(), &HistoryOptions::default(), &mut rng)
    }

    #[test]
    fn test_fixed_size_and_ids() {
        for seed in 0..20 {
            let h = draw(seed);
            assert_eq!(h.len(), 8);
            let ids: Vec<u32> = h.iter().map(|e| e.id).collect();
            assert_eq!(ids, (1..=8).collect::<Vec<_>>());
            assert!(h.iter().all(|e| e.opponent == "Federer"));
        }
    }

    #[test]
    fn test_dates_descend_by_spacing() {
        let h = draw(7);
        assert_eq!(h[0].date, NaiveDate::from_ymd_opt(2024, 7, 5).unwrap());
        for pair in h.windows(2) {
            assert!(pair[1].date < pair[0].date);
            assert_eq!((pair[0].date - pair[1].date).num_days(), 15);
        }
    }

    #[test]
    fn test_venues_and_scores_from_fixed_sets() {
        for seed in 0..20 {
            for e in draw(seed) {
                assert!(VENUES.contains(&e.venue.as_str()));
                let table: &[&str] = match e.result {
                    MatchOutcome::Win => &WIN_SCORES,
                    MatchOutcome::Loss => &LOSS_SCORES,
                    MatchOutcome::Draw => &DRAW_SCORES,
                };
                assert!(table.contains(&e.score.as_str()));
            }
        }
    }

    #[test]
    fn test_bet_ranges_and_payout_rule() {
        for seed in 0..50 {
            for e in draw(seed) {
                match (e.bet, e.payout) {
                    (Some(bet), Some(payout)) => {
                        assert!((1.5..=3.5).contains(&bet.odds), "odds {}", bet.odds);
                        assert!((50.0..350.0).contains(&bet.stake), "stake {}", bet.stake);
                        let expected = match e.result {
                            MatchOutcome::Win => bet.stake * bet.odds,
                            MatchOutcome::Loss => 0.0,
                            MatchOutcome::Draw => bet.stake,
                        };
                        assert_relative_eq!(payout, expected, epsilon = 1e-9);
                    }
                    (None, None) => {}
                    other => panic!("bet and payout disagree: {:?}", other),
                }
            }
        }
    }

    #[test]
    fn test_bet_frequency_near_sixty_percent() {
        let mut rng = StdRng::seed_from_u64(42);
        let opts = HistoryOptions {
            size: 2_000,
            spacing_days: 1,
        };
        let h = generate_history("A", "B", today(), &opts, &mut rng);
        let with_bet = h.iter().filter(|e| e.bet.is_some()).count() as f64 / h.len() as f64;
        assert!((0.55..0.65).contains(&with_bet), "bet share {}", with_bet);
        for outcome in OUTCOMES {
            let share = h.iter().filter(|e| e.result == outcome).count() as f64 / h.len() as f64;
            assert!((0.28..0.39).contains(&share), "{:?} share {}", outcome, share);
        }
    }

    #[test]
    fn test_custom_size() {
        let mut rng = StdRng::seed_from_u64(1);
        let opts = HistoryOptions {
            size: 3,
            spacing_days: 30,
        };
        let h = generate_history("A", "B", today(), &opts, &mut rng);
        assert_eq!(h.len(), 3);
        assert_eq!(h[2].date, NaiveDate::from_ymd_opt(2024, 4, 21).unwrap());
    }

    #[test]
    fn test_out_of_range_span_never_repeats_dates() {
        let mut rng = StdRng::seed_from_u64(4);
        let opts = HistoryOptions {
            size: 100,
            spacing_days: 2_000_000,
        };
        let h = generate_history("A", "B", today(), &opts, &mut rng);
        assert!(!h.is_empty() && h.len() < 100);
        for pair in h.windows(2) {
            assert!(pair[1].date < pair[0].date);
        }
    }
}
