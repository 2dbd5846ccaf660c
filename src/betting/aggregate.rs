//! Dashboard aggregates over match and history records.
//!
//! Everything here is a single pass over a slice. The only degenerate input
//! is a zero total stake, which yields `None` for the percentage gain instead
//! of dividing by zero.
use serde::Serialize;

use crate::registry::models::{BetResult, HistoricalMatch, HistoryRecord, MatchOutcome, MatchRecord};

/// Top-of-dashboard stat tiles
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub active_bets: usize,
    pub total_matches: usize,
    pub available_matches: usize,
    pub total_stake: f64,
    pub potential_return: f64,
    /// `None` when nothing is staked
    pub percentage_gain: Option<f64>,
}

/// Split matches into (opted-in, available).
pub fn partition(matches: &[MatchRecord]) -> (Vec<&MatchRecord>, Vec<&MatchRecord>) {
    matches.iter().partition(|m| m.opted_in)
}

/// Sum of stakes over opted-in matches; a missing stake counts as 0.
pub fn total_stake(matches: &[MatchRecord]) -> f64 {
    matches.iter().filter(|m| m.opted_in).map(MatchRecord::stake).sum()
}

/// Sum of stake × odds over opted-in matches.
pub fn potential_return(matches: &[MatchRecord]) -> f64 {
    matches
        .iter()
        .filter(|m| m.opted_in)
        .map(MatchRecord::potential_win)
        .sum()
}

/// (return − stake) / stake × 100, or `None` for a zero stake.
pub fn percentage_gain(total_stake: f64, potential_return: f64) -> Option<f64> {
    if total_stake <= 0.0 {
        return None;
    }
    let gain = (potential_return - total_stake) / total_stake * 100.0;
    gain.is_finite().then_some(gain)
}

/// Render a gain for display: one decimal with sign, or "N/A".
pub fn format_gain(gain: Option<f64>) -> String {
    match gain {
        Some(g) => format!("{:+.1}%", g),
        None => "N/A".to_string(),
    }
}

pub fn dashboard_stats(matches: &[MatchRecord]) -> DashboardStats {
    let (opted, available) = partition(matches);
    let total_stake = total_stake(matches);
    let potential_return = potential_return(matches);
    DashboardStats {
        active_bets: opted.len(),
        total_matches: matches.len(),
        available_matches: available.len(),
        total_stake,
        potential_return,
        percentage_gain: percentage_gain(total_stake, potential_return),
    }
}

/// Totals over the user's resolved bets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub total_staked: f64,
    pub total_payout: f64,
    pub net_profit: f64,
    /// Percent of records that were wins, 0 for an empty history
    pub win_rate: f64,
    pub wins: usize,
    pub losses: usize,
    pub pushes: usize,
}

pub fn summarize_history(records: &[HistoryRecord]) -> HistorySummary {
    let total_staked: f64 = records.iter().map(|r| r.stake).sum();
    let total_payout: f64 = records.iter().map(HistoryRecord::payout).sum();
    let count = |res: BetResult| records.iter().filter(|r| r.result == res).count();
    let wins = count(BetResult::Win);

    let win_rate = if records.is_empty() {
        0.0
    } else {
        wins as f64 / records.len() as f64 * 100.0
    };

    HistorySummary {
        total_staked,
        total_payout,
        net_profit: total_payout - total_staked,
        win_rate,
        wins,
        losses: count(BetResult::Loss),
        pushes: count(BetResult::Push),
    }
}

/// Header tiles of the head-to-head history modal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModalSummary {
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    pub total_staked: f64,
    pub total_payout: f64,
    pub net_profit: f64,
}

pub fn summarize_synthetic(entries: &[HistoricalMatch]) -> ModalSummary {
    let count = |res: MatchOutcome| entries.iter().filter(|e| e.result == res).count();
    let total_staked: f64 = entries.iter().filter_map(|e| e.bet).map(|b| b.stake).sum();
    let total_payout: f64 = entries.iter().filter_map(|e| e.payout).sum();

    ModalSummary {
        wins: count(MatchOutcome::Win),
        losses: count(MatchOutcome::Loss),
        draws: count(MatchOutcome::Draw),
        total_staked,
        total_payout,
        net_profit: total_payout - total_staked,
    }
}
