//! Prompt text fed to the classifier for a single match.

use crate::registry::models::{LastResult, MatchRecord, MatchSentiment, SocialSentiment, TeamHistory};

const DOMINANT_H2H: f64 = 60.0;
const WEAK_H2H: f64 = 40.0;
const POSITIVE_BUZZ: f64 = 0.3;
const NEGATIVE_BUZZ: f64 = -0.3;

/// Format a number the way the dashboard shows it: `75`, `2.5`.
pub fn display_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{:.0}", v)
    } else {
        format!("{}", v)
    }
}

pub fn build_prompt(record: &MatchRecord, sentiment: &MatchSentiment) -> String {
    let mut prompt = format!(
        "Player {} status {} versus {} status {}. Team overall {}. Weather conditions {}. Win probability {}%.",
        record.player_a,
        record.player_a_status.as_str(),
        record.player_b,
        record.player_b_status.as_str(),
        record.team_status.as_str(),
        record.weather.as_str(),
        display_number(record.win_probability_or_default()),
    );

    for (team, history) in [
        (&record.player_a, &record.team_a_history),
        (&record.player_b, &record.team_b_history),
    ] {
        if let Some(h) = history {
            prompt.push(' ');
            prompt.push_str(&history_sentence(team, h));
        }
    }

    for (team, buzz) in [
        (&record.player_a, &sentiment.team_a),
        (&record.player_b, &sentiment.team_b),
    ] {
        prompt.push(' ');
        prompt.push_str(&sentiment_sentence(team, buzz));
    }

    prompt
}

fn history_sentence(team: &str, h: &TeamHistory) -> String {
    let mut s = match h.recent_win_rate() {
        Some(rate) => format!("{} has won {:.0}% of recent matches", team, rate),
        None => format!("{} has no recent matches on record", team),
    };

    if let Some(h2h) = h.head_to_head_rate() {
        if h2h > DOMINANT_H2H {
            s.push_str(&format!(" and dominates the head-to-head with {:.0}% wins", h2h));
        } else if h2h < WEAK_H2H {
            s.push_str(&format!(" but struggles head-to-head with only {:.0}% wins", h2h));
        }
    }

    let last = match h.last_match_result {
        LastResult::Win => "won",
        LastResult::Loss => "lost",
        LastResult::Draw => "drew",
    };
    s.push_str(&format!(", and {} its last match.", last));
    s
}

fn sentiment_sentence(team: &str, s: &SocialSentiment) -> String {
    let mut out = if s.overall_score > POSITIVE_BUZZ {
        format!(
            "Fans are positive about {} with {:.0}% positive mentions",
            team, s.positive
        )
    } else if s.overall_score < NEGATIVE_BUZZ {
        format!(
            "Fans are negative about {} with {:.0}% negative mentions",
            team, s.negative
        )
    } else {
        format!("Fan sentiment on {} is mixed", team)
    };
    if s.trending {
        out.push_str(", and it is trending");
    }
    out.push('.');
    out
}
