use rand::Rng;

use super::prompt::display_number;
use crate::registry::models::{MatchRecord, PlayerStatus, TeamStrength, Weather};

/// One-line card blurb shown before (or instead of) a model narrative.
///
/// Opted-in cards list up to two factors in the bet's favour; open cards
/// get one of a few promotional lines picked by `rng`.
pub fn quick_insight<R: Rng + ?Sized>(record: &MatchRecord, rng: &mut R) -> String {
    let odds = display_number(record.odds);

    if record.opted_in {
        let mut factors = Vec::new();
        if record.player_a_status == PlayerStatus::Healthy {
            factors.push(format!("{} is in excellent form", record.player_a));
        }
        if record.player_b_status == PlayerStatus::Injured {
            factors.push(format!("{} has injury concerns", record.player_b));
        }
        if record.team_status == TeamStrength::Strong {
            factors.push("team is performing strongly".to_string());
        }
        if record.weather == Weather::Sunny {
            factors.push("perfect weather conditions".to_string());
        }

        if factors.is_empty() {
            return format!("🎯 Looking great! Your {}x odds bet has strong potential!", odds);
        }
        factors.truncate(2);
        return format!(
            "🎯 Looking great! {}. Your {}x odds bet has strong potential!",
            factors.join(" and "),
            odds
        );
    }

    let lines = [
        format!(
            "🔥 Hot match alert! {} vs {} has {}x odds",
            record.player_a, record.player_b, odds
        ),
        format!("⚡ Don't miss out! Perfect conditions for a {}x return", odds),
        format!(
            "🚀 Last chance! This {} match could be your biggest win",
            record.sport
        ),
        format!("💎 Premium opportunity with {}x multiplier available", odds),
    ];
    let pick = rng.gen_range(0..lines.len());
    lines[pick].clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_opted_in_lists_two_factors() {
        let reg = Registry::fixtures();
        let mut rng = StdRng::seed_from_u64(0);
        let text = quick_insight(reg.get(1).unwrap(), &mut rng);
        assert_eq!(
            text,
            "🎯 Looking great! Djokovic is in excellent form and team is performing strongly. \
             Your 2.5x odds bet has strong potential!"
        );
    }

    #[test]
    fn test_opted_in_injury_factor() {
        let reg = Registry::fixtures();
        let mut rng = StdRng::seed_from_u64(0);
        let text = quick_insight(reg.get(3).unwrap(), &mut rng);
        assert!(text.contains("Manchester City is in excellent form and Arsenal has injury concerns"));
    }

    #[test]
    fn test_opted_in_without_factors() {
        let mut m = Registry::fixtures().get(4).unwrap().clone();
        m.team_status = TeamStrength::Weak;
        m.weather = Weather::Rainy;
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            quick_insight(&m, &mut rng),
            "🎯 Looking great! Your 4.1x odds bet has strong potential!"
        );
    }

    #[test]
    fn test_available_picks_promotional_line() {
        let reg = Registry::fixtures();
        let nadal = reg.get(6).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let text = quick_insight(nadal, &mut rng);
            assert!(
                text.contains("2.1x") || text.contains("Tennis match"),
                "unexpected line: {}",
                text
            );
        }
    }
}
