use chrono::{DateTime, Local};
use itertools::{Itertools, MinMaxResult};
use std::time::Duration;

/// Results of one finished round
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSummary {
    pub score: u32,
    pub misses: u32,
    pub best_reaction: Option<Duration>,
    pub slowest_reaction: Option<Duration>,
    pub mean_reaction: Option<Duration>,
    pub started_at: Option<DateTime<Local>>,
}

impl RoundSummary {
    pub fn new(
        score: u32,
        misses: u32,
        reactions: &[Duration],
        started_at: Option<DateTime<Local>>,
    ) -> Self {
        let (best_reaction, slowest_reaction) = match reactions.iter().minmax() {
            MinMaxResult::NoElements => (None, None),
            MinMaxResult::OneElement(r) => (Some(*r), Some(*r)),
            MinMaxResult::MinMax(min, max) => (Some(*min), Some(*max)),
        };

        Self {
            score,
            misses,
            best_reaction,
            slowest_reaction,
            mean_reaction: mean(reactions),
            started_at,
        }
    }

    /// Percentage of selections that hit an active target
    pub fn accuracy(&self) -> Option<f64> {
        let attempts = self.score + self.misses;
        match attempts {
            0 => None,
            n => Some((self.score as f64 / n as f64 * 100.0).round()),
        }
    }

    pub fn describe(&self) -> String {
        let mut parts = vec![
            format!("score {}", self.score),
            format!("misses {}", self.misses),
        ];
        if let Some(acc) = self.accuracy() {
            parts.push(format!("{acc}% acc"));
        }
        if let Some(best) = self.best_reaction {
            parts.push(format!("best {}ms", best.as_millis()));
        }
        if let Some(mean) = self.mean_reaction {
            parts.push(format!("mean {}ms", mean.as_millis()));
        }
        if let Some(at) = self.started_at {
            parts.push(format!("started {}", at.format("%H:%M:%S")));
        }
        parts.join("   ")
    }
}

fn mean(reactions: &[Duration]) -> Option<Duration> {
    match reactions.len() {
        0 => None,
        n => Some(reactions.iter().sum::<Duration>() / n as u32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn empty_round() {
        let summary = RoundSummary::new(0, 0, &[], None);
        assert_eq!(summary.best_reaction, None);
        assert_eq!(summary.mean_reaction, None);
        assert_eq!(summary.accuracy(), None);
        assert_eq!(summary.describe(), "score 0   misses 0");
    }

    #[test]
    fn single_hit() {
        let summary = RoundSummary::new(1, 0, &[ms(420)], None);
        assert_eq!(summary.best_reaction, Some(ms(420)));
        assert_eq!(summary.slowest_reaction, Some(ms(420)));
        assert_eq!(summary.mean_reaction, Some(ms(420)));
        assert_eq!(summary.accuracy(), Some(100.0));
    }

    #[test]
    fn reaction_bounds_and_mean() {
        let summary = RoundSummary::new(3, 1, &[ms(300), ms(600), ms(450)], None);
        assert_eq!(summary.best_reaction, Some(ms(300)));
        assert_eq!(summary.slowest_reaction, Some(ms(600)));
        assert_eq!(summary.mean_reaction, Some(ms(450)));
        assert_eq!(summary.accuracy(), Some(75.0));
    }

    #[test]
    fn describe_lists_reactions() {
        let summary = RoundSummary::new(2, 2, &[ms(250), ms(350)], None);
        assert_eq!(
            summary.describe(),
            "score 2   misses 2   50% acc   best 250ms   mean 300ms"
        );
    }
}
