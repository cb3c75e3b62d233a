//! Per-team attacking/defensive strength derived from historical results.
//!
//! A team's strength is simply its mean goals scored and mean goals conceded
//! per match, pooled over every appearance regardless of home/away side.

use serde::Serialize;
use std::collections::HashMap;

use crate::tournament::models::HistoricalMatch;

/// Average goals per match for one team.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TeamStrength {
    pub goals_scored: f64,
    pub goals_conceded: f64,
    /// Number of historical appearances the averages are taken over.
    pub matches: u32,
}

#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    scored: u64,
    conceded: u64,
    matches: u32,
}

impl Totals {
    fn add(&mut self, scored: u32, conceded: u32) {
        self.scored += u64::from(scored);
        self.conceded += u64::from(conceded);
        self.matches += 1;
    }
}

/// Lookup of team name to strength. Teams with no appearances are absent.
#[derive(Debug, Clone, Default)]
pub struct StrengthTable {
    teams: HashMap<String, TeamStrength>,
}

impl StrengthTable {
    pub fn from_matches<'a, I>(matches: I) -> Self
    where
        I: IntoIterator<Item = &'a HistoricalMatch>,
    {
        let mut totals: HashMap<&'a str, Totals> = HashMap::new();
        for m in matches {
            totals
                .entry(m.home.as_str())
                .or_default()
                .add(m.home_goals, m.away_goals);
            totals
                .entry(m.away.as_str())
                .or_default()
                .add(m.away_goals, m.home_goals);
        }

        let teams = totals
            .into_iter()
            .map(|(team, t)| {
                let n = f64::from(t.matches);
                (
                    team.to_string(),
                    TeamStrength {
                        goals_scored: t.scored as f64 / n,
                        goals_conceded: t.conceded as f64 / n,
                        matches: t.matches,
                    },
                )
            })
            .collect();

        StrengthTable { teams }
    }

    pub fn get(&self, team: &str) -> Option<&TeamStrength> {
        self.teams.get(team)
    }

    pub fn contains(&self, team: &str) -> bool {
        self.teams.contains_key(team)
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Insert or replace a team's strength directly.
    #[cfg(test)]
    pub fn insert(&mut self, team: impl Into<String>, strength: TeamStrength) {
        self.teams.insert(team.into(), strength);
    }
}
