//! Cleaning of scraped team names and score strings.

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::tournament::{FixtureRow, HistoricalMatch};

fn host_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*\(H\)").expect("host marker pattern"))
}

fn extra_time_note() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // "(a.e.t.)" and anything trailing it up to a full stop or comma, which
    // covers penalty shoot-out annotations such as "(a.e.t.) (4–5 p)".
    RE.get_or_init(|| Regex::new(r"\s*\(a\.e\.t\.[^)]*\)[^.,]*").expect("extra time pattern"))
}

fn bracketed_note() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*\([^)]*\)").expect("bracketed note pattern"))
}

/// Trim a team name and drop the host-nation marker: "Germany (H)" → "Germany".
pub fn team_name(raw: &str) -> String {
    let cleaned = raw.replace('\u{a0}', " ");
    host_marker()
        .replace_all(&cleaned, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a final score such as "2–1" or "1–1 (a.e.t.) (4–5 p)" into
/// (home, away) goals. Returns `None` for anything that is not a score.
pub fn parse_score(raw: &str) -> Option<(u32, u32)> {
    let cleaned = raw.replace('\u{a0}', " ");
    let cleaned = extra_time_note().replace_all(&cleaned, "");
    let cleaned = bracketed_note().replace_all(&cleaned, "");
    let (home, away) = cleaned.split_once(|c: char| c == '–' || c == '-')?;
    Some((home.trim().parse().ok()?, away.trim().parse().ok()?))
}

/// Convert scraped rows into historical matches, dropping rows whose score
/// does not parse (unplayed or abandoned fixtures).
pub fn historical_matches(rows: &[FixtureRow]) -> Vec<HistoricalMatch> {
    rows.iter()
        .filter_map(|row| match parse_score(&row.score) {
            Some((home_goals, away_goals)) => Some(HistoricalMatch {
                home: team_name(&row.home),
                away: team_name(&row.away),
                home_goals,
                away_goals,
                year: row.year,
            }),
            None => {
                debug!(
                    "Dropping {} {} vs {}: unparseable score '{}'",
                    row.year, row.home, row.away, row.score
                );
                None
            }
        })
        .collect()
}

/// Normalise team names in raw fixture rows while leaving the score/match
/// code column untouched.
pub fn fixture_rows(rows: Vec<FixtureRow>) -> Vec<FixtureRow> {
    rows.into_iter()
        .map(|row| FixtureRow {
            home: team_name(&row.home),
            away: team_name(&row.away),
            score: row.score.trim().to_string(),
            year: row.year,
        })
        .collect()
}
