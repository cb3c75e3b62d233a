use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TournamentError;
use crate::model::Prediction;

// ── Raw rows ─────────────────────────────────────────────────────────────────

/// A completed match from a past tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalMatch {
    pub home: String,
    pub away: String,
    #[serde(rename = "homegoals")]
    pub home_goals: u32,
    #[serde(rename = "awaygoals")]
    pub away_goals: u32,
    pub year: u16,
}

/// One row of the raw fixture list, in page order. For knockout rows the
/// `score` column carries the match code ("Match 39") that later rounds
/// refer back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureRow {
    pub home: String,
    pub score: String,
    pub away: String,
    pub year: u16,
}

// ── Groups and stages ────────────────────────────────────────────────────────

/// Group letter. Displays as "Group A".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupId(char);

impl GroupId {
    pub fn new(letter: char) -> Option<Self> {
        letter
            .is_ascii_alphabetic()
            .then(|| GroupId(letter.to_ascii_uppercase()))
    }

    pub fn letter(self) -> char {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Group {}", self.0)
    }
}

impl FromStr for GroupId {
    type Err = TournamentError;

    /// Accepts "A", "Group A" or "group a".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let letter = s
            .strip_prefix("Group ")
            .or_else(|| s.strip_prefix("group "))
            .unwrap_or(s)
            .trim();
        let mut chars = letter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => GroupId::new(c),
            _ => None,
        }
        .ok_or_else(|| TournamentError::InvalidPlaceholder(s.to_string()))
    }
}

impl TryFrom<String> for GroupId {
    type Error = TournamentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GroupId> for String {
    fn from(value: GroupId) -> Self {
        value.0.to_string()
    }
}

/// Tournament phases in the order they are played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Stage {
    GroupStage,
    RoundOf16,
    QuarterFinals,
    SemiFinals,
    Final,
}

impl Stage {
    pub const KNOCKOUT: [Stage; 4] = [
        Stage::RoundOf16,
        Stage::QuarterFinals,
        Stage::SemiFinals,
        Stage::Final,
    ];

    /// Number of fixtures in the 24 → 16 → 8 → 4 → 2 → 1 format.
    pub fn fixture_count(self) -> usize {
        match self {
            Stage::GroupStage => 36,
            Stage::RoundOf16 => 8,
            Stage::QuarterFinals => 4,
            Stage::SemiFinals => 2,
            Stage::Final => 1,
        }
    }

    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::GroupStage => Some(Stage::RoundOf16),
            Stage::RoundOf16 => Some(Stage::QuarterFinals),
            Stage::QuarterFinals => Some(Stage::SemiFinals),
            Stage::SemiFinals => Some(Stage::Final),
            Stage::Final => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::GroupStage => "Group stage",
            Stage::RoundOf16 => "Round of 16",
            Stage::QuarterFinals => "Quarter-finals",
            Stage::SemiFinals => "Semi-finals",
            Stage::Final => "Final",
        };
        f.write_str(name)
    }
}

// ── Fixture slots ────────────────────────────────────────────────────────────

/// A side of a knockout fixture before it is resolved to a team.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Slot {
    Team(String),
    GroupWinner(GroupId),
    GroupRunnerUp(GroupId),
    /// One of the best third-placed teams, drawn from the listed groups.
    BestThird(Vec<GroupId>),
    /// Winner of the fixture with this match code in the previous round.
    MatchWinner(String),
}

impl Slot {
    /// Parse a fixture-template cell. Anything that does not look like a
    /// placeholder is taken to be a team name.
    pub fn parse(raw: &str) -> Result<Slot, TournamentError> {
        let raw = raw.trim();
        if let Some(rest) = raw.strip_prefix("Winner Match ") {
            return Ok(Slot::MatchWinner(format!("Match {}", rest.trim())));
        }
        if let Some(rest) = raw.strip_prefix("Winner ") {
            return Ok(Slot::GroupWinner(rest.parse()?));
        }
        if let Some(rest) = raw.strip_prefix("Runner-up ") {
            return Ok(Slot::GroupRunnerUp(rest.parse()?));
        }
        if let Some(rest) = raw.strip_prefix("3rd Group ") {
            let groups = parse_group_set(rest)
                .ok_or_else(|| TournamentError::InvalidPlaceholder(raw.to_string()))?;
            return Ok(Slot::BestThird(groups));
        }
        if raw.is_empty() {
            return Err(TournamentError::InvalidPlaceholder(raw.to_string()));
        }
        Ok(Slot::Team(raw.to_string()))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Team(name) => f.write_str(name),
            Slot::GroupWinner(g) => write!(f, "Winner {}", g),
            Slot::GroupRunnerUp(g) => write!(f, "Runner-up {}", g),
            Slot::BestThird(groups) => write!(f, "3rd Group {}", group_set_label(groups)),
            Slot::MatchWinner(code) => write!(f, "Winner {}", code),
        }
    }
}

/// Parse "D/E/F" into sorted, de-duplicated group ids.
pub fn parse_group_set(raw: &str) -> Option<Vec<GroupId>> {
    let mut groups = raw
        .split('/')
        .map(|part| part.parse::<GroupId>().ok())
        .collect::<Option<Vec<_>>>()?;
    groups.sort();
    groups.dedup();
    (!groups.is_empty()).then_some(groups)
}

pub fn group_set_label(groups: &[GroupId]) -> String {
    groups
        .iter()
        .map(|g| g.letter().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// A concrete group-stage match between two members of the same group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFixture {
    pub home: String,
    pub away: String,
}

/// A knockout fixture template: match code plus two unresolved slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnockoutFixture {
    pub code: String,
    pub home: Slot,
    pub away: Slot,
}

// ── Standings ────────────────────────────────────────────────────────────────

/// One team's row in a group table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupStanding {
    pub team: String,
    pub points: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
}

impl GroupStanding {
    pub fn new(team: impl Into<String>) -> Self {
        GroupStanding {
            team: team.into(),
            points: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
        }
    }

    /// Copy of this row with one more result folded in.
    pub fn with_result(&self, points: u32, scored: u32, conceded: u32) -> Self {
        let goals_for = self.goals_for + scored;
        let goals_against = self.goals_against + conceded;
        GroupStanding {
            team: self.team.clone(),
            points: self.points + points,
            goals_for,
            goals_against,
            goal_difference: goals_for as i32 - goals_against as i32,
        }
    }
}

/// Four-team group table. Rows keep insertion order until ranked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupTable {
    pub group: GroupId,
    pub rows: Vec<GroupStanding>,
}

impl GroupTable {
    pub const SIZE: usize = 4;

    pub fn new<I, S>(group: GroupId, teams: I) -> Result<Self, TournamentError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows: Vec<GroupStanding> = teams.into_iter().map(GroupStanding::new).collect();
        if rows.len() != Self::SIZE {
            return Err(TournamentError::GroupSize {
                group,
                found: rows.len(),
            });
        }
        Ok(GroupTable { group, rows })
    }

    pub fn contains(&self, team: &str) -> bool {
        self.row(team).is_some()
    }

    pub fn row(&self, team: &str) -> Option<&GroupStanding> {
        self.rows.iter().find(|r| r.team == team)
    }

    pub fn position(&self, place: usize) -> Option<&GroupStanding> {
        self.rows.get(place)
    }

    pub fn winner(&self) -> Option<&GroupStanding> {
        self.position(0)
    }

    pub fn runner_up(&self) -> Option<&GroupStanding> {
        self.position(1)
    }

    pub fn third(&self) -> Option<&GroupStanding> {
        self.position(2)
    }
}

// ── Resolved knockout ────────────────────────────────────────────────────────

/// A knockout fixture after both slots are known and the winner is decided.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedFixture {
    pub code: String,
    pub home: String,
    pub away: String,
    pub prediction: Prediction,
    pub winner: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRound {
    pub stage: Stage,
    pub fixtures: Vec<ResolvedFixture>,
}

impl ResolvedRound {
    pub fn winner_of(&self, code: &str) -> Option<&str> {
        self.fixtures
            .iter()
            .find(|f| f.code == code)
            .map(|f| f.winner.as_str())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn g(c: char) -> GroupId {
        GroupId::new(c).unwrap()
    }

    #[test]
    fn parses_every_placeholder_kind() {
        assert_eq!(Slot::parse("Winner Group A").unwrap(), Slot::GroupWinner(g('A')));
        assert_eq!(
            Slot::parse("Runner-up Group C").unwrap(),
            Slot::GroupRunnerUp(g('C'))
        );
        assert_eq!(
            Slot::parse("3rd Group D/E/F").unwrap(),
            Slot::BestThird(vec![g('D'), g('E'), g('F')])
        );
        assert_eq!(
            Slot::parse("Winner Match 39").unwrap(),
            Slot::MatchWinner("Match 39".into())
        );
        assert_eq!(Slot::parse(" Spain ").unwrap(), Slot::Team("Spain".into()));
    }

    #[test]
    fn third_place_groups_are_sorted() {
        assert_eq!(
            Slot::parse("3rd Group F/A/E/D").unwrap(),
            Slot::BestThird(vec![g('A'), g('D'), g('E'), g('F')])
        );
    }

    #[test]
    fn malformed_placeholders_are_rejected() {
        assert!(Slot::parse("Winner Group AB").is_err());
        assert!(Slot::parse("3rd Group D//F").is_err());
        assert!(Slot::parse("").is_err());
    }

    #[test]
    fn slot_display_round_trips_template_text() {
        for raw in ["Winner Group B", "Runner-up Group F", "3rd Group A/B/C/D", "Winner Match 45"] {
            assert_eq!(Slot::parse(raw).unwrap().to_string(), raw);
        }
    }

    #[test]
    fn group_table_requires_four_teams() {
        let err = GroupTable::new(g('A'), ["Germany", "Scotland", "Hungary"]).unwrap_err();
        assert_eq!(
            err,
            TournamentError::GroupSize {
                group: g('A'),
                found: 3
            }
        );
    }

    #[test]
    fn standing_tracks_goal_difference() {
        let row = GroupStanding::new("Italy").with_result(3, 2, 0).with_result(0, 1, 4);
        assert_eq!(row.points, 3);
        assert_eq!(row.goals_for, 3);
        assert_eq!(row.goals_against, 4);
        assert_eq!(row.goal_difference, -1);
    }

    #[test]
    fn knockout_stages_chain_to_final() {
        let mut stage = Stage::RoundOf16;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            seen.push(next);
            stage = next;
        }
        assert_eq!(seen, Stage::KNOCKOUT.to_vec());
    }
}
