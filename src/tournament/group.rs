//! Group stage simulation.
//!
//! Every fixture is predicted once and its expected points and goals,
//! truncated to whole numbers, are folded into a fresh snapshot of the group
//! table. Once all fixtures are applied the table is ranked by points, goal
//! difference and goals scored.

use serde::Serialize;
use tracing::debug;

use crate::error::{Result, TournamentError};
use crate::model::{Prediction, Predictor};

use super::models::{GroupFixture, GroupStanding, GroupTable};

/// A simulated group-stage match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMatch {
    pub home: String,
    pub away: String,
    pub prediction: Prediction,
}

/// Final ranked table for one group plus the matches that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulatedGroup {
    pub table: GroupTable,
    pub matches: Vec<GroupMatch>,
}

/// Fold one predicted match into `table`, returning the updated snapshot.
/// Fractional expectations are truncated toward zero.
pub fn apply_prediction(
    table: &GroupTable,
    home: &str,
    away: &str,
    prediction: &Prediction,
) -> Result<GroupTable> {
    for team in [home, away] {
        if !table.contains(team) {
            return Err(TournamentError::TeamNotInGroup {
                group: table.group,
                team: team.to_string(),
            });
        }
    }

    let home_points = prediction.home_points as u32;
    let away_points = prediction.away_points as u32;
    let home_goals = prediction.home_goals as u32;
    let away_goals = prediction.away_goals as u32;

    let rows = table
        .rows
        .iter()
        .map(|row| {
            if row.team == home {
                row.with_result(home_points, home_goals, away_goals)
            } else if row.team == away {
                row.with_result(away_points, away_goals, home_goals)
            } else {
                row.clone()
            }
        })
        .collect();

    Ok(GroupTable {
        group: table.group,
        rows,
    })
}

/// Rank rows by points, goal difference, then goals for (all descending).
/// Rows equal on all three keep their existing order.
pub fn rank(mut table: GroupTable) -> GroupTable {
    table.rows.sort_by(|a, b| ranking_key(b).cmp(&ranking_key(a)));
    table
}

pub(crate) fn ranking_key(row: &GroupStanding) -> (u32, i32, u32) {
    (row.points, row.goal_difference, row.goals_for)
}

/// Simulate every fixture whose home team belongs to `group`.
pub fn simulate_group(
    group: &GroupTable,
    fixtures: &[GroupFixture],
    predictor: &Predictor<'_>,
) -> Result<SimulatedGroup> {
    let mut table = group.clone();
    let mut matches = Vec::new();

    for fixture in fixtures.iter().filter(|f| group.contains(&f.home)) {
        let prediction = predictor.predict(&fixture.home, &fixture.away);
        table = apply_prediction(&table, &fixture.home, &fixture.away, &prediction)?;
        debug!(
            "{}: {} {:.0}-{:.0} {}",
            group.group, fixture.home, prediction.home_goals, prediction.away_goals, fixture.away
        );
        matches.push(GroupMatch {
            home: fixture.home.clone(),
            away: fixture.away.clone(),
            prediction,
        });
    }

    Ok(SimulatedGroup {
        table: rank(table),
        matches,
    })
}

/// Simulate all groups, preserving the order they were supplied in.
pub fn simulate_group_stage(
    groups: &[GroupTable],
    fixtures: &[GroupFixture],
    predictor: &Predictor<'_>,
) -> Result<Vec<SimulatedGroup>> {
    groups
        .iter()
        .map(|group| simulate_group(group, fixtures, predictor))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::strength::TeamStrength;
    use crate::model::StrengthTable;
    use crate::tournament::models::GroupId;

    fn g(c: char) -> GroupId {
        GroupId::new(c).unwrap()
    }

    fn fx(home: &str, away: &str) -> GroupFixture {
        GroupFixture {
            home: home.into(),
            away: away.into(),
        }
    }

    fn row(team: &str, points: u32, gf: u32, ga: u32) -> GroupStanding {
        GroupStanding {
            team: team.into(),
            points,
            goals_for: gf,
            goals_against: ga,
            goal_difference: gf as i32 - ga as i32,
        }
    }

    fn strengths(entries: &[(&str, f64, f64)]) -> StrengthTable {
        let mut t = StrengthTable::default();
        for &(team, scored, conceded) in entries {
            t.insert(
                team,
                TeamStrength {
                    goals_scored: scored,
                    goals_conceded: conceded,
                    matches: 12,
                },
            );
        }
        t
    }

    #[test]
    fn apply_prediction_truncates_and_leaves_input_untouched() {
        let table = GroupTable::new(g('A'), ["W", "X", "Y", "Z"]).unwrap();
        let p = Prediction {
            home_points: 2.7,
            away_points: 0.4,
            home_goals: 2.9,
            away_goals: 0.8,
            ..Prediction::NONE
        };
        let next = apply_prediction(&table, "W", "X", &p).unwrap();

        assert_eq!(next.row("W").unwrap(), &row("W", 2, 2, 0));
        assert_eq!(next.row("X").unwrap(), &row("X", 0, 0, 2));
        assert_eq!(next.row("Y").unwrap(), &row("Y", 0, 0, 0));
        // The input snapshot is not modified.
        assert_eq!(table.row("W").unwrap().points, 0);
    }

    #[test]
    fn apply_prediction_rejects_foreign_team() {
        let table = GroupTable::new(g('B'), ["W", "X", "Y", "Z"]).unwrap();
        let err = apply_prediction(&table, "W", "Q", &Prediction::NONE).unwrap_err();
        assert_eq!(
            err,
            TournamentError::TeamNotInGroup {
                group: g('B'),
                team: "Q".into()
            }
        );
    }

    #[test]
    fn ranking_orders_by_points_then_goal_difference_then_goals_for() {
        let table = GroupTable {
            group: g('C'),
            rows: vec![
                row("Low", 3, 2, 2),
                row("MoreGoals", 4, 5, 3),
                row("FewerGoals", 4, 3, 1),
                row("Top", 7, 4, 1),
            ],
        };
        let ranked = rank(table);
        let order: Vec<&str> = ranked.rows.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(order, vec!["Top", "MoreGoals", "FewerGoals", "Low"]);
    }

    #[test]
    fn ranking_is_stable_for_full_ties() {
        let table = GroupTable {
            group: g('D'),
            rows: vec![
                row("First", 1, 1, 1),
                row("Second", 1, 1, 1),
                row("Leader", 2, 0, 0),
                row("Third", 1, 1, 1),
            ],
        };
        let ranked = rank(table);
        let order: Vec<&str> = ranked.rows.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(order, vec!["Leader", "First", "Second", "Third"]);
    }

    #[test]
    fn teams_without_history_collect_nothing() {
        let t = strengths(&[("A", 1.5, 1.0), ("B", 1.2, 1.2), ("C", 1.0, 1.4)]);
        let predictor = Predictor::new(&t);
        let group = GroupTable::new(g('F'), ["A", "B", "C", "Newcomer"]).unwrap();
        let fixtures = vec![fx("A", "Newcomer"), fx("Newcomer", "B"), fx("C", "Newcomer")];

        let sim = simulate_group(&group, &fixtures, &predictor).unwrap();
        for r in &sim.table.rows {
            assert_eq!(r, &row(&r.team, 0, 0, 0));
        }
        assert_eq!(sim.matches.len(), 3);
    }

    #[test]
    fn only_fixtures_hosted_by_group_members_are_played() {
        let t = strengths(&[("A", 1.5, 1.0), ("B", 1.2, 1.2)]);
        let predictor = Predictor::new(&t);
        let group = GroupTable::new(g('A'), ["A", "B", "C", "D"]).unwrap();
        let fixtures = vec![fx("A", "B"), fx("E", "F")];

        let sim = simulate_group(&group, &fixtures, &predictor).unwrap();
        assert_eq!(sim.matches.len(), 1);
        assert_eq!(sim.matches[0].home, "A");
    }
}
