pub mod bracket;
pub mod group;
pub mod models;
pub mod third_place;

pub use bracket::{BracketResolver, KnockoutOutcome, KnockoutTemplates, Qualifiers, TieBreak};
pub use group::{simulate_group_stage, SimulatedGroup};
pub use models::{FixtureRow, GroupId, GroupTable, HistoricalMatch, Stage};
pub use third_place::{best_third_placed, ThirdPlaceTable, ThirdPlaced, QUALIFYING_THIRDS};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Result, TournamentError};
use crate::model::{Predictor, StrengthTable};

use models::{GroupFixture, KnockoutFixture, Slot};

/// The fixture list split into its group stage and knockout templates.
#[derive(Debug, Clone)]
pub struct TournamentTemplate {
    pub group_fixtures: Vec<GroupFixture>,
    pub knockout: KnockoutTemplates,
}

impl TournamentTemplate {
    /// Split the ordered fixture rows by position: the first 36 are the group
    /// stage, followed by 8, 4 and 2 knockout rows and a single final.
    pub fn from_rows(rows: &[FixtureRow], third_place_table: &ThirdPlaceTable) -> Result<Self> {
        let group_len = Stage::GroupStage.fixture_count();
        if rows.len() < group_len {
            return Err(TournamentError::RoundSize {
                stage: Stage::GroupStage,
                expected: group_len,
                found: rows.len(),
            });
        }
        let group_fixtures = rows[..group_len]
            .iter()
            .map(|r| GroupFixture {
                home: r.home.trim().to_string(),
                away: r.away.trim().to_string(),
            })
            .collect();

        let mut rounds = Vec::with_capacity(Stage::KNOCKOUT.len());
        let mut offset = group_len;
        for stage in Stage::KNOCKOUT {
            let expected = stage.fixture_count();
            let remaining = rows.len().saturating_sub(offset);
            // The final takes whatever is left, so trailing rows are caught here.
            let found = if stage == Stage::Final {
                remaining
            } else {
                remaining.min(expected)
            };
            if found != expected {
                return Err(TournamentError::RoundSize {
                    stage,
                    expected,
                    found,
                });
            }
            let fixtures = rows[offset..offset + expected]
                .iter()
                .map(|r| {
                    Ok(KnockoutFixture {
                        code: r.score.trim().to_string(),
                        home: Slot::parse(&r.home)?,
                        away: Slot::parse(&r.away)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            rounds.push(fixtures);
            offset += expected;
        }

        Ok(TournamentTemplate {
            group_fixtures,
            knockout: KnockoutTemplates::new(rounds, third_place_table)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SimulationOptions {
    pub tie_break: TieBreak,
    pub seed: u64,
    /// Ignore historical matches played before this year.
    pub min_year: Option<u16>,
}

/// Everything the pipeline produced, from group tables to the champion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentOutcome {
    pub rated_teams: usize,
    pub groups: Vec<SimulatedGroup>,
    pub best_thirds: Vec<ThirdPlaced>,
    pub knockout: KnockoutOutcome,
}

impl TournamentOutcome {
    pub fn champion(&self) -> &str {
        &self.knockout.champion
    }
}

/// Run the full pipeline: strength model → group stage → best thirds →
/// knockout bracket.
pub fn simulate_tournament(
    history: &[HistoricalMatch],
    groups: &[GroupTable],
    template: TournamentTemplate,
    third_place_table: &ThirdPlaceTable,
    options: SimulationOptions,
) -> Result<TournamentOutcome> {
    let strengths = StrengthTable::from_matches(
        history
            .iter()
            .filter(|m| options.min_year.map_or(true, |y| m.year >= y)),
    );
    if strengths.is_empty() {
        warn!("No historical matches to rate teams from; every prediction will be neutral");
    } else {
        info!("Rated {} teams from {} historical matches", strengths.len(), history.len());
    }

    for table in groups {
        for row in &table.rows {
            if !strengths.contains(&row.team) {
                warn!(
                    "{} ({}) has no historical record; its matches will score nothing",
                    row.team, table.group
                );
            }
        }
    }
    for fixture in &template.group_fixtures {
        if !groups.iter().any(|g| g.contains(&fixture.home)) {
            warn!(
                "Group fixture {} vs {} has no matching group and is skipped",
                fixture.home, fixture.away
            );
        }
    }

    let predictor = Predictor::new(&strengths);

    let simulated = simulate_group_stage(groups, &template.group_fixtures, &predictor)?;
    for sim in &simulated {
        let order: Vec<String> = sim
            .table
            .rows
            .iter()
            .map(|r| format!("{} {}pts", r.team, r.points))
            .collect();
        info!("{}: {}", sim.table.group, order.join(", "));
    }

    let tables: Vec<GroupTable> = simulated.iter().map(|s| s.table.clone()).collect();
    let best_thirds = best_third_placed(&tables, QUALIFYING_THIRDS)?;
    info!(
        "Best third-placed teams: {}",
        best_thirds
            .iter()
            .map(|t| format!("{} ({})", t.standing.team, t.group))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let qualifiers = Qualifiers::from_groups(&tables, &best_thirds, third_place_table)?;
    let knockout = BracketResolver::new(
        predictor,
        template.knockout,
        qualifiers,
        options.tie_break,
        options.seed,
    )
    .run()?;
    info!("Champion: {}", knockout.champion);

    Ok(TournamentOutcome {
        rated_teams: strengths.len(),
        groups: simulated,
        best_thirds,
        knockout,
    })
}
