//! Knockout bracket resolution.
//!
//! The resolver walks Round of 16 → Quarter-finals → Semi-finals → Final.
//! Each step resolves the round's slots to concrete teams, predicts every
//! fixture, and records the winner. Round-of-16 slots draw on group results;
//! every later slot names a fixture of the round immediately before it.

use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info};

use crate::error::{Result, TournamentError};
use crate::model::{Prediction, Predictor};

use super::models::{
    GroupId, GroupTable, KnockoutFixture, ResolvedFixture, ResolvedRound, Slot, Stage,
};
use super::third_place::{ThirdPlaceTable, ThirdPlaced};

// ── Tie-breaks and qualifiers ────────────────────────────────────────────────

/// How a knockout fixture with equal expected points is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// The away side goes through.
    #[default]
    Away,
    /// The home side goes through.
    Home,
    /// A seeded coin flip decides.
    CoinFlip,
}

/// Teams that came through the group stage, keyed the way round-of-16
/// slots refer to them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Qualifiers {
    winners: HashMap<GroupId, String>,
    runners_up: HashMap<GroupId, String>,
    thirds: HashMap<Vec<GroupId>, String>,
}

impl Qualifiers {
    pub fn from_groups(
        groups: &[GroupTable],
        best_thirds: &[ThirdPlaced],
        third_place_table: &ThirdPlaceTable,
    ) -> Result<Self> {
        let mut q = Qualifiers::default();
        for table in groups {
            if let Some(w) = table.winner() {
                q.winners.insert(table.group, w.team.clone());
            }
            if let Some(r) = table.runner_up() {
                q.runners_up.insert(table.group, r.team.clone());
            }
        }
        q.thirds = third_place_table.assign(best_thirds)?;
        Ok(q)
    }

    fn lookup(&self, slot: &Slot) -> Option<String> {
        match slot {
            Slot::Team(name) => Some(name.clone()),
            Slot::GroupWinner(g) => self.winners.get(g).cloned(),
            Slot::GroupRunnerUp(g) => self.runners_up.get(g).cloned(),
            Slot::BestThird(groups) => self.thirds.get(groups).cloned(),
            Slot::MatchWinner(_) => None,
        }
    }
}

// ── Templates ────────────────────────────────────────────────────────────────

/// Knockout fixture templates for all four rounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnockoutTemplates {
    rounds: Vec<(Stage, Vec<KnockoutFixture>)>,
}

impl KnockoutTemplates {
    /// Build from per-round fixture lists in play order. Checks round sizes,
    /// that match codes are unique within a round, that no slot refers
    /// forward or skips a round, and that every qualifier or previous-round
    /// winner is used exactly once.
    pub fn new(rounds: Vec<Vec<KnockoutFixture>>, third_place_table: &ThirdPlaceTable) -> Result<Self> {
        if rounds.len() != Stage::KNOCKOUT.len() {
            return Err(TournamentError::RoundSize {
                stage: Stage::Final,
                expected: Stage::KNOCKOUT.len(),
                found: rounds.len(),
            });
        }

        let rounds: Vec<(Stage, Vec<KnockoutFixture>)> =
            Stage::KNOCKOUT.iter().copied().zip(rounds).collect();

        let mut previous_codes: Vec<&str> = Vec::new();
        for (stage, fixtures) in &rounds {
            if fixtures.len() != stage.fixture_count() {
                return Err(TournamentError::RoundSize {
                    stage: *stage,
                    expected: stage.fixture_count(),
                    found: fixtures.len(),
                });
            }

            let mut codes = HashSet::new();
            for fixture in fixtures {
                if !codes.insert(fixture.code.as_str()) {
                    return Err(TournamentError::DuplicateMatchCode {
                        stage: *stage,
                        code: fixture.code.clone(),
                    });
                }
            }

            let mut used: HashSet<&Slot> = HashSet::new();
            for slot in fixtures.iter().flat_map(|f| [&f.home, &f.away]) {
                check_slot(*stage, slot, &previous_codes, third_place_table)?;
                if !used.insert(slot) {
                    return Err(TournamentError::SlotReused {
                        stage: *stage,
                        slot: slot.to_string(),
                    });
                }
            }
            let expected = expected_slots(*stage, &used, &previous_codes, third_place_table);
            if let Some(missing) = expected.iter().find(|s| !used.contains(s)) {
                return Err(TournamentError::SlotNeverUsed {
                    stage: *stage,
                    slot: missing.to_string(),
                });
            }

            previous_codes = fixtures.iter().map(|f| f.code.as_str()).collect();
        }

        Ok(KnockoutTemplates { rounds })
    }

    pub fn round(&self, stage: Stage) -> Option<&[KnockoutFixture]> {
        self.rounds
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, f)| f.as_slice())
    }
}

fn check_slot(
    stage: Stage,
    slot: &Slot,
    previous_codes: &[&str],
    third_place_table: &ThirdPlaceTable,
) -> Result<()> {
    let not_allowed = || TournamentError::SlotNotAllowed {
        stage,
        slot: slot.to_string(),
    };
    match (stage, slot) {
        (Stage::RoundOf16, Slot::MatchWinner(_)) => Err(not_allowed()),
        (Stage::RoundOf16, Slot::BestThird(groups)) => third_place_table.ensure_slot(groups),
        (Stage::RoundOf16, _) => Ok(()),
        (_, Slot::MatchWinner(code)) if previous_codes.contains(&code.as_str()) => Ok(()),
        (_, Slot::MatchWinner(_)) => Err(TournamentError::UnresolvedSlot {
            stage,
            slot: slot.to_string(),
        }),
        (_, _) => Err(not_allowed()),
    }
}

/// Slots a round must fill. The round of 16 takes the winner and runner-up
/// of every group it mentions plus one team per third-place slot; later
/// rounds take the winner of every previous fixture.
fn expected_slots(
    stage: Stage,
    used: &HashSet<&Slot>,
    previous_codes: &[&str],
    third_place_table: &ThirdPlaceTable,
) -> Vec<Slot> {
    if stage != Stage::RoundOf16 {
        return previous_codes
            .iter()
            .map(|code| Slot::MatchWinner(code.to_string()))
            .collect();
    }

    let mut groups: BTreeSet<GroupId> = third_place_table.slots().iter().flatten().copied().collect();
    for slot in used {
        match slot {
            Slot::GroupWinner(g) | Slot::GroupRunnerUp(g) => {
                groups.insert(*g);
            }
            Slot::BestThird(eligible) => groups.extend(eligible.iter().copied()),
            Slot::Team(_) | Slot::MatchWinner(_) => {}
        }
    }

    groups
        .into_iter()
        .flat_map(|g| [Slot::GroupWinner(g), Slot::GroupRunnerUp(g)])
        .chain(third_place_table.slots().iter().cloned().map(Slot::BestThird))
        .collect()
}

// ── Resolver ─────────────────────────────────────────────────────────────────

/// Final result of the knockout phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnockoutOutcome {
    pub rounds: Vec<ResolvedRound>,
    pub champion: String,
}

/// Round-by-round state machine over the knockout bracket.
pub struct BracketResolver<'a> {
    predictor: Predictor<'a>,
    templates: KnockoutTemplates,
    qualifiers: Qualifiers,
    tie_break: TieBreak,
    rng: StdRng,
    next: Option<Stage>,
    resolved: Vec<ResolvedRound>,
}

impl<'a> BracketResolver<'a> {
    pub fn new(
        predictor: Predictor<'a>,
        templates: KnockoutTemplates,
        qualifiers: Qualifiers,
        tie_break: TieBreak,
        seed: u64,
    ) -> Self {
        BracketResolver {
            predictor,
            templates,
            qualifiers,
            tie_break,
            rng: StdRng::seed_from_u64(seed),
            next: Some(Stage::RoundOf16),
            resolved: Vec::new(),
        }
    }

    /// The stage the next call to [`resolve_next`](Self::resolve_next) will
    /// play, or `None` once the final is decided.
    pub fn pending_stage(&self) -> Option<Stage> {
        self.next
    }

    pub fn resolved(&self) -> &[ResolvedRound] {
        &self.resolved
    }

    /// Resolve and play the next round.
    pub fn resolve_next(&mut self) -> Result<&ResolvedRound> {
        let stage = self.next.ok_or(TournamentError::BracketFinished)?;
        let templates = self
            .templates
            .round(stage)
            .ok_or(TournamentError::RoundSize {
                stage,
                expected: stage.fixture_count(),
                found: 0,
            })?
            .to_vec();

        let mut fixtures = Vec::with_capacity(templates.len());
        for template in &templates {
            let home = self.resolve_slot(stage, &template.home)?;
            let away = self.resolve_slot(stage, &template.away)?;
            let prediction = self.predictor.predict(&home, &away);
            let winner = self.pick_winner(&home, &away, &prediction);
            debug!(
                "{} {}: {} vs {} -> {} (xPts {:.2}-{:.2})",
                stage, template.code, home, away, winner, prediction.home_points, prediction.away_points
            );
            fixtures.push(ResolvedFixture {
                code: template.code.clone(),
                home,
                away,
                prediction,
                winner,
            });
        }

        info!(
            "{} resolved: {}",
            stage,
            fixtures
                .iter()
                .map(|f| f.winner.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        self.next = stage.next();
        let index = self.resolved.len();
        self.resolved.push(ResolvedRound { stage, fixtures });
        Ok(&self.resolved[index])
    }

    /// Play every remaining round and return the champion.
    pub fn run(mut self) -> Result<KnockoutOutcome> {
        while self.pending_stage().is_some() {
            self.resolve_next()?;
        }
        let champion = self
            .resolved()
            .last()
            .and_then(|r| r.fixtures.first())
            .map(|f| f.winner.clone())
            .ok_or(TournamentError::BracketFinished)?;
        Ok(KnockoutOutcome {
            rounds: self.resolved,
            champion,
        })
    }

    fn resolve_slot(&self, stage: Stage, slot: &Slot) -> Result<String> {
        let team = match slot {
            Slot::MatchWinner(code) => self
                .resolved
                .last()
                .and_then(|prev| prev.winner_of(code))
                .map(str::to_string),
            _ if stage == Stage::RoundOf16 => self.qualifiers.lookup(slot),
            _ => None,
        };
        team.ok_or_else(|| TournamentError::UnresolvedSlot {
            stage,
            slot: slot.to_string(),
        })
    }

    fn pick_winner(&mut self, home: &str, away: &str, p: &Prediction) -> String {
        let home_through = if p.home_points > p.away_points {
            true
        } else if p.home_points < p.away_points {
            false
        } else {
            match self.tie_break {
                TieBreak::Away => false,
                TieBreak::Home => true,
                TieBreak::CoinFlip => self.rng.gen_bool(0.5),
            }
        };
        if home_through {
            home.to_string()
        } else {
            away.to_string()
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
