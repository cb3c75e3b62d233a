//! Cross-group ranking of third-placed teams and the static table that
//! decides which round-of-16 slot each qualifying third fills.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::error::{Result, TournamentError};

use super::group::ranking_key;
use super::models::{group_set_label, parse_group_set, GroupId, GroupStanding, GroupTable};

/// Number of third-placed teams that reach the round of 16.
pub const QUALIFYING_THIRDS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThirdPlaced {
    pub group: GroupId,
    pub standing: GroupStanding,
}

/// Pool the third-placed row of every ranked group (in the order the groups
/// are given) and return the best `count` by points, goal difference and
/// goals for.
pub fn best_third_placed(groups: &[GroupTable], count: usize) -> Result<Vec<ThirdPlaced>> {
    let mut pool: Vec<ThirdPlaced> = groups
        .iter()
        .filter_map(|table| {
            table.third().map(|standing| ThirdPlaced {
                group: table.group,
                standing: standing.clone(),
            })
        })
        .collect();

    if pool.len() < count {
        return Err(TournamentError::NotEnoughThirds {
            needed: count,
            found: pool.len(),
        });
    }

    pool.sort_by(|a, b| ranking_key(&b.standing).cmp(&ranking_key(&a.standing)));
    pool.truncate(count);
    Ok(pool)
}

#[derive(Debug, Deserialize)]
struct RawThirdPlaceTable {
    slots: Vec<String>,
    combinations: HashMap<String, Vec<GroupId>>,
}

/// Static assignment of qualifying third-placed teams to bracket slots.
///
/// Each slot is identified by the set of groups it may draw from ("D/E/F").
/// A combination is keyed by the sorted letters of the groups whose thirds
/// qualified ("CDEF"); its i-th entry names the group whose third fills
/// slot i.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawThirdPlaceTable")]
pub struct ThirdPlaceTable {
    slots: Vec<Vec<GroupId>>,
    combinations: HashMap<String, Vec<GroupId>>,
}

impl TryFrom<RawThirdPlaceTable> for ThirdPlaceTable {
    type Error = TournamentError;

    fn try_from(raw: RawThirdPlaceTable) -> Result<Self> {
        let slots = raw
            .slots
            .iter()
            .map(|label| {
                parse_group_set(label)
                    .ok_or_else(|| TournamentError::InvalidPlaceholder(label.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        let table = ThirdPlaceTable {
            slots,
            combinations: raw.combinations,
        };
        table.validate()?;
        Ok(table)
    }
}

/// Keys of every way to choose `k` of `groups`, which must be sorted.
fn combination_keys(groups: &[GroupId], k: usize) -> Vec<String> {
    if k == 0 {
        return vec![String::new()];
    }
    let Some((first, rest)) = groups.split_first() else {
        return Vec::new();
    };
    let mut keys: Vec<String> = combination_keys(rest, k - 1)
        .into_iter()
        .map(|tail| format!("{}{}", first.letter(), tail))
        .collect();
    keys.extend(combination_keys(rest, k));
    keys
}

pub fn combination_key(groups: &[GroupId]) -> String {
    let mut letters: Vec<char> = groups.iter().map(|g| g.letter()).collect();
    letters.sort_unstable();
    letters.into_iter().collect()
}

impl ThirdPlaceTable {
    pub fn slots(&self) -> &[Vec<GroupId>] {
        &self.slots
    }

    /// Every combination must place each of its groups exactly once, into a
    /// slot that accepts that group, and every possible set of qualifying
    /// groups must have a combination.
    pub fn validate(&self) -> Result<()> {
        for (key, assignment) in &self.combinations {
            if assignment.len() != self.slots.len() {
                return Err(TournamentError::MissingThirdPlaceCombination(key.clone()));
            }
            if combination_key(assignment) != *key {
                return Err(TournamentError::MissingThirdPlaceCombination(key.clone()));
            }
            for (slot, group) in self.slots.iter().zip(assignment) {
                if !slot.contains(group) {
                    return Err(TournamentError::IneligibleThirdPlaceAssignment {
                        slot: group_set_label(slot),
                        group: *group,
                    });
                }
            }
        }

        let groups: Vec<GroupId> = self
            .slots
            .iter()
            .flatten()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        match combination_keys(&groups, self.slots.len())
            .into_iter()
            .find(|key| !self.combinations.contains_key(key))
        {
            Some(key) => Err(TournamentError::MissingThirdPlaceCombination(key)),
            None => Ok(()),
        }
    }

    /// Check that a bracket slot is one this table knows how to fill.
    pub fn ensure_slot(&self, eligible: &[GroupId]) -> Result<()> {
        if self.slots.iter().any(|s| s == eligible) {
            Ok(())
        } else {
            Err(TournamentError::ThirdPlaceSlotUnknown(group_set_label(eligible)))
        }
    }

    /// Map each slot to the team that fills it for the given qualifiers.
    pub fn assign(&self, qualifiers: &[ThirdPlaced]) -> Result<HashMap<Vec<GroupId>, String>> {
        let groups: Vec<GroupId> = qualifiers.iter().map(|q| q.group).collect();
        let key = combination_key(&groups);
        let assignment = self
            .combinations
            .get(&key)
            .ok_or_else(|| TournamentError::MissingThirdPlaceCombination(key.clone()))?;

        self.slots
            .iter()
            .zip(assignment)
            .map(|(slot, group)| {
                let team = qualifiers
                    .iter()
                    .find(|q| q.group == *group)
                    .map(|q| q.standing.team.clone())
                    .ok_or_else(|| TournamentError::MissingThirdPlaceCombination(key.clone()))?;
                Ok((slot.clone(), team))
            })
            .collect()
    }
}
