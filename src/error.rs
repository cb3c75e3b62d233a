use thiserror::Error;

use crate::tournament::models::{GroupId, Stage};

/// Fatal inconsistencies between fixture templates, group tables and the
/// third-place assignment table. None of these are recoverable: the
/// simulation cannot advance past the round that raised them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TournamentError {
    #[error("{group} must contain exactly 4 teams, found {found}")]
    GroupSize { group: GroupId, found: usize },

    #[error("{team} is scheduled in {group} but is not a member of it")]
    TeamNotInGroup { group: GroupId, team: String },

    #[error("{stage} needs {expected} fixtures, template has {found}")]
    RoundSize {
        stage: Stage,
        expected: usize,
        found: usize,
    },

    #[error("unrecognised placeholder '{0}'")]
    InvalidPlaceholder(String),

    #[error("slot '{slot}' cannot appear in {stage}")]
    SlotNotAllowed { stage: Stage, slot: String },

    #[error("slot '{slot}' in {stage} could not be resolved")]
    UnresolvedSlot { stage: Stage, slot: String },

    #[error("{stage} lists match code '{code}' more than once")]
    DuplicateMatchCode { stage: Stage, code: String },

    #[error("slot '{slot}' is used more than once in {stage}")]
    SlotReused { stage: Stage, slot: String },

    #[error("{stage} never uses slot '{slot}'")]
    SlotNeverUsed { stage: Stage, slot: String },

    #[error("need {needed} third-placed teams, only {found} groups were ranked")]
    NotEnoughThirds { needed: usize, found: usize },

    #[error("third-place table has no entry for qualifying groups {0}")]
    MissingThirdPlaceCombination(String),

    #[error("third-place table has no slot labelled '{0}'")]
    ThirdPlaceSlotUnknown(String),

    #[error("third-place table sends {group} to slot '{slot}' which does not accept it")]
    IneligibleThirdPlaceAssignment { slot: String, group: GroupId },

    #[error("bracket already produced a champion")]
    BracketFinished,
}

pub type Result<T> = std::result::Result<T, TournamentError>;
