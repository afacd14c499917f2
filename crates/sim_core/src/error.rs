//! Error kinds shared by the tick subsystems and the planner family.
//!
//! Tick subsystems never propagate these as `Result` — a failure is recovered
//! locally (the entity is skipped, the order dropped) and an [`crate::events::Event`]
//! is appended instead. Planners surface the same kinds as `stall_reason`
//! hints on their result (see [`crate::planners`]). Only host-boundary
//! operations (`load_game`, content validation) return `Result<_, SimError>`.

use crate::id::Id;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("invalid target: entity {0} missing or in the wrong system")]
    InvalidTarget(Id),
    #[error("insufficient fuel to cover any meaningful distance")]
    InsufficientFuel,
    #[error("colony {0} cannot pay mineral costs this step")]
    InsufficientSupplies(Id),
    #[error("no routable jump path to the target system")]
    Unreachable,
    #[error("installation {0} is not buildable for this faction")]
    UnbuildableInstallation(String),
    #[error("refit target ship {0} is not docked at this colony")]
    RefitShipNotDocked(Id),
    #[error("research queue blocked: missing prereqs for {0}")]
    QueueBlockedByPrereqs(String),
    #[error("no progress made")]
    NoProgress,
    #[error("malformed content: {0}")]
    MalformedContent(String),
    #[error("corrupted save: {0}")]
    CorruptedSave(String),
}

impl SimError {
    /// A short machine-stable tag, used as the `kind` hint on planner stalls
    /// and in diagnostic event messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SimError::InvalidTarget(_) => "invalid_target",
            SimError::InsufficientFuel => "insufficient_fuel",
            SimError::InsufficientSupplies(_) => "insufficient_supplies",
            SimError::Unreachable => "unreachable",
            SimError::UnbuildableInstallation(_) => "unbuildable_installation",
            SimError::RefitShipNotDocked(_) => "refit_ship_not_docked",
            SimError::QueueBlockedByPrereqs(_) => "queue_blocked_by_prereqs",
            SimError::NoProgress => "no_progress",
            SimError::MalformedContent(_) => "malformed_content",
            SimError::CorruptedSave(_) => "corrupted_save",
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
