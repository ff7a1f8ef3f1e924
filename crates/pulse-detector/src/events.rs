//! Setup lifecycle events for orchestration collaborators.

use crate::setup::Setup;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a setup was removed from tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    /// Price broke through the impulse's far boundary.
    StructureFailure,
    /// Price returned to within the target band of the impulse end.
    TargetReached,
    /// The oscillator re-entered the extreme zone while reversing.
    SecondExcursion,
    /// The oscillator completed its recovery.
    RecoveryComplete,
}

impl fmt::Display for RemovalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::StructureFailure => "structure_failure",
            Self::TargetReached => "target_reached",
            Self::SecondExcursion => "second_excursion",
            Self::RecoveryComplete => "recovery_complete",
        };
        write!(f, "{label}")
    }
}

/// An event emitted by the detection engine, carrying the full snapshot.
///
/// A `Removed` event is emitted in the same step the setup is deleted from
/// the tracked map, so there is at most one removal per setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum SetupEvent {
    Created(Setup),
    Updated(Setup),
    Removed { setup: Setup, reason: RemovalReason },
}

impl SetupEvent {
    /// The snapshot carried by this event.
    #[must_use]
    pub fn setup(&self) -> &Setup {
        match self {
            Self::Created(s) | Self::Updated(s) => s,
            Self::Removed { setup, .. } => setup,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Updated(_) => "updated",
            Self::Removed { .. } => "removed",
        }
    }
}
