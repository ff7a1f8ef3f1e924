//! Position lifecycle events for orchestration collaborators.

use crate::position::Position;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An event emitted by the lifecycle engine, carrying the full snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum PositionEvent {
    Opened(Position),
    BreakevenLocked(Position),
    TrailingActivated(Position),
    TrailingAdvanced { position: Position, level: u32 },
    PartiallyClosed {
        position: Position,
        fraction: Decimal,
        realized_pnl: Decimal,
    },
    Closed(Position),
}

impl PositionEvent {
    /// The snapshot carried by this event.
    #[must_use]
    pub fn position(&self) -> &Position {
        match self {
            Self::Opened(p)
            | Self::BreakevenLocked(p)
            | Self::TrailingActivated(p)
            | Self::Closed(p) => p,
            Self::TrailingAdvanced { position, .. } => position,
            Self::PartiallyClosed { position, .. } => position,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Opened(_) => "opened",
            Self::BreakevenLocked(_) => "breakeven_locked",
            Self::TrailingActivated(_) => "trailing_activated",
            Self::TrailingAdvanced { .. } => "trailing_advanced",
            Self::PartiallyClosed { .. } => "partially_closed",
            Self::Closed(_) => "closed",
        }
    }
}
