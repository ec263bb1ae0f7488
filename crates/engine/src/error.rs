//! Fatal render errors and non-fatal warnings.

use serde::{Deserialize, Serialize};

pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that abort a render. No partial scene graph is returned.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A length carries a unit symbol the normalizer does not know
    InvalidUnit(String),
    /// Dimensions that cannot produce geometry (oversized opening, zero width, ...)
    InvalidGeometry(String),
    /// A room, floor, stair or lift name that does not exist
    UnresolvedReference(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::InvalidUnit(unit) => write!(f, "Invalid unit '{}'", unit),
            RenderError::InvalidGeometry(msg) => write!(f, "Invalid geometry: {}", msg),
            RenderError::UnresolvedReference(name) => {
                write!(f, "Unresolved reference: {}", name)
            }
        }
    }
}

impl std::error::Error for RenderError {}

/// Recorded problems that do not stop the render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Warning {
    /// Rooms sharing a wall declared different thicknesses; the larger one wins
    WallConflict {
        floor: String,
        segment: String,
        thicknesses: Vec<f64>,
        resolved: f64,
    },
    /// A second declaration targeted an already matched wall segment
    DuplicateConnection {
        floor: String,
        segment: String,
        dropped: String,
    },
    /// The opening did not fit around its mark and was moved along the wall
    OpeningShifted {
        floor: String,
        segment: String,
        opening: String,
        requested: f64,
        placed: f64,
    },
    /// A stair violates the configured building-code profile
    CodeCompliance {
        stair: String,
        rule: String,
        detail: String,
    },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::WallConflict {
                floor,
                segment,
                thicknesses,
                resolved,
            } => write!(
                f,
                "[{}] wall {}: conflicting thicknesses {:?}, using {}",
                floor, segment, thicknesses, resolved
            ),
            Warning::DuplicateConnection {
                floor,
                segment,
                dropped,
            } => write!(
                f,
                "[{}] wall {} already has an opening, dropped {}",
                floor, segment, dropped
            ),
            Warning::OpeningShifted {
                floor,
                segment,
                opening,
                requested,
                placed,
            } => write!(
                f,
                "[{}] opening {} moved from {:.3} to {:.3} to fit wall {}",
                floor, opening, requested, placed, segment
            ),
            Warning::CodeCompliance { stair, rule, detail } => {
                write!(f, "stair {}: {} ({})", stair, rule, detail)
            }
        }
    }
}
