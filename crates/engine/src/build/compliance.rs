//! Building-code checks for stairs. Violations become warnings; geometry is
//! never changed.

use shared::{BuildingCode, HandrailSides};

use super::stairs::StairGeometry;
use crate::error::Warning;

const EPS: f64 = 1e-9;

/// Limits of one code profile, in meters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CodeLimits {
    pub max_riser: f64,
    pub min_tread: f64,
    pub min_width: f64,
    pub min_headroom: f64,
    /// Handrails required on both sides rather than one
    pub both_handrails: bool,
}

impl CodeLimits {
    /// `None` for `BuildingCode::None`: nothing is checked
    pub fn for_code(code: BuildingCode) -> Option<CodeLimits> {
        match code {
            BuildingCode::None => None,
            BuildingCode::Residential => Some(CodeLimits {
                max_riser: 0.196,
                min_tread: 0.254,
                min_width: 0.914,
                min_headroom: 2.032,
                both_handrails: false,
            }),
            BuildingCode::Commercial => Some(CodeLimits {
                max_riser: 0.178,
                min_tread: 0.279,
                min_width: 1.118,
                min_headroom: 2.032,
                both_handrails: false,
            }),
            BuildingCode::Ada => Some(CodeLimits {
                max_riser: 0.178,
                min_tread: 0.279,
                min_width: 1.118,
                min_headroom: 2.032,
                both_handrails: true,
            }),
        }
    }
}

/// One warning per violated rule
pub fn check_stair(
    name: &str,
    geometry: &StairGeometry,
    handrail: HandrailSides,
    code: BuildingCode,
) -> Vec<Warning> {
    let Some(limits) = CodeLimits::for_code(code) else {
        return Vec::new();
    };
    let dims = &geometry.dims;
    let mut warnings = Vec::new();
    let mut violate = |rule: &str, detail: String| {
        let w = Warning::CodeCompliance {
            stair: name.to_string(),
            rule: rule.to_string(),
            detail,
        };
        tracing::warn!("{}", w);
        warnings.push(w);
    };

    if geometry.riser_height > limits.max_riser + EPS {
        violate(
            "max_riser",
            format!("riser {:.3}m exceeds {:.3}m", geometry.riser_height, limits.max_riser),
        );
    }
    if geometry.treads > 0 && dims.tread_depth < limits.min_tread - EPS {
        violate(
            "min_tread",
            format!("tread {:.3}m below {:.3}m", dims.tread_depth, limits.min_tread),
        );
    }
    if geometry.min_width < limits.min_width - EPS {
        violate(
            "min_width",
            format!("width {:.3}m below {:.3}m", geometry.min_width, limits.min_width),
        );
    }
    if dims.headroom < limits.min_headroom - EPS {
        violate(
            "min_headroom",
            format!("headroom {:.3}m below {:.3}m", dims.headroom, limits.min_headroom),
        );
    }
    let handrails_ok = match handrail {
        HandrailSides::None => false,
        HandrailSides::Left | HandrailSides::Right => !limits.both_handrails,
        HandrailSides::Both => true,
    };
    if !handrails_ok {
        let needed = if limits.both_handrails { "both sides" } else { "one side" };
        violate("handrails", format!("handrails required on {}", needed));
    }

    warnings
}
