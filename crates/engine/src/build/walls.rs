//! Wall builder: one volume per segment, with an optional opening cut either
//! by a boolean backend (plus material reassignment) or as adjoining pieces.

use glam::Vec3;
use shared::{Config, OpeningHeight};

use super::csg::{cut_pieces, BooleanBackend};
use super::matcher::{OpeningKind, OpeningRequest};
use super::ownership::{Axis, WallSegment, TOLERANCE};
use super::reassign::reassign_materials;
use crate::error::{RenderError, RenderResult};
use crate::mesh::{Block, Face, FacePalette, Material, MeshData};
use crate::units::m;

/// How far a boolean cutter overshoots the faces it passes through
const CUT_OVERSHOOT: f64 = 0.01;

/// Opening rectangle on a wall, in wall-local terms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallOpening {
    pub kind: OpeningKind,
    /// Center along the wall axis (absolute plan coordinate)
    pub center: f64,
    pub width: f64,
    /// Bottom of the opening above the floor surface
    pub sill: f64,
    pub height: f64,
}

impl WallOpening {
    pub fn span(&self) -> (f64, f64) {
        (self.center - self.width / 2.0, self.center + self.width / 2.0)
    }
}

/// Size and place the opening for a matched request.
///
/// Explicit size wins over config defaults; `full` height spans the whole
/// wall. The center is clamped so the opening stays inside the segment.
pub fn resolve_opening(
    request: &OpeningRequest,
    segment: &WallSegment,
    config: &Config,
) -> RenderResult<WallOpening> {
    let default_width = match request.kind {
        OpeningKind::Door | OpeningKind::Opening => m(&config.door_width),
        OpeningKind::DoubleDoor => m(&config.double_door_width),
        OpeningKind::Window => m(&config.window_width),
    };
    let width = request.width.unwrap_or(default_width);

    let (sill, height) = match (&request.height, request.kind) {
        (Some(OpeningHeight::Full), _) => (0.0, segment.height),
        (Some(OpeningHeight::Exact(h)), OpeningKind::Window) => (m(&config.window_sill), m(h)),
        (Some(OpeningHeight::Exact(h)), _) => (0.0, m(h)),
        (None, OpeningKind::Window) => (m(&config.window_sill), m(&config.window_height)),
        (None, _) => (0.0, m(&config.door_height)),
    };

    if width <= 0.0 || height <= 0.0 {
        return Err(RenderError::InvalidGeometry(format!(
            "opening {} has non-positive size {:.3} x {:.3}",
            request.label, width, height
        )));
    }
    if width > segment.length() + TOLERANCE {
        return Err(RenderError::InvalidGeometry(format!(
            "opening {} is {:.3}m wide but wall {} is only {:.3}m long",
            request.label,
            width,
            segment.id,
            segment.length()
        )));
    }
    if sill + height > segment.height + TOLERANCE {
        return Err(RenderError::InvalidGeometry(format!(
            "opening {} reaches {:.3}m but wall {} is {:.3}m tall",
            request.label,
            sill + height,
            segment.id,
            segment.height
        )));
    }

    let center = request
        .center
        .clamp(segment.start + width / 2.0, segment.end - width / 2.0);

    Ok(WallOpening {
        kind: request.kind,
        center,
        width,
        sill,
        height,
    })
}

/// Box from wall-local ranges: along the wall, across it, and vertical
pub fn axis_block(axis: Axis, along: (f64, f64), across: (f64, f64), y: (f64, f64)) -> Block {
    let (ax, az) = match axis {
        Axis::X => (along, across),
        Axis::Y => (across, along),
    };
    Block::new(
        Vec3::new(ax.0 as f32, y.0 as f32, az.0 as f32),
        Vec3::new(ax.1 as f32, y.1 as f32, az.1 as f32),
    )
}

/// Full wall volume standing on `base`
pub fn wall_block(segment: &WallSegment, base: f64) -> Block {
    let half = segment.thickness / 2.0;
    let ext_start = if segment.extend_start { half } else { 0.0 };
    let ext_end = if segment.extend_end { half } else { 0.0 };
    axis_block(
        segment.axis,
        (segment.start - ext_start, segment.end + ext_end),
        (segment.line - half, segment.line + half),
        (base, base + segment.height),
    )
}

/// Room-facing faces carry each side's material, the rest the owner's
pub fn wall_palette(segment: &WallSegment) -> FacePalette {
    let mut palette = FacePalette::uniform(Material::opaque(&segment.edge_material));
    let (neg, pos) = match segment.axis {
        Axis::X => (Face::NegZ, Face::PosZ),
        Axis::Y => (Face::NegX, Face::PosX),
    };
    palette.set(neg, Material::opaque(&segment.neg_material));
    palette.set(pos, Material::opaque(&segment.pos_material));
    palette
}

/// Cutter volume for an opening, overshooting the wall faces so the boolean
/// never leaves coplanar slivers
pub fn opening_block(segment: &WallSegment, opening: &WallOpening, base: f64) -> Block {
    let (a, b) = opening.span();
    let half = segment.thickness / 2.0 + CUT_OVERSHOOT;
    let bottom = if opening.sill <= TOLERANCE {
        base - CUT_OVERSHOOT
    } else {
        base + opening.sill
    };
    let top_reach = opening.sill + opening.height;
    let top = if top_reach >= segment.height - TOLERANCE {
        base + segment.height + CUT_OVERSHOOT
    } else {
        base + top_reach
    };
    axis_block(
        segment.axis,
        (a, b),
        (segment.line - half, segment.line + half),
        (bottom, top),
    )
}

/// Build a wall segment's mesh. Open segments produce nothing.
pub fn build_wall(
    segment: &WallSegment,
    opening: Option<&WallOpening>,
    base: f64,
    backend: Option<&dyn BooleanBackend>,
) -> RenderResult<Option<MeshData>> {
    if segment.open {
        return Ok(None);
    }
    let solid = wall_block(segment, base);
    let palette = wall_palette(segment);

    let mesh = match (opening, backend) {
        (None, _) => {
            let mut mesh = MeshData::new();
            mesh.push_block(&solid, &palette);
            mesh
        }
        (Some(opening), Some(backend)) => {
            let cut = opening_block(segment, opening, base);
            let soup = backend.subtract(&solid, &cut)?;
            tracing::debug!("wall {}: cut with {}", segment.id, backend.name());
            reassign_materials(&soup, &palette)
        }
        (Some(opening), None) => {
            let cut = opening_block(segment, opening, base);
            tracing::debug!("wall {}: cut as pieces", segment.id);
            cut_pieces(&solid, &cut, &palette)
        }
    };
    Ok(Some(mesh))
}
