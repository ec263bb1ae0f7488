//! Door leaves and window panes for matched openings.

use shared::{Config, Swing};

use super::layout::PlacedRoom;
use super::matcher::{OpeningKind, OpeningRequest};
use super::ownership::{Axis, WallSegment};
use super::walls::{axis_block, WallOpening};
use crate::mesh::{FacePalette, Material, MeshData};
use crate::scene::NodeKind;

pub const LEAF_THICKNESS: f64 = 0.04;
pub const PANE_THICKNESS: f64 = 0.02;

/// Which side of the wall line (+1 higher coordinate, -1 lower) a room is on
fn side_of(segment: &WallSegment, room: Option<&PlacedRoom>) -> f64 {
    let Some(room) = room else {
        return 1.0;
    };
    let r = &room.rect;
    let center = match segment.axis {
        Axis::X => (r.y0 + r.y1) / 2.0,
        Axis::Y => (r.x0 + r.x1) / 2.0,
    };
    if center >= segment.line {
        1.0
    } else {
        -1.0
    }
}

/// Hinge jamb coordinate along the wall.
///
/// Jambs are named as seen from the side the door opens into: `swing: left`
/// hinges on the right jamb, `swing: right` on the left jamb.
pub fn hinge_position(segment: &WallSegment, opening: &WallOpening, side: f64, swing: Swing) -> f64 {
    // viewer's right hand along the wall axis
    let right = match segment.axis {
        Axis::X => side,
        Axis::Y => -side,
    };
    let half = opening.width / 2.0;
    match swing {
        Swing::Right => opening.center - right * half,
        Swing::Left => opening.center + right * half,
    }
}

/// One leaf hinged at `hinge`, opened 90 degrees into `side`
#[allow(clippy::too_many_arguments)]
fn push_leaf(
    mesh: &mut MeshData,
    segment: &WallSegment,
    opening: &WallOpening,
    base: f64,
    hinge: f64,
    leaf_width: f64,
    side: f64,
    material: &Material,
) {
    let inward = if opening.center >= hinge { 1.0 } else { -1.0 };
    let face = segment.line + side * segment.thickness / 2.0;
    let block = axis_block(
        segment.axis,
        (hinge, hinge + inward * LEAF_THICKNESS),
        (face, face + side * leaf_width),
        (base + opening.sill, base + opening.sill + opening.height),
    );
    mesh.push_block(&block, &FacePalette::uniform(material.clone()));
}

/// Build the leaf or pane for a matched opening. Plain openings get no mesh.
pub fn build_connection_geometry(
    request: &OpeningRequest,
    segment: &WallSegment,
    opening: &WallOpening,
    base: f64,
    rooms: &[PlacedRoom],
    config: &Config,
) -> Option<(NodeKind, MeshData)> {
    let side = side_of(segment, rooms.iter().find(|r| r.name == request.opens_into));
    let door = Material::opaque(&config.door_material);
    let mut mesh = MeshData::new();

    let kind = match opening.kind {
        OpeningKind::Opening => return None,
        OpeningKind::Door => {
            let hinge = hinge_position(segment, opening, side, request.swing);
            push_leaf(&mut mesh, segment, opening, base, hinge, opening.width, side, &door);
            NodeKind::Door
        }
        OpeningKind::DoubleDoor => {
            let (a, b) = opening.span();
            for hinge in [a, b] {
                push_leaf(&mut mesh, segment, opening, base, hinge, opening.width / 2.0, side, &door);
            }
            NodeKind::Door
        }
        OpeningKind::Window => {
            let glass = Material::translucent(&config.glass_material);
            let block = axis_block(
                segment.axis,
                opening.span(),
                (segment.line - PANE_THICKNESS / 2.0, segment.line + PANE_THICKNESS / 2.0),
                (base + opening.sill, base + opening.sill + opening.height),
            );
            mesh.push_block(&block, &FacePalette::uniform(glass));
            NodeKind::Window
        }
    };

    tracing::debug!(
        "{:?} for {} on {}: side {:+}",
        kind,
        request.label,
        segment.id,
        side
    );
    Some((kind, mesh))
}
