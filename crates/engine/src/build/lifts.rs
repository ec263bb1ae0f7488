//! Lift shafts: four wall panels per floor level, door voids cut by the
//! wall builder, and the shaft rectangle handed to slab building as an
//! exclusion zone.

use kurbo::Rect;
use shared::{Config, Lift, OpeningHeight, Swing, WallDirection};

use super::csg::BooleanBackend;
use super::layout::FloorLevel;
use super::matcher::{OpeningKind, OpeningRequest};
use super::ownership::{Axis, WallSegment};
use super::walls::{build_wall, resolve_opening};
use crate::error::{RenderError, RenderResult};
use crate::mesh::MeshData;
use crate::units::m;

/// Plan rectangle of the shaft (panel center lines)
pub fn shaft_rect(lift: &Lift) -> RenderResult<Rect> {
    let (x, y) = (m(&lift.position.x), m(&lift.position.y));
    let (w, d) = (m(&lift.size.width), m(&lift.size.depth));
    if !(w > 0.0 && d > 0.0) {
        return Err(RenderError::InvalidGeometry(format!(
            "lift '{}' has non-positive size {:.3} x {:.3}",
            lift.name, w, d
        )));
    }
    Ok(Rect::new(x, y, x + w, y + d))
}

fn panel(lift: &Lift, rect: Rect, dir: WallDirection, height: f64, config: &Config) -> WallSegment {
    let axis = Axis::of(dir);
    let (line, start, end) = match dir {
        WallDirection::Top => (rect.y0, rect.x0, rect.x1),
        WallDirection::Bottom => (rect.y1, rect.x0, rect.x1),
        WallDirection::Left => (rect.x0, rect.y0, rect.y1),
        WallDirection::Right => (rect.x1, rect.y0, rect.y1),
    };
    let material = config.lift_material.clone();
    WallSegment {
        id: format!("{}.{}", lift.name, dir.as_str()),
        axis,
        line,
        start,
        end,
        thickness: m(&config.wall_thickness),
        height,
        open: false,
        owner: lift.name.clone(),
        owner_dir: dir,
        neg_material: material.clone(),
        pos_material: material.clone(),
        edge_material: material,
        neg_room: None,
        pos_room: None,
        // top/bottom panels close the corners
        extend_start: axis == Axis::X,
        extend_end: axis == Axis::X,
    }
}

/// Shaft panels for one floor level, standing on that level's slab
pub fn build_lift_level(
    lift: &Lift,
    level: &FloorLevel,
    config: &Config,
    backend: Option<&dyn BooleanBackend>,
) -> RenderResult<MeshData> {
    let rect = shaft_rect(lift)?;
    let mut mesh = MeshData::new();

    for dir in WallDirection::ALL {
        let segment = panel(lift, rect, dir, level.height, config);
        let opening = if lift.doors.contains(&dir) {
            let request = OpeningRequest {
                label: format!("{}.{}", lift.name, dir.as_str()),
                kind: OpeningKind::Opening,
                room: lift.name.clone(),
                wall: dir,
                center: (segment.start + segment.end) / 2.0,
                width: None,
                height: Some(OpeningHeight::Exact(config.door_height.clone())),
                swing: Swing::default(),
                opens_into: lift.name.clone(),
            };
            Some(resolve_opening(&request, &segment, config)?)
        } else {
            None
        };
        if let Some(wall) = build_wall(&segment, opening.as_ref(), level.base(), backend)? {
            mesh.append(&wall);
        }
    }

    tracing::debug!(
        "lift {}: level {} panels, {} doors",
        lift.name,
        level.index,
        lift.doors.len()
    );
    Ok(mesh)
}
