//! Scene building: normalized floorplan in, per-floor scene graph out.
//!
//! Per floor: slabs, wall ownership, connection matching, walls with their
//! openings and leaves, then stairs and lift shafts. Stairs and lifts are
//! built ahead of the per-floor pass because they punch exclusion zones into
//! the slabs of the floors above them.

mod compliance;
mod connection_geometry;
mod csg;
mod layout;
mod lifts;
mod matcher;
mod ownership;
mod reassign;
mod slabs;
mod stairs;
mod walls;

pub use compliance::{check_stair, CodeLimits};
pub use connection_geometry::build_connection_geometry;
pub use csg::{backend_for, cut_pieces, facing_area, split_box, BooleanBackend, BoxSplitBackend, CsgMode};
#[cfg(feature = "csg")]
pub use csg::VcadBackend;
pub use layout::{floor_height, floor_levels, place_rooms, FloorLevel, PlacedRoom};
pub use lifts::{build_lift_level, shaft_rect};
pub use matcher::{match_connections, Matches, OpeningKind, OpeningRequest};
pub use ownership::{resolve_walls, Axis, WallSegment};
use ownership::TOLERANCE;
pub use reassign::reassign_materials;
pub use slabs::{build_slab, slab_pieces, subtract_rect};
pub use stairs::{
    build_stair, count_risers, expand_shape, riser_count, StairContext, StairDimensions,
    StairGeometry,
};
pub use walls::{build_wall, resolve_opening, WallOpening};

use std::collections::HashMap;

use kurbo::Rect;
use serde::{Deserialize, Serialize};
use shared::Floorplan;

use crate::error::{RenderError, RenderResult, Warning};
use crate::mesh::MeshData;
use crate::scene::{FloorGroup, NodeKind, Provenance, SceneGraph, SceneNode};
use crate::units::normalize;

/// Caller-side switches that do not belong to the floorplan itself
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    pub csg: CsgMode,
    /// Initial exploded-view spacing between floors, in meters
    pub exploded: f64,
}

/// Builds scene graphs. Holds no per-render state, so one builder can serve
/// concurrent renders.
pub struct SceneBuilder {
    options: BuildOptions,
    backend: Option<Box<dyn BooleanBackend>>,
}

impl SceneBuilder {
    pub fn new(options: BuildOptions) -> Self {
        let backend = backend_for(options.csg);
        tracing::debug!(
            "scene builder: csg {:?}, backend {}",
            options.csg,
            backend.as_ref().map_or("pieces", |b| b.name())
        );
        Self { options, backend }
    }

    /// Builder with an explicit boolean backend, whatever `options.csg` says
    pub fn with_backend(options: BuildOptions, backend: Box<dyn BooleanBackend>) -> Self {
        Self {
            options,
            backend: Some(backend),
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Render a floorplan. Fatal errors abort with no partial result.
    pub fn build(&self, plan: &Floorplan) -> RenderResult<SceneGraph> {
        let plan = normalize(plan)?;
        let config = &plan.config;
        let backend = self.backend.as_deref();
        let links = vertical_links(&plan)?;
        let levels = floor_levels(&plan);
        let placed: Vec<Vec<PlacedRoom>> = plan
            .floors
            .iter()
            .zip(&levels)
            .map(|(floor, level)| place_rooms(floor, level.height))
            .collect();

        let n = plan.floors.len();
        let mut exclusions: Vec<Vec<Rect>> = vec![Vec::new(); n];
        let mut vertical: Vec<Vec<SceneNode>> = vec![Vec::new(); n];
        let mut compliance: Vec<Vec<Warning>> = vec![Vec::new(); n];

        for (i, floor) in plan.floors.iter().enumerate() {
            let level = &levels[i];

            for stair in &floor.stairs {
                let target = links.get(&(i, stair.name.clone())).copied();
                let default_rise = match target {
                    Some(k) => levels[k].elevation - level.elevation,
                    None => level.height + level.slab,
                };
                let ctx = StairContext {
                    floor: &floor.name,
                    rooms: &placed[i],
                    config,
                    base: level.base(),
                    default_rise,
                    clear_height: level.height,
                };
                let geometry = build_stair(stair, &ctx)?;
                compliance[i].extend(check_stair(
                    &stair.name,
                    &geometry,
                    stair.handrail,
                    config.building_code,
                ));
                if let Some(k) = target {
                    for zones in &mut exclusions[i + 1..=k] {
                        zones.push(geometry.footprint);
                    }
                }

                let source = Provenance {
                    floor: floor.name.clone(),
                    entity: stair.name.clone(),
                    rooms: Vec::new(),
                };
                vertical[i].push(node(NodeKind::Stair, &stair.name, source.clone(), geometry.stair));
                if !geometry.handrails.is_empty() {
                    vertical[i].push(node(NodeKind::Handrail, &stair.name, source, geometry.handrails));
                }
            }

            for lift in &floor.lifts {
                let top = links.get(&(i, lift.name.clone())).copied().unwrap_or(i);
                let rect = shaft_rect(lift)?;
                for j in i..=top {
                    let mesh = build_lift_level(lift, &levels[j], config, backend)?;
                    let source = Provenance {
                        floor: floor.name.clone(),
                        entity: lift.name.clone(),
                        rooms: Vec::new(),
                    };
                    vertical[j].push(node(NodeKind::Lift, &lift.name, source, mesh));
                    if j > i {
                        exclusions[j].push(rect);
                    }
                }
            }
        }

        let mut graph = SceneGraph::default();
        for (i, floor) in plan.floors.iter().enumerate() {
            let level = &levels[i];
            let rooms = &placed[i];
            let base = level.base();
            let mut nodes = Vec::new();

            for room in rooms.iter().filter(|r| r.depth == 0) {
                let mesh = build_slab(room, level, &exclusions[i], config);
                if mesh.is_empty() {
                    tracing::debug!("slab {}: fully excluded", room.name);
                    continue;
                }
                let source = Provenance {
                    floor: floor.name.clone(),
                    entity: room.name.clone(),
                    rooms: vec![room.name.clone()],
                };
                nodes.push(node(NodeKind::Slab, &room.name, source, mesh));
            }

            let (segments, wall_warnings) = resolve_walls(&floor.name, rooms, config);
            let (matches, match_warnings) = match_connections(floor, rooms, &segments)?;
            graph.warnings.extend(wall_warnings);
            graph.warnings.extend(match_warnings);

            let mut openings = 0;
            for segment in segments.iter().filter(|s| !s.open) {
                let request = matches.get(&segment.id);
                let opening = request
                    .map(|r| resolve_opening(r, segment, config))
                    .transpose()?;
                if let (Some(r), Some(o)) = (request, opening.as_ref()) {
                    if (o.center - r.center).abs() > TOLERANCE {
                        let w = Warning::OpeningShifted {
                            floor: floor.name.clone(),
                            segment: segment.id.clone(),
                            opening: r.label.clone(),
                            requested: r.center,
                            placed: o.center,
                        };
                        tracing::warn!("{}", w);
                        graph.warnings.push(w);
                    }
                }
                let source = Provenance {
                    floor: floor.name.clone(),
                    entity: segment.id.clone(),
                    rooms: segment.rooms(),
                };

                if let Some(mesh) = build_wall(segment, opening.as_ref(), base, backend)? {
                    nodes.push(node(NodeKind::Wall, &segment.id, source.clone(), mesh));
                }
                let (Some(request), Some(opening)) = (request, opening) else {
                    continue;
                };
                openings += 1;
                if let Some((kind, mesh)) =
                    build_connection_geometry(request, segment, &opening, base, rooms, config)
                {
                    nodes.push(node(kind, &request.label, source, mesh));
                }
            }

            nodes.append(&mut vertical[i]);
            graph.warnings.append(&mut compliance[i]);

            tracing::info!(
                "floor {} '{}': elevation {:.3}m, {} rooms, {} walls, {} openings, {} nodes",
                i,
                floor.name,
                level.elevation,
                rooms.len(),
                segments.iter().filter(|s| !s.open).count(),
                openings,
                nodes.len()
            );

            graph.floors.push(FloorGroup {
                index: i,
                name: floor.name.clone(),
                elevation: level.elevation,
                presentation_offset: 0.0,
                nodes,
            });
        }

        graph.set_exploded(self.options.exploded);
        tracing::info!(
            "rendered {} floors, {} nodes, {} warnings",
            graph.floors.len(),
            graph.nodes().count(),
            graph.warnings.len()
        );
        Ok(graph)
    }
}

/// One-shot render with a fresh builder
pub fn render(plan: &Floorplan, options: BuildOptions) -> RenderResult<SceneGraph> {
    SceneBuilder::new(options).build(plan)
}

fn node(kind: NodeKind, name: &str, source: Provenance, mesh: MeshData) -> SceneNode {
    SceneNode {
        name: format!("{}:{}", kind.as_str(), name),
        kind,
        source,
        mesh,
    }
}

/// (floor index, element name) -> highest floor index it reaches
fn vertical_links(plan: &Floorplan) -> RenderResult<HashMap<(usize, String), usize>> {
    let mut links: HashMap<(usize, String), usize> = HashMap::new();
    let floor_index = |name: &str| {
        plan.floor_index(name).ok_or_else(|| {
            RenderError::UnresolvedReference(format!("floor '{}' in vertical connection", name))
        })
    };

    for vc in &plan.vertical_connections {
        let from = floor_index(&vc.from_floor)?;
        let to = floor_index(&vc.to_floor)?;
        let floor = &plan.floors[from];
        let known = floor.stairs.iter().any(|s| s.name == vc.element)
            || floor.lifts.iter().any(|l| l.name == vc.element);
        if !known {
            return Err(RenderError::UnresolvedReference(format!(
                "stair or lift '{}' on floor '{}'",
                vc.element, vc.from_floor
            )));
        }
        if to <= from {
            return Err(RenderError::InvalidGeometry(format!(
                "'{}' must lead from '{}' to a higher floor, not '{}'",
                vc.element, vc.from_floor, vc.to_floor
            )));
        }
        let top = links.entry((from, vc.element.clone())).or_insert(to);
        *top = (*top).max(to);
    }
    Ok(links)
}
