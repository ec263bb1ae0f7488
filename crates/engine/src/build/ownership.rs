//! Wall ownership: room edges lying on the same line are split into
//! elementary intervals, each resolved to one owner with per-side materials.

use std::cmp::Reverse;

use shared::{Config, WallDirection, WallKind, WallSpec};

use super::layout::PlacedRoom;
use crate::error::Warning;
use crate::units::m;

/// Line tolerance in meters
pub const TOLERANCE: f64 = 1e-6;

/// Plan axis a wall runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// Along plan X (top/bottom walls), thickness along plan Y
    X,
    /// Along plan Y (left/right walls), thickness along plan X
    Y,
}

impl Axis {
    pub fn of(dir: WallDirection) -> Axis {
        match dir {
            WallDirection::Top | WallDirection::Bottom => Axis::X,
            WallDirection::Left | WallDirection::Right => Axis::Y,
        }
    }
}

/// Whether the room's interior lies on the higher-coordinate side of its edge
pub(crate) fn interior_positive(dir: WallDirection) -> bool {
    matches!(dir, WallDirection::Top | WallDirection::Left)
}

/// One resolved physical wall volume (or an open stretch with no volume)
#[derive(Debug, Clone, PartialEq)]
pub struct WallSegment {
    pub id: String,
    pub axis: Axis,
    /// Coordinate of the wall center line across `axis`
    pub line: f64,
    pub start: f64,
    pub end: f64,
    pub thickness: f64,
    pub height: f64,
    pub open: bool,
    pub owner: String,
    pub owner_dir: WallDirection,
    /// Material of the face looking toward the lower coordinate
    pub neg_material: String,
    /// Material of the face looking toward the higher coordinate
    pub pos_material: String,
    /// Material of the four edge faces (owner's material)
    pub edge_material: String,
    pub neg_room: Option<String>,
    pub pos_room: Option<String>,
    /// Extend by half the thickness past `start`/`end` to close corners
    pub extend_start: bool,
    pub extend_end: bool,
}

impl WallSegment {
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, coord: f64) -> bool {
        coord >= self.start - TOLERANCE && coord <= self.end + TOLERANCE
    }

    /// Rooms on either side, for provenance
    pub fn rooms(&self) -> Vec<String> {
        self.neg_room
            .iter()
            .chain(self.pos_room.iter())
            .cloned()
            .collect()
    }
}

struct Edge<'a> {
    room: &'a PlacedRoom,
    dir: WallDirection,
    axis: Axis,
    line: f64,
    start: f64,
    end: f64,
    spec: Option<&'a WallSpec>,
}

impl Edge<'_> {
    fn owner_key(&self) -> (bool, usize, &str, WallDirection) {
        (
            interior_positive(self.dir),
            self.room.depth,
            self.room.path.as_str(),
            self.dir,
        )
    }

    fn material(&self, config: &Config) -> String {
        self.spec
            .and_then(|s| s.material.clone())
            .or_else(|| self.room.material.clone())
            .unwrap_or_else(|| config.interior_material.clone())
    }
}

#[derive(Debug, Clone)]
struct Resolution {
    owner: String,
    owner_path: String,
    owner_dir: WallDirection,
    open: bool,
    thickness: f64,
    conflict: Vec<f64>,
    height: f64,
    neg_material: String,
    pos_material: String,
    edge_material: String,
    neg_room: Option<String>,
    pos_room: Option<String>,
}

impl Resolution {
    /// Same volume and faces; the rooms behind each face may differ
    fn same_volume(&self, other: &Resolution) -> bool {
        self.owner_path == other.owner_path
            && self.owner_dir == other.owner_dir
            && self.open == other.open
            && self.thickness == other.thickness
            && self.conflict == other.conflict
            && self.height == other.height
            && self.neg_material == other.neg_material
            && self.pos_material == other.pos_material
            && self.edge_material == other.edge_material
    }
}

/// Room seen from one side of an interval
struct SideRoom<'a> {
    depth: usize,
    path: &'a str,
    name: &'a str,
    material: String,
}

/// Rooms whose interior surrounds the interval `along` of a wall line,
/// without an edge of their own on it (a parent around a partition)
fn enclosing<'a>(
    rooms: &'a [PlacedRoom],
    axis: Axis,
    line: f64,
    along: (f64, f64),
) -> impl Iterator<Item = &'a PlacedRoom> + 'a {
    rooms.iter().filter(move |r| {
        let rect = &r.rect;
        let (across, span) = match axis {
            Axis::X => ((rect.y0, rect.y1), (rect.x0, rect.x1)),
            Axis::Y => ((rect.x0, rect.x1), (rect.y0, rect.y1)),
        };
        across.0 < line - TOLERANCE
            && across.1 > line + TOLERANCE
            && span.0 <= along.0 + TOLERANCE
            && span.1 >= along.1 - TOLERANCE
    })
}

fn resolve_interval(
    candidates: &[&Edge<'_>],
    surrounding: &[&PlacedRoom],
    config: &Config,
) -> Resolution {
    let declared_solid: Vec<&Edge<'_>> = candidates
        .iter()
        .copied()
        .filter(|e| matches!(e.spec, Some(s) if s.kind != WallKind::Open))
        .collect();
    let declared_open: Vec<&Edge<'_>> = candidates
        .iter()
        .copied()
        .filter(|e| matches!(e.spec, Some(s) if s.kind == WallKind::Open))
        .collect();

    let (pool, open) = if !declared_solid.is_empty() {
        (declared_solid, false)
    } else if !declared_open.is_empty() {
        (declared_open, true)
    } else {
        (candidates.to_vec(), false)
    };

    // pool is never empty: every interval has at least one covering edge
    let owner = pool
        .iter()
        .min_by(|a, b| a.owner_key().cmp(&b.owner_key()))
        .copied()
        .unwrap_or(candidates[0]);

    // deepest room on each side: an edge on the line, or a room around it
    let side = |positive: bool| {
        let edges = candidates
            .iter()
            .filter(|e| interior_positive(e.dir) == positive)
            .map(|e| SideRoom {
                depth: e.room.depth,
                path: &e.room.path,
                name: &e.room.name,
                material: e.material(config),
            });
        let around = surrounding.iter().map(|r| SideRoom {
            depth: r.depth,
            path: &r.path,
            name: &r.name,
            material: r
                .material
                .clone()
                .unwrap_or_else(|| config.interior_material.clone()),
        });
        edges
            .chain(around)
            .min_by(|a, b| (Reverse(a.depth), a.path).cmp(&(Reverse(b.depth), b.path)))
    };
    let neg = side(false);
    let pos = side(true);

    let mut thicknesses: Vec<f64> = candidates
        .iter()
        .filter_map(|e| e.spec.and_then(|s| s.thickness.as_ref()).map(m))
        .collect();
    thicknesses.sort_by(f64::total_cmp);
    thicknesses.dedup_by(|a, b| (*a - *b).abs() < TOLERANCE);
    let thickness = thicknesses
        .last()
        .copied()
        .unwrap_or_else(|| m(&config.wall_thickness));
    let conflict = if thicknesses.len() > 1 {
        thicknesses
    } else {
        Vec::new()
    };

    let height = candidates
        .iter()
        .map(|e| e.room.height)
        .fold(0.0, f64::max);

    let side_material = |s: &Option<SideRoom<'_>>| {
        s.as_ref()
            .map(|s| s.material.clone())
            .unwrap_or_else(|| config.exterior_material.clone())
    };

    Resolution {
        owner: owner.room.name.clone(),
        owner_path: owner.room.path.clone(),
        owner_dir: owner.dir,
        open,
        thickness,
        conflict,
        height,
        neg_material: side_material(&neg),
        pos_material: side_material(&pos),
        edge_material: owner.material(config),
        neg_room: neg.map(|s| s.name.to_string()),
        pos_room: pos.map(|s| s.name.to_string()),
    }
}

/// Resolve every wall of a floor into owned segments.
///
/// The result is sorted by (axis, line, start) and does not depend on the
/// order rooms were declared in.
pub fn resolve_walls(
    floor: &str,
    rooms: &[PlacedRoom],
    config: &Config,
) -> (Vec<WallSegment>, Vec<Warning>) {
    let mut edges: Vec<Edge<'_>> = Vec::new();
    for room in rooms {
        for dir in WallDirection::ALL {
            let (line, start, end) = room.edge(dir);
            if end - start <= TOLERANCE {
                continue;
            }
            edges.push(Edge {
                room,
                dir,
                axis: Axis::of(dir),
                line,
                start,
                end,
                spec: room.walls.get(dir),
            });
        }
    }
    edges.sort_by(|a, b| a.axis.cmp(&b.axis).then(a.line.total_cmp(&b.line)));

    // cluster edges sharing a wall line
    let mut lines: Vec<Vec<&Edge<'_>>> = Vec::new();
    for edge in &edges {
        match lines.last_mut() {
            Some(group)
                if group[0].axis == edge.axis && (edge.line - group[0].line).abs() < TOLERANCE =>
            {
                group.push(edge)
            }
            _ => lines.push(vec![edge]),
        }
    }

    let mut segments: Vec<WallSegment> = Vec::new();
    let mut warnings = Vec::new();

    for group in &lines {
        let axis = group[0].axis;
        let line = group[0].line;

        let mut cuts: Vec<f64> = group.iter().flat_map(|e| [e.start, e.end]).collect();
        cuts.sort_by(f64::total_cmp);
        cuts.dedup_by(|a, b| (*a - *b).abs() < TOLERANCE);

        let mut merged: Vec<(f64, f64, Resolution)> = Vec::new();
        for pair in cuts.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let candidates: Vec<&Edge<'_>> = group
                .iter()
                .copied()
                .filter(|e| e.start <= a + TOLERANCE && e.end >= b - TOLERANCE)
                .collect();
            if candidates.is_empty() {
                continue;
            }
            let surrounding: Vec<&PlacedRoom> = enclosing(rooms, axis, line, (a, b)).collect();
            let res = resolve_interval(&candidates, &surrounding, config);
            match merged.last_mut() {
                Some((_, end, prev)) if (*end - a).abs() < TOLERANCE && prev.same_volume(&res) => *end = b,
                _ => merged.push((a, b, res)),
            }
        }

        let solid_spans: Vec<(f64, f64)> = merged
            .iter()
            .filter(|(_, _, r)| !r.open)
            .map(|(a, b, _)| (*a, *b))
            .collect();

        for (start, end, res) in merged {
            let ordinal = segments
                .iter()
                .filter(|s| s.owner == res.owner && s.owner_dir == res.owner_dir)
                .count();
            let id = format!("{}.{}.{}", res.owner_path, res.owner_dir.as_str(), ordinal);

            let continues = |at: f64| {
                solid_spans.iter().any(|(a, b)| {
                    ((*b - at).abs() < TOLERANCE && *a < start) || ((*a - at).abs() < TOLERANCE && *b > end)
                })
            };
            let corner = axis == Axis::X && !res.open;

            if !res.conflict.is_empty() {
                let w = Warning::WallConflict {
                    floor: floor.to_string(),
                    segment: id.clone(),
                    thicknesses: res.conflict.clone(),
                    resolved: res.thickness,
                };
                tracing::warn!("{}", w);
                warnings.push(w);
            }

            tracing::debug!(
                "wall {}: {:?} line={:.3} [{:.3}, {:.3}] t={:.3} open={}",
                id,
                axis,
                line,
                start,
                end,
                res.thickness,
                res.open
            );

            segments.push(WallSegment {
                id,
                axis,
                line,
                start,
                end,
                thickness: res.thickness,
                height: res.height,
                open: res.open,
                owner: res.owner,
                owner_dir: res.owner_dir,
                neg_material: res.neg_material,
                pos_material: res.pos_material,
                edge_material: res.edge_material,
                neg_room: res.neg_room,
                pos_room: res.pos_room,
                extend_start: corner && !continues(start),
                extend_end: corner && !continues(end),
            });
        }
    }

    (segments, warnings)
}
