//! Connection matching: every declared opening lands on exactly one wall
//! segment, and every segment carries at most one opening.

use std::collections::BTreeMap;

use shared::{ConnectionKind, Floor, OpeningHeight, Swing, WallDirection, WallKind};

use super::layout::PlacedRoom;
use super::ownership::{Axis, WallSegment, TOLERANCE};
use crate::error::{RenderError, RenderResult, Warning};
use crate::units::m;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpeningKind {
    Door,
    DoubleDoor,
    Opening,
    Window,
}

impl From<ConnectionKind> for OpeningKind {
    fn from(kind: ConnectionKind) -> Self {
        match kind {
            ConnectionKind::Door => OpeningKind::Door,
            ConnectionKind::DoubleDoor => OpeningKind::DoubleDoor,
            ConnectionKind::Opening => OpeningKind::Opening,
        }
    }
}

/// A declared opening resolved to plan coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct OpeningRequest {
    /// Human-readable origin, used in warnings and node names
    pub label: String,
    pub kind: OpeningKind,
    pub room: String,
    pub wall: WallDirection,
    /// Absolute coordinate of the opening center along the wall
    pub center: f64,
    pub width: Option<f64>,
    pub height: Option<OpeningHeight>,
    pub swing: Swing,
    pub opens_into: String,
}

/// Segment id -> the single opening applied to it
pub type Matches = BTreeMap<String, OpeningRequest>;

fn find_room<'a>(rooms: &'a [PlacedRoom], name: &str, floor: &str) -> RenderResult<&'a PlacedRoom> {
    rooms.iter().find(|r| r.name == name).ok_or_else(|| {
        RenderError::UnresolvedReference(format!("room '{}' on floor '{}'", name, floor))
    })
}

/// Absolute position of a percent mark along a room's full edge
fn mark(room: &PlacedRoom, wall: WallDirection, percent: f64) -> f64 {
    let (_, start, end) = room.edge(wall);
    start + percent.clamp(0.0, 100.0) / 100.0 * (end - start)
}

fn locate<'a>(
    segments: &'a [WallSegment],
    room: &PlacedRoom,
    wall: WallDirection,
    center: f64,
) -> RenderResult<&'a WallSegment> {
    let (line, _, _) = room.edge(wall);
    let axis = Axis::of(wall);
    segments
        .iter()
        .find(|s| s.axis == axis && (s.line - line).abs() < TOLERANCE && s.contains(center))
        .ok_or_else(|| {
            RenderError::InvalidGeometry(format!(
                "no wall segment under {}.{} at {:.3}",
                room.name,
                wall.as_str(),
                center
            ))
        })
}

/// Collect wall-spec openings (room order, then top/bottom/left/right)
/// followed by the floor's connections in list order.
fn requests(floor: &Floor, rooms: &[PlacedRoom]) -> RenderResult<Vec<OpeningRequest>> {
    let mut out = Vec::new();

    for room in rooms {
        for wall in WallDirection::ALL {
            let Some(spec) = room.walls.get(wall) else {
                continue;
            };
            let kind = match spec.kind {
                WallKind::Door => OpeningKind::Door,
                WallKind::Window => OpeningKind::Window,
                WallKind::Solid | WallKind::Open => continue,
            };
            out.push(OpeningRequest {
                label: format!("{}.{}", room.name, wall.as_str()),
                kind,
                room: room.name.clone(),
                wall,
                center: mark(room, wall, spec.position.unwrap_or(50.0)),
                width: spec.width.as_ref().map(m),
                height: spec.height.clone(),
                swing: Swing::default(),
                opens_into: room.name.clone(),
            });
        }
    }

    for c in &floor.connections {
        let from = find_room(rooms, &c.from.room, &floor.name)?;
        let to = find_room(rooms, &c.to.room, &floor.name)?;
        let center = mark(from, c.from.wall, c.position);
        let (from_line, _, _) = from.edge(c.from.wall);
        let (to_line, to_start, to_end) = to.edge(c.to.wall);
        let touches = Axis::of(c.from.wall) == Axis::of(c.to.wall)
            && (from_line - to_line).abs() < TOLERANCE
            && center >= to_start - TOLERANCE
            && center <= to_end + TOLERANCE;
        if !touches {
            return Err(RenderError::InvalidGeometry(format!(
                "connection {}.{} -> {}.{} at {:.3}: the walls do not meet there",
                c.from.room,
                c.from.wall.as_str(),
                c.to.room,
                c.to.wall.as_str(),
                center
            )));
        }
        let opens_into = match &c.opens_into {
            Some(name) => find_room(rooms, name, &floor.name)?.name.clone(),
            None => from.name.clone(),
        };
        out.push(OpeningRequest {
            label: format!(
                "{}.{}->{}.{}",
                c.from.room,
                c.from.wall.as_str(),
                c.to.room,
                c.to.wall.as_str()
            ),
            kind: c.kind.into(),
            room: from.name.clone(),
            wall: c.from.wall,
            center,
            width: c.width.as_ref().map(m),
            height: c.height.clone(),
            swing: c.swing.unwrap_or_default(),
            opens_into,
        });
    }

    Ok(out)
}

/// Assign openings to segments; first declaration wins, later ones that hit
/// an already matched segment become `DuplicateConnection` warnings.
pub fn match_connections(
    floor: &Floor,
    rooms: &[PlacedRoom],
    segments: &[WallSegment],
) -> RenderResult<(Matches, Vec<Warning>)> {
    let mut matches = Matches::new();
    let mut warnings = Vec::new();

    for request in requests(floor, rooms)? {
        let room = find_room(rooms, &request.room, &floor.name)?;
        let segment = locate(segments, room, request.wall, request.center)?;

        if matches.contains_key(&segment.id) {
            let w = Warning::DuplicateConnection {
                floor: floor.name.clone(),
                segment: segment.id.clone(),
                dropped: request.label.clone(),
            };
            tracing::warn!("{}", w);
            warnings.push(w);
            continue;
        }

        tracing::debug!(
            "opening {} ({:?}) -> segment {}{}",
            request.label,
            request.kind,
            segment.id,
            if segment.open { " (open, no geometry)" } else { "" }
        );
        matches.insert(segment.id.clone(), request);
    }

    Ok((matches, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::layout::place_rooms;
    use crate::build::ownership::resolve_walls;
    use crate::fixtures::*;
    use shared::{Config, WallSpec};

    fn run(f: &Floor) -> RenderResult<(Matches, Vec<Warning>, Vec<WallSegment>)> {
        let rooms = place_rooms(f, 3.0);
        let (segments, _) = resolve_walls(&f.name, &rooms, &Config::default());
        let (matches, warnings) = match_connections(f, &rooms, &segments)?;
        Ok((matches, warnings, segments))
    }

    #[test]
    fn test_door_matches_shared_segment() {
        let f = two_rooms_with_door();
        let (matches, warnings, _) = run(&f).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(matches.len(), 1);
        let (id, req) = matches.iter().next().unwrap();
        assert_eq!(id, "a.right.0");
        assert_eq!(req.center, 2.0);
        assert_eq!(req.kind, OpeningKind::Door);
    }

    #[test]
    fn test_bidirectional_pair_is_deduplicated() {
        let mut f = two_rooms_with_door();
        f.connections.push(door("b", WallDirection::Left, "a", WallDirection::Right));
        let (matches, warnings, _) = run(&f).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            Warning::DuplicateConnection { dropped, .. } if dropped == "b.left->a.right"
        ));
        // the first declaration is the one kept
        assert_eq!(matches["a.right.0"].room, "a");
    }

    #[test]
    fn test_wall_spec_opening_precedes_connections() {
        let mut f = two_rooms_with_door();
        f.rooms[1].walls.left = Some(WallSpec {
            kind: WallKind::Door,
            position: Some(25.0),
            ..Default::default()
        });
        let (matches, warnings, segments) = run(&f).unwrap();
        // the declared door wall moves ownership of the shared wall to b
        let shared = segments
            .iter()
            .find(|s| s.axis == Axis::Y && s.line == 4.0)
            .unwrap();
        assert_eq!(shared.id, "b.left.0");
        assert_eq!(shared.owner, "b");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[&shared.id].label, "b.left");
        assert_eq!(matches[&shared.id].center, 1.0);
        assert!(matches!(
            &warnings[..],
            [Warning::DuplicateConnection { dropped, .. }] if dropped == "a.right->b.left"
        ));
    }

    #[test]
    fn test_connection_between_distant_rooms_rejected() {
        let mut f = two_rooms_with_door();
        f.rooms.push(room("c", 20.0, 0.0, 4.0, 4.0));
        f.connections[0] = door("a", WallDirection::Top, "c", WallDirection::Left);
        assert!(matches!(run(&f), Err(RenderError::InvalidGeometry(msg)) if msg.contains("a.top -> c.left")));
    }

    #[test]
    fn test_connection_mark_outside_neighbour_rejected() {
        // b only spans the lower half of a.right
        let mut f = floor(
            "g",
            vec![room("a", 0.0, 0.0, 4.0, 6.0), room("b", 4.0, 3.0, 4.0, 3.0)],
        );
        f.connections.push(door("a", WallDirection::Right, "b", WallDirection::Left));
        f.connections[0].position = 25.0;
        assert!(matches!(run(&f), Err(RenderError::InvalidGeometry(_))));
        f.connections[0].position = 75.0;
        let (matches, _, _) = run(&f).unwrap();
        assert_eq!(matches.values().next().unwrap().center, 4.5);
    }

    #[test]
    fn test_unknown_room_is_unresolved() {
        let mut f = two_rooms_with_door();
        f.connections[0].to.room = "attic".into();
        let err = run(&f).unwrap_err();
        assert!(matches!(err, RenderError::UnresolvedReference(msg) if msg.contains("attic")));
    }

    #[test]
    fn test_unknown_opens_into_is_unresolved() {
        let mut f = two_rooms_with_door();
        f.connections[0].opens_into = Some("garage".into());
        assert!(matches!(run(&f), Err(RenderError::UnresolvedReference(_))));
    }

    #[test]
    fn test_open_wall_keeps_match() {
        let mut f = two_rooms_with_door();
        f.rooms[0].walls.right = Some(WallSpec::of_kind(WallKind::Open));
        let (matches, _, segments) = run(&f).unwrap();
        let seg = segments.iter().find(|s| s.id == "a.right.0").unwrap();
        assert!(seg.open);
        assert!(matches.contains_key("a.right.0"));
    }

    #[test]
    fn test_matching_is_deterministic() {
        let mut f = two_rooms_with_door();
        f.rooms[0].walls.top = Some(WallSpec::of_kind(WallKind::Window));
        let (first, _, _) = run(&f).unwrap();
        let (second, _, _) = run(&f).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_percent_measured_along_declaring_edge() {
        // b is offset down by 1m, so 50% of b.left is y=3
        let mut f = floor(
            "g",
            vec![room("a", 0.0, 0.0, 4.0, 6.0), room("b", 4.0, 1.0, 4.0, 4.0)],
        );
        f.connections.push(door("b", WallDirection::Left, "a", WallDirection::Right));
        let (matches, _, _) = run(&f).unwrap();
        let req = matches.values().next().unwrap();
        assert_eq!(req.center, 3.0);
    }
}
