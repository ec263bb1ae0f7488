//! Factory functions for creating test data.
//!
//! Provides convenient helpers to construct `Room`, `Floor`, `Stair`,
//! `Floorplan` and other input types used by unit and integration tests.

use shared::*;

// ── Room factories ──────────────────────────────────────────────

/// Room with position and size in meters and undeclared (solid) walls.
pub fn room(name: &str, x: f64, y: f64, width: f64, depth: f64) -> Room {
    Room {
        name: name.to_string(),
        label: None,
        position: Point::meters(x, y),
        size: Size::meters(width, depth),
        walls: Walls::default(),
        height: None,
        material: None,
        sub_rooms: vec![],
    }
}

/// Room measured in feet.
pub fn room_ft(name: &str, x: f64, y: f64, width: f64, depth: f64) -> Room {
    let ft = |v| Length::new(v, Unit::Feet);
    Room {
        position: Point { x: ft(x), y: ft(y) },
        size: Size {
            width: ft(width),
            depth: ft(depth),
        },
        ..room(name, 0.0, 0.0, 0.0, 0.0)
    }
}

/// Room with one declared wall.
pub fn room_with_wall(
    name: &str,
    x: f64,
    y: f64,
    width: f64,
    depth: f64,
    dir: WallDirection,
    spec: WallSpec,
) -> Room {
    let mut r = room(name, x, y, width, depth);
    *r.walls.get_mut(dir) = Some(spec);
    r
}

// ── Connection factories ────────────────────────────────────────

/// Single door at 50% with default size and swing.
pub fn door(from_room: &str, from_wall: WallDirection, to_room: &str, to_wall: WallDirection) -> Connection {
    Connection {
        from: WallRef::new(from_room, from_wall),
        to: WallRef::new(to_room, to_wall),
        kind: ConnectionKind::Door,
        position: 50.0,
        width: None,
        height: None,
        swing: None,
        opens_into: None,
    }
}

/// Connection of any kind with an explicit size.
pub fn sized_connection(
    kind: ConnectionKind,
    from: WallRef,
    to: WallRef,
    width: f64,
    height: OpeningHeight,
) -> Connection {
    Connection {
        kind,
        width: Some(Length::meters(width)),
        height: Some(height),
        ..door(&from.room, from.wall, &to.room, to.wall)
    }
}

// ── Floor / plan factories ──────────────────────────────────────

/// Floor with rooms only.
pub fn floor(name: &str, rooms: Vec<Room>) -> Floor {
    Floor {
        name: name.to_string(),
        height: None,
        rooms,
        connections: vec![],
        stairs: vec![],
        lifts: vec![],
    }
}

/// Two 4x4 m rooms side by side, `a.right -> b.left` door at 50%.
pub fn two_rooms_with_door() -> Floor {
    let mut f = floor(
        "ground",
        vec![room("a", 0.0, 0.0, 4.0, 4.0), room("b", 4.0, 0.0, 4.0, 4.0)],
    );
    f.connections
        .push(door("a", WallDirection::Right, "b", WallDirection::Left));
    f
}

/// Plan with default config and no vertical connections.
pub fn plan(floors: Vec<Floor>) -> Floorplan {
    Floorplan {
        floors,
        config: Config::default(),
        vertical_connections: vec![],
    }
}

// ── Vertical circulation ────────────────────────────────────────

/// Stair at (1.0, 0.5) heading +Y with every dimension defaulted.
pub fn stair(name: &str, shape: StairShape) -> Stair {
    Stair {
        name: name.to_string(),
        position: Point::meters(1.0, 0.5),
        rotation: 0.0,
        shape,
        rise: None,
        width: None,
        max_riser: None,
        tread_depth: None,
        headroom: None,
        stringer: StringerStyle::default(),
        handrail: HandrailSides::default(),
    }
}

/// Flight segment for custom stairs.
pub fn flight(steps: u32) -> StairSegment {
    StairSegment::Flight {
        steps,
        width: None,
        align: None,
    }
}

/// 90-degree landing turn.
pub fn landing(direction: TurnDirection) -> StairSegment {
    StairSegment::Turn {
        direction,
        angle: TurnAngle::Quarter,
        style: TurnStyle::Landing,
    }
}

/// Lift with position and size in meters.
pub fn lift(name: &str, x: f64, y: f64, width: f64, depth: f64, doors: Vec<WallDirection>) -> Lift {
    Lift {
        name: name.to_string(),
        position: Point::meters(x, y),
        size: Size::meters(width, depth),
        doors,
    }
}

pub fn vertical(element: &str, from_floor: &str, to_floor: &str) -> VerticalConnection {
    VerticalConnection {
        element: element.to_string(),
        from_floor: from_floor.to_string(),
        to_floor: to_floor.to_string(),
    }
}
