//! Floor layout: nested rooms flattened to absolute rectangles, floor heights
//! and elevations.

use kurbo::Rect;
use shared::{Config, Floor, Floorplan, Room, WallDirection, Walls};

use crate::units::m;

/// A room (or sub-room) placed in absolute plan coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRoom {
    pub name: String,
    /// "parent/child" chain used as a deterministic tie-break key
    pub path: String,
    pub depth: usize,
    /// Plan rectangle in meters (x0/x1 along plan X, y0/y1 along plan Y)
    pub rect: Rect,
    pub height: f64,
    pub material: Option<String>,
    pub walls: Walls,
    /// Name of the top-level room this one belongs to
    pub root: String,
}

impl PlacedRoom {
    /// Coordinate of the wall line and the (start, end) range along it
    pub fn edge(&self, dir: WallDirection) -> (f64, f64, f64) {
        let r = &self.rect;
        match dir {
            WallDirection::Top => (r.y0, r.x0, r.x1),
            WallDirection::Bottom => (r.y1, r.x0, r.x1),
            WallDirection::Left => (r.x0, r.y0, r.y1),
            WallDirection::Right => (r.x1, r.y0, r.y1),
        }
    }
}

/// Vertical placement of one floor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorLevel {
    pub index: usize,
    /// Bottom of the floor slab
    pub elevation: f64,
    pub height: f64,
    pub slab: f64,
}

impl FloorLevel {
    /// Top of the slab, where walls, stairs and lifts start
    pub fn base(&self) -> f64 {
        self.elevation + self.slab
    }
}

/// Tallest explicit room height, searching sub-rooms too
fn tallest_room(rooms: &[Room]) -> Option<f64> {
    rooms
        .iter()
        .flat_map(|r| {
            let own = r.height.as_ref().map(m);
            own.into_iter().chain(tallest_room(&r.sub_rooms))
        })
        .reduce(f64::max)
}

/// Explicit floor height, else tallest room, else the configured wall height
pub fn floor_height(floor: &Floor, config: &Config) -> f64 {
    floor
        .height
        .as_ref()
        .map(m)
        .or_else(|| tallest_room(&floor.rooms))
        .unwrap_or_else(|| m(&config.wall_height))
}

/// `elevation(i) = sum over j < i of (slab + height(j))`
pub fn floor_levels(plan: &Floorplan) -> Vec<FloorLevel> {
    let slab = m(&plan.config.slab_thickness);
    let mut elevation = 0.0;
    plan.floors
        .iter()
        .enumerate()
        .map(|(index, floor)| {
            let height = floor_height(floor, &plan.config);
            let level = FloorLevel {
                index,
                elevation,
                height,
                slab,
            };
            elevation += slab + height;
            level
        })
        .collect()
}

/// Flatten a floor's room tree in declaration order (parents before children)
pub fn place_rooms(floor: &Floor, floor_height: f64) -> Vec<PlacedRoom> {
    let mut out = Vec::new();
    for room in &floor.rooms {
        place(room, 0.0, 0.0, "", 0, &room.name, floor_height, &mut out);
    }
    out
}

#[allow(clippy::too_many_arguments)]
fn place(
    room: &Room,
    ox: f64,
    oy: f64,
    parent_path: &str,
    depth: usize,
    root: &str,
    inherited_height: f64,
    out: &mut Vec<PlacedRoom>,
) {
    let x0 = ox + m(&room.position.x);
    let y0 = oy + m(&room.position.y);
    let rect = Rect::new(
        x0,
        y0,
        x0 + m(&room.size.width),
        y0 + m(&room.size.depth),
    );
    let path = if parent_path.is_empty() {
        room.name.clone()
    } else {
        format!("{}/{}", parent_path, room.name)
    };
    let height = room.height.as_ref().map(m).unwrap_or(inherited_height);

    out.push(PlacedRoom {
        name: room.name.clone(),
        path: path.clone(),
        depth,
        rect,
        height,
        material: room.material.clone(),
        walls: room.walls.clone(),
        root: root.to_string(),
    });
    for sub in &room.sub_rooms {
        place(sub, x0, y0, &path, depth + 1, root, height, out);
    }
}
