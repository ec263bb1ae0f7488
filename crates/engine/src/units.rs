//! Unit normalization: every `Length` in a floorplan converted to meters.
//!
//! Normalization is pure and idempotent. Percentages, angles and step counts
//! are not lengths and pass through untouched.

use shared::*;

use crate::error::{RenderError, RenderResult};

/// Convert all lengths of a value to meters.
pub trait Normalize: Sized {
    fn normalize(&self) -> RenderResult<Self>;
}

/// Normalize a whole floorplan (entry point used by the scene builder)
pub fn normalize(plan: &Floorplan) -> RenderResult<Floorplan> {
    plan.normalize()
}

impl Normalize for Length {
    fn normalize(&self) -> RenderResult<Self> {
        self.to_meters()
            .map(Length::meters)
            .ok_or_else(|| RenderError::InvalidUnit(self.unit.clone()))
    }
}

impl<T: Normalize> Normalize for Option<T> {
    fn normalize(&self) -> RenderResult<Self> {
        self.as_ref().map(T::normalize).transpose()
    }
}

impl<T: Normalize> Normalize for Vec<T> {
    fn normalize(&self) -> RenderResult<Self> {
        self.iter().map(T::normalize).collect()
    }
}

impl Normalize for Point {
    fn normalize(&self) -> RenderResult<Self> {
        Ok(Point {
            x: self.x.normalize()?,
            y: self.y.normalize()?,
        })
    }
}

impl Normalize for Size {
    fn normalize(&self) -> RenderResult<Self> {
        Ok(Size {
            width: self.width.normalize()?,
            depth: self.depth.normalize()?,
        })
    }
}

impl Normalize for OpeningHeight {
    fn normalize(&self) -> RenderResult<Self> {
        Ok(match self {
            OpeningHeight::Full => OpeningHeight::Full,
            OpeningHeight::Exact(len) => OpeningHeight::Exact(len.normalize()?),
        })
    }
}

impl Normalize for WallSpec {
    fn normalize(&self) -> RenderResult<Self> {
        Ok(WallSpec {
            width: self.width.normalize()?,
            height: self.height.normalize()?,
            thickness: self.thickness.normalize()?,
            ..self.clone()
        })
    }
}

impl Normalize for Walls {
    fn normalize(&self) -> RenderResult<Self> {
        Ok(Walls {
            top: self.top.normalize()?,
            bottom: self.bottom.normalize()?,
            left: self.left.normalize()?,
            right: self.right.normalize()?,
        })
    }
}

impl Normalize for Room {
    fn normalize(&self) -> RenderResult<Self> {
        Ok(Room {
            name: self.name.clone(),
            label: self.label.clone(),
            position: self.position.normalize()?,
            size: self.size.normalize()?,
            walls: self.walls.normalize()?,
            height: self.height.normalize()?,
            material: self.material.clone(),
            sub_rooms: self.sub_rooms.normalize()?,
        })
    }
}

impl Normalize for Connection {
    fn normalize(&self) -> RenderResult<Self> {
        Ok(Connection {
            width: self.width.normalize()?,
            height: self.height.normalize()?,
            ..self.clone()
        })
    }
}

impl Normalize for StairSegment {
    fn normalize(&self) -> RenderResult<Self> {
        Ok(match self {
            StairSegment::Flight {
                steps,
                width,
                align,
            } => StairSegment::Flight {
                steps: *steps,
                width: width.normalize()?,
                align: align.clone(),
            },
            turn @ StairSegment::Turn { .. } => turn.clone(),
        })
    }
}

impl Normalize for StairShape {
    fn normalize(&self) -> RenderResult<Self> {
        Ok(match self {
            StairShape::Custom { segments } => StairShape::Custom {
                segments: segments.normalize()?,
            },
            preset => preset.clone(),
        })
    }
}

impl Normalize for Stair {
    fn normalize(&self) -> RenderResult<Self> {
        Ok(Stair {
            name: self.name.clone(),
            position: self.position.normalize()?,
            rotation: self.rotation,
            shape: self.shape.normalize()?,
            rise: self.rise.normalize()?,
            width: self.width.normalize()?,
            max_riser: self.max_riser.normalize()?,
            tread_depth: self.tread_depth.normalize()?,
            headroom: self.headroom.normalize()?,
            stringer: self.stringer,
            handrail: self.handrail,
        })
    }
}

impl Normalize for Lift {
    fn normalize(&self) -> RenderResult<Self> {
        Ok(Lift {
            name: self.name.clone(),
            position: self.position.normalize()?,
            size: self.size.normalize()?,
            doors: self.doors.clone(),
        })
    }
}

impl Normalize for Floor {
    fn normalize(&self) -> RenderResult<Self> {
        Ok(Floor {
            name: self.name.clone(),
            height: self.height.normalize()?,
            rooms: self.rooms.normalize()?,
            connections: self.connections.normalize()?,
            stairs: self.stairs.normalize()?,
            lifts: self.lifts.normalize()?,
        })
    }
}

impl Normalize for Config {
    fn normalize(&self) -> RenderResult<Self> {
        Ok(Config {
            wall_thickness: self.wall_thickness.normalize()?,
            slab_thickness: self.slab_thickness.normalize()?,
            wall_height: self.wall_height.normalize()?,
            door_width: self.door_width.normalize()?,
            door_height: self.door_height.normalize()?,
            double_door_width: self.double_door_width.normalize()?,
            window_width: self.window_width.normalize()?,
            window_height: self.window_height.normalize()?,
            window_sill: self.window_sill.normalize()?,
            stair_width: self.stair_width.normalize()?,
            max_riser: self.max_riser.normalize()?,
            tread_depth: self.tread_depth.normalize()?,
            handrail_height: self.handrail_height.normalize()?,
            ..self.clone()
        })
    }
}

impl Normalize for Floorplan {
    fn normalize(&self) -> RenderResult<Self> {
        Ok(Floorplan {
            floors: self.floors.normalize()?,
            config: self.config.normalize()?,
            vertical_connections: self.vertical_connections.clone(),
        })
    }
}

/// Value in meters of an already normalized length
pub(crate) fn m(len: &Length) -> f64 {
    len.to_meters().unwrap_or(len.value)
}
