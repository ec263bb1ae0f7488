//! Stair geometry.
//!
//! Every preset expands to the general segmented model: an ordered list of
//! flights and turns. Construction walks that list with a cursor (plan
//! position, heading, walking-surface elevation); flights emit treads and
//! risers, turns emit a landing or a fan of winder wedges and rotate the
//! heading. Each tread, landing and winder tread accounts for one riser.

use glam::{DVec2, Vec2, Vec3};
use kurbo::Rect;
use shared::{
    Config, HandrailSides, Stair, StairSegment, StairShape, StringerStyle, TurnAngle,
    TurnDirection, TurnStyle, WallAlignment,
};

use super::layout::PlacedRoom;
use super::ownership::{interior_positive, Axis};
use crate::error::{RenderError, RenderResult};
use crate::mesh::{Material, MeshData};
use crate::units::m;

pub const TREAD_THICKNESS: f64 = 0.04;
pub const RISER_THICKNESS: f64 = 0.02;
pub const HANDRAIL_INSET: f64 = 0.05;
const HANDRAIL_HALF: f32 = 0.025;
/// Winder treads per quarter turn of a spiral preset
const SPIRAL_TREADS_PER_QUARTER: u32 = 4;
const PARALLEL_TOLERANCE: f64 = 1e-6;

/// Floor-level inputs for stair construction
pub struct StairContext<'a> {
    pub floor: &'a str,
    pub rooms: &'a [PlacedRoom],
    pub config: &'a Config,
    /// Top of the floor slab the stair starts on
    pub base: f64,
    /// Rise used when the stair declares none
    pub default_rise: f64,
    /// Clear height used when the stair declares no headroom
    pub clear_height: f64,
}

/// Resolved dimensions of one stair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StairDimensions {
    pub rise: f64,
    pub width: f64,
    pub max_riser: f64,
    pub tread_depth: f64,
    pub headroom: f64,
}

#[derive(Debug, Clone)]
pub struct StairGeometry {
    pub stair: MeshData,
    pub handrails: MeshData,
    pub dims: StairDimensions,
    pub risers: u32,
    pub riser_height: f64,
    pub treads: usize,
    pub landings: usize,
    pub winder_treads: usize,
    /// Narrowest flight width (flights may override the stair width)
    pub min_width: f64,
    /// Plan bounding rectangle of every tread, landing and winder
    pub footprint: Rect,
}

/// Number of risers needed so none exceeds `max_riser`
pub fn riser_count(rise: f64, max_riser: f64) -> u32 {
    (rise / max_riser - 1e-9).ceil().max(1.0) as u32
}

fn flight(steps: u32) -> StairSegment {
    StairSegment::Flight {
        steps,
        width: None,
        align: None,
    }
}

fn turn(direction: TurnDirection, angle: TurnAngle, style: TurnStyle) -> StairSegment {
    StairSegment::Turn {
        direction,
        angle,
        style,
    }
}

/// Expand a preset into flights and turns for `risers` risers.
/// `Custom` shapes are returned as declared.
pub fn expand_shape(shape: &StairShape, risers: u32) -> Vec<StairSegment> {
    let landing = TurnStyle::Landing;
    let segments = match shape {
        StairShape::Straight => vec![flight(risers)],
        StairShape::LShaped { turn: dir } | StairShape::UShaped { turn: dir } => {
            let angle = if matches!(shape, StairShape::LShaped { .. }) {
                TurnAngle::Quarter
            } else {
                TurnAngle::Half
            };
            let treads = risers.saturating_sub(1);
            let first = treads.div_ceil(2);
            vec![
                flight(first),
                turn(*dir, angle, landing),
                flight(treads - first),
            ]
        }
        StairShape::DoubleL { turn: dir } => {
            let treads = risers.saturating_sub(2);
            let (base, rem) = (treads / 3, treads % 3);
            vec![
                flight(base + u32::from(rem > 0)),
                turn(*dir, TurnAngle::Quarter, landing),
                flight(base + u32::from(rem > 1)),
                turn(*dir, TurnAngle::Quarter, landing),
                flight(base),
            ]
        }
        StairShape::Winder { turn: dir } => {
            let treads = risers.saturating_sub(3);
            let first = treads.div_ceil(2);
            vec![
                flight(first),
                turn(*dir, TurnAngle::Quarter, TurnStyle::Winder { treads: 3 }),
                flight(treads - first),
            ]
        }
        StairShape::Spiral { turn: dir } => {
            let full = risers / SPIRAL_TREADS_PER_QUARTER;
            let rem = risers % SPIRAL_TREADS_PER_QUARTER;
            let mut out: Vec<StairSegment> = (0..full)
                .map(|_| {
                    turn(
                        *dir,
                        TurnAngle::Quarter,
                        TurnStyle::Winder {
                            treads: SPIRAL_TREADS_PER_QUARTER,
                        },
                    )
                })
                .collect();
            if rem > 0 {
                out.push(turn(*dir, TurnAngle::Quarter, TurnStyle::Winder { treads: rem }));
            }
            out
        }
        StairShape::Custom { segments } => segments.clone(),
    };
    segments
        .into_iter()
        .filter(|s| !matches!(s, StairSegment::Flight { steps: 0, .. }))
        .collect()
}

/// Risers a segment list climbs
pub fn count_risers(segments: &[StairSegment]) -> u32 {
    segments
        .iter()
        .map(|s| match s {
            StairSegment::Flight { steps, .. } => *steps,
            StairSegment::Turn {
                style: TurnStyle::Landing,
                ..
            } => 1,
            StairSegment::Turn {
                style: TurnStyle::Winder { treads },
                ..
            } => *treads,
        })
        .sum()
}

/// Left of a plan heading
fn left(h: DVec2) -> DVec2 {
    DVec2::new(h.y, -h.x)
}

fn world(p: DVec2, y: f64) -> Vec3 {
    Vec3::new(p.x as f32, y as f32, p.y as f32)
}

fn plan(p: DVec2) -> Vec2 {
    Vec2::new(p.x as f32, p.y as f32)
}

struct Cursor {
    pos: DVec2,
    heading: DVec2,
    /// Elevation of the walking surface reached so far
    z: f64,
}

struct Builder<'a> {
    name: &'a str,
    ctx: &'a StairContext<'a>,
    stringer: StringerStyle,
    handrail: HandrailSides,
    dims: StairDimensions,
    riser: f64,
    cursor: Cursor,
    stair: MeshData,
    handrails: MeshData,
    wood: Material,
    glass: Material,
    treads: usize,
    landings: usize,
    winder_treads: usize,
    min_width: f64,
    min: DVec2,
    max: DVec2,
}

impl Builder<'_> {
    fn extend_footprint(&mut self, points: &[DVec2]) {
        for p in points {
            self.min = self.min.min(*p);
            self.max = self.max.max(*p);
        }
    }

    fn slab(&mut self, corners: &[DVec2], top: f64) {
        let footprint: Vec<Vec2> = corners.iter().map(|p| plan(*p)).collect();
        self.stair.push_prism(
            &footprint,
            (top - TREAD_THICKNESS) as f32,
            top as f32,
            &self.wood,
            &self.wood,
        );
        self.extend_footprint(corners);
    }

    /// Shift the cursor sideways so the flight's edge touches the wall's
    /// interior face
    fn align(&mut self, align: &WallAlignment, width: f64) -> RenderResult<()> {
        let room = self
            .ctx
            .rooms
            .iter()
            .find(|r| r.name == align.room)
            .ok_or_else(|| {
                RenderError::UnresolvedReference(format!(
                    "room '{}' referenced by stair '{}' on floor '{}'",
                    align.room, self.name, self.ctx.floor
                ))
            })?;
        let h = self.cursor.heading;
        let axis = Axis::of(align.wall);
        let parallel = match axis {
            Axis::X => h.y.abs() < PARALLEL_TOLERANCE,
            Axis::Y => h.x.abs() < PARALLEL_TOLERANCE,
        };
        if !parallel {
            return Err(RenderError::InvalidGeometry(format!(
                "flight of stair '{}' is not parallel to wall {}.{}",
                self.name,
                align.room,
                align.wall.as_str()
            )));
        }

        let (line, _, _) = room.edge(align.wall);
        let thickness = room
            .walls
            .get(align.wall)
            .and_then(|w| w.thickness.as_ref())
            .map(m)
            .unwrap_or_else(|| m(&self.ctx.config.wall_thickness));
        let inward = if interior_positive(align.wall) { 1.0 } else { -1.0 };
        let center = line + inward * (thickness / 2.0 + width / 2.0);
        match axis {
            Axis::X => self.cursor.pos.y = center,
            Axis::Y => self.cursor.pos.x = center,
        }
        tracing::debug!(
            "stair {}: flight aligned to {}.{} at {:.3}",
            self.name,
            align.room,
            align.wall.as_str(),
            center
        );
        Ok(())
    }

    fn flight(&mut self, steps: u32, width: f64) {
        let d = self.dims.tread_depth;
        let h = self.cursor.heading;
        let side = left(h) * (width / 2.0);
        let (p0, z0) = (self.cursor.pos, self.cursor.z);

        for i in 0..steps {
            let a = p0 + h * (i as f64 * d);
            let b = p0 + h * ((i + 1) as f64 * d);
            let top = z0 + (i + 1) as f64 * self.riser;
            self.slab(&[a - side, b - side, b + side, a + side], top);

            let riser_material = match self.stringer {
                StringerStyle::Closed => Some(self.wood.clone()),
                StringerStyle::Glass => Some(self.glass.clone()),
                StringerStyle::Open => None,
            };
            let riser_top = top - TREAD_THICKNESS;
            let riser_bottom = top - self.riser;
            if let Some(material) = riser_material.filter(|_| riser_top > riser_bottom) {
                let t = h * RISER_THICKNESS;
                let plate = [plan(a - side), plan(a + side), plan(a + side + t), plan(a - side + t)];
                self.stair.push_prism(
                    &plate,
                    riser_bottom as f32,
                    riser_top as f32,
                    &material,
                    &material,
                );
            }
        }
        self.treads += steps as usize;

        let rail_sides: &[f64] = match self.handrail {
            HandrailSides::None => &[],
            HandrailSides::Left => &[1.0],
            HandrailSides::Right => &[-1.0],
            HandrailSides::Both => &[1.0, -1.0],
        };
        let rail_height = m(&self.ctx.config.handrail_height);
        let last = if steps > 1 { (steps - 1) as f64 * d } else { d };
        let end_z = z0 + steps as f64 * self.riser;
        for s in rail_sides {
            let offset = left(h) * (s * (width / 2.0 - HANDRAIL_INSET));
            let from = world(p0 + offset, z0 + self.riser + rail_height);
            let to = world(p0 + h * last + offset, end_z + rail_height);
            self.handrails.push_bar(from, to, HANDRAIL_HALF, &self.wood);
        }

        self.cursor.pos = p0 + h * (steps as f64 * d);
        self.cursor.z = end_z;
    }

    fn turn(&mut self, direction: TurnDirection, angle: TurnAngle, style: TurnStyle) -> RenderResult<()> {
        let w = self.dims.width;
        let h = self.cursor.heading;
        let p = self.cursor.pos;
        let side = match direction {
            TurnDirection::Left => left(h),
            TurnDirection::Right => -left(h),
        };
        // side-coordinate range of the turn area relative to the cursor
        let (s0, s1) = match angle {
            TurnAngle::Quarter => (-w / 2.0, w / 2.0),
            TurnAngle::Half => (-w / 2.0, 1.5 * w),
        };

        match style {
            TurnStyle::Landing => {
                let corners = [
                    p + side * s0,
                    p + side * s1,
                    p + side * s1 + h * w,
                    p + side * s0 + h * w,
                ];
                let top = self.cursor.z + self.riser;
                self.slab(&corners, top);
                self.cursor.z = top;
                self.landings += 1;
            }
            TurnStyle::Winder { treads } => {
                if treads == 0 {
                    return Err(RenderError::InvalidGeometry(format!(
                        "stair '{}' has a winder turn with no treads",
                        self.name
                    )));
                }
                self.winder_fan(p, h, side, angle, treads);
            }
        }

        match angle {
            TurnAngle::Quarter => {
                self.cursor.pos = p + h * (w / 2.0) + side * (w / 2.0);
                self.cursor.heading = side;
            }
            TurnAngle::Half => {
                self.cursor.pos = p + side * w;
                self.cursor.heading = -h;
            }
        }
        Ok(())
    }

    /// Wedge treads fanned around the inner corner of the turn
    fn winder_fan(&mut self, p: DVec2, h: DVec2, side: DVec2, angle: TurnAngle, treads: u32) {
        let w = self.dims.width;
        let pivot = p + side * (w / 2.0);
        let sweep = angle.degrees().to_radians();
        let corners: Vec<(f64, DVec2)> = match angle {
            TurnAngle::Quarter => vec![(45f64.to_radians(), pivot - side * w + h * w)],
            TurnAngle::Half => vec![
                (45f64.to_radians(), pivot - side * w + h * w),
                (135f64.to_radians(), pivot + side * w + h * w),
            ],
        };
        let ray = |theta: f64| {
            let (sin, cos) = theta.sin_cos();
            let mut t = f64::MAX;
            if cos.abs() > 1e-9 {
                t = t.min(w / cos.abs());
            }
            if sin > 1e-9 {
                t = t.min(w / sin);
            }
            pivot + (-side * cos + h * sin) * t
        };

        for i in 0..treads {
            let t0 = sweep * i as f64 / treads as f64;
            let t1 = sweep * (i + 1) as f64 / treads as f64;
            let mut wedge = vec![pivot, ray(t0)];
            wedge.extend(
                corners
                    .iter()
                    .filter(|(theta, _)| *theta > t0 + 1e-9 && *theta < t1 - 1e-9)
                    .map(|(_, c)| *c),
            );
            wedge.push(ray(t1));
            let top = self.cursor.z + (i + 1) as f64 * self.riser;
            self.slab(&wedge, top);
        }
        self.cursor.z += treads as f64 * self.riser;
        self.winder_treads += treads as usize;
    }
}

/// Stair dimensions with config fallbacks
pub fn stair_dimensions(stair: &Stair, ctx: &StairContext<'_>) -> StairDimensions {
    let cfg = ctx.config;
    StairDimensions {
        rise: stair.rise.as_ref().map(m).unwrap_or(ctx.default_rise),
        width: stair.width.as_ref().map(m).unwrap_or_else(|| m(&cfg.stair_width)),
        max_riser: stair
            .max_riser
            .as_ref()
            .map(m)
            .unwrap_or_else(|| m(&cfg.max_riser)),
        tread_depth: stair
            .tread_depth
            .as_ref()
            .map(m)
            .unwrap_or_else(|| m(&cfg.tread_depth)),
        headroom: stair.headroom.as_ref().map(m).unwrap_or(ctx.clear_height),
    }
}

/// Build one stair in world coordinates
pub fn build_stair(stair: &Stair, ctx: &StairContext<'_>) -> RenderResult<StairGeometry> {
    let dims = stair_dimensions(stair, ctx);
    for (what, value) in [
        ("rise", dims.rise),
        ("width", dims.width),
        ("max_riser", dims.max_riser),
        ("tread_depth", dims.tread_depth),
    ] {
        if !(value > 0.0) {
            return Err(RenderError::InvalidGeometry(format!(
                "stair '{}' has non-positive {} {}",
                stair.name, what, value
            )));
        }
    }

    let segments = expand_shape(&stair.shape, riser_count(dims.rise, dims.max_riser));
    let risers = count_risers(&segments);
    if risers == 0 {
        return Err(RenderError::InvalidGeometry(format!(
            "stair '{}' has no steps",
            stair.name
        )));
    }
    let riser = dims.rise / risers as f64;
    // presets are sized to fit; custom segment lists are taken as declared
    if riser > dims.max_riser * (1.0 + 1e-9) {
        return Err(RenderError::InvalidGeometry(format!(
            "stair '{}' climbs {:.3}m in {} risers of {:.3}m, above the {:.3}m maximum",
            stair.name, dims.rise, risers, riser, dims.max_riser
        )));
    }

    let theta = stair.rotation.to_radians();
    let start = DVec2::new(m(&stair.position.x), m(&stair.position.y));
    let mut b = Builder {
        name: &stair.name,
        ctx,
        stringer: stair.stringer,
        handrail: stair.handrail,
        dims,
        riser,
        cursor: Cursor {
            pos: start,
            heading: DVec2::new(theta.sin(), theta.cos()),
            z: ctx.base,
        },
        stair: MeshData::new(),
        handrails: MeshData::new(),
        wood: Material::opaque(&ctx.config.stair_material),
        glass: Material::translucent(&ctx.config.glass_material),
        treads: 0,
        landings: 0,
        winder_treads: 0,
        min_width: dims.width,
        min: DVec2::splat(f64::MAX),
        max: DVec2::splat(f64::MIN),
    };

    for segment in &segments {
        match segment {
            StairSegment::Flight {
                steps,
                width,
                align,
            } => {
                let width = width.as_ref().map(m).unwrap_or(dims.width);
                if !(width > 0.0) {
                    return Err(RenderError::InvalidGeometry(format!(
                        "stair '{}' has a flight of width {}",
                        stair.name, width
                    )));
                }
                if let Some(align) = align {
                    b.align(align, width)?;
                }
                b.min_width = b.min_width.min(width);
                b.flight(*steps, width);
            }
            StairSegment::Turn {
                direction,
                angle,
                style,
            } => b.turn(*direction, *angle, *style)?,
        }
    }

    tracing::debug!(
        "stair {}: {} risers of {:.4}m, {} treads, {} landings, {} winders",
        stair.name,
        risers,
        riser,
        b.treads,
        b.landings,
        b.winder_treads
    );

    Ok(StairGeometry {
        footprint: Rect::new(b.min.x, b.min.y, b.max.x, b.max.y),
        stair: b.stair,
        handrails: b.handrails,
        dims,
        risers,
        riser_height: riser,
        treads: b.treads,
        landings: b.landings,
        winder_treads: b.winder_treads,
        min_width: b.min_width,
    })
}
