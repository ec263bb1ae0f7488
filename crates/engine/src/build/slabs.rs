//! Floor slabs: one per top-level room, minus lift shafts and stairwells
//! passing through the floor.

use glam::Vec3;
use kurbo::Rect;
use shared::Config;

use super::layout::{FloorLevel, PlacedRoom};
use crate::mesh::{Block, FacePalette, Material, MeshData};

const MIN_PIECE_AREA: f64 = 1e-9;

/// `rect` minus `hole`, as up to four non-overlapping rectangles
pub fn subtract_rect(rect: Rect, hole: Rect) -> Vec<Rect> {
    let cut = rect.intersect(hole);
    if cut.area() <= MIN_PIECE_AREA {
        return vec![rect];
    }
    [
        // full-width strips above and below the hole, then the two sides
        Rect::new(rect.x0, rect.y0, rect.x1, cut.y0),
        Rect::new(rect.x0, cut.y1, rect.x1, rect.y1),
        Rect::new(rect.x0, cut.y0, cut.x0, cut.y1),
        Rect::new(cut.x1, cut.y0, rect.x1, cut.y1),
    ]
    .into_iter()
    .filter(|r| r.area() > MIN_PIECE_AREA)
    .collect()
}

/// Remaining pieces of `rect` after every exclusion zone
pub fn slab_pieces(rect: Rect, exclusions: &[Rect]) -> Vec<Rect> {
    exclusions.iter().fold(vec![rect], |pieces, hole| {
        pieces
            .into_iter()
            .flat_map(|p| subtract_rect(p, *hole))
            .collect()
    })
}

/// Slab mesh for one top-level room; empty when fully excluded
pub fn build_slab(
    room: &PlacedRoom,
    level: &FloorLevel,
    exclusions: &[Rect],
    config: &Config,
) -> MeshData {
    let palette = FacePalette::uniform(Material::opaque(&config.floor_material));
    let (y0, y1) = (level.elevation as f32, level.base() as f32);
    let mut mesh = MeshData::new();
    let pieces = slab_pieces(room.rect, exclusions);
    for r in &pieces {
        mesh.push_block(
            &Block::new(
                Vec3::new(r.x0 as f32, y0, r.y0 as f32),
                Vec3::new(r.x1 as f32, y1, r.y1 as f32),
            ),
            &palette,
        );
    }
    if pieces.len() != 1 {
        tracing::debug!("slab {}: {} pieces after exclusions", room.name, pieces.len());
    }
    mesh
}
