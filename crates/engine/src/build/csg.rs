//! Boolean backends for cutting openings out of wall volumes.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::RenderResult;
use crate::mesh::{Block, FacePalette, MeshData, TriangleSoup};

/// Wall cutting strategy requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsgMode {
    /// Boolean kernel when compiled in (`csg` feature), otherwise pieces
    #[default]
    Auto,
    /// Always subtract: vcad when compiled in, else the box-split kernel
    Boolean,
    /// Adjoining box pieces, no subtraction
    Pieces,
}

/// Subtracts one box from another and returns bare triangles
pub trait BooleanBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn subtract(&self, solid: &Block, cut: &Block) -> RenderResult<TriangleSoup>;
}

/// Pick the backend for a mode; `None` selects the multi-piece fallback
pub fn backend_for(mode: CsgMode) -> Option<Box<dyn BooleanBackend>> {
    match mode {
        CsgMode::Pieces => None,
        #[cfg(feature = "csg")]
        CsgMode::Auto | CsgMode::Boolean => Some(Box::new(VcadBackend)),
        #[cfg(not(feature = "csg"))]
        CsgMode::Auto => None,
        #[cfg(not(feature = "csg"))]
        CsgMode::Boolean => Some(Box::new(BoxSplitBackend)),
    }
}

/// Split `solid` along the faces of `cut` into the boxes left over.
///
/// Slabs are peeled off along X, then Y, then Z; whatever remains in the
/// middle is inside the cut and discarded.
pub fn split_box(solid: &Block, cut: &Block) -> Vec<Block> {
    let lo = cut.min.max(solid.min);
    let hi = cut.max.min(solid.max);
    if (hi - lo).min_element() <= 0.0 {
        return vec![*solid];
    }

    let mut pieces = Vec::new();
    let mut rest = *solid;
    for axis in 0..3 {
        if lo[axis] > rest.min[axis] {
            let mut below = rest;
            below.max[axis] = lo[axis];
            pieces.push(below);
        }
        if hi[axis] < rest.max[axis] {
            let mut above = rest;
            above.min[axis] = hi[axis];
            pieces.push(above);
        }
        rest.min[axis] = lo[axis];
        rest.max[axis] = hi[axis];
    }
    pieces.retain(|p| !p.is_degenerate());
    pieces
}

/// Fallback path: the solid's silhouette minus the cut, as adjoining boxes
/// that keep their per-face materials.
pub fn cut_pieces(solid: &Block, cut: &Block, palette: &FacePalette) -> MeshData {
    let mut mesh = MeshData::new();
    for piece in split_box(solid, cut) {
        mesh.push_block(&piece, palette);
    }
    mesh
}

/// Exact box-minus-box kernel built on `split_box`. Like any boolean kernel
/// it hands back triangles without materials.
pub struct BoxSplitBackend;

impl BooleanBackend for BoxSplitBackend {
    fn name(&self) -> &'static str {
        "box-split"
    }

    fn subtract(&self, solid: &Block, cut: &Block) -> RenderResult<TriangleSoup> {
        let palette = FacePalette::uniform(crate::mesh::Material::opaque("csg"));
        Ok(cut_pieces(solid, cut, &palette).to_soup())
    }
}

#[cfg(feature = "csg")]
pub use vcad_backend::VcadBackend;

#[cfg(feature = "csg")]
mod vcad_backend {
    use glam::Vec3;
    use vcad::{centered_cube, Part};

    use super::BooleanBackend;
    use crate::error::{RenderError, RenderResult};
    use crate::mesh::{Block, TriangleSoup};

    /// Boolean subtraction through the vcad CAD kernel
    pub struct VcadBackend;

    fn block_part(name: &str, block: &Block) -> Part {
        let s = block.size();
        let c = block.center();
        centered_cube(name, s.x as f64, s.y as f64, s.z as f64).translate(
            c.x as f64,
            c.y as f64,
            c.z as f64,
        )
    }

    impl BooleanBackend for VcadBackend {
        fn name(&self) -> &'static str {
            "vcad"
        }

        fn subtract(&self, solid: &Block, cut: &Block) -> RenderResult<TriangleSoup> {
            let result = block_part("wall", solid).difference(&block_part("opening", cut));
            let mesh = result.to_mesh();
            let positions = mesh.vertices();
            let indices = mesh.indices();

            tracing::debug!(
                "vcad subtract: {} vertices, {} tris",
                positions.len() / 3,
                indices.len() / 3
            );

            if positions.is_empty() || indices.is_empty() {
                return Err(RenderError::InvalidGeometry(
                    "boolean subtraction produced an empty mesh".to_string(),
                ));
            }

            Ok(TriangleSoup {
                positions: positions
                    .chunks_exact(3)
                    .map(|p| Vec3::new(p[0] as f32, p[1] as f32, p[2] as f32))
                    .collect(),
                indices: indices.to_vec(),
            })
        }
    }
}

/// Projected area of the faces pointing along `dir`
pub fn facing_area(mesh: &MeshData, dir: Vec3) -> f32 {
    (0..mesh.triangle_count())
        .map(|t| {
            let [a, b, c] = mesh.triangle(t);
            let n = (b - a).cross(c - a) * 0.5;
            n.dot(dir).max(0.0)
        })
        .sum()
}
