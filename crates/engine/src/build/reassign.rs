//! Material reassignment after boolean subtraction.
//!
//! A boolean kernel returns bare triangles. Every wall starts as a box with a
//! six-face palette, and every cut is an axis-aligned box, so each result
//! face is classified by its dominant signed-axis normal and gets the
//! material the original box used for that direction. Faces inside the cut
//! get the jamb/lintel/sill direction's material.

use crate::mesh::{Face, FacePalette, MeshData, TriangleSoup};

/// Rebuild per-face material groups in a single pass over the triangles.
/// Degenerate (zero-area) triangles are dropped.
pub fn reassign_materials(soup: &TriangleSoup, palette: &FacePalette) -> MeshData {
    let mut mesh = MeshData::new();
    let mut dropped = 0usize;

    for tri in soup.indices.chunks_exact(3) {
        let [a, b, c] = [
            soup.positions[tri[0] as usize],
            soup.positions[tri[1] as usize],
            soup.positions[tri[2] as usize],
        ];
        let normal = (b - a).cross(c - a);
        let Some(face) = Face::classify(normal) else {
            dropped += 1;
            continue;
        };
        mesh.push_triangle([a, b, c], normal, palette.get(face));
    }

    tracing::debug!(
        "reassign_materials: {} tris in, {} out, {} groups, {} dropped",
        soup.indices.len() / 3,
        mesh.triangle_count(),
        mesh.groups.len(),
        dropped
    );
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Block, Material};
    use glam::Vec3;

    fn palette() -> FacePalette {
        let mut p = FacePalette::uniform(Material::opaque("brick"));
        p.set(Face::PosZ, Material::opaque("plaster"));
        p.set(Face::NegZ, Material::opaque("wallpaper"));
        p
    }

    fn face_materials(mesh: &MeshData) -> Vec<(Face, String)> {
        let mut out: Vec<(Face, String)> = (0..mesh.triangle_count())
            .map(|t| {
                let [a, b, c] = mesh.triangle(t);
                let face = Face::classify((b - a).cross(c - a)).unwrap();
                (face, mesh.triangle_material(t).unwrap().name.clone())
            })
            .collect();
        out.sort_by_key(|(f, m)| (f.index(), m.clone()));
        out.dedup();
        out
    }

    #[test]
    fn test_roundtrip_restores_six_face_palette() {
        let mut original = MeshData::new();
        original.push_block(&Block::new(Vec3::ZERO, Vec3::new(4.0, 3.0, 0.15)), &palette());

        let restored = reassign_materials(&original.to_soup(), &palette());
        assert_eq!(face_materials(&restored), face_materials(&original));
        assert_eq!(restored.triangle_count(), 12);
    }

    #[test]
    fn test_consecutive_faces_share_group() {
        let mut original = MeshData::new();
        original.push_block(&Block::new(Vec3::ZERO, Vec3::ONE), &palette());
        let restored = reassign_materials(&original.to_soup(), &palette());
        // +Z, -Z, then four brick faces in one run
        assert_eq!(restored.groups.len(), 3);
        assert_eq!(restored.groups[2].count, 24);
    }

    #[test]
    fn test_degenerate_triangles_dropped() {
        let soup = TriangleSoup {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::X * 2.0, Vec3::Z],
            indices: vec![0, 1, 2, 0, 1, 3],
        };
        let mesh = reassign_materials(&soup, &palette());
        assert_eq!(mesh.triangle_count(), 1);
    }
}
