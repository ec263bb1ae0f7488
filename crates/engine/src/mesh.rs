//! CPU-side mesh data with per-face material groups.

use glam::{Affine3A, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Floats per vertex: position(3) + normal(3)
pub const STRIDE: usize = 6;

const DEGENERATE_AREA: f32 = 1e-9;

/// Surface material referenced by name; the caller resolves the name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub translucent: bool,
}

impl Material {
    pub fn opaque(name: &str) -> Self {
        Self {
            name: name.to_string(),
            translucent: false,
        }
    }

    pub fn translucent(name: &str) -> Self {
        Self {
            name: name.to_string(),
            translucent: true,
        }
    }
}

/// Contiguous range of the index buffer drawn with one material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceGroup {
    /// First index (not triangle) of the range
    pub start: u32,
    /// Number of indices in the range
    pub count: u32,
    /// Position in `MeshData::materials`
    pub material: u32,
}

/// The six signed axis directions a box face can point to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosX,
        Face::NegX,
        Face::PosY,
        Face::NegY,
        Face::PosZ,
        Face::NegZ,
    ];

    pub fn index(&self) -> usize {
        match self {
            Face::PosX => 0,
            Face::NegX => 1,
            Face::PosY => 2,
            Face::NegY => 3,
            Face::PosZ => 4,
            Face::NegZ => 5,
        }
    }

    pub fn normal(&self) -> Vec3 {
        match self {
            Face::PosX => Vec3::X,
            Face::NegX => Vec3::NEG_X,
            Face::PosY => Vec3::Y,
            Face::NegY => Vec3::NEG_Y,
            Face::PosZ => Vec3::Z,
            Face::NegZ => Vec3::NEG_Z,
        }
    }

    /// Dominant signed axis of a normal; `None` for a zero vector
    pub fn classify(n: Vec3) -> Option<Face> {
        let a = n.abs();
        if a.max_element() <= f32::EPSILON {
            return None;
        }
        Some(if a.x >= a.y && a.x >= a.z {
            if n.x > 0.0 {
                Face::PosX
            } else {
                Face::NegX
            }
        } else if a.y >= a.z {
            if n.y > 0.0 {
                Face::PosY
            } else {
                Face::NegY
            }
        } else if n.z > 0.0 {
            Face::PosZ
        } else {
            Face::NegZ
        })
    }
}

/// One material per box face, indexed by `Face::index`
#[derive(Debug, Clone, PartialEq)]
pub struct FacePalette {
    pub faces: [Material; 6],
}

impl FacePalette {
    pub fn uniform(material: Material) -> Self {
        Self {
            faces: std::array::from_fn(|_| material.clone()),
        }
    }

    pub fn get(&self, face: Face) -> &Material {
        &self.faces[face.index()]
    }

    pub fn set(&mut self, face: Face, material: Material) {
        self.faces[face.index()] = material;
    }
}

/// Axis-aligned box volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    pub min: Vec3,
    pub max: Vec3,
}

impl Block {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// True when any extent is (numerically) zero
    pub fn is_degenerate(&self) -> bool {
        self.size().min_element() <= 1e-6
    }
}

/// Triangle soup without materials (what a boolean kernel hands back)
#[derive(Debug, Clone, Default)]
pub struct TriangleSoup {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
}

/// Mesh with interleaved [px, py, pz, nx, ny, nz] vertices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
    pub materials: Vec<Material>,
    pub groups: Vec<FaceGroup>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / STRIDE
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn position(&self, vertex: usize) -> Vec3 {
        let b = vertex * STRIDE;
        Vec3::new(self.vertices[b], self.vertices[b + 1], self.vertices[b + 2])
    }

    pub fn normal(&self, vertex: usize) -> Vec3 {
        let b = vertex * STRIDE;
        Vec3::new(
            self.vertices[b + 3],
            self.vertices[b + 4],
            self.vertices[b + 5],
        )
    }

    /// Corner positions of triangle `tri`
    pub fn triangle(&self, tri: usize) -> [Vec3; 3] {
        let i = tri * 3;
        [
            self.position(self.indices[i] as usize),
            self.position(self.indices[i + 1] as usize),
            self.position(self.indices[i + 2] as usize),
        ]
    }

    /// Material of triangle `tri`, looked up through the face groups
    pub fn triangle_material(&self, tri: usize) -> Option<&Material> {
        let idx = (tri * 3) as u32;
        self.groups
            .iter()
            .find(|g| idx >= g.start && idx < g.start + g.count)
            .and_then(|g| self.materials.get(g.material as usize))
    }

    /// Index of `material`, registering it on first use
    pub fn material_index(&mut self, material: &Material) -> u32 {
        if let Some(i) = self.materials.iter().position(|m| m == material) {
            return i as u32;
        }
        self.materials.push(material.clone());
        (self.materials.len() - 1) as u32
    }

    /// Append one flat-shaded triangle. Winding is fixed up so the geometric
    /// normal agrees with `facing`. Degenerate triangles are skipped.
    pub fn push_triangle(&mut self, corners: [Vec3; 3], facing: Vec3, material: &Material) {
        let [a, mut b, mut c] = corners;
        let mut n = (b - a).cross(c - a);
        if n.length() * 0.5 <= DEGENERATE_AREA {
            return;
        }
        if n.dot(facing) < 0.0 {
            std::mem::swap(&mut b, &mut c);
            n = -n;
        }
        let n = n.normalize();
        let mat = self.material_index(material);
        let base = self.vertex_count() as u32;
        for p in [a, b, c] {
            self.vertices
                .extend_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z]);
        }
        let start = self.indices.len() as u32;
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);

        match self.groups.last_mut() {
            Some(g) if g.material == mat && g.start + g.count == start => g.count += 3,
            _ => self.groups.push(FaceGroup {
                start,
                count: 3,
                material: mat,
            }),
        }
    }

    /// Append a planar quad (corners in perimeter order)
    pub fn push_quad(&mut self, corners: [Vec3; 4], facing: Vec3, material: &Material) {
        let [a, b, c, d] = corners;
        self.push_triangle([a, b, c], facing, material);
        self.push_triangle([a, c, d], facing, material);
    }

    /// Append an axis-aligned box with one material per face
    pub fn push_block(&mut self, block: &Block, palette: &FacePalette) {
        let (lo, hi) = (block.min, block.max);
        let faces: [([Vec3; 4], Face); 6] = [
            (
                [
                    Vec3::new(lo.x, lo.y, hi.z),
                    Vec3::new(hi.x, lo.y, hi.z),
                    Vec3::new(hi.x, hi.y, hi.z),
                    Vec3::new(lo.x, hi.y, hi.z),
                ],
                Face::PosZ,
            ),
            (
                [
                    Vec3::new(hi.x, lo.y, lo.z),
                    Vec3::new(lo.x, lo.y, lo.z),
                    Vec3::new(lo.x, hi.y, lo.z),
                    Vec3::new(hi.x, hi.y, lo.z),
                ],
                Face::NegZ,
            ),
            (
                [
                    Vec3::new(hi.x, lo.y, hi.z),
                    Vec3::new(hi.x, lo.y, lo.z),
                    Vec3::new(hi.x, hi.y, lo.z),
                    Vec3::new(hi.x, hi.y, hi.z),
                ],
                Face::PosX,
            ),
            (
                [
                    Vec3::new(lo.x, lo.y, lo.z),
                    Vec3::new(lo.x, lo.y, hi.z),
                    Vec3::new(lo.x, hi.y, hi.z),
                    Vec3::new(lo.x, hi.y, lo.z),
                ],
                Face::NegX,
            ),
            (
                [
                    Vec3::new(lo.x, hi.y, hi.z),
                    Vec3::new(hi.x, hi.y, hi.z),
                    Vec3::new(hi.x, hi.y, lo.z),
                    Vec3::new(lo.x, hi.y, lo.z),
                ],
                Face::PosY,
            ),
            (
                [
                    Vec3::new(lo.x, lo.y, lo.z),
                    Vec3::new(hi.x, lo.y, lo.z),
                    Vec3::new(hi.x, lo.y, hi.z),
                    Vec3::new(lo.x, lo.y, hi.z),
                ],
                Face::NegY,
            ),
        ];

        for (quad, face) in &faces {
            self.push_quad(*quad, face.normal(), palette.get(*face));
        }
    }

    /// Append a vertical prism over a convex footprint given in the XZ plane
    pub fn push_prism(
        &mut self,
        footprint: &[Vec2],
        y0: f32,
        y1: f32,
        cap: &Material,
        side: &Material,
    ) {
        if footprint.len() < 3 {
            return;
        }
        let centroid = footprint.iter().copied().sum::<Vec2>() / footprint.len() as f32;
        let at = |p: Vec2, y: f32| Vec3::new(p.x, y, p.y);

        for i in 1..footprint.len() - 1 {
            let (a, b, c) = (footprint[0], footprint[i], footprint[i + 1]);
            self.push_triangle([at(a, y1), at(b, y1), at(c, y1)], Vec3::Y, cap);
            self.push_triangle([at(a, y0), at(b, y0), at(c, y0)], Vec3::NEG_Y, cap);
        }
        for i in 0..footprint.len() {
            let a = footprint[i];
            let b = footprint[(i + 1) % footprint.len()];
            let mid = (a + b) * 0.5 - centroid;
            let outward = Vec3::new(mid.x, 0.0, mid.y);
            self.push_quad(
                [at(a, y0), at(b, y0), at(b, y1), at(a, y1)],
                outward,
                side,
            );
        }
    }

    /// Append a square-profile bar swept along the straight line `from -> to`
    pub fn push_bar(&mut self, from: Vec3, to: Vec3, half: f32, material: &Material) {
        let axis = to - from;
        if axis.length() <= 1e-6 {
            return;
        }
        let dir = axis.normalize();
        let up_hint = if dir.y.abs() > 0.99 { Vec3::X } else { Vec3::Y };
        let side = dir.cross(up_hint).normalize() * half;
        let up = side.cross(dir).normalize() * half;

        let ring = |c: Vec3| [c - side - up, c + side - up, c + side + up, c - side + up];
        let (s, e) = (ring(from), ring(to));
        for i in 0..4 {
            let j = (i + 1) % 4;
            let outward = (s[i] + s[j]) * 0.5 - from;
            self.push_quad([s[i], s[j], e[j], e[i]], outward, material);
        }
        self.push_quad(s, -dir, material);
        self.push_quad(e, dir, material);
    }

    /// Append another mesh, remapping its materials into this one
    pub fn append(&mut self, other: &MeshData) {
        let base = self.vertex_count() as u32;
        let index_base = self.indices.len() as u32;
        let remap: Vec<u32> = other
            .materials
            .iter()
            .map(|m| self.material_index(m))
            .collect();
        self.vertices.extend_from_slice(&other.vertices);
        self.indices
            .extend(other.indices.iter().map(|&i| i + base));
        for g in &other.groups {
            let material = remap[g.material as usize];
            let start = index_base + g.start;
            match self.groups.last_mut() {
                Some(last) if last.material == material && last.start + last.count == start => {
                    last.count += g.count
                }
                _ => self.groups.push(FaceGroup {
                    start,
                    count: g.count,
                    material,
                }),
            }
        }
    }

    /// Apply an affine transform to positions and normals
    pub fn transform(&mut self, m: &Affine3A) {
        for v in 0..self.vertex_count() {
            let p = m.transform_point3(self.position(v));
            let n = m.transform_vector3(self.normal(v)).normalize_or_zero();
            let b = v * STRIDE;
            self.vertices[b..b + STRIDE].copy_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z]);
        }
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.transform(&Affine3A::from_translation(offset));
    }

    /// Positions and indices only, materials discarded
    pub fn to_soup(&self) -> TriangleSoup {
        TriangleSoup {
            positions: (0..self.vertex_count()).map(|v| self.position(v)).collect(),
            indices: self.indices.clone(),
        }
    }

    /// Axis-aligned bounds; `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        if self.vertex_count() == 0 {
            return None;
        }
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for v in 0..self.vertex_count() {
            let p = self.position(v);
            min = min.min(p);
            max = max.max(p);
        }
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wood() -> Material {
        Material::opaque("wood")
    }

    #[test]
    fn test_classify_dominant_axis() {
        assert_eq!(Face::classify(Vec3::new(0.9, 0.1, -0.2)), Some(Face::PosX));
        assert_eq!(Face::classify(Vec3::new(0.1, -0.8, 0.3)), Some(Face::NegY));
        assert_eq!(Face::classify(Vec3::new(0.0, 0.0, -1.0)), Some(Face::NegZ));
        assert_eq!(Face::classify(Vec3::ZERO), None);
    }

    #[test]
    fn test_block_mesh_counts() {
        let mut mesh = MeshData::new();
        let block = Block::new(Vec3::ZERO, Vec3::new(2.0, 3.0, 4.0));
        mesh.push_block(&block, &FacePalette::uniform(wood()));
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.vertex_count(), 36);
        assert_eq!(mesh.groups.len(), 1);
        assert_eq!(mesh.groups[0].count, 36);
    }

    #[test]
    fn test_block_faces_point_outward() {
        let mut mesh = MeshData::new();
        let block = Block::new(Vec3::ZERO, Vec3::ONE);
        mesh.push_block(&block, &FacePalette::uniform(wood()));
        let center = block.center();
        for tri in 0..mesh.triangle_count() {
            let [a, b, c] = mesh.triangle(tri);
            let n = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(n.dot(centroid - center) > 0.0, "triangle {} faces inward", tri);
        }
    }

    #[test]
    fn test_palette_groups_per_face() {
        let mut palette = FacePalette::uniform(Material::opaque("plaster"));
        palette.set(Face::PosZ, Material::opaque("brick"));
        let mut mesh = MeshData::new();
        mesh.push_block(&Block::new(Vec3::ZERO, Vec3::ONE), &palette);
        assert_eq!(mesh.materials.len(), 2);
        // +Z is emitted first, then five plaster faces merge into one group
        assert_eq!(mesh.groups.len(), 2);
        assert_eq!(mesh.triangle_material(0).unwrap().name, "brick");
        assert_eq!(mesh.triangle_material(11).unwrap().name, "plaster");
    }

    #[test]
    fn test_degenerate_triangle_skipped() {
        let mut mesh = MeshData::new();
        mesh.push_triangle([Vec3::ZERO, Vec3::X, Vec3::X * 2.0], Vec3::Y, &wood());
        assert!(mesh.is_empty());
        assert!(mesh.materials.is_empty());
    }

    #[test]
    fn test_prism_over_triangle() {
        let mut mesh = MeshData::new();
        let footprint = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        mesh.push_prism(&footprint, 0.0, 0.5, &wood(), &wood());
        // 2 caps + 3 side quads
        assert_eq!(mesh.triangle_count(), 2 + 6);
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Vec3::ZERO);
        assert_eq!(max, Vec3::new(1.0, 0.5, 1.0));
    }

    #[test]
    fn test_bar_bounds() {
        let mut mesh = MeshData::new();
        mesh.push_bar(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), 0.025, &wood());
        assert_eq!(mesh.triangle_count(), 12);
        let (min, max) = mesh.bounds().unwrap();
        assert!((max.x - min.x - 2.0).abs() < 1e-5);
        assert!((max.y - min.y - 0.05).abs() < 1e-5);
    }

    #[test]
    fn test_append_remaps_materials() {
        let mut a = MeshData::new();
        a.push_block(&Block::new(Vec3::ZERO, Vec3::ONE), &FacePalette::uniform(wood()));
        let mut b = MeshData::new();
        b.push_block(
            &Block::new(Vec3::ONE, Vec3::splat(2.0)),
            &FacePalette::uniform(Material::translucent("glass")),
        );
        a.append(&b);
        assert_eq!(a.triangle_count(), 24);
        assert_eq!(a.materials.len(), 2);
        assert!(a.triangle_material(23).unwrap().translucent);
        assert!(a.indices.iter().all(|&i| (i as usize) < a.vertex_count()));
    }

    #[test]
    fn test_translate() {
        let mut mesh = MeshData::new();
        mesh.push_block(&Block::new(Vec3::ZERO, Vec3::ONE), &FacePalette::uniform(wood()));
        mesh.translate(Vec3::new(0.0, 3.0, 0.0));
        let (min, _) = mesh.bounds().unwrap();
        assert_eq!(min.y, 3.0);
    }
}
