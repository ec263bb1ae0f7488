//! Integrity checks for generated meshes.
//!
//! `MeshValidator` inspects one `MeshData`: buffer strides, index range, unit
//! normals, material groups tiling the index buffer, zero-area triangles.
//! It also measures bounds and projected areas for tests comparing the two
//! wall-cutting paths. `validate_scene` runs every check over a scene graph.

use std::fmt;

use glam::Vec3;

use crate::build::facing_area;
use crate::mesh::{MeshData, STRIDE};
use crate::scene::SceneGraph;

/// Normal length tolerance used by `validate_all`
const NORMAL_EPSILON: f32 = 0.1;
/// Below this a triangle counts as zero-area
const MIN_AREA: f32 = 1e-9;

/// One problem found in a mesh
#[derive(Debug, Clone, PartialEq)]
pub enum MeshIssue {
    VertexStride { len: usize },
    IndexStride { len: usize },
    IndexOutOfRange { vertex_count: usize, sample: Vec<u32> },
    NonUnitNormals { count: usize },
    GroupsUncovered { indices: usize },
    DegenerateTriangles { count: usize },
}

impl fmt::Display for MeshIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshIssue::VertexStride { len } => {
                write!(f, "vertex buffer of {} floats is not a multiple of {}", len, STRIDE)
            }
            MeshIssue::IndexStride { len } => {
                write!(f, "index buffer of {} is not a multiple of 3", len)
            }
            MeshIssue::IndexOutOfRange {
                vertex_count,
                sample,
            } => write!(
                f,
                "indices out of range for {} vertices: {:?}",
                vertex_count, sample
            ),
            MeshIssue::NonUnitNormals { count } => {
                write!(f, "{} normals are not unit length", count)
            }
            MeshIssue::GroupsUncovered { indices } => {
                write!(f, "material groups do not tile the {} indices", indices)
            }
            MeshIssue::DegenerateTriangles { count } => {
                write!(f, "{} zero-area triangles", count)
            }
        }
    }
}

pub struct MeshValidator<'a> {
    mesh: &'a MeshData,
}

impl<'a> MeshValidator<'a> {
    pub fn new(mesh: &'a MeshData) -> Self {
        Self { mesh }
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertices.len() / STRIDE
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.indices.len() / 3
    }

    fn out_of_range(&self) -> Vec<u32> {
        let n = self.vertex_count() as u32;
        self.mesh.indices.iter().copied().filter(|&i| i >= n).take(5).collect()
    }

    /// Vertices whose normal length is off by more than `epsilon`
    pub fn non_unit_normals(&self, epsilon: f32) -> usize {
        self.mesh
            .vertices
            .chunks_exact(STRIDE)
            .filter(|v| (Vec3::new(v[3], v[4], v[5]).length() - 1.0).abs() > epsilon)
            .count()
    }

    /// Groups tile the index buffer in order, each on a whole triangle
    /// range, each pointing at an existing material.
    pub fn groups_tile_indices(&self) -> bool {
        let mut next = 0u32;
        for g in &self.mesh.groups {
            if g.start != next || g.count % 3 != 0 || g.material as usize >= self.mesh.materials.len() {
                return false;
            }
            next += g.count;
        }
        next as usize == self.mesh.indices.len()
    }

    /// Triangles with (near) zero area. Only meaningful once indices are in range.
    pub fn degenerate_triangles(&self) -> usize {
        (0..self.triangle_count())
            .filter(|&t| {
                let [a, b, c] = self.mesh.triangle(t);
                (b - a).cross(c - a).length() * 0.5 < MIN_AREA
            })
            .count()
    }

    /// Axis-aligned bounds; zero box for an empty mesh.
    pub fn aabb(&self) -> (Vec3, Vec3) {
        self.mesh.bounds().unwrap_or((Vec3::ZERO, Vec3::ZERO))
    }

    /// Bounding box extent along X, Y, Z
    pub fn dimensions(&self) -> [f32; 3] {
        let (min, max) = self.aabb();
        (max - min).to_array()
    }

    pub fn dimensions_within(&self, expected: [f32; 3], tolerance: f32) -> bool {
        self.dimensions()
            .iter()
            .zip(expected)
            .all(|(got, want)| (got - want).abs() < tolerance)
    }

    /// Area of the faces pointing along `dir`, projected onto the plane
    /// perpendicular to it.
    pub fn projected_area(&self, dir: Vec3) -> f32 {
        facing_area(self.mesh, dir.normalize_or_zero())
    }

    /// Names of the materials actually referenced by triangles, sorted.
    pub fn material_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .mesh
            .groups
            .iter()
            .filter_map(|g| self.mesh.materials.get(g.material as usize))
            .map(|m| m.name.as_str())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Every check; empty means the mesh is sound.
    pub fn validate_all(&self) -> Vec<MeshIssue> {
        let mut issues = Vec::new();
        let (vlen, ilen) = (self.mesh.vertices.len(), self.mesh.indices.len());

        if vlen % STRIDE != 0 {
            issues.push(MeshIssue::VertexStride { len: vlen });
        }
        if ilen % 3 != 0 {
            issues.push(MeshIssue::IndexStride { len: ilen });
        }
        let sample = self.out_of_range();
        if !sample.is_empty() {
            issues.push(MeshIssue::IndexOutOfRange {
                vertex_count: self.vertex_count(),
                sample,
            });
        }
        let bad_normals = self.non_unit_normals(NORMAL_EPSILON);
        if bad_normals > 0 {
            issues.push(MeshIssue::NonUnitNormals { count: bad_normals });
        }
        if !self.groups_tile_indices() {
            issues.push(MeshIssue::GroupsUncovered { indices: ilen });
        }
        if issues.is_empty() {
            let degenerate = self.degenerate_triangles();
            if degenerate > 0 {
                issues.push(MeshIssue::DegenerateTriangles { count: degenerate });
            }
        }
        issues
    }
}

/// Validate every node of a scene graph; returns (node name, issue) pairs.
pub fn validate_scene(graph: &SceneGraph) -> Vec<(String, MeshIssue)> {
    let issues: Vec<(String, MeshIssue)> = graph
        .nodes()
        .flat_map(|node| {
            MeshValidator::new(&node.mesh)
                .validate_all()
                .into_iter()
                .map(move |issue| (node.name.clone(), issue))
        })
        .collect();
    tracing::debug!("validated {} nodes, {} issues", graph.nodes().count(), issues.len());
    issues
}
