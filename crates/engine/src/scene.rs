//! Output scene graph: per-floor groups of tagged meshes.

use serde::{Deserialize, Serialize};

use crate::error::Warning;
use crate::mesh::MeshData;

/// What a scene node represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Slab,
    Wall,
    Door,
    Window,
    Stair,
    Handrail,
    Lift,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Slab => "slab",
            NodeKind::Wall => "wall",
            NodeKind::Door => "door",
            NodeKind::Window => "window",
            NodeKind::Stair => "stair",
            NodeKind::Handrail => "handrail",
            NodeKind::Lift => "lift",
        }
    }
}

/// Source entity a node was generated from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub floor: String,
    /// Room, stair, lift or wall segment id
    pub entity: String,
    /// Rooms touching the generated geometry
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rooms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub source: Provenance,
    pub mesh: MeshData,
}

/// All nodes of one floor. Meshes are in world coordinates; the
/// presentation offset is applied by viewers only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorGroup {
    pub index: usize,
    pub name: String,
    pub elevation: f64,
    pub presentation_offset: f64,
    pub nodes: Vec<SceneNode>,
}

impl FloorGroup {
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &SceneNode> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }

    pub fn node(&self, name: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneGraph {
    pub floors: Vec<FloorGroup>,
    pub warnings: Vec<Warning>,
}

impl SceneGraph {
    /// Spread floors apart vertically by `spacing` per floor index.
    /// Only presentation offsets change; mesh data stays untouched.
    pub fn set_exploded(&mut self, spacing: f64) {
        for floor in &mut self.floors {
            floor.presentation_offset = spacing * floor.index as f64;
        }
    }

    pub fn floor(&self, name: &str) -> Option<&FloorGroup> {
        self.floors.iter().find(|f| f.name == name)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.floors.iter().flat_map(|f| f.nodes.iter())
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &SceneNode> {
        self.nodes().filter(move |n| n.kind == kind)
    }
}
