//! Binary glTF (GLB) export of a scene graph.
//!
//! Layout: one glTF node per floor, translated by the floor's presentation
//! offset, with one child node per scene node. Every face group becomes a
//! primitive with its own material; translucent materials are blended.

use crate::mesh::{Material, MeshData, STRIDE};
use crate::scene::SceneGraph;

/// GLB magic number: "glTF"
const GLB_MAGIC: u32 = 0x46546C67;
/// GLB version 2
const GLB_VERSION: u32 = 2;
/// JSON chunk type
const CHUNK_TYPE_JSON: u32 = 0x4E4F534A;
/// BIN chunk type
const CHUNK_TYPE_BIN: u32 = 0x004E4942;

/// glTF component types
const FLOAT: u32 = 5126;
const UNSIGNED_INT: u32 = 5125;

/// glTF buffer view targets
const ARRAY_BUFFER: u32 = 34962;
const ELEMENT_ARRAY_BUFFER: u32 = 34963;

const TRANSLUCENT_ALPHA: f32 = 0.35;

/// Base color for a material name. Well-known names get fixed colors, the
/// rest a stable hash-derived gray-ish tint.
fn base_color(material: &Material) -> [f32; 4] {
    let rgb = match material.name.as_str() {
        "plaster" => [0.92, 0.91, 0.88],
        "brick" => [0.66, 0.33, 0.25],
        "concrete" => [0.62, 0.62, 0.6],
        "wood" => [0.6, 0.43, 0.27],
        "glass" => [0.7, 0.85, 0.95],
        "steel" => [0.55, 0.57, 0.6],
        name => {
            // FNV-1a
            let hash = name
                .bytes()
                .fold(0x811c9dc5u32, |h, b| (h ^ b as u32).wrapping_mul(0x01000193));
            let channel = |shift: u32| 0.45 + ((hash >> shift) & 0xff) as f32 / 255.0 * 0.45;
            [channel(0), channel(8), channel(16)]
        }
    };
    let alpha = if material.translucent { TRANSLUCENT_ALPHA } else { 1.0 };
    [rgb[0], rgb[1], rgb[2], alpha]
}

fn material_json(material: &Material) -> serde_json::Value {
    let mut json = serde_json::json!({
        "name": material.name,
        "pbrMetallicRoughness": {
            "baseColorFactor": base_color(material),
            "metallicFactor": if material.name == "steel" { 0.8 } else { 0.0 },
            "roughnessFactor": 0.7
        }
    });
    if material.translucent {
        json["alphaMode"] = serde_json::json!("BLEND");
        json["doubleSided"] = serde_json::json!(true);
    }
    json
}

/// Build a complete GLB (binary glTF) file from a scene graph.
///
/// Nodes with empty meshes are skipped; an empty scene yields an empty buffer.
pub fn build_glb(graph: &SceneGraph) -> Vec<u8> {
    let mut bin_data: Vec<u8> = Vec::new();
    let mut accessors = Vec::new();
    let mut buffer_views = Vec::new();
    let mut gltf_meshes = Vec::new();
    let mut nodes = Vec::new();
    let mut floor_nodes: Vec<usize> = Vec::new();
    let mut materials: Vec<Material> = Vec::new();

    // ── Phase 1: binary buffer, accessors and meshes per scene node ──
    let mut children_per_floor: Vec<Vec<usize>> = Vec::new();
    for floor in &graph.floors {
        let mut children = Vec::new();
        for scene_node in &floor.nodes {
            let mesh = &scene_node.mesh;
            if mesh.vertex_count() == 0 || mesh.indices.is_empty() {
                continue;
            }

            let primitives = write_mesh(
                mesh,
                &mut bin_data,
                &mut buffer_views,
                &mut accessors,
                &mut materials,
            );
            gltf_meshes.push(serde_json::json!({
                "name": scene_node.name,
                "primitives": primitives
            }));
            nodes.push(serde_json::json!({
                "name": scene_node.name,
                "mesh": gltf_meshes.len() - 1,
                "extras": {
                    "kind": scene_node.kind.as_str(),
                    "floor": scene_node.source.floor,
                    "entity": scene_node.source.entity,
                    "rooms": scene_node.source.rooms
                }
            }));
            children.push(nodes.len() - 1);
        }
        children_per_floor.push(children);
    }

    if gltf_meshes.is_empty() {
        return Vec::new();
    }

    // ── Phase 2: floor nodes and glTF JSON ─────────────────────
    for (floor, children) in graph.floors.iter().zip(children_per_floor) {
        nodes.push(serde_json::json!({
            "name": floor.name,
            "translation": [0.0, floor.presentation_offset as f32, 0.0],
            "children": children,
            "extras": { "index": floor.index, "elevation": floor.elevation }
        }));
        floor_nodes.push(nodes.len() - 1);
    }

    let gltf_json = serde_json::json!({
        "asset": {
            "version": "2.0",
            "generator": "floorplan3d v0.1"
        },
        "scene": 0,
        "scenes": [{
            "name": "Building",
            "nodes": floor_nodes
        }],
        "nodes": nodes,
        "meshes": gltf_meshes,
        "accessors": accessors,
        "bufferViews": buffer_views,
        "buffers": [{
            "byteLength": bin_data.len()
        }],
        "materials": materials.iter().map(material_json).collect::<Vec<_>>()
    });

    let json = serde_json::to_vec(&gltf_json).unwrap_or_default();
    let glb = container(&[(CHUNK_TYPE_JSON, json, b' '), (CHUNK_TYPE_BIN, bin_data, 0)]);

    tracing::debug!(
        "glb: {} floors, {} meshes, {} materials, {} bytes",
        graph.floors.len(),
        gltf_meshes.len(),
        materials.len(),
        glb.len()
    );
    glb
}

/// GLB header followed by each chunk padded to 4 bytes with its pad byte
fn container(chunks: &[(u32, Vec<u8>, u8)]) -> Vec<u8> {
    let padded = |len: usize| len.div_ceil(4) * 4;
    let total = 12 + chunks.iter().map(|(_, data, _)| 8 + padded(data.len())).sum::<usize>();

    let mut glb = Vec::with_capacity(total);
    for word in [GLB_MAGIC, GLB_VERSION, total as u32] {
        glb.extend_from_slice(&word.to_le_bytes());
    }
    for (kind, data, pad) in chunks {
        let len = padded(data.len());
        glb.extend_from_slice(&(len as u32).to_le_bytes());
        glb.extend_from_slice(&kind.to_le_bytes());
        glb.extend_from_slice(data);
        glb.resize(glb.len() + len - data.len(), *pad);
    }
    glb
}

/// Append one mesh to the buffer; returns its primitives
fn write_mesh(
    mesh: &MeshData,
    bin_data: &mut Vec<u8>,
    buffer_views: &mut Vec<serde_json::Value>,
    accessors: &mut Vec<serde_json::Value>,
    materials: &mut Vec<Material>,
) -> Vec<serde_json::Value> {
    let vertex_count = mesh.vertex_count();
    let mut positions: Vec<f32> = Vec::with_capacity(vertex_count * 3);
    let mut normals: Vec<f32> = Vec::with_capacity(vertex_count * 3);
    let mut pos_min = [f32::MAX; 3];
    let mut pos_max = [f32::MIN; 3];

    for vertex in mesh.vertices.chunks_exact(STRIDE) {
        positions.extend_from_slice(&vertex[..3]);
        normals.extend_from_slice(&vertex[3..6]);
        for axis in 0..3 {
            pos_min[axis] = pos_min[axis].min(vertex[axis]);
            pos_max[axis] = pos_max[axis].max(vertex[axis]);
        }
    }

    let mut push_view = |bytes: Vec<u8>, target: u32| {
        let offset = bin_data.len();
        bin_data.extend_from_slice(&bytes);
        bin_data.resize(offset + bytes.len().div_ceil(4) * 4, 0);
        buffer_views.push(serde_json::json!({
            "buffer": 0,
            "byteOffset": offset,
            "byteLength": bytes.len(),
            "target": target
        }));
        buffer_views.len() - 1
    };
    let pos_view = push_view(le_bytes(&positions, f32::to_le_bytes), ARRAY_BUFFER);
    let norm_view = push_view(le_bytes(&normals, f32::to_le_bytes), ARRAY_BUFFER);
    let idx_view = push_view(le_bytes(&mesh.indices, u32::to_le_bytes), ELEMENT_ARRAY_BUFFER);

    accessors.push(serde_json::json!({
        "bufferView": pos_view,
        "byteOffset": 0,
        "componentType": FLOAT,
        "count": vertex_count,
        "type": "VEC3",
        "min": pos_min,
        "max": pos_max
    }));
    let pos_acc = accessors.len() - 1;
    accessors.push(serde_json::json!({
        "bufferView": norm_view,
        "byteOffset": 0,
        "componentType": FLOAT,
        "count": vertex_count,
        "type": "VEC3"
    }));
    let norm_acc = accessors.len() - 1;

    let mut primitives = Vec::new();
    for group in &mesh.groups {
        let Some(material) = mesh.materials.get(group.material as usize) else {
            continue;
        };
        let material_index = match materials.iter().position(|m| m == material) {
            Some(i) => i,
            None => {
                materials.push(material.clone());
                materials.len() - 1
            }
        };
        accessors.push(serde_json::json!({
            "bufferView": idx_view,
            "byteOffset": group.start as usize * 4,
            "componentType": UNSIGNED_INT,
            "count": group.count,
            "type": "SCALAR"
        }));
        primitives.push(serde_json::json!({
            "attributes": {
                "POSITION": pos_acc,
                "NORMAL": norm_acc
            },
            "indices": accessors.len() - 1,
            "material": material_index
        }));
    }
    primitives
}

fn le_bytes<T: Copy, const N: usize>(data: &[T], encode: fn(T) -> [u8; N]) -> Vec<u8> {
    data.iter().flat_map(|&v| encode(v)).collect()
}
