//! Behavioral scenarios checked through the public API: plan in, scene graph
//! (or the intermediate wall/opening/stair results) out.

use floorplan3d::build::{
    build_stair, floor_height, match_connections, place_rooms, render, resolve_opening,
    resolve_walls, BuildOptions, CsgMode, StairContext, WallOpening,
};
use floorplan3d::export::build_glb;
use floorplan3d::fixtures::*;
use floorplan3d::mesh::MeshData;
use floorplan3d::units::normalize;
use floorplan3d::validation::MeshValidator;
use floorplan3d::{NodeKind, Warning};
use glam::Vec3;
use shared::*;

fn pieces() -> BuildOptions {
    BuildOptions {
        csg: CsgMode::Pieces,
        ..Default::default()
    }
}

/// Run the wall pipeline by hand and resolve the opening on `segment`
fn opening_on(p: &Floorplan, segment: &str) -> WallOpening {
    let p = normalize(p).unwrap();
    let floor = &p.floors[0];
    let rooms = place_rooms(floor, floor_height(floor, &p.config));
    let (segments, _) = resolve_walls(&floor.name, &rooms, &p.config);
    let (matches, _) = match_connections(floor, &rooms, &segments).unwrap();
    let seg = segments.iter().find(|s| s.id == segment).unwrap();
    resolve_opening(&matches[segment], seg, &p.config).unwrap()
}

/// Materials of the triangles facing along `dir`
fn materials_facing(mesh: &MeshData, dir: Vec3) -> Vec<String> {
    let mut names: Vec<String> = (0..mesh.triangle_count())
        .filter(|&t| mesh.normal(mesh.indices[t * 3] as usize).dot(dir) > 0.99)
        .filter_map(|t| mesh.triangle_material(t).map(|m| m.name.clone()))
        .collect();
    names.sort();
    names.dedup();
    names
}

fn shared_wall_plan() -> Floorplan {
    let mut a = room("a", 0.0, 0.0, 4.0, 4.0);
    a.material = Some("tile".into());
    let mut b = room("b", 4.0, 0.0, 4.0, 4.0);
    b.material = Some("paint".into());
    plan(vec![floor("ground", vec![a, b])])
}

#[test]
fn test_shared_wall_is_one_volume_with_two_faces() {
    let graph = render(&shared_wall_plan(), pieces()).unwrap();
    let on_shared_line: Vec<_> = graph
        .nodes_of_kind(NodeKind::Wall)
        .filter(|n| {
            let (min, max) = n.mesh.bounds().unwrap();
            min.x > 3.9 && max.x < 4.1
        })
        .collect();
    assert_eq!(on_shared_line.len(), 1);

    let wall = on_shared_line[0];
    assert_eq!(wall.name, "wall:a.right.0");
    assert_eq!(wall.source.rooms, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(materials_facing(&wall.mesh, Vec3::NEG_X), vec!["tile"]);
    assert_eq!(materials_facing(&wall.mesh, Vec3::X), vec!["paint"]);
}

#[test]
fn test_explicit_door_centered_on_shared_wall() {
    let mut ground = floor(
        "ground",
        vec![room("a", 0.0, 0.0, 4.0, 4.0), room("b", 4.0, 0.0, 4.0, 4.0)],
    );
    ground.connections.push(sized_connection(
        ConnectionKind::Door,
        WallRef::new("a", WallDirection::Right),
        WallRef::new("b", WallDirection::Left),
        1.0,
        OpeningHeight::Exact(Length::meters(2.1)),
    ));
    let p = plan(vec![ground]);

    let opening = opening_on(&p, "a.right.0");
    assert!((opening.center - 2.0).abs() < 1e-9);
    assert!((opening.width - 1.0).abs() < 1e-9);
    assert!((opening.height - 2.1).abs() < 1e-9);
    assert_eq!(opening.sill, 0.0);

    for options in [pieces(), BuildOptions::default()] {
        let graph = render(&p, options).unwrap();
        let wall = graph.floors[0].node("wall:a.right.0").unwrap();
        let area = MeshValidator::new(&wall.mesh).projected_area(Vec3::NEG_X);
        assert!((area - (12.0 - 2.1)).abs() < 1e-3, "area {}", area);
        assert_eq!(graph.nodes_of_kind(NodeKind::Door).count(), 1);
    }
}

#[test]
fn test_full_height_opening_spans_tall_room() {
    let mut a = room("a", 0.0, 0.0, 4.0, 4.0);
    a.height = Some(Length::meters(3.35));
    let mut b = room("b", 4.0, 0.0, 4.0, 4.0);
    b.height = Some(Length::meters(3.35));
    let mut ground = floor("ground", vec![a, b]);
    ground.connections.push(sized_connection(
        ConnectionKind::Opening,
        WallRef::new("a", WallDirection::Right),
        WallRef::new("b", WallDirection::Left),
        1.0,
        OpeningHeight::Full,
    ));
    let p = plan(vec![ground]);

    let opening = opening_on(&p, "a.right.0");
    assert!((opening.height - 3.35).abs() < 1e-9);
    assert_eq!(opening.sill, 0.0);

    let graph = render(&p, pieces()).unwrap();
    let wall = graph.floors[0].node("wall:a.right.0").unwrap();
    let v = MeshValidator::new(&wall.mesh);
    assert!((v.dimensions()[1] - 3.35).abs() < 1e-4);
    assert!((v.projected_area(Vec3::NEG_X) - (4.0 * 3.35 - 3.35)).abs() < 1e-3);
    // a plain opening has no leaf
    assert_eq!(graph.nodes_of_kind(NodeKind::Door).count(), 0);
}

#[test]
fn test_bidirectional_door_pair_yields_one_door() {
    let mut ground = two_rooms_with_door();
    ground
        .connections
        .push(door("b", WallDirection::Left, "a", WallDirection::Right));
    let graph = render(&plan(vec![ground]), BuildOptions::default()).unwrap();

    assert_eq!(graph.nodes_of_kind(NodeKind::Door).count(), 1);
    assert_eq!(graph.warnings.len(), 1);
    match &graph.warnings[0] {
        Warning::DuplicateConnection { segment, .. } => assert_eq!(segment, "a.right.0"),
        other => panic!("unexpected warning {:?}", other),
    }
}

#[test]
fn test_custom_stair_with_two_landings() {
    let mut s = stair(
        "main",
        StairShape::Custom {
            segments: vec![
                flight(5),
                landing(TurnDirection::Left),
                flight(6),
                landing(TurnDirection::Left),
                flight(5),
            ],
        },
    );
    s.rise = Some(Length::meters(3.2));
    let mut ground = floor("ground", vec![room("hall", 0.0, 0.0, 6.0, 4.0)]);
    ground.stairs.push(s.clone());
    let p = plan(vec![ground]);

    let rooms = place_rooms(&p.floors[0], 3.0);
    let ctx = StairContext {
        floor: "ground",
        rooms: &rooms,
        config: &p.config,
        base: 0.2,
        default_rise: 3.2,
        clear_height: 3.0,
    };
    let geo = build_stair(&s, &ctx).unwrap();
    assert_eq!(geo.treads, 16);
    assert_eq!(geo.landings, 2);
    assert_eq!(geo.risers, 18);
    assert!((geo.riser_height - 3.2 / 18.0).abs() < 1e-9);
    let f = geo.footprint;
    for (got, want) in [(f.x0, 0.5), (f.y0, 0.5), (f.x1, 4.18), (f.y1, 2.9)] {
        assert!((got - want).abs() < 1e-6, "{:?}", f);
    }

    let graph = render(&p, BuildOptions::default()).unwrap();
    let node = graph.floors[0].node("stair:main").unwrap();
    let (min, max) = node.mesh.bounds().unwrap();
    assert!((min.x - 0.5).abs() < 1e-4 && (max.z - 2.9).abs() < 1e-4);
    assert!((max.y - 3.4).abs() < 1e-4);
}

#[test]
fn test_straight_stair_riser_count_from_rise() {
    let mut s = stair("main", StairShape::Straight);
    s.rise = Some(Length::meters(3.0));
    let p = plan(vec![floor("ground", vec![room("hall", 0.0, 0.0, 3.0, 6.0)])]);
    let rooms = place_rooms(&p.floors[0], 3.0);
    let ctx = StairContext {
        floor: "ground",
        rooms: &rooms,
        config: &p.config,
        base: 0.2,
        default_rise: 3.2,
        clear_height: 3.0,
    };
    let geo = build_stair(&s, &ctx).unwrap();
    assert_eq!(geo.risers, 16);
    assert!((geo.riser_height - 0.1875).abs() < 1e-9);
    assert!(geo.riser_height <= 0.197);
}

#[test]
fn test_face_materials_survive_export() {
    let graph = render(&shared_wall_plan(), BuildOptions::default()).unwrap();
    let glb = build_glb(&graph);
    let json_len = u32::from_le_bytes([glb[12], glb[13], glb[14], glb[15]]) as usize;
    let json: serde_json::Value = serde_json::from_slice(&glb[20..20 + json_len]).unwrap();
    let names: Vec<&str> = json["materials"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["name"].as_str())
        .collect();
    for expected in ["tile", "paint", "concrete"] {
        assert!(names.contains(&expected), "{} missing from {:?}", expected, names);
    }
}
