//! Integration tests for the build pipeline.
//!
//! Tests end-to-end: Floorplan (in memory or JSON) -> SceneBuilder -> validate
//! mesh output and GLB export.

use floorplan3d::build::{render, BoxSplitBackend, BuildOptions, CsgMode, SceneBuilder};
use floorplan3d::export::build_glb;
use floorplan3d::fixtures::*;
use floorplan3d::validation::MeshValidator;
use floorplan3d::{NodeKind, RenderError, SceneGraph};
use glam::Vec3;
use shared::*;

fn house() -> Floorplan {
    let mut ground = two_rooms_with_door();
    ground.rooms[0].walls.top = Some(WallSpec::of_kind(WallKind::Window));
    ground.rooms.push(room("hall", 0.0, 4.0, 8.0, 4.5));
    let mut hall_door = door("hall", WallDirection::Top, "b", WallDirection::Bottom);
    hall_door.position = 75.0;
    ground.connections.push(hall_door);
    // runs along +x, turns right toward +y
    let mut s = stair("main", StairShape::LShaped { turn: TurnDirection::Right });
    s.position = Point::meters(0.8, 5.0);
    s.rotation = 90.0;
    ground.stairs.push(s);

    let upper = floor("first", vec![room("bed", 0.0, 0.0, 8.0, 8.5)]);
    let mut p = plan(vec![ground, upper]);
    p.vertical_connections.push(vertical("main", "ground", "first"));
    p
}

fn assert_valid(graph: &SceneGraph) {
    for node in graph.nodes() {
        let v = MeshValidator::new(&node.mesh);
        let errors = v.validate_all();
        assert!(errors.is_empty(), "{}: {:?}", node.name, errors);
        assert!(v.triangle_count() > 0, "{} is empty", node.name);
    }
}

#[test]
fn test_house_end_to_end() {
    let graph = render(&house(), BuildOptions::default()).unwrap();
    assert_valid(&graph);
    assert!(graph.warnings.is_empty(), "{:?}", graph.warnings);

    let ground = graph.floor("ground").unwrap();
    assert_eq!(ground.nodes_of_kind(NodeKind::Door).count(), 2);
    assert_eq!(ground.nodes_of_kind(NodeKind::Window).count(), 1);
    assert_eq!(ground.nodes_of_kind(NodeKind::Stair).count(), 1);
    assert_eq!(ground.nodes_of_kind(NodeKind::Slab).count(), 3);

    let first = graph.floor("first").unwrap();
    assert!((first.elevation - 3.2).abs() < 1e-9);
    // every upper node sits at or above the upper slab
    for node in &first.nodes {
        let (min, _) = node.mesh.bounds().unwrap();
        assert!(min.y >= 3.2 - 1e-4, "{} starts at {}", node.name, min.y);
    }
}

#[test]
fn test_json_floorplan_in_feet() {
    let json = r#"{
        "floors": [{
            "name": "ground",
            "rooms": [
                {"name": "a",
                 "position": {"x": {"value": 0, "unit": "ft"}, "y": {"value": 0, "unit": "ft"}},
                 "size": {"width": {"value": 12, "unit": "ft"}, "depth": {"value": 10, "unit": "ft"}},
                 "walls": {"right": {"kind": "door", "position": 50}}},
                {"name": "b",
                 "position": {"x": {"value": 12, "unit": "ft"}, "y": {"value": 0}},
                 "size": {"width": {"value": 10, "unit": "ft"}, "depth": {"value": 10, "unit": "ft"}}}
            ]
        }],
        "config": {"wall_thickness": {"value": 6, "unit": "in"}}
    }"#;
    let plan: Floorplan = serde_json::from_str(json).unwrap();
    let graph = render(&plan, BuildOptions::default()).unwrap();
    assert_valid(&graph);

    let wall = graph.floors[0].node("wall:a.right.0").unwrap();
    let v = MeshValidator::new(&wall.mesh);
    let dims = v.dimensions();
    assert!((dims[0] - 0.1524).abs() < 1e-4);
    assert!((dims[2] - 3.048).abs() < 1e-4);
    assert_eq!(graph.nodes_of_kind(NodeKind::Door).count(), 1);
}

#[test]
fn test_unknown_unit_aborts() {
    let mut p = plan(vec![two_rooms_with_door()]);
    p.floors[0].rooms[0].size.width = Length {
        value: 3.0,
        unit: "cubit".into(),
    };
    assert_eq!(
        render(&p, BuildOptions::default()),
        Err(RenderError::InvalidUnit("cubit".into()))
    );
}

#[test]
fn test_pieces_and_boolean_paths_agree_on_every_wall() {
    let p = house();
    let pieces = render(
        &p,
        BuildOptions {
            csg: CsgMode::Pieces,
            ..Default::default()
        },
    )
    .unwrap();
    let boolean = SceneBuilder::with_backend(BuildOptions::default(), Box::new(BoxSplitBackend))
        .build(&p)
        .unwrap();
    assert_valid(&boolean);

    for (a, b) in pieces
        .nodes_of_kind(NodeKind::Wall)
        .zip(boolean.nodes_of_kind(NodeKind::Wall))
    {
        assert_eq!(a.name, b.name);
        let (va, vb) = (MeshValidator::new(&a.mesh), MeshValidator::new(&b.mesh));
        assert_eq!(va.aabb(), vb.aabb());
        assert_eq!(va.material_names(), vb.material_names());
        for dir in [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z, Vec3::Y] {
            assert!(
                (va.projected_area(dir) - vb.projected_area(dir)).abs() < 1e-3,
                "{} {:?}",
                a.name,
                dir
            );
        }
    }
}

#[test]
fn test_renders_are_deterministic() {
    let p = house();
    let builder = SceneBuilder::new(BuildOptions::default());
    assert_eq!(builder.build(&p).unwrap(), builder.build(&p).unwrap());
}

#[test]
fn test_parallel_renders_share_builder() {
    let builder = SceneBuilder::new(BuildOptions::default());
    let p = house();
    let expected = builder.build(&p).unwrap();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4).map(|_| s.spawn(|| builder.build(&p).unwrap())).collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_scene_graph_serializes() {
    let graph = render(&house(), BuildOptions::default()).unwrap();
    let json = serde_json::to_string(&graph).unwrap();
    let back: SceneGraph = serde_json::from_str(&json).unwrap();
    assert_eq!(back.floors.len(), 2);
    assert_eq!(back.nodes().count(), graph.nodes().count());
}

#[test]
fn test_glb_export_of_house() {
    let graph = render(
        &house(),
        BuildOptions {
            exploded: 3.0,
            ..Default::default()
        },
    )
    .unwrap();
    let glb = build_glb(&graph);
    assert_eq!(&glb[0..4], b"glTF");
    assert_eq!(glb.len() % 4, 0);
}
