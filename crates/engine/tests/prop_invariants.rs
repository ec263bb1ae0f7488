use floorplan3d::build::{match_connections, place_rooms, resolve_walls};
use floorplan3d::fixtures::{door, floor, plan, room};
use floorplan3d::units::normalize;
use floorplan3d::Warning;
use proptest::prelude::*;
use shared::*;

fn arb_unit() -> impl Strategy<Value = Unit> {
    prop_oneof![
        Just(Unit::Meters),
        Just(Unit::Feet),
        Just(Unit::Centimeters),
        Just(Unit::Inches),
        Just(Unit::Millimeters),
    ]
}

fn arb_length() -> impl Strategy<Value = Length> {
    (0.1f64..500.0, arb_unit()).prop_map(|(v, u)| Length::new(v, u))
}

/// Room whose position and size each carry their own unit
fn arb_room(name: String) -> impl Strategy<Value = Room> {
    (arb_length(), arb_length(), arb_length(), arb_length()).prop_map(move |(x, y, w, d)| Room {
        position: Point { x, y },
        size: Size { width: w, depth: d },
        ..room(&name, 0.0, 0.0, 0.0, 0.0)
    })
}

/// Rooms on an integer grid, named r0..rn, together with a shuffled copy
fn arb_grid_rooms() -> impl Strategy<Value = (Vec<Room>, Vec<Room>)> {
    prop::collection::vec((0u8..6, 0u8..6, 1u8..4, 1u8..4), 1..6).prop_flat_map(|cells| {
        let rooms: Vec<Room> = cells
            .iter()
            .enumerate()
            .map(|(i, &(x, y, w, d))| room(&format!("r{i}"), x as f64, y as f64, w as f64, d as f64))
            .collect();
        (Just(rooms.clone()), Just(rooms).prop_shuffle())
    })
}

/// A row of 3x3 rooms and doors between random neighbours, in random order
/// and direction
fn arb_row_with_doors() -> impl Strategy<Value = Floor> {
    (2usize..5).prop_flat_map(|n| {
        prop::collection::vec((0..n - 1, any::<bool>(), 5.0f64..95.0), 1..8).prop_map(
            move |doors| {
                let rooms = (0..n)
                    .map(|i| room(&format!("r{i}"), 3.0 * i as f64, 0.0, 3.0, 3.0))
                    .collect();
                let mut f = floor("ground", rooms);
                for (i, forward, position) in doors {
                    let (a, b) = (format!("r{i}"), format!("r{}", i + 1));
                    let mut c = if forward {
                        door(&a, WallDirection::Right, &b, WallDirection::Left)
                    } else {
                        door(&b, WallDirection::Left, &a, WallDirection::Right)
                    };
                    c.position = position;
                    f.connections.push(c);
                }
                f
            },
        )
    })
}

proptest! {
    #[test]
    fn prop_normalize_is_idempotent(room in arb_room("a".into()), thickness in arb_length()) {
        let mut p = plan(vec![floor("ground", vec![room.clone()])]);
        p.config.wall_thickness = thickness.clone();

        let once = normalize(&p).unwrap();
        let twice = normalize(&once).unwrap();
        prop_assert_eq!(&once, &twice);

        let placed = &once.floors[0].rooms[0];
        prop_assert_eq!(placed.size.width.unit.as_str(), "m");
        prop_assert!((placed.size.width.value - room.size.width.to_meters().unwrap()).abs() < 1e-12);
        prop_assert!((once.config.wall_thickness.value - thickness.to_meters().unwrap()).abs() < 1e-12);
    }

    #[test]
    fn prop_wall_ownership_ignores_declaration_order((rooms, shuffled) in arb_grid_rooms()) {
        let config = Config::default();
        let a = place_rooms(&floor("ground", rooms), 3.0);
        let b = place_rooms(&floor("ground", shuffled), 3.0);

        let (segments_a, warnings_a) = resolve_walls("ground", &a, &config);
        let (segments_b, warnings_b) = resolve_walls("ground", &b, &config);
        prop_assert_eq!(segments_a, segments_b);
        prop_assert_eq!(warnings_a, warnings_b);
    }

    #[test]
    fn prop_every_door_matched_or_reported(f in arb_row_with_doors()) {
        let config = Config::default();
        let rooms = place_rooms(&f, 3.0);
        let (segments, _) = resolve_walls("ground", &rooms, &config);

        let (matches, warnings) = match_connections(&f, &rooms, &segments).unwrap();
        let again = match_connections(&f, &rooms, &segments).unwrap();
        prop_assert_eq!(&matches, &again.0);
        prop_assert_eq!(&warnings, &again.1);

        let duplicates = warnings
            .iter()
            .filter(|w| matches!(w, Warning::DuplicateConnection { .. }))
            .count();
        prop_assert_eq!(matches.len() + duplicates, f.connections.len());
        for id in matches.keys() {
            prop_assert!(segments.iter().any(|s| &s.id == id && !s.open));
        }
    }
}
