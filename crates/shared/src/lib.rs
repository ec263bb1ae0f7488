use serde::{Deserialize, Serialize};

mod length;

pub use length::{Length, LengthParseError, Unit};

/// Имя комнаты (уникально в пределах этажа)
pub type RoomName = String;

/// Точка на плане этажа
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: Length,
    pub y: Length,
}

impl Point {
    pub fn meters(x: f64, y: f64) -> Self {
        Self {
            x: Length::meters(x),
            y: Length::meters(y),
        }
    }
}

/// Размер прямоугольника на плане (ширина по X, глубина по Y)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: Length,
    pub depth: Length,
}

impl Size {
    pub fn meters(width: f64, depth: f64) -> Self {
        Self {
            width: Length::meters(width),
            depth: Length::meters(depth),
        }
    }
}

/// Сторона комнаты
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallDirection {
    /// Минимальный Y на плане
    Top,
    /// Максимальный Y на плане
    Bottom,
    /// Минимальный X на плане
    Left,
    /// Максимальный X на плане
    Right,
}

impl WallDirection {
    pub const ALL: [WallDirection; 4] = [
        WallDirection::Top,
        WallDirection::Bottom,
        WallDirection::Left,
        WallDirection::Right,
    ];

    pub fn opposite(&self) -> WallDirection {
        match self {
            WallDirection::Top => WallDirection::Bottom,
            WallDirection::Bottom => WallDirection::Top,
            WallDirection::Left => WallDirection::Right,
            WallDirection::Right => WallDirection::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WallDirection::Top => "top",
            WallDirection::Bottom => "bottom",
            WallDirection::Left => "left",
            WallDirection::Right => "right",
        }
    }
}

/// Тип стены
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallKind {
    #[default]
    Solid,
    Door,
    Window,
    Open,
}

/// Высота проёма: явная или "full" (от пола до потолка)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpeningHeight {
    Full,
    Exact(Length),
}

/// Описание одной стены комнаты
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WallSpec {
    #[serde(default)]
    pub kind: WallKind,
    /// Положение проёма в процентах длины стены (для door/window)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Length>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<OpeningHeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<Length>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
}

impl WallSpec {
    pub fn of_kind(kind: WallKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }
}

/// Стены комнаты по сторонам; None: стена не объявлена (сплошная по умолчанию)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Walls {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<WallSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<WallSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<WallSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<WallSpec>,
}

impl Walls {
    pub fn get(&self, dir: WallDirection) -> Option<&WallSpec> {
        match dir {
            WallDirection::Top => self.top.as_ref(),
            WallDirection::Bottom => self.bottom.as_ref(),
            WallDirection::Left => self.left.as_ref(),
            WallDirection::Right => self.right.as_ref(),
        }
    }

    pub fn get_mut(&mut self, dir: WallDirection) -> &mut Option<WallSpec> {
        match dir {
            WallDirection::Top => &mut self.top,
            WallDirection::Bottom => &mut self.bottom,
            WallDirection::Left => &mut self.left,
            WallDirection::Right => &mut self.right,
        }
    }
}

/// Комната; позиция вложенных комнат задаётся относительно родителя
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub name: RoomName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub position: Point,
    pub size: Size,
    #[serde(default)]
    pub walls: Walls,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Length>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_rooms: Vec<Room>,
}

/// Тип соединения между комнатами
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionKind {
    Door,
    DoubleDoor,
    Opening,
}

/// Направление открывания двери
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Swing {
    Left,
    #[default]
    Right,
}

/// Ссылка на стену комнаты
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WallRef {
    pub room: RoomName,
    pub wall: WallDirection,
}

impl WallRef {
    pub fn new(room: &str, wall: WallDirection) -> Self {
        Self {
            room: room.to_string(),
            wall,
        }
    }
}

fn default_position() -> f64 {
    50.0
}

/// Соединение (дверь/проём) между двумя стенами
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub from: WallRef,
    pub to: WallRef,
    pub kind: ConnectionKind,
    /// Положение центра проёма в процентах длины стены `from`
    #[serde(default = "default_position")]
    pub position: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Length>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<OpeningHeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swing: Option<Swing>,
    /// Имя комнаты, в которую открывается дверь
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opens_into: Option<RoomName>,
}

// ============================================================================
// Лестницы и лифты
// ============================================================================

/// Направление поворота марша
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnDirection {
    #[default]
    Left,
    Right,
}

/// Угол поворота: 90° или 180°
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnAngle {
    Quarter,
    Half,
}

impl TurnAngle {
    pub fn degrees(&self) -> f64 {
        match self {
            TurnAngle::Quarter => 90.0,
            TurnAngle::Half => 180.0,
        }
    }
}

/// Как оформлен поворот: площадка или забежные ступени
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnStyle {
    #[default]
    Landing,
    Winder { treads: u32 },
}

/// Привязка марша к стене комнаты
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallAlignment {
    pub room: RoomName,
    pub wall: WallDirection,
}

/// Сегмент произвольной лестницы
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StairSegment {
    /// Прямой марш из N ступеней
    Flight {
        steps: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<Length>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        align: Option<WallAlignment>,
    },
    /// Поворот на 90°/180°
    Turn {
        direction: TurnDirection,
        angle: TurnAngle,
        #[serde(default)]
        style: TurnStyle,
    },
}

/// Форма лестницы: пресет или последовательность сегментов
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StairShape {
    Straight,
    LShaped { turn: TurnDirection },
    UShaped { turn: TurnDirection },
    DoubleL { turn: TurnDirection },
    Spiral { turn: TurnDirection },
    Winder { turn: TurnDirection },
    Custom { segments: Vec<StairSegment> },
}

/// Тип косоура (определяет подступенки)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringerStyle {
    #[default]
    Closed,
    Open,
    Glass,
}

/// С каких сторон ставить перила
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandrailSides {
    None,
    Left,
    #[default]
    Right,
    Both,
}

/// Лестница
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stair {
    pub name: String,
    /// Начало первого марша (середина нижней ступени)
    pub position: Point,
    /// Направление подъёма в градусах; 0 = вдоль +Y плана
    #[serde(default)]
    pub rotation: f64,
    pub shape: StairShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rise: Option<Length>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Length>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_riser: Option<Length>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tread_depth: Option<Length>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headroom: Option<Length>,
    #[serde(default)]
    pub stringer: StringerStyle,
    #[serde(default)]
    pub handrail: HandrailSides,
}

/// Лифт
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lift {
    pub name: String,
    pub position: Point,
    pub size: Size,
    #[serde(default)]
    pub doors: Vec<WallDirection>,
}

/// Связь лестницы/лифта между этажами
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerticalConnection {
    /// Имя лестницы или лифта на этаже `from_floor`
    pub element: String,
    pub from_floor: String,
    pub to_floor: String,
}

/// Этаж
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Length>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub stairs: Vec<Stair>,
    #[serde(default)]
    pub lifts: Vec<Lift>,
}

// ============================================================================
// Конфигурация
// ============================================================================

/// Профиль строительных норм для проверки лестниц
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingCode {
    #[default]
    None,
    Residential,
    Commercial,
    Ada,
}

fn default_wall_thickness() -> Length {
    Length::meters(0.15)
}
fn default_slab_thickness() -> Length {
    Length::meters(0.2)
}
fn default_wall_height() -> Length {
    Length::meters(3.0)
}
fn default_door_width() -> Length {
    Length::meters(0.9)
}
fn default_door_height() -> Length {
    Length::meters(2.1)
}
fn default_double_door_width() -> Length {
    Length::meters(1.8)
}
fn default_window_width() -> Length {
    Length::meters(1.2)
}
fn default_window_height() -> Length {
    Length::meters(1.2)
}
fn default_window_sill() -> Length {
    Length::meters(0.9)
}
fn default_stair_width() -> Length {
    Length::meters(1.0)
}
fn default_max_riser() -> Length {
    Length::meters(0.197)
}
fn default_tread_depth() -> Length {
    Length::meters(0.28)
}
fn default_handrail_height() -> Length {
    Length::meters(0.9)
}
fn material(name: &str) -> String {
    name.to_string()
}
fn default_interior_material() -> String {
    material("plaster")
}
fn default_exterior_material() -> String {
    material("brick")
}
fn default_floor_material() -> String {
    material("concrete")
}
fn default_stair_material() -> String {
    material("wood")
}
fn default_glass_material() -> String {
    material("glass")
}
fn default_door_material() -> String {
    material("wood")
}
fn default_lift_material() -> String {
    material("steel")
}

/// Глобальные значения по умолчанию
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_wall_thickness")]
    pub wall_thickness: Length,
    #[serde(default = "default_slab_thickness")]
    pub slab_thickness: Length,
    #[serde(default = "default_wall_height")]
    pub wall_height: Length,
    #[serde(default = "default_door_width")]
    pub door_width: Length,
    #[serde(default = "default_door_height")]
    pub door_height: Length,
    #[serde(default = "default_double_door_width")]
    pub double_door_width: Length,
    #[serde(default = "default_window_width")]
    pub window_width: Length,
    #[serde(default = "default_window_height")]
    pub window_height: Length,
    #[serde(default = "default_window_sill")]
    pub window_sill: Length,
    #[serde(default = "default_stair_width")]
    pub stair_width: Length,
    #[serde(default = "default_max_riser")]
    pub max_riser: Length,
    #[serde(default = "default_tread_depth")]
    pub tread_depth: Length,
    #[serde(default = "default_handrail_height")]
    pub handrail_height: Length,
    #[serde(default)]
    pub building_code: BuildingCode,
    #[serde(default = "default_interior_material")]
    pub interior_material: String,
    #[serde(default = "default_exterior_material")]
    pub exterior_material: String,
    #[serde(default = "default_floor_material")]
    pub floor_material: String,
    #[serde(default = "default_stair_material")]
    pub stair_material: String,
    #[serde(default = "default_glass_material")]
    pub glass_material: String,
    #[serde(default = "default_door_material")]
    pub door_material: String,
    #[serde(default = "default_lift_material")]
    pub lift_material: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wall_thickness: default_wall_thickness(),
            slab_thickness: default_slab_thickness(),
            wall_height: default_wall_height(),
            door_width: default_door_width(),
            door_height: default_door_height(),
            double_door_width: default_double_door_width(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            window_sill: default_window_sill(),
            stair_width: default_stair_width(),
            max_riser: default_max_riser(),
            tread_depth: default_tread_depth(),
            handrail_height: default_handrail_height(),
            building_code: BuildingCode::default(),
            interior_material: default_interior_material(),
            exterior_material: default_exterior_material(),
            floor_material: default_floor_material(),
            stair_material: default_stair_material(),
            glass_material: default_glass_material(),
            door_material: default_door_material(),
            lift_material: default_lift_material(),
        }
    }
}

/// Полное описание здания, вход движка
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floorplan {
    pub floors: Vec<Floor>,
    #[serde(default)]
    pub config: Config,
    #[serde(default)]
    pub vertical_connections: Vec<VerticalConnection>,
}

impl Floorplan {
    /// Индекс этажа по имени
    pub fn floor_index(&self, name: &str) -> Option<usize> {
        self.floors.iter().position(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(val: &T) {
        let json = serde_json::to_string(val).expect("serialize");
        let back: T = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(*val, back);
    }

    fn room(name: &str, x: f64, y: f64, w: f64, d: f64) -> Room {
        Room {
            name: name.to_string(),
            label: None,
            position: Point::meters(x, y),
            size: Size::meters(w, d),
            walls: Walls::default(),
            height: None,
            material: None,
            sub_rooms: vec![],
        }
    }

    // --- Walls ---

    #[test]
    fn test_wall_direction_serde() {
        let json = serde_json::to_string(&WallDirection::Right).unwrap();
        assert_eq!(json, r#""right""#);
        for dir in WallDirection::ALL {
            roundtrip(&dir);
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }

    #[test]
    fn test_walls_get_mut() {
        let mut walls = Walls::default();
        *walls.get_mut(WallDirection::Left) = Some(WallSpec::of_kind(WallKind::Open));
        assert_eq!(walls.get(WallDirection::Left).unwrap().kind, WallKind::Open);
        assert!(walls.get(WallDirection::Right).is_none());
    }

    #[test]
    fn test_opening_height_serde() {
        let json = serde_json::to_string(&OpeningHeight::Full).unwrap();
        assert_eq!(json, r#""full""#);
        roundtrip(&OpeningHeight::Exact(Length::new(7.0, Unit::Feet)));
    }

    #[test]
    fn test_wall_spec_defaults_to_solid() {
        let spec: WallSpec = serde_json::from_str("{}").unwrap();
        assert_eq!(spec.kind, WallKind::Solid);
        assert!(spec.thickness.is_none());
    }

    // --- Rooms & connections ---

    #[test]
    fn test_room_serde() {
        let mut r = room("kitchen", 0.0, 0.0, 4.0, 3.0);
        r.walls.right = Some(WallSpec {
            kind: WallKind::Door,
            position: Some(30.0),
            ..Default::default()
        });
        r.sub_rooms.push(room("pantry", 0.0, 0.0, 1.0, 1.0));
        roundtrip(&r);
    }

    #[test]
    fn test_connection_position_defaults_to_center() {
        let json = r#"{
            "from": {"room": "a", "wall": "right"},
            "to": {"room": "b", "wall": "left"},
            "kind": "double_door"
        }"#;
        let c: Connection = serde_json::from_str(json).unwrap();
        assert_eq!(c.position, 50.0);
        assert_eq!(c.kind, ConnectionKind::DoubleDoor);
        assert!(c.swing.is_none());
    }

    // --- Stairs ---

    #[test]
    fn test_stair_shape_serde() {
        let shape = StairShape::LShaped {
            turn: TurnDirection::Right,
        };
        let json = serde_json::to_string(&shape).unwrap();
        assert!(json.contains(r#""type":"l_shaped""#));
        roundtrip(&shape);

        let json = serde_json::to_string(&StairShape::Straight).unwrap();
        assert_eq!(json, r#"{"type":"straight"}"#);
    }

    #[test]
    fn test_custom_stair_serde() {
        let shape = StairShape::Custom {
            segments: vec![
                StairSegment::Flight {
                    steps: 5,
                    width: Some(Length::new(36.0, Unit::Inches)),
                    align: Some(WallAlignment {
                        room: "hall".to_string(),
                        wall: WallDirection::Left,
                    }),
                },
                StairSegment::Turn {
                    direction: TurnDirection::Left,
                    angle: TurnAngle::Quarter,
                    style: TurnStyle::Winder { treads: 3 },
                },
            ],
        };
        roundtrip(&shape);
    }

    #[test]
    fn test_turn_style_defaults_to_landing() {
        let json = r#"{"type":"turn","direction":"left","angle":"half"}"#;
        let seg: StairSegment = serde_json::from_str(json).unwrap();
        match seg {
            StairSegment::Turn { style, angle, .. } => {
                assert_eq!(style, TurnStyle::Landing);
                assert_eq!(angle.degrees(), 180.0);
            }
            _ => panic!("Expected Turn"),
        }
    }

    #[test]
    fn test_deserialize_invalid_shape_fails() {
        let json = r#"{"type":"escalator"}"#;
        let result: Result<StairShape, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    // --- Config & plan ---

    #[test]
    fn test_config_defaults_from_empty_json() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.max_riser, Length::meters(0.197));
        assert_eq!(cfg.building_code, BuildingCode::None);
    }

    #[test]
    fn test_floorplan_serde() {
        let plan = Floorplan {
            floors: vec![Floor {
                name: "ground".to_string(),
                height: Some(Length::meters(3.35)),
                rooms: vec![room("a", 0.0, 0.0, 4.0, 4.0), room("b", 4.0, 0.0, 4.0, 4.0)],
                connections: vec![Connection {
                    from: WallRef::new("a", WallDirection::Right),
                    to: WallRef::new("b", WallDirection::Left),
                    kind: ConnectionKind::Door,
                    position: 50.0,
                    width: None,
                    height: Some(OpeningHeight::Full),
                    swing: Some(Swing::Left),
                    opens_into: Some("b".to_string()),
                }],
                stairs: vec![],
                lifts: vec![Lift {
                    name: "lift1".to_string(),
                    position: Point::meters(8.0, 0.0),
                    size: Size::meters(2.0, 2.0),
                    doors: vec![WallDirection::Bottom],
                }],
            }],
            config: Config::default(),
            vertical_connections: vec![],
        };
        roundtrip(&plan);
        assert_eq!(plan.floor_index("ground"), Some(0));
        assert_eq!(plan.floor_index("roof"), None);
    }

    #[test]
    fn test_deserialize_minimal_plan_from_json() {
        let json = r#"{
            "floors": [{
                "name": "ground",
                "rooms": [{
                    "name": "living",
                    "position": {"x": {"value": 0}, "y": {"value": 0}},
                    "size": {"width": {"value": 20, "unit": "ft"}, "depth": {"value": 15, "unit": "ft"}}
                }]
            }]
        }"#;
        let plan: Floorplan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.floors.len(), 1);
        assert_eq!(plan.floors[0].rooms[0].size.width.unit, "ft");
        assert_eq!(plan.config, Config::default());
    }
}
