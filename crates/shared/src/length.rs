use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Единица измерения длины
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Meters,
    Feet,
    Centimeters,
    Inches,
    Millimeters,
}

impl Unit {
    /// Распознать единицу по символу ("m", "ft", "cm", "in", "mm") или полному имени
    pub fn from_symbol(symbol: &str) -> Option<Unit> {
        match symbol.trim().to_ascii_lowercase().as_str() {
            "m" | "meter" | "meters" => Some(Unit::Meters),
            "ft" | "foot" | "feet" => Some(Unit::Feet),
            "cm" | "centimeter" | "centimeters" => Some(Unit::Centimeters),
            "in" | "inch" | "inches" => Some(Unit::Inches),
            "mm" | "millimeter" | "millimeters" => Some(Unit::Millimeters),
            _ => None,
        }
    }

    /// Каноническое сокращение
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Meters => "m",
            Unit::Feet => "ft",
            Unit::Centimeters => "cm",
            Unit::Inches => "in",
            Unit::Millimeters => "mm",
        }
    }

    /// Множитель перевода в метры
    pub fn meters_factor(&self) -> f64 {
        match self {
            Unit::Meters => 1.0,
            Unit::Feet => 0.3048,
            Unit::Centimeters => 0.01,
            Unit::Inches => 0.0254,
            Unit::Millimeters => 0.001,
        }
    }
}

fn default_unit() -> String {
    Unit::Meters.symbol().to_string()
}

/// Длина с единицей измерения, как её выдал парсер.
///
/// Единица хранится строкой: нераспознанный символ должен дойти до
/// нормализатора и стать ошибкой `InvalidUnit`, а не потеряться при
/// десериализации.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Length {
    pub value: f64,
    #[serde(default = "default_unit")]
    pub unit: String,
}

impl Length {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self {
            value,
            unit: unit.symbol().to_string(),
        }
    }

    /// Длина в метрах
    pub fn meters(value: f64) -> Self {
        Self::new(value, Unit::Meters)
    }

    /// Распознанная единица (None для неизвестного символа)
    pub fn parsed_unit(&self) -> Option<Unit> {
        Unit::from_symbol(&self.unit)
    }

    /// Значение в метрах, если единица известна
    pub fn to_meters(&self) -> Option<f64> {
        self.parsed_unit().map(|u| self.value * u.meters_factor())
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

/// Ошибка разбора строки вида "3.35m"
#[derive(Debug, Clone, PartialEq)]
pub struct LengthParseError(pub String);

impl fmt::Display for LengthParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid length literal '{}'", self.0)
    }
}

impl std::error::Error for LengthParseError {}

impl FromStr for Length {
    type Err = LengthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(trimmed.len());
        let (number, unit) = trimmed.split_at(split);
        let value: f64 = number
            .trim()
            .parse()
            .map_err(|_| LengthParseError(s.to_string()))?;
        let unit = unit.trim();
        Ok(Length {
            value,
            unit: if unit.is_empty() {
                default_unit()
            } else {
                unit.to_string()
            },
        })
    }
}
