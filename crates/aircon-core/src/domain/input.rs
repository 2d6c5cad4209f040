//! Validated request shape for the decision engine.

use std::fmt;
use std::str::FromStr;

use aircon_state::{CaseKey, Movement, TimeOfDay};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::ValidationError;

/// Physical form of the indoor unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcType {
    #[serde(rename = "Window AC")]
    Window,
    #[serde(rename = "Split AC")]
    Split,
    #[serde(rename = "Cassette AC")]
    Cassette,
    #[serde(rename = "Portable AC")]
    Portable,
}

impl fmt::Display for AcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcType::Window => write!(f, "Window AC"),
            AcType::Split => write!(f, "Split AC"),
            AcType::Cassette => write!(f, "Cassette AC"),
            AcType::Portable => write!(f, "Portable AC"),
        }
    }
}

/// Lowercase alphanumerics only, so "Split AC", "split-ac" and "SPLIT" compare equal
/// once the trailing noun is stripped.
fn normalize(s: &str, suffix: &str) -> String {
    let folded: String = s
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    folded
        .strip_suffix(suffix)
        .map(str::to_string)
        .unwrap_or(folded)
}

impl FromStr for AcType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s, "ac").as_str() {
            "window" => Ok(AcType::Window),
            "split" => Ok(AcType::Split),
            "cassette" => Ok(AcType::Cassette),
            "portable" => Ok(AcType::Portable),
            _ => Err(ValidationError::UnknownAcType {
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompressorType {
    #[serde(rename = "Reciprocating Compressor")]
    Reciprocating,
    #[serde(rename = "Inverter Rotary Compressor")]
    InverterRotary,
    #[serde(rename = "Fixed Speed Rotary Compressor")]
    FixedSpeedRotary,
    #[serde(rename = "Scroll Compressor")]
    Scroll,
}

impl fmt::Display for CompressorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressorType::Reciprocating => write!(f, "Reciprocating Compressor"),
            CompressorType::InverterRotary => write!(f, "Inverter Rotary Compressor"),
            CompressorType::FixedSpeedRotary => write!(f, "Fixed Speed Rotary Compressor"),
            CompressorType::Scroll => write!(f, "Scroll Compressor"),
        }
    }
}

impl FromStr for CompressorType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s, "compressor").as_str() {
            "reciprocating" => Ok(CompressorType::Reciprocating),
            "inverterrotary" => Ok(CompressorType::InverterRotary),
            "fixedspeedrotary" => Ok(CompressorType::FixedSpeedRotary),
            "scroll" => Ok(CompressorType::Scroll),
            _ => Err(ValidationError::UnknownCompressor {
                value: s.to_string(),
            }),
        }
    }
}

/// Where the occupants sit, as clock-face hours seen from the unit.
///
/// Text form: `11o` for one occupant, `11o,2o` for several. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position(Vec<u8>);

impl Position {
    /// Build from clock hours (1..=12).
    pub fn new(hours: Vec<u8>) -> Result<Self, ValidationError> {
        if hours.is_empty() || hours.iter().any(|h| !(1..=12).contains(h)) {
            return Err(ValidationError::InvalidPosition {
                value: format!("{hours:?}"),
            });
        }
        Ok(Self(hours))
    }

    pub fn hours(&self) -> &[u8] {
        &self.0
    }

    /// The only hour when exactly one occupant was placed.
    pub fn single(&self) -> Option<u8> {
        match self.0.as_slice() {
            [hour] => Some(*hour),
            _ => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<String> = self.0.iter().map(|h| format!("{h}o")).collect();
        f.write_str(&tokens.join(","))
    }
}

impl FromStr for Position {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidPosition {
            value: s.to_string(),
        };
        let hours = s
            .split(',')
            .map(|token| {
                let digits = token
                    .trim()
                    .strip_suffix(['o', 'O'])
                    .filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))
                    .ok_or_else(invalid)?;
                digits.parse::<u8>().map_err(|_| invalid())
            })
            .collect::<Result<Vec<u8>, _>>()?;
        Position::new(hours).map_err(|_| invalid())
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Everything the engine needs for one decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRecord {
    /// Room temperature (°C)
    pub room_temp: f64,
    /// Relative humidity (%)
    pub humidity: f64,
    pub num_people: u32,
    pub movement: Movement,
    pub timing: TimeOfDay,
    pub position: Position,
    pub ac_type: AcType,
    pub compressor_options: CompressorType,
    /// Cooling capacity rating (tons)
    pub tonnage: f64,
    /// Seasonal efficiency rating, used as a divisor
    pub iseer: f64,
    /// Other heat sources in the room (W)
    pub external_heat: f64,
    /// Floor area (sq ft)
    pub room_size: f64,
    /// Daily energy budget (kWh)
    pub affordable_units: f64,
}

impl InputRecord {
    /// Check numeric invariants. Enum and text fields are already valid by
    /// construction.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let finite = [
            ("room_temp", self.room_temp),
            ("humidity", self.humidity),
            ("tonnage", self.tonnage),
            ("iseer", self.iseer),
            ("external_heat", self.external_heat),
            ("room_size", self.room_size),
            ("affordable_units", self.affordable_units),
        ];
        if let Some((field, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ValidationError::NonFinite {
                field,
                value: *value,
            });
        }

        if !(0.0..=100.0).contains(&self.humidity) {
            return Err(ValidationError::OutOfRange {
                field: "humidity",
                constraint: "between 0 and 100",
                value: self.humidity,
            });
        }
        let positive = [
            ("tonnage", self.tonnage),
            ("iseer", self.iseer),
            ("room_size", self.room_size),
            ("affordable_units", self.affordable_units),
        ];
        if let Some((field, value)) = positive.iter().find(|(_, v)| *v <= 0.0) {
            return Err(ValidationError::OutOfRange {
                field,
                constraint: "> 0",
                value: *value,
            });
        }
        if self.external_heat < 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "external_heat",
                constraint: ">= 0",
                value: self.external_heat,
            });
        }
        Ok(())
    }

    /// The similarity key stored alongside each cached decision.
    pub fn case_key(&self) -> CaseKey {
        CaseKey {
            room_temp: self.room_temp,
            humidity: self.humidity,
            num_people: self.num_people,
            movement: self.movement,
            timing: self.timing,
        }
    }
}
