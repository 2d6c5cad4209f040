//! Persisted record shapes: the case key, the decision output, and the
//! case entry pairing them.
//!
//! Every field round-trips losslessly through the store backends so that a
//! replayed similarity test sees exactly what the original request saw.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::RecordError;

// ---------------------------------------------------------------------------
// Key fields
// ---------------------------------------------------------------------------

/// Whether occupants were seen moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Movement {
    Yes,
    No,
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Movement::Yes => write!(f, "Yes"),
            Movement::No => write!(f, "No"),
        }
    }
}

impl FromStr for Movement {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(Movement::Yes),
            "no" => Ok(Movement::No),
            _ => Err(RecordError::InvalidMovement {
                value: s.to_string(),
            }),
        }
    }
}

/// Wall-clock time of day with minute resolution.
///
/// Text form is 24h `HH:MM`; that is also the persisted form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Result<Self, RecordError> {
        if hour > 23 || minute > 59 {
            return Err(RecordError::InvalidTiming {
                value: format!("{hour}:{minute}"),
            });
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Night window used by the sleep override: 21:00 through 05:59.
    pub fn is_night(&self) -> bool {
        self.hour >= 21 || self.hour < 6
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RecordError::InvalidTiming {
            value: s.to_string(),
        };
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        let all_digits = |p: &str| !p.is_empty() && p.len() <= 2 && p.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(h) || !all_digits(m) {
            return Err(invalid());
        }
        let hour: u8 = h.parse().map_err(|_| invalid())?;
        let minute: u8 = m.parse().map_err(|_| invalid())?;
        TimeOfDay::new(hour, minute).map_err(|_| invalid())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Output fields
// ---------------------------------------------------------------------------

/// Operating mode of the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "Cool Mode")]
    Cool,
    #[serde(rename = "Dry Mode")]
    Dry,
    #[serde(rename = "Eco Mode")]
    Eco,
    #[serde(rename = "Sleep Mode")]
    Sleep,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Cool => write!(f, "Cool Mode"),
            Mode::Dry => write!(f, "Dry Mode"),
            Mode::Eco => write!(f, "Eco Mode"),
            Mode::Sleep => write!(f, "Sleep Mode"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FanSpeed {
    Low,
    Medium,
    High,
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FanSpeed::Low => write!(f, "Low"),
            FanSpeed::Medium => write!(f, "Medium"),
            FanSpeed::High => write!(f, "High"),
        }
    }
}

/// Louvre setting for the airflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlapDirection {
    Left,
    Middle,
    Right,
    Rotate,
}

impl fmt::Display for FlapDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlapDirection::Left => write!(f, "Left"),
            FlapDirection::Middle => write!(f, "Middle"),
            FlapDirection::Right => write!(f, "Right"),
            FlapDirection::Rotate => write!(f, "Rotate"),
        }
    }
}

/// Recommended configuration produced by the decision engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    /// Room temperature the decision was made for (°C)
    pub room_temp: f64,
    /// Relative humidity the decision was made for (%)
    pub humidity: f64,
    /// Target set-point (°C)
    pub suggested_ac_temp: f64,
    pub mode: Mode,
    pub fan_speed: FanSpeed,
    pub flap_direction: FlapDirection,
    /// Estimated daily draw (kWh)
    pub estimated_units_per_day: f64,
}

// ---------------------------------------------------------------------------
// Case memory
// ---------------------------------------------------------------------------

/// The subset of a request used to recognise a recurring situation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseKey {
    pub room_temp: f64,
    pub humidity: f64,
    pub num_people: u32,
    pub movement: Movement,
    pub timing: TimeOfDay,
}

/// How far apart two keys may be and still count as the same situation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityTolerance {
    /// Maximum absolute room temperature difference (°C, inclusive)
    pub room_temp: f64,
    /// Maximum absolute humidity difference (%, inclusive)
    pub humidity: f64,
}

impl Default for SimilarityTolerance {
    fn default() -> Self {
        Self {
            room_temp: 1.0,
            humidity: 5.0,
        }
    }
}

impl CaseKey {
    /// True when `self` (a stored key) matches `probe`.
    ///
    /// Occupancy and movement must be equal; timing is compared on the hour
    /// only.
    pub fn is_similar(&self, probe: &CaseKey, tolerance: &SimilarityTolerance) -> bool {
        (self.room_temp - probe.room_temp).abs() <= tolerance.room_temp
            && (self.humidity - probe.humidity).abs() <= tolerance.humidity
            && self.num_people == probe.num_people
            && self.movement == probe.movement
            && self.timing.hour() == probe.timing.hour()
    }
}

/// One immutable (key, output) pair in the case log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseEntry {
    /// Unique entry id (UUID v4)
    pub id: String,
    /// When the entry was appended
    pub recorded_at: DateTime<Utc>,
    pub key: CaseKey,
    pub output: OutputRecord,
}

impl CaseEntry {
    /// Create a new entry stamped with a fresh id and the current time.
    pub fn new(key: CaseKey, output: OutputRecord) -> Self {
        CaseEntry {
            id: Uuid::new_v4().to_string(),
            recorded_at: Utc::now(),
            key,
            output,
        }
    }
}

/// First entry, in iteration order, whose key is similar to `probe`.
pub fn find_similar<'a, I>(
    entries: I,
    probe: &CaseKey,
    tolerance: &SimilarityTolerance,
) -> Option<&'a CaseEntry>
where
    I: IntoIterator<Item = &'a CaseEntry>,
{
    entries
        .into_iter()
        .find(|entry| entry.key.is_similar(probe, tolerance))
}
