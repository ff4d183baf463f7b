use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fmt, str::FromStr};

use super::value::CellValue;

/// The seven lifecycle stages of a pursuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Unassigned,
    Assigned,
    Reviewed,
    Submitted,
    Skipped,
    Won,
    Lost,
}

impl Stage {
    /// Canonical display order, used by board columns and the `stages` command.
    pub const ALL: [Self; 7] = [
        Self::Unassigned,
        Self::Assigned,
        Self::Reviewed,
        Self::Submitted,
        Self::Skipped,
        Self::Won,
        Self::Lost,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unassigned => "unassigned",
            Self::Assigned => "assigned",
            Self::Reviewed => "reviewed",
            Self::Submitted => "submitted",
            Self::Skipped => "skipped",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }

    /// True for stages with no expected onward movement.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost | Self::Skipped)
    }
}

/// Priority banding. Ordered by `rank`, never lexically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    High,
    Normal,
    Low,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Normal
    }
}

impl Priority {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
        }
    }

    /// Fixed rank table used by the grid sort (0 sorts first ascending).
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Urgent => 0,
            Self::High => 1,
            Self::Normal => 2,
            Self::Low => 3,
        }
    }
}

/// A tracked pursuit record.
///
/// Records are owned by the external fetch layer and treated as read-mostly
/// here. The only sanctioned mutations are the stage write driven by the
/// transition coordinator and the cell write driven by a committed inline
/// edit, both of which require external confirmation before they are durable.
///
/// Unknown scalar fields are preserved via `#[serde(flatten)]` so fixture
/// files can carry columns this crate does not model explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkItem {
    pub id: String,
    pub title: String,
    pub stage: Stage,
    pub priority: Priority,
    pub owner: Option<String>,
    pub client: Option<String>,
    pub due_date: Option<chrono::NaiveDate>,
    /// Completion percentage. Kept within 0..=100 by [`Self::set_progress`]
    /// and clamped on deserialization; write through the setter.
    #[serde(deserialize_with = "deserialize_progress")]
    pub progress: u8,
    pub notes: String,
    pub budget: Option<f64>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub url: Option<String>,
    pub created_at_us: i64,
    pub updated_at_us: i64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for WorkItem {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            stage: Stage::Unassigned,
            priority: Priority::Normal,
            owner: None,
            client: None,
            due_date: None,
            progress: 0,
            notes: String::new(),
            budget: None,
            estimated_hours: None,
            actual_hours: None,
            url: None,
            created_at_us: 0,
            updated_at_us: 0,
            extra: BTreeMap::new(),
        }
    }
}

impl WorkItem {
    /// Set completion, clamping to 100.
    pub fn set_progress(&mut self, value: u8) {
        self.progress = value.min(100);
    }

    /// Look up the scalar value behind a column key.
    ///
    /// Keys not modeled as struct fields fall through to the `extra` map;
    /// a miss yields [`CellValue::Missing`] rather than an error so the grid
    /// can render sparse collections.
    #[must_use]
    pub fn value(&self, key: &str) -> CellValue {
        match key {
            "id" => CellValue::Text(self.id.clone()),
            "title" => CellValue::Text(self.title.clone()),
            "stage" => CellValue::Stage(self.stage),
            "priority" => CellValue::Priority(self.priority),
            "owner" => self
                .owner
                .clone()
                .map_or(CellValue::Missing, CellValue::UserRef),
            "client" => self
                .client
                .clone()
                .map_or(CellValue::Missing, CellValue::Text),
            "due_date" => self.due_date.map_or(CellValue::Missing, CellValue::Date),
            "progress" => CellValue::Progress(self.progress),
            "notes" => CellValue::Text(self.notes.clone()),
            "budget" => self.budget.map_or(CellValue::Missing, CellValue::Currency),
            "estimated_hours" => self
                .estimated_hours
                .map_or(CellValue::Missing, CellValue::Number),
            "actual_hours" => self
                .actual_hours
                .map_or(CellValue::Missing, CellValue::Number),
            "url" => self.url.clone().map_or(CellValue::Missing, CellValue::Link),
            _ => self
                .extra
                .get(key)
                .map_or(CellValue::Missing, CellValue::from_json),
        }
    }

    /// Write the scalar value behind a column key.
    ///
    /// Only the scalar fields reachable by inline editing are supported;
    /// `stage` deliberately is not (it moves through the coordinator).
    pub fn set_value(&mut self, key: &str, value: CellValue) -> Result<(), UnknownField> {
        match (key, value) {
            ("title", CellValue::Text(s)) => self.title = s,
            ("owner", CellValue::UserRef(s) | CellValue::Text(s)) => self.owner = Some(s),
            ("owner", CellValue::Missing) => self.owner = None,
            ("client", CellValue::Text(s)) => self.client = Some(s),
            ("client", CellValue::Missing) => self.client = None,
            ("due_date", CellValue::Date(d)) => self.due_date = Some(d),
            ("due_date", CellValue::Missing) => self.due_date = None,
            ("notes", CellValue::Text(s)) => self.notes = s,
            ("budget", CellValue::Currency(n) | CellValue::Number(n)) => self.budget = Some(n),
            ("budget", CellValue::Missing) => self.budget = None,
            ("estimated_hours", CellValue::Number(n)) => self.estimated_hours = Some(n),
            ("actual_hours", CellValue::Number(n)) => self.actual_hours = Some(n),
            ("url", CellValue::Link(s) | CellValue::Text(s)) => self.url = Some(s),
            (key, value) => {
                if self.extra.contains_key(key) {
                    self.extra.insert(key.to_string(), value.to_json());
                } else {
                    return Err(UnknownField {
                        key: key.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Fixture files may carry out-of-range progress values; clamp on ingest so
/// the 0..=100 invariant holds from the moment an item exists.
fn deserialize_progress<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = u16::deserialize(deserializer)?;
    Ok(u8::try_from(raw.min(100)).unwrap_or(100))
}

/// Error returned when a cell write targets a field the item does not carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField {
    pub key: String,
}

impl fmt::Display for UnknownField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no such field: '{}'", self.key)
    }
}

impl std::error::Error for UnknownField {}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}

impl FromStr for Stage {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "unassigned" => Ok(Self::Unassigned),
            "assigned" => Ok(Self::Assigned),
            "reviewed" => Ok(Self::Reviewed),
            "submitted" => Ok(Self::Submitted),
            "skipped" => Ok(Self::Skipped),
            "won" => Ok(Self::Won),
            "lost" => Ok(Self::Lost),
            _ => Err(ParseEnumError {
                expected: "stage",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "urgent" => Ok(Self::Urgent),
            "high" => Ok(Self::High),
            "normal" => Ok(Self::Normal),
            "low" => Ok(Self::Low),
            _ => Err(ParseEnumError {
                expected: "priority",
                got: s.to_string(),
            }),
        }
    }
}
