//! Scalar cell values.
//!
//! Every column resolves to one of these variants. Keeping the set closed
//! means rendering, sorting, filtering, and export each dispatch through a
//! single `match` instead of scattered per-column conditionals.

use chrono::NaiveDate;
use std::cmp::Ordering;

use super::item::{Priority, Stage};

/// One cell's worth of data, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Currency(f64),
    Date(NaiveDate),
    Stage(Stage),
    Priority(Priority),
    UserRef(String),
    Progress(u8),
    Link(String),
    /// Absent value. Sorts and filters as the empty string.
    Missing,
}

impl CellValue {
    /// Human-facing rendering, also the filter haystack.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) | Self::UserRef(s) | Self::Link(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Currency(n) => format!("${}", format_number(*n)),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::Stage(s) => s.to_string(),
            Self::Priority(p) => p.to_string(),
            Self::Progress(p) => format!("{p}%"),
            Self::Missing => String::new(),
        }
    }

    /// Cell text for delimited export. Dates are ISO, currency is the raw
    /// number, enumerations and user references use their display text.
    #[must_use]
    pub fn export(&self) -> String {
        match self {
            Self::Currency(n) | Self::Number(n) => format_number(*n),
            Self::Progress(p) => p.to_string(),
            other => other.display(),
        }
    }

    /// Total order used by the grid sort.
    ///
    /// Numeric kinds compare numerically, dates chronologically, priority by
    /// its fixed rank table, everything else case-insensitively as text.
    /// Mixed kinds (possible through `extra` columns) fall back to text.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a) | Self::Currency(a), Self::Number(b) | Self::Currency(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Priority(a), Self::Priority(b)) => a.rank().cmp(&b.rank()),
            (Self::Progress(a), Self::Progress(b)) => a.cmp(b),
            _ => {
                let a = self.display().to_ascii_lowercase();
                let b = other.display().to_ascii_lowercase();
                a.cmp(&b)
            }
        }
    }

    /// Lift a JSON scalar out of an item's `extra` map.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::Text(s.clone()),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Missing, Self::Number),
            serde_json::Value::Bool(b) => Self::Text(b.to_string()),
            _ => Self::Missing,
        }
    }

    /// Inverse of [`Self::from_json`] for writes into the `extra` map.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Number(n) | Self::Currency(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Progress(p) => serde_json::Value::Number((*p).into()),
            Self::Missing => serde_json::Value::Null,
            other => serde_json::Value::String(other.display()),
        }
    }
}

/// Trim a trailing `.0` so whole numbers print as integers.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{CellValue, NaiveDate, Ordering, Priority};

    #[test]
    fn display_formats_by_kind() {
        assert_eq!(CellValue::Number(12.0).display(), "12");
        assert_eq!(CellValue::Number(12.5).display(), "12.5");
        assert_eq!(CellValue::Currency(90_000.0).display(), "$90000");
        assert_eq!(
            CellValue::Date(NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()).display(),
            "2025-03-09"
        );
        assert_eq!(CellValue::Progress(75).display(), "75%");
        assert_eq!(CellValue::Missing.display(), "");
    }

    #[test]
    fn export_uses_raw_numbers() {
        assert_eq!(CellValue::Currency(90_000.0).export(), "90000");
        assert_eq!(CellValue::Progress(75).export(), "75");
        assert_eq!(CellValue::Priority(Priority::High).export(), "high");
    }

    #[test]
    fn priority_compares_by_rank_not_text() {
        // Lexically "high" < "urgent", but urgent ranks first.
        assert_eq!(
            CellValue::Priority(Priority::Urgent).compare(&CellValue::Priority(Priority::High)),
            Ordering::Less
        );
        assert_eq!(
            CellValue::Priority(Priority::Normal).compare(&CellValue::Priority(Priority::Low)),
            Ordering::Less
        );
    }

    #[test]
    fn text_comparison_is_case_insensitive() {
        assert_eq!(
            CellValue::Text("alpha".into()).compare(&CellValue::Text("ALPHA".into())),
            Ordering::Equal
        );
    }

    #[test]
    fn missing_sorts_as_empty_string() {
        assert_eq!(
            CellValue::Missing.compare(&CellValue::Text("a".into())),
            Ordering::Less
        );
        assert_eq!(
            CellValue::Missing.compare(&CellValue::Text(String::new())),
            Ordering::Equal
        );
    }

    #[test]
    fn json_roundtrip_for_extra_columns() {
        let v = CellValue::from_json(&serde_json::json!("west"));
        assert_eq!(v, CellValue::Text("west".into()));
        assert_eq!(v.to_json(), serde_json::json!("west"));

        let n = CellValue::from_json(&serde_json::json!(4.5));
        assert_eq!(n, CellValue::Number(4.5));
        assert_eq!(n.to_json(), serde_json::json!(4.5));
    }
}
