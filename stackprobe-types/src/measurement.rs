//! Measurements - named facts produced once per check run.

use std::collections::BTreeMap;
use std::fmt;

/// The kind tag of a [`MeasurementValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MeasurementKind {
    /// A ratio, percentage or duration.
    Numeric,
    /// An absolute count.
    Count,
    /// A yes/no fact.
    Presence,
    /// An ordered sequence of names.
    ListOfNames,
}

impl MeasurementKind {
    /// Whether values of this kind can be compared against a number.
    pub fn is_numeric(&self) -> bool {
        matches!(self, MeasurementKind::Numeric | MeasurementKind::Count)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementKind::Numeric => "numeric",
            MeasurementKind::Count => "count",
            MeasurementKind::Presence => "presence",
            MeasurementKind::ListOfNames => "list",
        }
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A measured value, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "value", rename_all = "snake_case"))]
pub enum MeasurementValue {
    Numeric(f64),
    Count(u64),
    Presence(bool),
    ListOfNames(Vec<String>),
}

impl MeasurementValue {
    pub fn kind(&self) -> MeasurementKind {
        match self {
            MeasurementValue::Numeric(_) => MeasurementKind::Numeric,
            MeasurementValue::Count(_) => MeasurementKind::Count,
            MeasurementValue::Presence(_) => MeasurementKind::Presence,
            MeasurementValue::ListOfNames(_) => MeasurementKind::ListOfNames,
        }
    }

    /// Numeric view of a `Numeric` or `Count` value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MeasurementValue::Numeric(v) => Some(*v),
            MeasurementValue::Count(c) => Some(*c as f64),
            _ => None,
        }
    }

    pub fn as_names(&self) -> Option<&[String]> {
        match self {
            MeasurementValue::ListOfNames(names) => Some(names),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MeasurementValue::Presence(b) => Some(*b),
            _ => None,
        }
    }
}

/// A single named measurement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurement {
    pub name: String,
    pub value: MeasurementValue,
}

impl Measurement {
    pub fn new(name: impl Into<String>, value: MeasurementValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn kind(&self) -> MeasurementKind {
        self.value.kind()
    }
}

/// The set of measurements collected for one run, keyed by name.
///
/// Names are unique: inserting a name twice keeps the later value.
///
/// # Example
///
/// ```rust
/// use stackprobe_types::{Measurements, MeasurementValue};
///
/// let m = Measurements::new()
///     .numeric("token_seconds", 0.42)
///     .presence("tenants_listed", true);
///
/// assert_eq!(m.get("token_seconds"), Some(&MeasurementValue::Numeric(0.42)));
/// assert!(m.get("image_count").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Measurements {
    values: BTreeMap<String, MeasurementValue>,
}

impl Measurements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a numeric measurement.
    pub fn numeric(self, name: impl Into<String>, value: f64) -> Self {
        self.with(name, MeasurementValue::Numeric(value))
    }

    /// Add a count measurement.
    pub fn count(self, name: impl Into<String>, value: u64) -> Self {
        self.with(name, MeasurementValue::Count(value))
    }

    /// Add a presence measurement.
    pub fn presence(self, name: impl Into<String>, value: bool) -> Self {
        self.with(name, MeasurementValue::Presence(value))
    }

    /// Add a list-of-names measurement.
    pub fn names<I, S>(self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.with(name, MeasurementValue::ListOfNames(values))
    }

    /// Add a measurement with an already-tagged value.
    pub fn with(mut self, name: impl Into<String>, value: MeasurementValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: MeasurementValue) {
        self.values.insert(name.into(), value);
    }

    pub fn push(&mut self, measurement: Measurement) {
        self.values.insert(measurement.name, measurement.value);
    }

    pub fn get(&self, name: &str) -> Option<&MeasurementValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MeasurementValue)> {
        self.values.iter()
    }
}

impl FromIterator<Measurement> for Measurements {
    fn from_iter<T: IntoIterator<Item = Measurement>>(iter: T) -> Self {
        let mut measurements = Measurements::new();
        for m in iter {
            measurements.push(m);
        }
        measurements
    }
}
