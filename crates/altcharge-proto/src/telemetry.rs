use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A decoded telemetry value.
///
/// VARINT fields decode to `Int`, FIXED32 fields to `Float`. Scaling can turn
/// an `Int` into a `Float`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TelemetryValue {
    Int(i64),
    Float(f32),
}

impl TelemetryValue {
    pub(crate) fn negated(self) -> Self {
        match self {
            TelemetryValue::Int(value) => TelemetryValue::Int(value.wrapping_neg()),
            TelemetryValue::Float(value) => TelemetryValue::Float(-value),
        }
    }

    pub(crate) fn divided_by(self, divisor: f32) -> Self {
        match self {
            TelemetryValue::Int(value) => {
                TelemetryValue::Float((value as f64 / f64::from(divisor)) as f32)
            }
            TelemetryValue::Float(value) => TelemetryValue::Float(value / divisor),
        }
    }
}

impl fmt::Display for TelemetryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryValue::Int(value) => write!(f, "{value}"),
            TelemetryValue::Float(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for TelemetryValue {
    fn from(value: i64) -> Self {
        TelemetryValue::Int(value)
    }
}

impl From<f32> for TelemetryValue {
    fn from(value: f32) -> Self {
        TelemetryValue::Float(value)
    }
}

/// Named telemetry values decoded from one frame.
///
/// Keys are the semantic names from the field tables; unknown field numbers
/// never appear. Serializes as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Telemetry {
    values: BTreeMap<&'static str, TelemetryValue>,
}

impl Telemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<TelemetryValue> {
        self.values.get(name).copied()
    }

    /// Store `value` under `name`, replacing any earlier value.
    pub fn insert(&mut self, name: &'static str, value: TelemetryValue) {
        self.values.insert(name, value);
    }

    /// Merge `other` into `self`; values from `other` win.
    pub fn merge(&mut self, other: Telemetry) {
        self.values.extend(other.values);
    }

    pub(crate) fn update(&mut self, name: &str, f: impl FnOnce(TelemetryValue) -> TelemetryValue) {
        if let Some(value) = self.values.get_mut(name) {
            *value = f(*value);
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, TelemetryValue)> + '_ {
        self.values.iter().map(|(name, value)| (*name, *value))
    }
}

impl FromIterator<(&'static str, TelemetryValue)> for Telemetry {
    fn from_iter<I: IntoIterator<Item = (&'static str, TelemetryValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_overwrites() {
        let mut telemetry = Telemetry::new();
        telemetry.insert("temp", TelemetryValue::Int(20));
        telemetry.insert("temp", TelemetryValue::Int(21));
        assert_eq!(telemetry.get("temp"), Some(TelemetryValue::Int(21)));
        assert_eq!(telemetry.len(), 1);
    }

    #[test]
    fn merge_prefers_incoming_values() {
        let mut base: Telemetry = [("temp", TelemetryValue::Int(20)), ("batSoc", 50.0f32.into())]
            .into_iter()
            .collect();
        let nested: Telemetry = [("temp", TelemetryValue::Int(30))].into_iter().collect();
        base.merge(nested);
        assert_eq!(base.get("temp"), Some(TelemetryValue::Int(30)));
        assert_eq!(base.get("batSoc"), Some(TelemetryValue::Float(50.0)));
    }

    #[test]
    fn scaling_an_int_yields_a_float() {
        assert_eq!(
            TelemetryValue::Int(125).divided_by(10.0),
            TelemetryValue::Float(12.5)
        );
    }

    #[test]
    fn negation_covers_both_kinds() {
        assert_eq!(TelemetryValue::Float(120.0).negated(), TelemetryValue::Float(-120.0));
        assert_eq!(TelemetryValue::Int(7).negated(), TelemetryValue::Int(-7));
    }

    #[test]
    fn serializes_as_flat_object() {
        let telemetry: Telemetry = [
            ("batSoc", TelemetryValue::Float(76.5)),
            ("temp", TelemetryValue::Int(31)),
        ]
        .into_iter()
        .collect();
        let json = serde_json::to_string(&telemetry).unwrap();
        assert_eq!(json, r#"{"batSoc":76.5,"temp":31}"#);
    }
}
