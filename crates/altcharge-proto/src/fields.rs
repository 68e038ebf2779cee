//! Field-number tables for heartbeat payloads and command parameters.
//!
//! The tables are plain data. [`FieldMap::global`] indexes them once per
//! process; the index is immutable and shared read-only.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::telemetry::Telemetry;

/// How the charger declares a telemetry field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Sent as a VARINT.
    Int,
    /// Sent as a FIXED32 float.
    Float,
}

/// A named telemetry field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub number: u32,
    pub name: &'static str,
    pub kind: ValueKind,
}

const fn int(number: u32, name: &'static str) -> FieldSpec {
    FieldSpec {
        number,
        name,
        kind: ValueKind::Int,
    }
}

const fn float(number: u32, name: &'static str) -> FieldSpec {
    FieldSpec {
        number,
        name,
        kind: ValueKind::Float,
    }
}

pub const INT_FIELDS: &[FieldSpec] = &[
    int(1, "status1"),
    int(102, "temp"),
    int(130, "switchOFF130"),
    int(138, "startVoltage"),
    int(262, "batSoc"),
    int(268, "chargeToFull268"),
    int(269, "unknown269"),
    int(427, "unknown427"),
    int(428, "unknown428"),
    int(581, "operationMode"),
    int(597, "startStop"),
];

pub const FLOAT_FIELDS: &[FieldSpec] = &[
    float(105, "alternatorPower"),
    float(139, "carBatVolt"),
    float(425, "stationPower"),
    float(598, "permanentWatts"),
    float(602, "wifiRssi"),
    float(603, "ratedPower"),
    float(608, "cableLength608"),
    float(609, "unknown609"),
];

/// A fix-up applied to a named value after the payload walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Adjustment {
    /// Device reports a scaled integer (e.g. decivolts).
    DivideBy(f32),
    /// Device reports output power as negative.
    Negate,
}

pub const ADJUSTMENTS: &[(&str, Adjustment)] = &[
    ("startVoltage", Adjustment::DivideBy(10.0)),
    ("alternatorPower", Adjustment::Negate),
    ("stationPower", Adjustment::Negate),
];

/// How a command parameter is written into the command payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamEncoding {
    /// Integer VARINT, value truncated toward zero.
    Varint,
    /// Integer VARINT of `value * factor`, truncated toward zero.
    ScaledVarint(f64),
    /// FIXED32 little-endian float.
    Fixed32,
}

/// A writable command parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub number: u32,
    pub encoding: ParamEncoding,
}

pub const COMMAND_PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "switchOFF130",
        number: 1,
        encoding: ParamEncoding::Varint,
    },
    ParamSpec {
        name: "operationMode",
        number: 116,
        encoding: ParamEncoding::Varint,
    },
    ParamSpec {
        name: "startStop",
        number: 122,
        encoding: ParamEncoding::Varint,
    },
    ParamSpec {
        name: "permanentWatts",
        number: 123,
        encoding: ParamEncoding::Fixed32,
    },
    ParamSpec {
        name: "startVoltage",
        number: 137,
        encoding: ParamEncoding::ScaledVarint(10.0),
    },
    ParamSpec {
        name: "cableLength608",
        number: 203,
        encoding: ParamEncoding::Fixed32,
    },
];

static GLOBAL: Lazy<FieldMap> = Lazy::new(FieldMap::build);

/// Indexed view over the static tables.
#[derive(Debug)]
pub struct FieldMap {
    telemetry: HashMap<u32, FieldSpec>,
    params: HashMap<&'static str, ParamSpec>,
}

impl FieldMap {
    /// The process-wide table index, built on first use.
    pub fn global() -> &'static FieldMap {
        &GLOBAL
    }

    fn build() -> Self {
        let telemetry = INT_FIELDS
            .iter()
            .chain(FLOAT_FIELDS)
            .map(|spec| (spec.number, *spec))
            .collect();
        let params = COMMAND_PARAMS
            .iter()
            .map(|spec| (spec.name, *spec))
            .collect();
        Self { telemetry, params }
    }

    /// The telemetry field declared under `number`, if any.
    pub fn telemetry_field(&self, number: u32) -> Option<&FieldSpec> {
        self.telemetry.get(&number)
    }

    /// The command parameter named `name`, if any.
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.get(name)
    }

    /// Apply [`ADJUSTMENTS`] to every named value present in `telemetry`.
    pub fn adjust(&self, telemetry: &mut Telemetry) {
        for (name, adjustment) in ADJUSTMENTS {
            telemetry.update(name, |value| match adjustment {
                Adjustment::DivideBy(divisor) => value.divided_by(*divisor),
                Adjustment::Negate => value.negated(),
            });
        }
    }
}
