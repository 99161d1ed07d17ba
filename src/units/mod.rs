//! Unit handling
//!
//! Values travel through the pipeline with the unit they were recorded in. A
//! [`UnitManager`] converts a scalar between two units of the same dimension.
//! Conversion between dimensions (e.g. `mg` to `h`) or from an unknown unit is
//! an error rather than a silent pass-through.

use chrono::{Duration, NaiveDateTime};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};
use thiserror::Error;

/// Error type for unit conversions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitError {
    #[error("Unknown unit '{0}'")]
    UnknownUnit(String),
    #[error("Cannot convert from '{from}' to '{to}': incompatible dimensions")]
    Incompatible { from: String, to: String },
}

/// A unit identified by its symbol, e.g. `mg/l` or `h`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Unit(String);

impl Unit {
    pub fn new(symbol: impl Into<String>) -> Self {
        Unit(symbol.into())
    }

    /// The symbol of the unit
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Unit {
    fn from(symbol: &str) -> Self {
        Unit::new(symbol)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Dimensionless,
    Mass,
    Concentration,
    Time,
    Length,
    Volume,
    Clearance,
}

lazy_static! {
    /// Symbol -> (dimension, factor to the reference unit of that dimension)
    ///
    /// Reference units: g, g/l, h, m, l, l/h.
    static ref UNITS: HashMap<&'static str, (Dimension, f64)> = {
        let mut m = HashMap::new();
        m.insert("", (Dimension::Dimensionless, 1.0));
        m.insert("-", (Dimension::Dimensionless, 1.0));
        m.insert("%", (Dimension::Dimensionless, 0.01));

        m.insert("kg", (Dimension::Mass, 1e3));
        m.insert("g", (Dimension::Mass, 1.0));
        m.insert("mg", (Dimension::Mass, 1e-3));
        m.insert("ug", (Dimension::Mass, 1e-6));
        m.insert("µg", (Dimension::Mass, 1e-6));
        m.insert("ng", (Dimension::Mass, 1e-9));

        m.insert("g/l", (Dimension::Concentration, 1.0));
        m.insert("mg/l", (Dimension::Concentration, 1e-3));
        m.insert("mg/dl", (Dimension::Concentration, 1e-2));
        m.insert("ug/l", (Dimension::Concentration, 1e-6));
        m.insert("µg/l", (Dimension::Concentration, 1e-6));
        m.insert("ug/ml", (Dimension::Concentration, 1e-3));
        m.insert("µg/ml", (Dimension::Concentration, 1e-3));
        m.insert("ng/ml", (Dimension::Concentration, 1e-6));
        m.insert("ng/l", (Dimension::Concentration, 1e-9));

        m.insert("y", (Dimension::Time, 24.0 * 365.0));
        m.insert("month", (Dimension::Time, 24.0 * 30.0));
        m.insert("w", (Dimension::Time, 24.0 * 7.0));
        m.insert("d", (Dimension::Time, 24.0));
        m.insert("h", (Dimension::Time, 1.0));
        m.insert("min", (Dimension::Time, 1.0 / 60.0));
        m.insert("s", (Dimension::Time, 1.0 / 3600.0));

        m.insert("m", (Dimension::Length, 1.0));
        m.insert("cm", (Dimension::Length, 1e-2));
        m.insert("mm", (Dimension::Length, 1e-3));

        m.insert("l", (Dimension::Volume, 1.0));
        m.insert("ml", (Dimension::Volume, 1e-3));

        m.insert("l/h", (Dimension::Clearance, 1.0));
        m.insert("ml/min", (Dimension::Clearance, 1e-3 * 60.0));
        m
    };
}

/// Converts scalar values between units
pub struct UnitManager;

impl UnitManager {
    /// Convert `value` expressed in `from` into `to`
    pub fn convert(value: f64, from: &Unit, to: &Unit) -> Result<f64, UnitError> {
        if from == to {
            return Ok(value);
        }
        let (from_dim, from_factor) = lookup(from)?;
        let (to_dim, to_factor) = lookup(to)?;
        if from_dim != to_dim {
            return Err(UnitError::Incompatible {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(value * from_factor / to_factor)
    }

    /// Whether `unit` is a known time unit
    pub fn is_time_unit(unit: &Unit) -> bool {
        matches!(lookup(unit), Ok((Dimension::Time, _)))
    }
}

fn lookup(unit: &Unit) -> Result<(Dimension, f64), UnitError> {
    UNITS
        .get(unit.as_str().to_lowercase().as_str())
        .copied()
        .ok_or_else(|| UnitError::UnknownUnit(unit.to_string()))
}

/// A duration of `value` hours, with millisecond resolution
///
/// Saturates at the bounds of [`Duration`].
pub fn hours(value: f64) -> Duration {
    let milliseconds = (value * 3_600_000.0).round() as i64;
    Duration::try_milliseconds(milliseconds).unwrap_or(if milliseconds < 0 {
        Duration::MIN
    } else {
        Duration::MAX
    })
}

/// `date` moved forward by whole `hours`, `None` when out of range
pub fn hours_after(date: NaiveDateTime, hours: i64) -> Option<NaiveDateTime> {
    Duration::try_hours(hours).and_then(|delta| date.checked_add_signed(delta))
}

/// `date` moved back by whole `hours`, `None` when out of range
pub fn hours_before(date: NaiveDateTime, hours: i64) -> Option<NaiveDateTime> {
    Duration::try_hours(hours).and_then(|delta| date.checked_sub_signed(delta))
}

/// `date` moved forward by whole `days`, `None` when out of range
pub fn days_after(date: NaiveDateTime, days: i64) -> Option<NaiveDateTime> {
    Duration::try_days(days).and_then(|delta| date.checked_add_signed(delta))
}

/// Convert a duration to whole hours, truncated toward zero
pub fn duration_in_hours(value: f64, unit: &Unit) -> Result<i64, UnitError> {
    let hours = UnitManager::convert(value, unit, &Unit::from("h"))?;
    Ok(hours.trunc() as i64)
}

/// Convert a duration to whole days, truncated toward zero
pub fn duration_in_days(value: f64, unit: &Unit) -> Result<i64, UnitError> {
    let days = UnitManager::convert(value, unit, &Unit::from("d"))?;
    Ok(days.trunc() as i64)
}
