use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::units::{Unit, UnitError};

/// Identifier of the synthetic age covariate of drug models
pub const AGE: &str = "age";
/// Identifier of the patient covariate holding a birthdate
pub const BIRTHDATE: &str = "birthdate";

/// Value of a patient covariate observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CovariateValue {
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

/// A covariate observed on the patient at a given date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientCovariate {
    pub id: String,
    pub value: CovariateValue,
    #[serde(default)]
    pub unit: Unit,
    pub date: NaiveDateTime,
}

impl PatientCovariate {
    pub fn new(
        id: impl Into<String>,
        value: CovariateValue,
        unit: impl Into<Unit>,
        date: NaiveDateTime,
    ) -> Self {
        PatientCovariate {
            id: id.into(),
            value,
            unit: unit.into(),
            date,
        }
    }

    /// Numeric value in the observation's own unit
    ///
    /// Booleans map to 1.0 / 0.0. Dates have no numeric value.
    pub fn numeric_value(&self) -> Option<f64> {
        match self.value {
            CovariateValue::Number(v) => Some(v),
            CovariateValue::Bool(b) => Some(if b { 1.0 } else { 0.0 }),
            CovariateValue::Date(_) => None,
        }
    }

    pub fn date_value(&self) -> Option<NaiveDate> {
        match self.value {
            CovariateValue::Date(d) => Some(d),
            _ => None,
        }
    }
}

/// Age at `at` of someone born on `birthdate`, in whole `unit`s
///
/// Supported units are years (`y`), months (`month`), weeks (`w`) and days (`d`).
pub fn age_in_unit(birthdate: NaiveDate, at: NaiveDateTime, unit: &Unit) -> Result<f64, UnitError> {
    let at = at.date();
    let full_months = || {
        let mut months = (at.year() - birthdate.year()) * 12 + at.month() as i32
            - birthdate.month() as i32;
        if at.day() < birthdate.day() {
            months -= 1;
        }
        months
    };
    let days = (at - birthdate).num_days();

    match unit.as_str().to_lowercase().as_str() {
        "y" => Ok(full_months().div_euclid(12) as f64),
        "month" => Ok(full_months() as f64),
        "w" => Ok(days.div_euclid(7) as f64),
        "d" => Ok(days as f64),
        _ => Err(UnitError::Incompatible {
            from: "y".to_string(),
            to: unit.to_string(),
        }),
    }
}
