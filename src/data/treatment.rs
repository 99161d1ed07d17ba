use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::covariate::PatientCovariate;
use crate::data::dosage::DosageHistory;
use crate::units::Unit;

/// Kind of a therapeutic target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetType {
    Residual,
    Peak,
    Mean,
    Auc,
    Auc24,
    CumulativeAuc,
    AucOverMic,
    Auc24OverMic,
    TimeOverMic,
    PeakDividedByMic,
    ResidualDividedByMic,
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetType::Residual => "residual",
            TargetType::Peak => "peak",
            TargetType::Mean => "mean",
            TargetType::Auc => "auc",
            TargetType::Auc24 => "auc24",
            TargetType::CumulativeAuc => "cumulativeAuc",
            TargetType::AucOverMic => "aucOverMic",
            TargetType::Auc24OverMic => "auc24OverMic",
            TargetType::TimeOverMic => "timeOverMic",
            TargetType::PeakDividedByMic => "peakDividedByMic",
            TargetType::ResidualDividedByMic => "residualDividedByMic",
        };
        write!(f, "{}", name)
    }
}

/// A patient specific target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub active_moiety_id: String,
    pub target_type: TargetType,
    pub min: f64,
    pub best: f64,
    pub max: f64,
    #[serde(default)]
    pub unit: Unit,
}

impl Target {
    pub fn new(active_moiety_id: impl Into<String>, target_type: TargetType) -> Self {
        Target {
            active_moiety_id: active_moiety_id.into(),
            target_type,
            min: 0.0,
            best: 0.0,
            max: 0.0,
            unit: Unit::default(),
        }
    }

    pub fn with_bounds(mut self, min: f64, best: f64, max: f64, unit: impl Into<Unit>) -> Self {
        self.min = min;
        self.best = best;
        self.max = max;
        self.unit = unit.into();
        self
    }
}

/// A blood sample measured on the patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub id: String,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub analyte_id: String,
    pub value: f64,
    pub unit: Unit,
}

impl Sample {
    pub fn new(id: impl Into<String>, date: NaiveDateTime, value: f64, unit: impl Into<Unit>) -> Self {
        Sample {
            id: id.into(),
            date,
            analyte_id: String::new(),
            value,
            unit: unit.into(),
        }
    }
}

/// Everything known about the patient's treatment for one drug
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrugTreatment {
    #[serde(default)]
    pub dosage_history: DosageHistory,
    #[serde(default)]
    pub samples: Vec<Sample>,
    #[serde(default)]
    pub targets: Vec<Target>,
    #[serde(default)]
    pub covariates: Vec<PatientCovariate>,
}

impl DrugTreatment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dosage_history(mut self, dosage_history: DosageHistory) -> Self {
        self.dosage_history = dosage_history;
        self
    }

    pub fn with_sample(mut self, sample: Sample) -> Self {
        self.samples.push(sample);
        self
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.targets.push(target);
        self
    }

    pub fn with_covariate(mut self, covariate: PatientCovariate) -> Self {
        self.covariates.push(covariate);
        self
    }
}
