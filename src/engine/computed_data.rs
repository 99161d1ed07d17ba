//! Results returned by the PK engine

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::data::DosageHistory;
use crate::engine::computing_trait::PredictionParameterType;
use crate::units::{hours, Unit};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterValue {
    pub id: String,
    pub value: f64,
}

impl ParameterValue {
    pub fn new(id: impl Into<String>, value: f64) -> Self {
        ParameterValue {
            id: id.into(),
            value,
        }
    }
}

/// Parameters of one prediction type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSet {
    pub parameter_type: PredictionParameterType,
    pub values: Vec<ParameterValue>,
}

/// Statistics of the concentrations over one cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleStatistics {
    pub mean: f64,
    pub peak: f64,
    pub residual: f64,
    pub auc: f64,
    pub auc24: f64,
    pub cumulative_auc: f64,
}

/// Concentrations predicted between two intakes
///
/// `times` are offsets in hours from `start`, paired with `concentrations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleData {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub times: Vec<f64>,
    pub concentrations: Vec<f64>,
    pub unit: Unit,
    #[serde(default)]
    pub parameters: Vec<ParameterValue>,
    #[serde(default)]
    pub statistics: CycleStatistics,
}

impl CycleData {
    /// Whether `date` lies within `[start, end]`
    pub fn contains(&self, date: NaiveDateTime) -> bool {
        self.start <= date && date <= self.end
    }

    /// Absolute time of the `index`-th point
    pub fn time_at(&self, index: usize) -> Option<NaiveDateTime> {
        self.times
            .get(index)
            .and_then(|offset| self.start.checked_add_signed(hours(*offset)))
    }
}

/// One candidate dosage proposed by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DosageAdjustment {
    pub score: f64,
    #[serde(default)]
    pub history: DosageHistory,
    pub data: Vec<CycleData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentData {
    pub id: String,
    pub adjustments: Vec<DosageAdjustment>,
}

/// Per rank, the cycles of that percentile curve
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentilesData {
    pub id: String,
    pub ranks: Vec<f64>,
    pub percentiles: Vec<Vec<CycleData>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ComputedData {
    Adjustment(AdjustmentData),
    Percentiles(PercentilesData),
}
