//! Computation requests understood by the PK engine

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Which parameters the engine predicts with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PredictionParameterType {
    /// Typical patient parameters
    Population,
    /// Population parameters adjusted with the patient's covariates
    Apriori,
    /// A priori parameters further adjusted with the patient's samples
    Aposteriori,
}

/// How many candidate dosages the engine returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BestCandidatesOption {
    BestDosage,
    AllDosages,
    BestDosagePerInterval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadingOption {
    NoLoadingDose,
    LoadingDoseAllowed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RestPeriodOption {
    NoRestPeriod,
    RestPeriodAllowed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SteadyStateTargetOption {
    AtSteadyState,
    WithinTreatmentTimeRange,
}

/// Where the targets used by the adjustment come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetExtractionOption {
    PopulationValues,
    AprioriValues,
    IndividualTargets,
    IndividualTargetsIfDefinitionExists,
    #[default]
    DefinitionIfNoIndividualTarget,
}

/// Which formulations and routes the engine may propose
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormulationAndRouteSelectionOption {
    #[default]
    LastFormulationAndRoute,
    DefaultFormulationAndRoute,
    AllFormulationAndRoutes,
}

/// Options shared by every computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputingOption {
    pub parameter_type: PredictionParameterType,
    pub retrieve_statistics: bool,
    pub retrieve_parameters: bool,
    pub retrieve_covariates: bool,
}

impl ComputingOption {
    /// Options retrieving statistics, parameters and covariates
    pub fn new(parameter_type: PredictionParameterType) -> Self {
        ComputingOption {
            parameter_type,
            retrieve_statistics: true,
            retrieve_parameters: true,
            retrieve_covariates: true,
        }
    }
}

/// Request for dosage adjustments over `[start, end)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentTrait {
    pub id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub points_per_hour: f64,
    pub computing_option: ComputingOption,
    pub adjustment_time: NaiveDateTime,
    pub best_candidates_option: BestCandidatesOption,
    pub loading_option: LoadingOption,
    pub rest_period_option: RestPeriodOption,
    pub steady_state_target_option: SteadyStateTargetOption,
    pub target_extraction_option: TargetExtractionOption,
    pub formulation_and_route_selection_option: FormulationAndRouteSelectionOption,
}

impl AdjustmentTrait {
    pub fn parameter_type(&self) -> PredictionParameterType {
        self.computing_option.parameter_type
    }

    pub fn with_end(mut self, end: NaiveDateTime) -> Self {
        self.end = end;
        self
    }

    pub fn with_points_per_hour(mut self, points_per_hour: f64) -> Self {
        self.points_per_hour = points_per_hour;
        self
    }

    pub fn with_best_candidates_option(mut self, option: BestCandidatesOption) -> Self {
        self.best_candidates_option = option;
        self
    }

    pub fn with_parameter_type(mut self, parameter_type: PredictionParameterType) -> Self {
        self.computing_option.parameter_type = parameter_type;
        self
    }
}

/// Request for population percentiles over `[start, end)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentilesTrait {
    pub id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub ranks: Vec<f64>,
    pub points_per_hour: f64,
    pub computing_option: ComputingOption,
}

/// Any computation the engine can run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ComputingTrait {
    Adjustment(AdjustmentTrait),
    Percentiles(PercentilesTrait),
}

impl ComputingTrait {
    pub fn start(&self) -> NaiveDateTime {
        match self {
            ComputingTrait::Adjustment(t) => t.start,
            ComputingTrait::Percentiles(t) => t.start,
        }
    }

    pub fn end(&self) -> NaiveDateTime {
        match self {
            ComputingTrait::Adjustment(t) => t.end,
            ComputingTrait::Percentiles(t) => t.end,
        }
    }

    pub fn parameter_type(&self) -> PredictionParameterType {
        match self {
            ComputingTrait::Adjustment(t) => t.computing_option.parameter_type,
            ComputingTrait::Percentiles(t) => t.computing_option.parameter_type,
        }
    }
}
