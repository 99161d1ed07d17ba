//! Per-request processing context
//!
//! An [`XpertRequestResult`] is created for every drug request of a query and
//! handed by mutable reference to each flow step in turn. It owns the
//! treatment, borrows the selected drug model from the repository and
//! accumulates the outputs of the steps.

use serde::Serialize;

use crate::data::{DrugModel, DrugTreatment, PatientCovariate, Sample, SingleDose, XpertRequest};
use crate::engine::{AdjustmentData, AdjustmentTrait, CycleStatistics, ParameterSet};
use crate::error::XpertError;
use crate::flow::options::SampleThresholds;
use crate::flow::percentile;
use crate::language::Language;

/// Outcome of the check of one covariate definition against the patient
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CovariateValidationResult {
    pub definition_id: String,
    /// The patient observation used, `None` when the default value applies
    pub patient_covariate: Option<PatientCovariate>,
    /// Empty when there is nothing to report
    pub warning: String,
}

/// Outcome of the check of one dose of the dosage history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoseValidationResult {
    pub time_range_index: usize,
    pub dose: SingleDose,
    pub warning: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningLevel {
    Normal,
    Critical,
}

/// Position of a sample within the population percentiles
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleValidationResult {
    sample: Sample,
    group: u8,
    warning_level: WarningLevel,
    warning: String,
}

impl SampleValidationResult {
    /// `group` is in `[1, 100]`, 1 being below the first percentile
    pub fn new(sample: Sample, group: u8, language: Language, thresholds: &SampleThresholds) -> Self {
        SampleValidationResult {
            sample,
            group,
            warning_level: percentile::warning_level(group, thresholds),
            warning: percentile::warning_text(group, language, thresholds),
        }
    }

    pub fn sample(&self) -> &Sample {
        &self.sample
    }

    pub fn group(&self) -> u8 {
        self.group
    }

    pub fn warning_level(&self) -> WarningLevel {
        self.warning_level
    }

    pub fn warning(&self) -> &str {
        &self.warning
    }
}

#[derive(Debug, Clone)]
pub struct XpertRequestResult<'a> {
    request: XpertRequest,
    treatment: Option<DrugTreatment>,
    drug_model: Option<&'a DrugModel>,
    error: Option<XpertError>,
    covariate_validation_results: Vec<CovariateValidationResult>,
    dose_validation_results: Vec<DoseValidationResult>,
    sample_validation_results: Vec<SampleValidationResult>,
    adjustment_trait: Option<AdjustmentTrait>,
    adjustment_data: Option<AdjustmentData>,
    cycle_stats: Option<CycleStatistics>,
    parameters: Vec<ParameterSet>,
}

impl<'a> XpertRequestResult<'a> {
    pub fn new(request: XpertRequest, treatment: Option<DrugTreatment>) -> Self {
        XpertRequestResult {
            request,
            treatment,
            drug_model: None,
            error: None,
            covariate_validation_results: Vec::new(),
            dose_validation_results: Vec::new(),
            sample_validation_results: Vec::new(),
            adjustment_trait: None,
            adjustment_data: None,
            cycle_stats: None,
            parameters: Vec::new(),
        }
    }

    pub fn request(&self) -> &XpertRequest {
        &self.request
    }

    pub fn treatment(&self) -> Option<&DrugTreatment> {
        self.treatment.as_ref()
    }

    pub fn drug_model(&self) -> Option<&'a DrugModel> {
        self.drug_model
    }

    pub(crate) fn set_drug_model(&mut self, drug_model: &'a DrugModel) {
        self.drug_model = Some(drug_model);
    }

    /// False once an error has been recorded
    pub fn should_continue_processing(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&XpertError> {
        self.error.as_ref()
    }

    /// The recorded error as text, empty when there is none
    pub fn error_message(&self) -> String {
        self.error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Record a terminal failure, only the first one is kept
    pub fn set_error(&mut self, error: XpertError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    pub fn covariate_validation_results(&self) -> &[CovariateValidationResult] {
        &self.covariate_validation_results
    }

    pub(crate) fn set_covariate_validation_results(&mut self, results: Vec<CovariateValidationResult>) {
        self.covariate_validation_results = results;
    }

    pub fn dose_validation_results(&self) -> &[DoseValidationResult] {
        &self.dose_validation_results
    }

    pub(crate) fn set_dose_validation_results(&mut self, results: Vec<DoseValidationResult>) {
        self.dose_validation_results = results;
    }

    /// Sample results, sorted by sample date
    pub fn sample_validation_results(&self) -> &[SampleValidationResult] {
        &self.sample_validation_results
    }

    pub(crate) fn set_sample_validation_results(&mut self, mut results: Vec<SampleValidationResult>) {
        results.sort_by_key(|result| result.sample.date);
        self.sample_validation_results = results;
    }

    pub fn adjustment_trait(&self) -> Option<&AdjustmentTrait> {
        self.adjustment_trait.as_ref()
    }

    pub(crate) fn set_adjustment_trait(&mut self, adjustment_trait: AdjustmentTrait) {
        self.adjustment_trait = Some(adjustment_trait);
    }

    pub fn adjustment_data(&self) -> Option<&AdjustmentData> {
        self.adjustment_data.as_ref()
    }

    pub(crate) fn set_adjustment_data(&mut self, adjustment_data: AdjustmentData) {
        self.adjustment_data = Some(adjustment_data);
    }

    pub fn cycle_stats(&self) -> Option<&CycleStatistics> {
        self.cycle_stats.as_ref()
    }

    pub(crate) fn set_cycle_stats(&mut self, cycle_stats: CycleStatistics) {
        self.cycle_stats = Some(cycle_stats);
    }

    /// Parameters in the order `[aposteriori, apriori, population]`, the a
    /// posteriori set being present only for a posteriori adjustments
    pub fn parameters(&self) -> &[ParameterSet] {
        &self.parameters
    }

    pub(crate) fn add_parameters(&mut self, parameters: ParameterSet) {
        self.parameters.push(parameters);
    }
}
