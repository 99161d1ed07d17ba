use crate::engine::{
    ComputedData, ComputingOption, ComputingRequest, ComputingTrait, PercentilesTrait,
    PredictionParameterType,
};
use crate::error::{ComputationStage, XpertError};
use crate::flow::percentile::{find_group, percentile_ranks};
use crate::flow::request_result::{SampleValidationResult, XpertRequestResult};
use crate::flow::{FlowContext, FlowStep};
use crate::units::{hours_after, hours_before};

/// Positions every patient sample within the a priori population percentiles
pub struct SampleValidator;

impl FlowStep for SampleValidator {
    fn name(&self) -> &'static str {
        "SampleValidator"
    }

    fn perform<'a>(
        &self,
        result: &mut XpertRequestResult<'a>,
        context: FlowContext<'a, '_>,
    ) -> Result<(), XpertError> {
        let treatment = result.treatment().ok_or(XpertError::MissingTreatment)?;
        let model = result.drug_model().ok_or(XpertError::MissingDrugModel)?;
        let language = result.request().output_lang;
        let options = context.options;

        let mut validations = Vec::with_capacity(treatment.samples.len());
        for sample in &treatment.samples {
            let percentiles_trait = PercentilesTrait {
                id: sample.id.clone(),
                start: hours_before(sample.date, options.sample_window_hours)
                    .ok_or(XpertError::TimeOutOfRange("sample percentiles window"))?,
                end: hours_after(sample.date, options.sample_window_hours)
                    .ok_or(XpertError::TimeOutOfRange("sample percentiles window"))?,
                ranks: percentile_ranks(),
                points_per_hour: options.percentiles_points_per_hour,
                computing_option: ComputingOption::new(PredictionParameterType::Apriori),
            };
            let request = ComputingRequest::new(
                sample.id.clone(),
                model,
                treatment,
                ComputingTrait::Percentiles(percentiles_trait),
            );

            tracing::debug!(sample_id = %sample.id, "Submitting percentiles computation");
            let percentiles = match context.engine.compute(&request) {
                Ok(ComputedData::Percentiles(data)) => data,
                Ok(_) => {
                    return Err(XpertError::computation(
                        ComputationStage::Percentiles,
                        "unexpected response type",
                    ))
                }
                Err(e) => {
                    return Err(XpertError::computation(
                        ComputationStage::Percentiles,
                        e.to_string(),
                    ))
                }
            };

            let group =
                find_group(&percentiles, sample).map_err(|e| XpertError::SampleValidation {
                    sample_id: sample.id.clone(),
                    reason: e.to_string(),
                })?;

            validations.push(SampleValidationResult::new(
                sample.clone(),
                group,
                language,
                &options.sample_thresholds,
            ));
        }

        result.set_sample_validation_results(validations);
        Ok(())
    }
}
