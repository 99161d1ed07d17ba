//! Submission of the adjustment to the PK engine
//!
//! Besides the requested adjustment, three derived computations are run to
//! complete the report: the cycle statistics at steady state, and the a priori
//! and population parameters of the patient.

use crate::data::{DrugModel, DrugTreatment};
use crate::engine::{
    AdjustmentData, AdjustmentTrait, BestCandidatesOption, ComputedData, ComputingEngine,
    ComputingRequest, ComputingTrait, CycleData, ParameterSet, PredictionParameterType,
};
use crate::error::{ComputationStage, XpertError};
use crate::flow::request_result::XpertRequestResult;
use crate::flow::{FlowContext, FlowStep};
use crate::units::hours_after;

pub struct RequestExecutor;

impl FlowStep for RequestExecutor {
    fn name(&self) -> &'static str {
        "RequestExecutor"
    }

    fn perform<'a>(
        &self,
        result: &mut XpertRequestResult<'a>,
        context: FlowContext<'a, '_>,
    ) -> Result<(), XpertError> {
        let treatment = result.treatment().ok_or(XpertError::MissingTreatment)?;
        let model = result.drug_model().ok_or(XpertError::MissingDrugModel)?;
        let adjustment_trait = result
            .adjustment_trait()
            .ok_or(XpertError::MissingAdjustmentTrait)?;
        let options = context.options;
        let executor = Executor {
            engine: context.engine,
            model,
            treatment,
        };

        let primary_type = adjustment_trait.parameter_type();
        let adjustment = executor.adjust(adjustment_trait.clone(), ComputationStage::Adjustment)?;
        let mut parameters = vec![ParameterSet {
            parameter_type: primary_type,
            values: first_cycle(&adjustment, ComputationStage::Adjustment)?
                .parameters
                .clone(),
        }];

        let steady_state_hours = model
            .half_life
            .steady_state_hours()
            .map_err(|e| XpertError::unit_conversion(&model.drug_model_id, e))?;
        let statistics_trait = adjustment_trait
            .clone()
            .with_end(
                hours_after(adjustment_trait.adjustment_time, steady_state_hours)
                    .ok_or(XpertError::TimeOutOfRange("steady state end"))?,
            )
            .with_points_per_hour(options.statistics_points_per_hour)
            .with_best_candidates_option(BestCandidatesOption::BestDosage);
        let statistics = executor.adjust(statistics_trait, ComputationStage::SteadyStateStatistics)?;
        let cycle_stats = last_cycle(&statistics, ComputationStage::SteadyStateStatistics)?
            .statistics
            .clone();

        let parameters_trait = adjustment_trait
            .clone()
            .with_points_per_hour(options.parameters_points_per_hour)
            .with_best_candidates_option(BestCandidatesOption::BestDosage);

        if primary_type == PredictionParameterType::Aposteriori {
            parameters.push(executor.parameters(
                parameters_trait.clone(),
                PredictionParameterType::Apriori,
                ComputationStage::AprioriParameters,
            )?);
        }
        parameters.push(executor.parameters(
            parameters_trait,
            PredictionParameterType::Population,
            ComputationStage::PopulationParameters,
        )?);

        tracing::info!(
            adjustments = adjustment.adjustments.len(),
            parameter_sets = parameters.len(),
            "Adjustment computed"
        );
        result.set_adjustment_data(adjustment);
        result.set_cycle_stats(cycle_stats);
        for set in parameters {
            result.add_parameters(set);
        }
        Ok(())
    }
}

struct Executor<'r> {
    engine: &'r dyn ComputingEngine,
    model: &'r DrugModel,
    treatment: &'r DrugTreatment,
}

impl Executor<'_> {
    fn adjust(
        &self,
        adjustment_trait: AdjustmentTrait,
        stage: ComputationStage,
    ) -> Result<AdjustmentData, XpertError> {
        let request = ComputingRequest::new(
            adjustment_trait.id.clone(),
            self.model,
            self.treatment,
            ComputingTrait::Adjustment(adjustment_trait),
        );
        tracing::debug!(%stage, "Submitting computation");

        match self.engine.compute(&request) {
            Ok(ComputedData::Adjustment(data)) if !data.adjustments.is_empty() => Ok(data),
            Ok(ComputedData::Adjustment(_)) => {
                Err(XpertError::computation(stage, "no adjustment was computed"))
            }
            Ok(_) => Err(XpertError::computation(stage, "unexpected response type")),
            Err(e) => Err(XpertError::computation(stage, e.to_string())),
        }
    }

    fn parameters(
        &self,
        adjustment_trait: AdjustmentTrait,
        parameter_type: PredictionParameterType,
        stage: ComputationStage,
    ) -> Result<ParameterSet, XpertError> {
        let data = self.adjust(adjustment_trait.with_parameter_type(parameter_type), stage)?;
        Ok(ParameterSet {
            parameter_type,
            values: first_cycle(&data, stage)?.parameters.clone(),
        })
    }
}

fn first_cycle(data: &AdjustmentData, stage: ComputationStage) -> Result<&CycleData, XpertError> {
    data.adjustments
        .first()
        .and_then(|adjustment| adjustment.data.first())
        .ok_or_else(|| XpertError::computation(stage, "no cycle data"))
}

fn last_cycle(data: &AdjustmentData, stage: ComputationStage) -> Result<&CycleData, XpertError> {
    data.adjustments
        .first()
        .and_then(|adjustment| adjustment.data.last())
        .ok_or_else(|| XpertError::computation(stage, "no cycle data"))
}
