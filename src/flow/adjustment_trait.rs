//! Creation of the adjustment trait
//!
//! Resolves the adjustment time, the evaluation window and the adjustment
//! options from the request, the dosage history and the selected drug model.

use chrono::{Duration, NaiveDateTime};

use crate::data::{DosageHistory, DrugModel, XpertRequest};
use crate::engine::{
    AdjustmentTrait, BestCandidatesOption, ComputingOption, LoadingOption, PredictionParameterType,
    RestPeriodOption, SteadyStateTargetOption,
};
use crate::error::XpertError;
use crate::flow::options::XpertOptions;
use crate::flow::request_result::XpertRequestResult;
use crate::flow::{FlowContext, FlowStep};
use crate::units::{days_after, duration_in_days, hours_after, hours_before};

pub struct AdjustmentTraitCreator;

impl FlowStep for AdjustmentTraitCreator {
    fn name(&self) -> &'static str {
        "AdjustmentTraitCreator"
    }

    fn perform<'a>(
        &self,
        result: &mut XpertRequestResult<'a>,
        context: FlowContext<'a, '_>,
    ) -> Result<(), XpertError> {
        let treatment = result.treatment().ok_or(XpertError::MissingTreatment)?;
        let model = result.drug_model().ok_or(XpertError::MissingDrugModel)?;
        let request = result.request();
        let options = context.options;
        let history = &treatment.dosage_history;

        let full = model.selected_formulation_and_route(history).ok_or_else(|| {
            XpertError::UnsupportedFormulationAndRoute {
                model_id: model.drug_model_id.clone(),
                formulation_and_route: history
                    .last_formulation_and_route()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            }
        })?;

        let adjustment_time = compute_adjustment_time(request, history, model, options)?;

        let standard_treatment = full.fixed_standard_treatment();
        let (start, end) = match standard_treatment {
            Some(standard) => {
                let start = history
                    .earliest_start()
                    .unwrap_or(request.computation_time);
                let days = duration_in_days(standard.duration, &standard.unit)
                    .map_err(|e| XpertError::unit_conversion(&model.drug_model_id, e))?;
                let end = days_after(start, days)
                    .ok_or(XpertError::TimeOutOfRange("standard treatment end"))?;
                if end <= adjustment_time {
                    return Err(XpertError::TreatmentAlreadyOver);
                }
                (start, end)
            }
            None => {
                let start = hours_before(adjustment_time, options.window_lead_hours)
                    .ok_or(XpertError::TimeOutOfRange("adjustment window start"))?;
                let end = days_after(start, options.default_window_days)
                    .ok_or(XpertError::TimeOutOfRange("adjustment window end"))?;
                (start, end)
            }
        };

        let loading_option = request.options.loading_option.unwrap_or(
            if full.is_loading_dose_recommended {
                LoadingOption::LoadingDoseAllowed
            } else {
                LoadingOption::NoLoadingDose
            },
        );
        let rest_period_option = request.options.rest_period_option.unwrap_or(
            if full.is_rest_period_recommended {
                RestPeriodOption::RestPeriodAllowed
            } else {
                RestPeriodOption::NoRestPeriod
            },
        );
        let steady_state_target_option = if standard_treatment.is_some() {
            SteadyStateTargetOption::WithinTreatmentTimeRange
        } else {
            SteadyStateTargetOption::AtSteadyState
        };
        let parameter_type = if !history.is_empty() && !treatment.samples.is_empty() {
            PredictionParameterType::Aposteriori
        } else {
            PredictionParameterType::Apriori
        };

        let adjustment_trait = AdjustmentTrait {
            id: String::new(),
            start,
            end,
            points_per_hour: options.adjustment_points_per_hour,
            computing_option: ComputingOption::new(parameter_type),
            adjustment_time,
            best_candidates_option: BestCandidatesOption::BestDosagePerInterval,
            loading_option,
            rest_period_option,
            steady_state_target_option,
            target_extraction_option: request.options.target_extraction_option,
            formulation_and_route_selection_option: request
                .options
                .formulation_and_route_selection_option,
        };

        tracing::info!(
            %adjustment_time,
            %start,
            %end,
            parameter_type = ?parameter_type,
            "Created adjustment trait"
        );
        result.set_adjustment_trait(adjustment_trait);
        Ok(())
    }
}

/// Time at which the dosage should be adjusted
///
/// An explicit request time wins. Otherwise this is the next intake after the
/// computation time; when the treatment has no future intake, the last intake
/// is moved forward by steps of two half-lives until it is no longer in the
/// past. Without any usable intake, the adjustment is set shortly after now.
pub fn compute_adjustment_time(
    request: &XpertRequest,
    history: &DosageHistory,
    model: &DrugModel,
    options: &XpertOptions,
) -> Result<NaiveDateTime, XpertError> {
    if let Some(adjustment_time) = request.adjustment_time {
        return Ok(adjustment_time);
    }

    let now = request.computation_time;
    let fallback = || {
        hours_after(now, options.fallback_adjustment_offset_hours)
            .ok_or(XpertError::TimeOutOfRange("fallback adjustment time"))
    };

    let Some(from) = history
        .latest_start_before(now)
        .or_else(|| history.earliest_start())
    else {
        return fallback();
    };
    let horizon = days_after(now, options.intake_horizon_days)
        .ok_or(XpertError::TimeOutOfRange("intake search horizon"))?;
    let intakes = history.extract_intakes(from, horizon);

    let next = intakes.iter().find(|intake| intake.time > now);
    let Some(chosen) = next.or(intakes.last()).map(|intake| intake.time) else {
        return fallback();
    };
    if chosen >= now {
        return Ok(chosen);
    }

    let step_hours = model
        .half_life
        .hours()
        .map_err(|e| XpertError::unit_conversion(&model.drug_model_id, e))?
        .saturating_mul(2);
    if step_hours <= 0 {
        return fallback();
    }
    let out_of_range = || XpertError::TimeOutOfRange("half-life stepping");
    let step = Duration::try_hours(step_hours).ok_or_else(out_of_range)?;
    let (elapsed, step) = (
        i128::from((now - chosen).num_milliseconds()),
        i128::from(step.num_milliseconds()),
    );
    let shift = i64::try_from((elapsed + step - 1) / step * step).map_err(|_| out_of_range())?;
    Duration::try_milliseconds(shift)
        .and_then(|shift| chosen.checked_add_signed(shift))
        .ok_or_else(out_of_range)
}
