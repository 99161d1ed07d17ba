//! Adjustment window resolution through the pipeline

use tuberxpert::engine::SteadyStateTargetOption;
use tuberxpert::prelude::*;

use crate::common::*;

/// The adult model with a fixed standard treatment of `duration` `unit`
fn with_standard_treatment(duration: f64, unit: &str) -> DrugModel {
    let mut model = rifampicin();
    model.formulation_and_routes[0].standard_treatment = Some(StandardTreatment {
        is_fixed_duration: true,
        duration,
        unit: unit.into(),
    });
    model
}

fn run<'a>(
    repository: &'a DrugModelRepository,
    engine: &'a PkStub,
    request: XpertRequest,
) -> XpertRequestResult<'a> {
    let treatment = DrugTreatment::new()
        .with_dosage_history(daily_history(dt(1, 8), None, 600.0))
        .with_covariate(weight(72.0, dt(1, 8)));
    let pipeline = XpertPipeline::new(repository, engine);
    let mut result = XpertRequestResult::new(request, Some(treatment));
    pipeline.run(&mut result);
    result
}

#[test]
fn test_standard_treatment_window_round_trip() {
    let repository = DrugModelRepository::new().with_model(with_standard_treatment(2.0, "w"));
    let engine = PkStub::new();
    let result = run(&repository, &engine, XpertRequest::new("rifampicin", dt(10, 10)));

    assert!(result.should_continue_processing());
    let adjustment = result.adjustment_trait().unwrap();
    assert_eq!(adjustment.start, dt(1, 8));
    assert_eq!(adjustment.end, dt(15, 8));
    assert_eq!(adjustment.adjustment_time, dt(11, 8));
    assert_eq!(
        adjustment.steady_state_target_option,
        SteadyStateTargetOption::WithinTreatmentTimeRange
    );
}

#[test]
fn test_treatment_over_at_adjustment_time() {
    let repository = DrugModelRepository::new().with_model(with_standard_treatment(14.0, "d"));
    let engine = PkStub::new();
    let request = XpertRequest::new("rifampicin", dt(10, 10)).with_adjustment_time(dt(15, 8));
    let result = run(&repository, &engine, request);

    assert_eq!(result.error(), Some(&XpertError::TreatmentAlreadyOver));
    assert_eq!(
        result.error_message(),
        "Based on the standard treatment in the model, the treatment is already over at the time of the adjustment."
    );
    assert!(engine.requests().is_empty());
}

#[test]
fn test_explicit_adjustment_time_sets_default_window() {
    let repository = DrugModelRepository::new().with_model(rifampicin());
    let engine = PkStub::new();
    let request = XpertRequest::new("rifampicin", dt(10, 10)).with_adjustment_time(dt(12, 20));
    let result = run(&repository, &engine, request);

    let adjustment = result.adjustment_trait().unwrap();
    assert_eq!(adjustment.adjustment_time, dt(12, 20));
    assert_eq!(adjustment.start, dt(12, 19));
    assert_eq!(adjustment.end, dt(19, 19));
    assert_eq!(
        adjustment.steady_state_target_option,
        SteadyStateTargetOption::AtSteadyState
    );
}
