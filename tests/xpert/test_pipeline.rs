//! End to end runs of the xpert pipeline

use approx::assert_relative_eq;
use tuberxpert::engine::{ComputingTrait, PredictionParameterType};
use tuberxpert::prelude::*;

use crate::common::*;

fn patient() -> DrugTreatment {
    DrugTreatment::new()
        .with_dosage_history(daily_history(dt(1, 8), None, 600.0))
        .with_sample(Sample::new("late", dt(9, 8), 200.0, "mg/l"))
        .with_sample(Sample::new("early", dt(8, 8), 9_000.0, "ug/l"))
        .with_target(Target::new("rifampicin", TargetType::Auc24).with_bounds(
            200.0, 300.0, 400.0, "mg*h/l",
        ))
        .with_covariate(weight(72.0, dt(1, 8)))
        .with_covariate(birthdate(1980, 5, 1))
}

fn request() -> XpertRequest {
    XpertRequest::new("rifampicin", dt(10, 10))
}

#[test]
fn test_aposteriori_request() {
    let repository = DrugModelRepository::new().with_model(rifampicin());
    let engine = PkStub::new();
    let pipeline = XpertPipeline::new(&repository, &engine);

    let mut result = XpertRequestResult::new(request(), Some(patient()));
    pipeline.run(&mut result);

    assert_eq!(result.error_message(), "");
    assert_eq!(
        result.drug_model().unwrap().drug_model_id,
        "ch.tucuxi.rifampicin.adult"
    );

    // Both covariates are fulfilled, the age through the birthdate
    let covariates = result.covariate_validation_results();
    assert_eq!(covariates.len(), 2);
    assert!(covariates.iter().all(|c| c.warning.is_empty()));
    assert_eq!(
        covariates[1].patient_covariate.as_ref().map(|c| c.id.as_str()),
        Some(BIRTHDATE)
    );

    assert_eq!(result.dose_validation_results().len(), 1);
    assert_eq!(result.dose_validation_results()[0].warning, "");

    let samples: Vec<_> = result
        .sample_validation_results()
        .iter()
        .map(|s| (s.sample().id.as_str(), s.group(), s.warning_level()))
        .collect();
    assert_eq!(
        samples,
        vec![
            ("early", 1, WarningLevel::Critical),
            ("late", 100, WarningLevel::Critical)
        ]
    );
    assert_eq!(
        result.sample_validation_results()[0].warning(),
        "99% of the population is above this measure"
    );

    let adjustment = result.adjustment_trait().unwrap();
    assert_eq!(adjustment.adjustment_time, dt(11, 8));
    assert_eq!(adjustment.start, dt(11, 7));
    assert_eq!(adjustment.end, dt(18, 7));
    assert_eq!(
        adjustment.parameter_type(),
        PredictionParameterType::Aposteriori
    );

    let parameters: Vec<_> = result
        .parameters()
        .iter()
        .map(|set| set.parameter_type)
        .collect();
    assert_eq!(
        parameters,
        vec![
            PredictionParameterType::Aposteriori,
            PredictionParameterType::Apriori,
            PredictionParameterType::Population,
        ]
    );
    for set in result.parameters() {
        assert_relative_eq!(set.values[0].value, clearance(set.parameter_type));
    }

    // Steady state is reached after 10 half-lives of 12 hours
    assert_relative_eq!(result.cycle_stats().unwrap().mean, 121.0);
    assert_eq!(result.adjustment_data().unwrap().adjustments.len(), 1);

    // Two sample percentiles, then the adjustment and its three derivatives
    assert_eq!(engine.requests().len(), 6);
}

#[test]
fn test_apriori_without_samples() {
    let repository = DrugModelRepository::new().with_model(rifampicin());
    let engine = PkStub::new();
    let pipeline = XpertPipeline::new(&repository, &engine);

    let treatment = DrugTreatment::new()
        .with_dosage_history(daily_history(dt(1, 8), None, 600.0))
        .with_covariate(weight(72.0, dt(1, 8)));
    let mut result = XpertRequestResult::new(request(), Some(treatment));
    pipeline.run(&mut result);

    assert!(result.should_continue_processing());
    assert!(result.sample_validation_results().is_empty());
    let parameters: Vec<_> = result
        .parameters()
        .iter()
        .map(|set| set.parameter_type)
        .collect();
    assert_eq!(
        parameters,
        vec![
            PredictionParameterType::Apriori,
            PredictionParameterType::Population
        ]
    );
    assert_eq!(engine.requests().len(), 3);
}

#[test]
fn test_target_overlap_stops_before_computation() {
    let repository = DrugModelRepository::new().with_model(rifampicin());
    let engine = PkStub::new();
    let pipeline = XpertPipeline::new(&repository, &engine);

    let treatment = patient().with_target(Target::new("rifampicin", TargetType::Auc24));
    let mut result = XpertRequestResult::new(request(), Some(treatment));
    pipeline.run(&mut result);

    assert_eq!(
        result.error_message(),
        "Two patient's targets with the same active moiety and the same target type detected."
    );
    assert!(result.adjustment_trait().is_none());
    assert!(engine.requests().is_empty());
}

#[test]
fn test_run_all_keeps_requests_independent() {
    let repository = DrugModelRepository::new().with_model(rifampicin());
    let engine = PkStub::new();
    let pipeline = XpertPipeline::new(&repository, &engine);

    let mut results = vec![
        XpertRequestResult::new(request(), Some(patient())),
        XpertRequestResult::new(
            XpertRequest::new("imatinib", dt(10, 10)),
            Some(DrugTreatment::new()),
        ),
        XpertRequestResult::new(request(), Some(patient())),
    ];
    pipeline.run_all(&mut results);

    assert!(results[0].should_continue_processing());
    assert_eq!(
        results[1].error_message(),
        "No drug model found for drug 'imatinib'."
    );
    assert!(results[2].should_continue_processing());
    assert_eq!(results[0].parameters(), results[2].parameters());
}

#[test]
fn test_options_drive_sampling_density() {
    let repository = DrugModelRepository::new().with_model(rifampicin());
    let engine = PkStub::new();
    let options = XpertOptions::from_json(
        r#"{ "adjustmentPointsPerHour": 10.0, "parametersPointsPerHour": 2.0 }"#,
    )
    .unwrap();
    let pipeline = XpertPipeline::new(&repository, &engine).with_options(options);

    let treatment = DrugTreatment::new()
        .with_dosage_history(daily_history(dt(1, 8), None, 600.0))
        .with_covariate(weight(72.0, dt(1, 8)));
    let mut result = XpertRequestResult::new(request(), Some(treatment));
    pipeline.run(&mut result);
    assert!(result.should_continue_processing());

    let densities: Vec<_> = engine
        .requests()
        .iter()
        .map(|request| match request {
            ComputingTrait::Adjustment(t) => t.points_per_hour,
            ComputingTrait::Percentiles(t) => t.points_per_hour,
        })
        .collect();
    assert_eq!(densities, vec![10.0, 20.0, 2.0]);
}
