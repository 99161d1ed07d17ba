//! Drug model selection through the public API

use tuberxpert::flow::{FlowStep, ModelSelector};
use tuberxpert::operation::{Comparison, Operation};
use tuberxpert::prelude::*;

use crate::common::*;

fn select<'a>(
    repository: &'a DrugModelRepository,
    treatment: DrugTreatment,
) -> XpertRequestResult<'a> {
    let engine = PkStub::new();
    let options = XpertOptions::default();
    let context = tuberxpert::FlowContext {
        repository,
        engine: &engine,
        options: &options,
    };
    let mut result =
        XpertRequestResult::new(XpertRequest::new("rifampicin", dt(10, 10)), Some(treatment));
    ModelSelector.execute(&mut result, context);
    result
}

/// The adult model without its age covariate
fn without_age() -> DrugModel {
    let mut model = rifampicin();
    model.drug_model_id = "ch.tucuxi.rifampicin.noage".to_string();
    model.covariates.retain(|c| c.id != AGE);
    model
}

#[test]
fn test_richer_model_wins_a_tie() {
    let repository = DrugModelRepository::new()
        .with_model(without_age())
        .with_model(rifampicin());
    let treatment = DrugTreatment::new()
        .with_covariate(weight(80.0, dt(2, 8)))
        .with_covariate(birthdate(1975, 3, 3));

    let result = select(&repository, treatment);
    assert_eq!(
        result.drug_model().unwrap().drug_model_id,
        "ch.tucuxi.rifampicin.adult"
    );
}

#[test]
fn test_missing_covariate_favors_the_smaller_model() {
    let repository = DrugModelRepository::new()
        .with_model(rifampicin())
        .with_model(without_age());
    let treatment = DrugTreatment::new().with_covariate(weight(80.0, dt(2, 8)));

    let result = select(&repository, treatment);
    assert_eq!(
        result.drug_model().unwrap().drug_model_id,
        "ch.tucuxi.rifampicin.noage"
    );
}

#[test]
fn test_minor_gets_age_warning() {
    let repository = DrugModelRepository::new().with_model(rifampicin());
    let treatment = DrugTreatment::new()
        .with_covariate(weight(50.0, dt(2, 8)))
        .with_covariate(birthdate(2010, 6, 1));

    let result = select(&repository, treatment);
    assert!(result.should_continue_processing());
    let age = result
        .covariate_validation_results()
        .iter()
        .find(|c| c.definition_id == AGE)
        .unwrap();
    assert_eq!(age.warning, "The patient shall be an adult");
    assert_eq!(
        age.patient_covariate.as_ref().map(|c| c.id.as_str()),
        Some(BIRTHDATE)
    );
}

#[test]
fn test_missing_weight_uses_default() {
    let repository = DrugModelRepository::new().with_model(rifampicin());
    let treatment = DrugTreatment::new().with_covariate(birthdate(1975, 3, 3));

    let result = select(&repository, treatment);
    let weight = &result.covariate_validation_results()[0];
    assert!(weight.patient_covariate.is_none());
    assert_eq!(
        weight.warning,
        "No value given, the default value is used: 70 kg"
    );
}

#[test]
fn test_hard_constraint_excludes_every_model() {
    let mut model = rifampicin();
    model.constraints.push(DomainConstraint {
        covariate_id: "bodyweight".to_string(),
        kind: ConstraintKind::Hard,
        operation: Operation::compare(Comparison::Ge, 40.0),
        error_message: Default::default(),
    });
    let repository = DrugModelRepository::new().with_model(model);
    let treatment = DrugTreatment::new()
        .with_covariate(weight(35.0, dt(2, 8)))
        .with_covariate(weight(45.0, dt(6, 8)));

    let result = select(&repository, treatment);
    assert_eq!(result.error_message(), "No valid drug model found.");
    assert!(result.drug_model().is_none());
}

#[test]
fn test_incompatible_route_is_skipped() {
    let repository = DrugModelRepository::new().with_model(rifampicin());
    let infusion = FormulationAndRoute::new(
        "parenteralSolution",
        AdministrationRoute::Intravenous,
        AbsorptionModel::Infusion,
    );
    let treatment = DrugTreatment::new().with_dosage_history(DosageHistory::new().with_time_range(
        DosageTimeRange::new(
            dt(1, 8),
            None,
            Dosage::lasting(SingleDose::new(600.0, "mg", infusion), 24.0),
        ),
    ));

    let result = select(&repository, treatment);
    assert_eq!(result.error(), Some(&XpertError::NoValidDrugModel));
}
