//! Drug model selection
//!
//! Every drug model registered for the requested drug is scored against the
//! patient covariates. The score counts the covariate definitions the patient
//! cannot fulfil: no observation (the default value will be used) or an
//! observation rejected by the definition's validation formula. The lowest
//! score wins; ties go to the model defining more covariates.

use chrono::NaiveDateTime;

use crate::data::{
    age_in_unit, ConstraintKind, CovariateDefinition, DomainConstraint, DrugModel, DrugTreatment,
    PatientCovariate, AGE, BIRTHDATE,
};
use crate::error::XpertError;
use crate::flow::request_result::{CovariateValidationResult, XpertRequestResult};
use crate::flow::{FlowContext, FlowStep};
use crate::language::{translate, Language, TextKey};
use crate::units::UnitManager;

pub struct ModelSelector;

impl FlowStep for ModelSelector {
    fn name(&self) -> &'static str {
        "ModelSelector"
    }

    fn perform<'a>(
        &self,
        result: &mut XpertRequestResult<'a>,
        context: FlowContext<'a, '_>,
    ) -> Result<(), XpertError> {
        let request = result.request();
        let treatment = result.treatment().ok_or(XpertError::MissingTreatment)?;

        if treatment.dosage_history.formulation_and_routes().len() > 1 {
            return Err(XpertError::MixedFormulationAndRoutes);
        }

        let candidates = context.repository.models_for_drug(&request.drug_id);
        if candidates.is_empty() {
            return Err(XpertError::NoDrugModelForDrug(request.drug_id.clone()));
        }

        let mut best: Option<Candidate<'a>> = None;
        for model in candidates {
            if !model.is_compatible_with(&treatment.dosage_history) {
                tracing::debug!(
                    drug_model_id = %model.drug_model_id,
                    "Formulation and route incompatible with the dosage history"
                );
                continue;
            }

            if !satisfies_constraints(model, treatment, request.computation_time)? {
                continue;
            }

            let (score, validations) =
                score_model(model, treatment, request.computation_time, request.output_lang)?;
            tracing::debug!(drug_model_id = %model.drug_model_id, score, "Scored drug model");

            let is_better = match &best {
                None => true,
                Some(current) => {
                    score < current.score
                        || (score == current.score
                            && model.covariates.len() > current.model.covariates.len())
                }
            };
            if is_better {
                best = Some(Candidate {
                    model,
                    score,
                    validations,
                });
            }
        }

        let best = best.ok_or(XpertError::NoValidDrugModel)?;
        check_translations(best.model, request.output_lang)?;

        tracing::info!(
            drug_model_id = %best.model.drug_model_id,
            score = best.score,
            "Selected drug model"
        );
        result.set_drug_model(best.model);
        result.set_covariate_validation_results(best.validations);
        Ok(())
    }
}

struct Candidate<'a> {
    model: &'a DrugModel,
    score: u32,
    validations: Vec<CovariateValidationResult>,
}

/// An observation of a covariate, with its value in the definition unit
struct Observation<'t> {
    source: &'t PatientCovariate,
    value: f64,
}

/// Score `model` against the patient, with one validation result per
/// covariate definition given by the patient
pub(crate) fn score_model(
    model: &DrugModel,
    treatment: &DrugTreatment,
    computation_time: NaiveDateTime,
    language: Language,
) -> Result<(u32, Vec<CovariateValidationResult>), XpertError> {
    let mut score = 0;
    let mut validations = Vec::new();

    for definition in model.covariates.iter().filter(|d| !d.is_computed) {
        let observations = observations_for(model, definition, treatment, computation_time)?;

        let validation = if observations.is_empty() {
            score += 1;
            CovariateValidationResult {
                definition_id: definition.id.clone(),
                patient_covariate: None,
                warning: translate(TextKey::CovariateMissing, language, &default_value_text(definition)),
            }
        } else {
            let rejected = match &definition.validation {
                Some(operation) => {
                    let mut rejected = None;
                    for observation in &observations {
                        let valid = operation.evaluate(observation.value).map_err(|source| {
                            XpertError::OperationEvaluation {
                                model_id: model.drug_model_id.clone(),
                                covariate_id: definition.id.clone(),
                                source,
                            }
                        })?;
                        if !valid {
                            rejected = Some(observation);
                            break;
                        }
                    }
                    rejected
                }
                None => None,
            };

            match rejected {
                Some(observation) => {
                    score += 1;
                    CovariateValidationResult {
                        definition_id: definition.id.clone(),
                        patient_covariate: Some(observation.source.clone()),
                        warning: definition
                            .validation_error_message
                            .get(language)
                            .unwrap_or_default()
                            .to_string(),
                    }
                }
                None => {
                    let latest = observations.iter().max_by_key(|o| o.source.date);
                    CovariateValidationResult {
                        definition_id: definition.id.clone(),
                        patient_covariate: latest.map(|o| o.source.clone()),
                        warning: String::new(),
                    }
                }
            }
        };
        validations.push(validation);
    }

    Ok((score, validations))
}

fn default_value_text(definition: &CovariateDefinition) -> String {
    if definition.unit.as_str().is_empty() {
        definition.default_value.to_string()
    } else {
        format!("{} {}", definition.default_value, definition.unit)
    }
}

/// Patient observations of `definition`, converted to the definition unit
///
/// Without observation, the age is computed at `computation_time` from the
/// patient birthdate.
fn observations_for<'t>(
    model: &DrugModel,
    definition: &CovariateDefinition,
    treatment: &'t DrugTreatment,
    computation_time: NaiveDateTime,
) -> Result<Vec<Observation<'t>>, XpertError> {
    let mut observations = Vec::new();
    for covariate in treatment.covariates.iter().filter(|c| c.id == definition.id) {
        observations.push(Observation {
            source: covariate,
            value: converted_value(model, definition, covariate)?,
        });
    }

    if observations.is_empty() && definition.id == AGE {
        if let Some(birthdate) = single_birthdate(treatment)? {
            let date = birthdate
                .date_value()
                .ok_or_else(|| XpertError::InvalidCovariateValue(BIRTHDATE.to_string()))?;
            let age = age_in_unit(date, computation_time, &definition.unit)
                .map_err(|e| XpertError::unit_conversion(&model.drug_model_id, e))?;
            observations.push(Observation {
                source: birthdate,
                value: age,
            });
        }
    }

    Ok(observations)
}

fn converted_value(
    model: &DrugModel,
    definition: &CovariateDefinition,
    covariate: &PatientCovariate,
) -> Result<f64, XpertError> {
    let value = covariate
        .numeric_value()
        .ok_or_else(|| XpertError::InvalidCovariateValue(covariate.id.clone()))?;
    // A unitless observation is taken in the definition unit
    let unit = if covariate.unit.as_str().is_empty() {
        &definition.unit
    } else {
        &covariate.unit
    };
    UnitManager::convert(value, unit, &definition.unit)
        .map_err(|e| XpertError::unit_conversion(&model.drug_model_id, e))
}

fn single_birthdate(treatment: &DrugTreatment) -> Result<Option<&PatientCovariate>, XpertError> {
    let mut birthdates = treatment.covariates.iter().filter(|c| c.id == BIRTHDATE);
    let first = birthdates.next();
    if birthdates.next().is_some() {
        return Err(XpertError::AmbiguousBirthdate);
    }
    Ok(first)
}

/// Whether the patient is within the hard domain constraints of `model`
///
/// Constraints are evaluated over `[oldest covariate date, computation_time]`.
pub(crate) fn satisfies_constraints(
    model: &DrugModel,
    treatment: &DrugTreatment,
    computation_time: NaiveDateTime,
) -> Result<bool, XpertError> {
    let window_start = treatment
        .covariates
        .iter()
        .map(|c| c.date)
        .min()
        .unwrap_or(computation_time)
        .min(computation_time);

    for constraint in &model.constraints {
        let values = constraint_values(model, constraint, treatment, window_start, computation_time)?;
        let mut violated = false;
        for value in values {
            let ok = constraint
                .operation
                .evaluate(value)
                .map_err(|e| domain_error(model, e.to_string()))?;
            violated |= !ok;
        }

        if violated {
            match constraint.kind {
                ConstraintKind::Hard => {
                    tracing::debug!(
                        drug_model_id = %model.drug_model_id,
                        covariate = %constraint.covariate_id,
                        "Hard domain constraint violated"
                    );
                    return Ok(false);
                }
                ConstraintKind::Soft => {
                    tracing::debug!(
                        drug_model_id = %model.drug_model_id,
                        covariate = %constraint.covariate_id,
                        "Soft domain constraint violated"
                    );
                }
            }
        }
    }
    Ok(true)
}

fn constraint_values(
    model: &DrugModel,
    constraint: &DomainConstraint,
    treatment: &DrugTreatment,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> Result<Vec<f64>, XpertError> {
    let definition = model
        .covariate_definition(&constraint.covariate_id)
        .ok_or_else(|| {
            domain_error(model, format!("unknown covariate '{}'", constraint.covariate_id))
        })?;

    let mut values = Vec::new();
    for covariate in treatment
        .covariates
        .iter()
        .filter(|c| c.id == definition.id && c.date >= from && c.date <= to)
    {
        let value = converted_value(model, definition, covariate)
            .map_err(|e| domain_error(model, e.to_string()))?;
        values.push(value);
    }

    if values.is_empty() && definition.id == AGE {
        if let Some(date) = single_birthdate(treatment)?.and_then(PatientCovariate::date_value) {
            for at in [from, to] {
                let age = age_in_unit(date, at, &definition.unit)
                    .map_err(|e| domain_error(model, e.to_string()))?;
                values.push(age);
            }
        }
    }

    if values.is_empty() {
        values.push(definition.default_value);
    }
    Ok(values)
}

fn domain_error(model: &DrugModel, reason: String) -> XpertError {
    XpertError::DomainComputation {
        model_id: model.drug_model_id.clone(),
        reason,
    }
}

/// Every covariate of the model must be displayable in `language` or English
///
/// Name, description and validation error message are all required, even
/// for covariates without a validation formula.
pub(crate) fn check_translations(model: &DrugModel, language: Language) -> Result<(), XpertError> {
    for definition in &model.covariates {
        let translated = definition.name.has_translation(language)
            && definition.description.has_translation(language)
            && definition.validation_error_message.has_translation(language);
        if !translated {
            return Err(XpertError::MissingTranslation {
                model_id: model.drug_model_id.clone(),
                covariate_id: definition.id.clone(),
                language,
            });
        }
    }
    Ok(())
}
