use crate::error::XpertError;
use crate::flow::request_result::{DoseValidationResult, XpertRequestResult};
use crate::flow::{FlowContext, FlowStep};
use crate::language::{translate, TextKey};
use crate::units::UnitManager;

/// Checks every dose of the dosage history against the doses available for
/// its formulation and route
pub struct DoseValidator;

impl FlowStep for DoseValidator {
    fn name(&self) -> &'static str {
        "DoseValidator"
    }

    fn perform<'a>(
        &self,
        result: &mut XpertRequestResult<'a>,
        _context: FlowContext<'a, '_>,
    ) -> Result<(), XpertError> {
        let treatment = result.treatment().ok_or(XpertError::MissingTreatment)?;
        let model = result.drug_model().ok_or(XpertError::MissingDrugModel)?;
        let language = result.request().output_lang;

        let mut validations = Vec::new();
        for (index, range) in treatment.dosage_history.time_ranges().iter().enumerate() {
            for dose in range.dosage.single_doses() {
                let full = model
                    .formulation_and_route(&dose.formulation_and_route)
                    .ok_or_else(|| XpertError::UnsupportedFormulationAndRoute {
                        model_id: model.drug_model_id.clone(),
                        formulation_and_route: dose.formulation_and_route.to_string(),
                    })?;
                let available = &full.available_doses;

                let value = UnitManager::convert(dose.dose, &dose.unit, &available.unit)
                    .map_err(|e| XpertError::unit_conversion(&model.drug_model_id, e))?;

                let warning = if value < available.min {
                    let bound = format!("{} {}", available.min, available.unit);
                    translate(TextKey::DoseBelowMinimum, language, &bound)
                } else if value > available.max {
                    let bound = format!("{} {}", available.max, available.unit);
                    translate(TextKey::DoseAboveMaximum, language, &bound)
                } else {
                    String::new()
                };

                validations.push(DoseValidationResult {
                    time_range_index: index,
                    dose: dose.clone(),
                    warning,
                });
            }
        }

        tracing::debug!(doses = validations.len(), "Validated doses");
        result.set_dose_validation_results(validations);
        Ok(())
    }
}
