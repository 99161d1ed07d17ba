use std::collections::{BTreeSet, HashMap};

use crate::data::TargetType;
use crate::error::XpertError;
use crate::flow::request_result::XpertRequestResult;
use crate::flow::{FlowContext, FlowStep};

/// Checks the patient targets against each other and the drug model
///
/// Two targets may not share both the active moiety and the target type, and
/// every target must refer to an active moiety of the selected model.
pub struct TargetValidator;

impl FlowStep for TargetValidator {
    fn name(&self) -> &'static str {
        "TargetValidator"
    }

    fn perform<'a>(
        &self,
        result: &mut XpertRequestResult<'a>,
        _context: FlowContext<'a, '_>,
    ) -> Result<(), XpertError> {
        let treatment = result.treatment().ok_or(XpertError::MissingTreatment)?;
        let model = result.drug_model().ok_or(XpertError::MissingDrugModel)?;

        let mut seen: HashMap<&str, BTreeSet<TargetType>> = HashMap::new();
        for target in &treatment.targets {
            let types = seen.entry(target.active_moiety_id.as_str()).or_default();
            if !types.insert(target.target_type) {
                return Err(XpertError::TargetOverlap);
            }

            if !model.has_active_moiety(&target.active_moiety_id) {
                return Err(XpertError::UnknownTargetActiveMoiety(
                    target.active_moiety_id.clone(),
                ));
            }
        }
        Ok(())
    }
}
