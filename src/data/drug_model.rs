//! Drug model metadata
//!
//! Only the parts of a drug model the decision pipeline reads are represented
//! here: active moieties and their targets, covariate definitions, formulation
//! and routes, half-life and domain constraints. The PK equations belong to the
//! engine.

use serde::{Deserialize, Serialize};

use crate::data::dosage::{DosageHistory, FormulationAndRoute};
use crate::data::treatment::TargetType;
use crate::language::Translatable;
use crate::operation::Operation;
use crate::units::{Unit, UnitError, UnitManager};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetDefinition {
    pub target_type: TargetType,
    #[serde(default)]
    pub unit: Unit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveMoiety {
    pub id: String,
    #[serde(default)]
    pub name: Translatable,
    #[serde(default)]
    pub targets: Vec<TargetDefinition>,
}

impl ActiveMoiety {
    pub fn new(id: impl Into<String>) -> Self {
        ActiveMoiety {
            id: id.into(),
            name: Translatable::default(),
            targets: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CovariateDefinition {
    pub id: String,
    pub default_value: f64,
    #[serde(default)]
    pub unit: Unit,
    /// Computed by the engine from other covariates, never given by the patient
    #[serde(default)]
    pub is_computed: bool,
    #[serde(default)]
    pub validation: Option<Operation>,
    #[serde(default)]
    pub name: Translatable,
    #[serde(default)]
    pub description: Translatable,
    #[serde(default)]
    pub validation_error_message: Translatable,
}

impl CovariateDefinition {
    pub fn new(id: impl Into<String>, default_value: f64, unit: impl Into<Unit>) -> Self {
        CovariateDefinition {
            id: id.into(),
            default_value,
            unit: unit.into(),
            is_computed: false,
            validation: None,
            name: Translatable::default(),
            description: Translatable::default(),
            validation_error_message: Translatable::default(),
        }
    }
}

/// Range of doses a formulation can deliver, in `unit`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableDoses {
    pub unit: Unit,
    pub default: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardTreatment {
    pub is_fixed_duration: bool,
    pub duration: f64,
    pub unit: Unit,
}

/// A formulation and route together with its clinical recommendations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullFormulationAndRoute {
    pub formulation_and_route: FormulationAndRoute,
    #[serde(default)]
    pub is_default: bool,
    pub available_doses: AvailableDoses,
    #[serde(default)]
    pub is_loading_dose_recommended: bool,
    #[serde(default)]
    pub is_rest_period_recommended: bool,
    #[serde(default)]
    pub standard_treatment: Option<StandardTreatment>,
}

impl FullFormulationAndRoute {
    /// The standard treatment, if it has a fixed duration
    pub fn fixed_standard_treatment(&self) -> Option<&StandardTreatment> {
        self.standard_treatment
            .as_ref()
            .filter(|treatment| treatment.is_fixed_duration)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HalfLife {
    pub value: f64,
    pub unit: Unit,
    /// Number of half-lives after which steady state is considered reached
    pub multiplier: f64,
}

impl HalfLife {
    pub fn new(value: f64, unit: impl Into<Unit>, multiplier: f64) -> Self {
        HalfLife {
            value,
            unit: unit.into(),
            multiplier,
        }
    }

    /// Half-life in whole hours, truncated
    pub fn hours(&self) -> Result<i64, UnitError> {
        crate::units::duration_in_hours(self.value, &self.unit)
    }

    /// `multiplier` half-lives in whole hours, truncated
    pub fn steady_state_hours(&self) -> Result<i64, UnitError> {
        let hours = UnitManager::convert(self.value, &self.unit, &Unit::from("h"))?;
        Ok((self.multiplier * hours).trunc() as i64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConstraintKind {
    /// Violations make the model unusable for the patient
    Hard,
    /// Violations are tolerated
    Soft,
}

/// A restriction on the patients a drug model applies to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainConstraint {
    pub covariate_id: String,
    pub kind: ConstraintKind,
    pub operation: Operation,
    #[serde(default)]
    pub error_message: Translatable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrugModel {
    pub drug_model_id: String,
    pub drug_id: String,
    #[serde(default)]
    pub active_moieties: Vec<ActiveMoiety>,
    #[serde(default)]
    pub covariates: Vec<CovariateDefinition>,
    pub formulation_and_routes: Vec<FullFormulationAndRoute>,
    pub half_life: HalfLife,
    #[serde(default)]
    pub constraints: Vec<DomainConstraint>,
}

impl DrugModel {
    pub fn covariate_definition(&self, id: &str) -> Option<&CovariateDefinition> {
        self.covariates.iter().find(|definition| definition.id == id)
    }

    pub fn has_active_moiety(&self, id: &str) -> bool {
        self.active_moieties.iter().any(|moiety| moiety.id == id)
    }

    pub fn formulation_and_route(
        &self,
        formulation_and_route: &FormulationAndRoute,
    ) -> Option<&FullFormulationAndRoute> {
        self.formulation_and_routes
            .iter()
            .find(|full| full.formulation_and_route.is_compatible(formulation_and_route))
    }

    /// The formulation and route flagged as default, else the first one
    pub fn default_formulation_and_route(&self) -> Option<&FullFormulationAndRoute> {
        self.formulation_and_routes
            .iter()
            .find(|full| full.is_default)
            .or_else(|| self.formulation_and_routes.first())
    }

    /// The formulation and route the treatment is given with
    ///
    /// This is the one of the latest dosage when there is a history, the
    /// model's default otherwise.
    pub fn selected_formulation_and_route(
        &self,
        history: &DosageHistory,
    ) -> Option<&FullFormulationAndRoute> {
        match history.last_formulation_and_route() {
            Some(formulation_and_route) => self.formulation_and_route(formulation_and_route),
            None => self.default_formulation_and_route(),
        }
    }

    /// Whether every formulation and route of `history` is supported
    pub fn is_compatible_with(&self, history: &DosageHistory) -> bool {
        history
            .formulation_and_routes()
            .into_iter()
            .all(|far| self.formulation_and_route(far).is_some())
    }
}
