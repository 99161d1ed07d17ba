use std::fmt;
use thiserror::Error;

use crate::language::Language;
use crate::operation::OperationError;
use crate::units::UnitError;

/// Computation submitted to the PK engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputationStage {
    Adjustment,
    SteadyStateStatistics,
    AprioriParameters,
    PopulationParameters,
    Percentiles,
}

impl fmt::Display for ComputationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            ComputationStage::Adjustment => "Adjustment computation",
            ComputationStage::SteadyStateStatistics => "Steady state statistics computation",
            ComputationStage::AprioriParameters => "A priori parameters computation",
            ComputationStage::PopulationParameters => "Typical patient parameters computation",
            ComputationStage::Percentiles => "Percentiles computation",
        };
        write!(f, "{}", stage)
    }
}

/// Terminal failure of an xpert request
///
/// The first error recorded on a request result stops its processing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum XpertError {
    #[error("No treatment set.")]
    MissingTreatment,

    #[error("No drug model set.")]
    MissingDrugModel,

    #[error("No adjustment trait set.")]
    MissingAdjustmentTrait,

    #[error("Multiple formulations and routes are not supported.")]
    MixedFormulationAndRoutes,

    #[error("No drug model found for drug '{0}'.")]
    NoDrugModelForDrug(String),

    #[error("No valid drug model found.")]
    NoValidDrugModel,

    #[error("Error in the evaluation of the domain constraints of drug model '{model_id}': {reason}")]
    DomainComputation { model_id: String, reason: String },

    #[error("Error in the conversion of units for drug model '{model_id}': {source}")]
    UnitConversion {
        model_id: String,
        #[source]
        source: UnitError,
    },

    #[error("Covariate '{covariate_id}' of drug model '{model_id}' cannot be validated: {source}")]
    OperationEvaluation {
        model_id: String,
        covariate_id: String,
        #[source]
        source: OperationError,
    },

    #[error("Patient covariate '{0}' has no numeric value.")]
    InvalidCovariateValue(String),

    #[error("Multiple birthdates are present, the age of the patient cannot be computed.")]
    AmbiguousBirthdate,

    #[error(
        "Drug model '{model_id}' has no translation in '{language}' or English for covariate '{covariate_id}'."
    )]
    MissingTranslation {
        model_id: String,
        covariate_id: String,
        language: Language,
    },

    #[error("Two patient's targets with the same active moiety and the same target type detected.")]
    TargetOverlap,

    #[error("Patient's target active moiety '{0}' is not part of the drug model.")]
    UnknownTargetActiveMoiety(String),

    #[error("Formulation and route {formulation_and_route} is not supported by drug model '{model_id}'.")]
    UnsupportedFormulationAndRoute {
        model_id: String,
        formulation_and_route: String,
    },

    #[error("Validation of sample '{sample_id}' failed: {reason}")]
    SampleValidation { sample_id: String, reason: String },

    #[error(
        "Based on the standard treatment in the model, the treatment is already over at the time of the adjustment."
    )]
    TreatmentAlreadyOver,

    #[error("Time computation out of range: {0}.")]
    TimeOutOfRange(&'static str),

    #[error("{stage} failed: {reason}")]
    Computation {
        stage: ComputationStage,
        reason: String,
    },
}

impl XpertError {
    pub(crate) fn computation(stage: ComputationStage, reason: impl Into<String>) -> Self {
        XpertError::Computation {
            stage,
            reason: reason.into(),
        }
    }

    pub(crate) fn unit_conversion(model_id: impl Into<String>, source: UnitError) -> Self {
        XpertError::UnitConversion {
            model_id: model_id.into(),
            source,
        }
    }
}
