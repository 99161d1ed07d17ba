//! Contract with the PK computation engine
//!
//! The engine is an external collaborator: it receives a [`ComputingRequest`]
//! (treatment, drug model and a [`ComputingTrait`]) and returns either
//! [`ComputedData`] or an error. This crate never simulates concentrations
//! itself.

pub mod computed_data;
pub mod computing_trait;

pub use computed_data::*;
pub use computing_trait::*;

use crate::data::{DrugModel, DrugTreatment};

/// Everything the engine needs for one computation
#[derive(Debug, Clone)]
pub struct ComputingRequest<'a> {
    pub id: String,
    pub drug_model: &'a DrugModel,
    pub treatment: &'a DrugTreatment,
    pub computing_trait: ComputingTrait,
}

impl<'a> ComputingRequest<'a> {
    pub fn new(
        id: impl Into<String>,
        drug_model: &'a DrugModel,
        treatment: &'a DrugTreatment,
        computing_trait: ComputingTrait,
    ) -> Self {
        ComputingRequest {
            id: id.into(),
            drug_model,
            treatment,
            computing_trait,
        }
    }
}

/// A blocking PK computation service
///
/// Failures are returned, never retried by the caller.
pub trait ComputingEngine: Send + Sync {
    fn compute(&self, request: &ComputingRequest<'_>) -> anyhow::Result<ComputedData>;
}
