pub mod covariate;
pub mod dosage;
pub mod drug_model;
pub mod query;
pub mod repository;
pub mod treatment;

pub use covariate::{age_in_unit, CovariateValue, PatientCovariate, AGE, BIRTHDATE};
pub use dosage::{
    AbsorptionModel, AdministrationRoute, Dosage, DosageHistory, DosageTimeRange,
    FormulationAndRoute, IntakeEvent, SingleDose,
};
pub use drug_model::{
    ActiveMoiety, AvailableDoses, ConstraintKind, CovariateDefinition, DomainConstraint, DrugModel,
    FullFormulationAndRoute, HalfLife, StandardTreatment, TargetDefinition,
};
pub use query::{XpertRequest, XpertRequestOptions};
pub use repository::{DrugModelRepository, RepositoryError};
pub use treatment::{DrugTreatment, Sample, Target, TargetType};
