pub mod data;
pub mod engine;
pub mod error;
pub mod flow;
pub mod language;
pub mod operation;
pub mod units;

pub use crate::data::*;
pub use crate::engine::{ComputedData, ComputingEngine, ComputingRequest, ComputingTrait};
pub use crate::flow::{
    FlowContext, FlowStep, FlowStepProvider, XpertFlowStepProvider, XpertOptions, XpertPipeline,
    XpertRequestResult,
};
pub use error::{ComputationStage, XpertError};
pub use language::Language;
pub use units::{Unit, UnitError, UnitManager};

pub mod prelude {
    pub mod data {
        pub use crate::data::{
            DosageHistory, DosageTimeRange, DrugModel, DrugModelRepository, DrugTreatment,
            PatientCovariate, Sample, Target, XpertRequest,
        };
    }
    pub mod engine {
        pub use crate::engine::{
            AdjustmentData, AdjustmentTrait, ComputedData, ComputingEngine, ComputingRequest,
            ComputingTrait, PercentilesData, PercentilesTrait, PredictionParameterType,
        };
    }
    pub mod flow {
        pub use crate::flow::{
            AdjustmentTraitCreator, DoseValidator, ModelSelector, RequestExecutor,
            SampleValidator, TargetValidator,
        };
    }

    pub use crate::data::*;
    pub use crate::error::XpertError;
    pub use crate::flow::{
        CovariateValidationResult, DoseValidationResult, FlowStep, SampleValidationResult,
        WarningLevel, XpertOptions, XpertPipeline, XpertRequestResult,
    };
    pub use crate::language::Language;
}
