//! The xpert decision pipeline
//!
//! Each drug request of a query gets its own [`XpertRequestResult`], which is
//! passed through an ordered list of [`FlowStep`]s. A step either completes
//! and stores its outputs on the result, or fails; the first failure is
//! recorded on the result and every following step is skipped.
//!
//! # Example
//!
//! ```rust,ignore
//! use tuberxpert::prelude::*;
//!
//! let repository = DrugModelRepository::from_dir(Path::new("drugfiles"))?;
//! let pipeline = XpertPipeline::new(&repository, &engine);
//!
//! let mut result = XpertRequestResult::new(request, Some(treatment));
//! pipeline.run(&mut result);
//! if let Some(error) = result.error() {
//!     eprintln!("{}", error);
//! }
//! ```

pub mod adjustment_trait;
pub mod dose_validator;
pub mod model_selector;
pub mod options;
pub mod percentile;
pub mod request_executor;
pub mod request_result;
pub mod sample_validator;
pub mod target_validator;

#[cfg(test)]
pub(crate) mod test_support;

pub use adjustment_trait::{compute_adjustment_time, AdjustmentTraitCreator};
pub use dose_validator::DoseValidator;
pub use model_selector::ModelSelector;
pub use options::{SampleThresholds, XpertOptions};
pub use percentile::PositioningError;
pub use request_executor::RequestExecutor;
pub use request_result::{
    CovariateValidationResult, DoseValidationResult, SampleValidationResult, WarningLevel,
    XpertRequestResult,
};
pub use sample_validator::SampleValidator;
pub use target_validator::TargetValidator;

use rayon::prelude::*;

use crate::data::DrugModelRepository;
use crate::engine::ComputingEngine;
use crate::error::XpertError;

/// Shared, read-only collaborators of the flow steps
///
/// Drug models borrowed from `repository` live as long as the request results
/// they are stored on.
#[derive(Clone, Copy)]
pub struct FlowContext<'r, 'e> {
    pub repository: &'r DrugModelRepository,
    pub engine: &'e dyn ComputingEngine,
    pub options: &'e XpertOptions,
}

/// A stage of the pipeline
pub trait FlowStep: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run the step on `result`
    fn perform<'a>(
        &self,
        result: &mut XpertRequestResult<'a>,
        context: FlowContext<'a, '_>,
    ) -> Result<(), XpertError>;

    /// Run the step unless the request already failed, recording any failure
    fn execute<'a>(&self, result: &mut XpertRequestResult<'a>, context: FlowContext<'a, '_>) {
        if !result.should_continue_processing() {
            tracing::debug!(step = self.name(), "Skipped after a previous failure");
            return;
        }
        if let Err(error) = self.perform(result, context) {
            tracing::warn!(
                step = self.name(),
                drug_id = %result.request().drug_id,
                %error,
                "Request processing failed"
            );
            result.set_error(error);
        }
    }
}

/// Supplies the ordered steps of a pipeline
pub trait FlowStepProvider: Send + Sync {
    fn steps(&self) -> &[Box<dyn FlowStep>];
}

/// The steps of a dosage adjustment report
pub struct XpertFlowStepProvider {
    steps: Vec<Box<dyn FlowStep>>,
}

impl XpertFlowStepProvider {
    pub fn new() -> Self {
        XpertFlowStepProvider {
            steps: vec![
                Box::new(ModelSelector),
                Box::new(TargetValidator),
                Box::new(DoseValidator),
                Box::new(SampleValidator),
                Box::new(AdjustmentTraitCreator),
                Box::new(RequestExecutor),
            ],
        }
    }
}

impl Default for XpertFlowStepProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowStepProvider for XpertFlowStepProvider {
    fn steps(&self) -> &[Box<dyn FlowStep>] {
        &self.steps
    }
}

/// Runs request results through the steps of a [`FlowStepProvider`]
pub struct XpertPipeline<'a> {
    repository: &'a DrugModelRepository,
    engine: &'a dyn ComputingEngine,
    options: XpertOptions,
    provider: Box<dyn FlowStepProvider>,
}

impl<'a> XpertPipeline<'a> {
    pub fn new(repository: &'a DrugModelRepository, engine: &'a dyn ComputingEngine) -> Self {
        XpertPipeline {
            repository,
            engine,
            options: XpertOptions::default(),
            provider: Box::new(XpertFlowStepProvider::new()),
        }
    }

    pub fn with_options(mut self, options: XpertOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_provider(mut self, provider: impl FlowStepProvider + 'static) -> Self {
        self.provider = Box::new(provider);
        self
    }

    pub fn options(&self) -> &XpertOptions {
        &self.options
    }

    fn context(&self) -> FlowContext<'a, '_> {
        FlowContext {
            repository: self.repository,
            engine: self.engine,
            options: &self.options,
        }
    }

    /// Process one request result, step by step
    pub fn run(&self, result: &mut XpertRequestResult<'a>) {
        let context = self.context();
        tracing::info!(drug_id = %result.request().drug_id, "Processing xpert request");

        for step in self.provider.steps() {
            if !result.should_continue_processing() {
                break;
            }
            tracing::debug!(step = step.name(), "Running flow step");
            step.execute(result, context);
        }

        if result.should_continue_processing() {
            tracing::info!(drug_id = %result.request().drug_id, "Xpert request processed");
        }
    }

    /// Process independent request results in parallel
    pub fn run_all(&self, results: &mut [XpertRequestResult<'a>]) {
        results.par_iter_mut().for_each(|result| self.run(result));
    }
}
