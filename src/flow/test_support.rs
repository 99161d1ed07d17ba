//! Fixtures shared by the flow step tests

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime};

use crate::data::{
    AbsorptionModel, ActiveMoiety, AdministrationRoute, AvailableDoses, CovariateDefinition,
    CovariateValue, Dosage, DosageTimeRange, DrugModel, DrugModelRepository, FormulationAndRoute,
    FullFormulationAndRoute, HalfLife, PatientCovariate, SingleDose, XpertRequest,
};
use crate::engine::{ComputedData, ComputingEngine, ComputingRequest, ComputingTrait};
use crate::flow::options::XpertOptions;
use crate::flow::FlowContext;
use crate::language::{Language, Translatable};

/// An engine replaying canned responses and recording the submitted traits
pub struct ScriptedEngine {
    responses: Mutex<VecDeque<anyhow::Result<ComputedData>>>,
    requests: Mutex<Vec<ComputingTrait>>,
}

impl ScriptedEngine {
    pub fn new(responses: Vec<anyhow::Result<ComputedData>>) -> Self {
        ScriptedEngine {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ComputingTrait> {
        self.requests.lock().unwrap().clone()
    }
}

impl ComputingEngine for ScriptedEngine {
    fn compute(&self, request: &ComputingRequest<'_>) -> anyhow::Result<ComputedData> {
        self.requests
            .lock()
            .unwrap()
            .push(request.computing_trait.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow::anyhow!("no scripted response")))
    }
}

pub fn context<'r, 'e>(
    repository: &'r DrugModelRepository,
    engine: &'e ScriptedEngine,
    options: &'e XpertOptions,
) -> FlowContext<'r, 'e> {
    FlowContext {
        repository,
        engine,
        options,
    }
}

/// 2024-01-`day` at `hour`:00
pub fn dt(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

/// A rifampicin request computed on 2024-01-10 at 10:00
pub fn request() -> XpertRequest {
    XpertRequest::new("rifampicin", dt(10, 10))
}

pub fn oral() -> FormulationAndRoute {
    FormulationAndRoute::new(
        "oralSolution",
        AdministrationRoute::Oral,
        AbsorptionModel::Extravascular,
    )
}

pub fn infusion() -> FormulationAndRoute {
    FormulationAndRoute::new(
        "parenteralSolution",
        AdministrationRoute::Intravenous,
        AbsorptionModel::Infusion,
    )
}

/// 600 mg every 24 hours from `start`, open-ended
pub fn daily_range(start: NaiveDateTime, formulation_and_route: FormulationAndRoute) -> DosageTimeRange {
    DosageTimeRange::new(
        start,
        None,
        Dosage::looped(Dosage::lasting(
            SingleDose::new(600.0, "mg", formulation_and_route),
            24.0,
        )),
    )
}

/// A rifampicin model given orally, 150 to 1200 mg, half-life of 12 h
pub fn drug_model(id: &str, covariates: Vec<CovariateDefinition>) -> DrugModel {
    DrugModel {
        drug_model_id: id.to_string(),
        drug_id: "rifampicin".to_string(),
        active_moieties: vec![ActiveMoiety::new("rifampicin")],
        covariates,
        formulation_and_routes: vec![FullFormulationAndRoute {
            formulation_and_route: oral(),
            is_default: true,
            available_doses: AvailableDoses {
                unit: "mg".into(),
                default: 600.0,
                min: 150.0,
                max: 1200.0,
            },
            is_loading_dose_recommended: false,
            is_rest_period_recommended: false,
            standard_treatment: None,
        }],
        half_life: HalfLife::new(12.0, "h", 10.0),
        constraints: vec![],
    }
}

/// English name, description and "<id> out of range" validation message
pub fn translated(mut definition: CovariateDefinition) -> CovariateDefinition {
    definition.name = Translatable::new().with(Language::English, definition.id.clone());
    definition.description = Translatable::new().with(Language::English, definition.id.clone());
    definition.validation_error_message =
        Translatable::new().with(Language::English, format!("{} out of range", definition.id));
    definition
}

pub fn numeric(id: &str, value: f64, unit: &str, date: NaiveDateTime) -> PatientCovariate {
    PatientCovariate::new(id, CovariateValue::Number(value), unit, date)
}
