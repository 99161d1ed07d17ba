//! Shared fixtures for the xpert integration tests

use std::sync::Mutex;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tuberxpert::engine::{
    AdjustmentData, ComputedData, ComputingEngine, ComputingRequest, ComputingTrait,
    CycleData, CycleStatistics, DosageAdjustment, ParameterValue, PercentilesData,
    PredictionParameterType,
};
use tuberxpert::prelude::*;

/// A rifampicin model, adult population, given orally once a day
pub const RIFAMPICIN: &str = r#"{
    "drugModelId": "ch.tucuxi.rifampicin.adult",
    "drugId": "rifampicin",
    "activeMoieties": [{
        "id": "rifampicin",
        "name": { "en": "Rifampicin" },
        "targets": [{ "targetType": "auc24", "unit": "mg*h/l" }]
    }],
    "covariates": [
        {
            "id": "bodyweight",
            "defaultValue": 70.0,
            "unit": "kg",
            "validation": { "op": "between", "min": 20.0, "max": 200.0 },
            "name": { "en": "Total body weight", "fr": "Poids total" },
            "description": { "en": "Total body weight of the patient" },
            "validationErrorMessage": { "en": "The body weight shall be in [20, 200] kg" }
        },
        {
            "id": "age",
            "defaultValue": 40.0,
            "unit": "y",
            "validation": { "op": "compare", "cmp": "ge", "value": 18.0 },
            "name": { "en": "Age" },
            "description": { "en": "Age of the patient, in years" },
            "validationErrorMessage": { "en": "The patient shall be an adult" }
        }
    ],
    "formulationAndRoutes": [{
        "formulationAndRoute": {
            "formulation": "oralSolution",
            "administrationName": "foo bar",
            "administrationRoute": "oral",
            "absorptionModel": "extravascular"
        },
        "isDefault": true,
        "availableDoses": { "unit": "mg", "default": 600.0, "min": 150.0, "max": 1200.0 }
    }],
    "halfLife": { "value": 12.0, "unit": "h", "multiplier": 10.0 }
}"#;

pub fn rifampicin() -> DrugModel {
    DrugModelRepository::parse(RIFAMPICIN).unwrap()
}

/// 2024-01-`day` at `hour`:00
pub fn dt(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

pub fn oral() -> FormulationAndRoute {
    FormulationAndRoute::new(
        "oralSolution",
        AdministrationRoute::Oral,
        AbsorptionModel::Extravascular,
    )
}

/// `dose` mg every 24 hours from `start`
pub fn daily_history(start: NaiveDateTime, end: Option<NaiveDateTime>, dose: f64) -> DosageHistory {
    DosageHistory::new().with_time_range(DosageTimeRange::new(
        start,
        end,
        Dosage::looped(Dosage::lasting(SingleDose::new(dose, "mg", oral()), 24.0)),
    ))
}

pub fn weight(value: f64, date: NaiveDateTime) -> PatientCovariate {
    PatientCovariate::new("bodyweight", CovariateValue::Number(value), "kg", date)
}

pub fn birthdate(y: i32, m: u32, d: u32) -> PatientCovariate {
    PatientCovariate::new(
        BIRTHDATE,
        CovariateValue::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap()),
        "",
        dt(1, 8),
    )
}

/// Clearance reported by [`PkStub`] for each parameter type
pub fn clearance(parameter_type: PredictionParameterType) -> f64 {
    match parameter_type {
        PredictionParameterType::Aposteriori => 4.2,
        PredictionParameterType::Apriori => 5.1,
        PredictionParameterType::Population => 6.0,
    }
}

/// An engine answering every request with deterministic data
///
/// Percentile rank index `i` is a flat curve at `10 + i` mg/l. Adjustments
/// have one daily cycle per day of the requested window; the first cycle
/// carries the clearance of the parameter type and the last one a mean equal
/// to the window length in hours.
#[derive(Default)]
pub struct PkStub {
    requests: Mutex<Vec<ComputingTrait>>,
}

impl PkStub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<ComputingTrait> {
        self.requests.lock().unwrap().clone()
    }
}

impl ComputingEngine for PkStub {
    fn compute(&self, request: &ComputingRequest<'_>) -> anyhow::Result<ComputedData> {
        self.requests
            .lock()
            .unwrap()
            .push(request.computing_trait.clone());

        match &request.computing_trait {
            ComputingTrait::Percentiles(t) => Ok(ComputedData::Percentiles(PercentilesData {
                id: t.id.clone(),
                ranks: t.ranks.clone(),
                percentiles: (0..t.ranks.len())
                    .map(|i| {
                        let c = 10.0 + i as f64;
                        vec![CycleData {
                            start: t.start,
                            end: t.end,
                            times: vec![0.0, (t.end - t.start).num_minutes() as f64 / 60.0],
                            concentrations: vec![c, c],
                            unit: "mg/l".into(),
                            parameters: vec![],
                            statistics: CycleStatistics::default(),
                        }]
                    })
                    .collect(),
            })),
            ComputingTrait::Adjustment(t) => {
                let days = (t.end - t.start).num_days().max(1);
                let data = (0..days)
                    .map(|day| {
                        let start = t.start + Duration::days(day);
                        CycleData {
                            start,
                            end: start + Duration::days(1),
                            times: vec![0.0, 24.0],
                            concentrations: vec![0.0, 0.0],
                            unit: "mg/l".into(),
                            parameters: if day == 0 {
                                vec![ParameterValue::new(
                                    "CL",
                                    clearance(t.computing_option.parameter_type),
                                )]
                            } else {
                                vec![]
                            },
                            statistics: CycleStatistics {
                                mean: (t.end - t.start).num_hours() as f64,
                                ..Default::default()
                            },
                        }
                    })
                    .collect();
                Ok(ComputedData::Adjustment(AdjustmentData {
                    id: t.id.clone(),
                    adjustments: vec![DosageAdjustment {
                        score: 1.0,
                        history: Default::default(),
                        data,
                    }],
                }))
            }
        }
    }
}
