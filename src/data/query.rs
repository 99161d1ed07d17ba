use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::engine::{
    FormulationAndRouteSelectionOption, LoadingOption, RestPeriodOption, TargetExtractionOption,
};
use crate::language::Language;

/// User choices for the adjustment, `None` defers to the drug model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpertRequestOptions {
    #[serde(default)]
    pub loading_option: Option<LoadingOption>,
    #[serde(default)]
    pub rest_period_option: Option<RestPeriodOption>,
    #[serde(default)]
    pub target_extraction_option: TargetExtractionOption,
    #[serde(default)]
    pub formulation_and_route_selection_option: FormulationAndRouteSelectionOption,
}

/// One drug request of an xpert query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpertRequest {
    pub drug_id: String,
    #[serde(default)]
    pub output_lang: Language,
    /// Reference "now" of the query
    pub computation_time: NaiveDateTime,
    #[serde(default)]
    pub adjustment_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub options: XpertRequestOptions,
}

impl XpertRequest {
    pub fn new(drug_id: impl Into<String>, computation_time: NaiveDateTime) -> Self {
        XpertRequest {
            drug_id: drug_id.into(),
            output_lang: Language::default(),
            computation_time,
            adjustment_time: None,
            options: XpertRequestOptions::default(),
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.output_lang = language;
        self
    }

    pub fn with_adjustment_time(mut self, adjustment_time: NaiveDateTime) -> Self {
        self.adjustment_time = Some(adjustment_time);
        self
    }

    pub fn with_options(mut self, options: XpertRequestOptions) -> Self {
        self.options = options;
        self
    }
}
