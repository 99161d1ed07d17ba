use serde::{Deserialize, Serialize};

/// Group thresholds of sample validation
///
/// Warning text and severity use independent threshold pairs: a group gets a
/// warning when `group <= warning_low || group > warning_high`, and is
/// critical when `group <= critical_low || group > critical_high`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleThresholds {
    pub warning_low: u8,
    pub warning_high: u8,
    pub critical_low: u8,
    pub critical_high: u8,
}

impl Default for SampleThresholds {
    fn default() -> Self {
        Self {
            warning_low: 10,
            warning_high: 90,
            critical_low: 5,
            critical_high: 95,
        }
    }
}

/// Configuration of the xpert pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct XpertOptions {
    /// Sampling density of the primary adjustment (default: 20)
    pub adjustment_points_per_hour: f64,
    /// Sampling density of the steady state statistics (default: 20)
    pub statistics_points_per_hour: f64,
    /// Sampling density of the parameter computations (default: 1)
    pub parameters_points_per_hour: f64,
    /// Sampling density of the sample percentiles (default: 20)
    pub percentiles_points_per_hour: f64,
    /// Half width of the percentile window around a sample, in hours (default: 1)
    pub sample_window_hours: i64,
    /// Length of the evaluation window without standard treatment, in days (default: 7)
    pub default_window_days: i64,
    /// Lead of the window start over the adjustment time, in hours (default: 1)
    pub window_lead_hours: i64,
    /// Offset from now of the fallback adjustment time, in hours (default: 1)
    pub fallback_adjustment_offset_hours: i64,
    /// How far past now intakes are searched for the adjustment time, in days (default: 7)
    pub intake_horizon_days: i64,
    pub sample_thresholds: SampleThresholds,
}

impl Default for XpertOptions {
    fn default() -> Self {
        Self {
            adjustment_points_per_hour: 20.0,
            statistics_points_per_hour: 20.0,
            parameters_points_per_hour: 1.0,
            percentiles_points_per_hour: 20.0,
            sample_window_hours: 1,
            default_window_days: 7,
            window_lead_hours: 1,
            fallback_adjustment_offset_hours: 1,
            intake_horizon_days: 7,
            sample_thresholds: SampleThresholds::default(),
        }
    }
}

impl XpertOptions {
    /// Read options from JSON, missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_adjustment_points_per_hour(mut self, points_per_hour: f64) -> Self {
        self.adjustment_points_per_hour = points_per_hour;
        self
    }

    pub fn with_statistics_points_per_hour(mut self, points_per_hour: f64) -> Self {
        self.statistics_points_per_hour = points_per_hour;
        self
    }

    pub fn with_parameters_points_per_hour(mut self, points_per_hour: f64) -> Self {
        self.parameters_points_per_hour = points_per_hour;
        self
    }

    pub fn with_sample_window_hours(mut self, hours: i64) -> Self {
        self.sample_window_hours = hours;
        self
    }

    pub fn with_default_window_days(mut self, days: i64) -> Self {
        self.default_window_days = days;
        self
    }

    pub fn with_sample_thresholds(mut self, thresholds: SampleThresholds) -> Self {
        self.sample_thresholds = thresholds;
        self
    }
}
