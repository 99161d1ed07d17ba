//! Positioning of a measure within population percentiles
//!
//! The PK engine returns one concentration curve per percentile rank. The
//! curves split the population into bands; a sample belongs to the band of
//! the first curve that is above or equal to its value at the sample time.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::data::Sample;
use crate::engine::{CycleData, PercentilesData};
use crate::flow::options::SampleThresholds;
use crate::flow::request_result::WarningLevel;
use crate::language::{translate, Language, TextKey};
use crate::units::{UnitError, UnitManager};

/// Number of bands formed by the 99 percentile curves
pub const GROUP_COUNT: u8 = 100;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PositioningError {
    #[error("The sample date {0} is not within the computed cycles.")]
    DateNotInCycles(NaiveDateTime),
    #[error("No percentile was computed.")]
    EmptyPercentiles,
    #[error("The sample date is not within the curve of percentile rank index {rank_index}.")]
    NoBracket { rank_index: usize },
    #[error("Cannot convert the sample value: {0}")]
    Unit(#[from] UnitError),
}

/// The ranks requested to the engine for sample validation, 1 to 99
pub fn percentile_ranks() -> Vec<f64> {
    (1..GROUP_COUNT).map(f64::from).collect()
}

/// Find the percentile group of `sample`, in `[1, 100]`
///
/// The cycle containing the sample date is located on the first rank and the
/// same cycle index is used for every rank. Within a cycle, the pair of points
/// bracketing the sample date is searched from where the previous rank found
/// it, falling back to a full scan when the curves are not aligned.
pub fn find_group(percentiles: &PercentilesData, sample: &Sample) -> Result<u8, PositioningError> {
    let first = percentiles
        .percentiles
        .first()
        .ok_or(PositioningError::EmptyPercentiles)?;
    let cycle_index = first
        .iter()
        .position(|cycle| cycle.contains(sample.date))
        .ok_or(PositioningError::DateNotInCycles(sample.date))?;

    let measure = UnitManager::convert(sample.value, &sample.unit, &first[cycle_index].unit)?;

    let mut cursor = 0;
    for (rank_index, cycles) in percentiles.percentiles.iter().enumerate() {
        let cycle = cycles
            .get(cycle_index)
            .ok_or(PositioningError::DateNotInCycles(sample.date))?;

        let pair = find_bracket(cycle, sample.date, cursor)
            .or_else(|| find_bracket(cycle, sample.date, 0))
            .ok_or(PositioningError::NoBracket { rank_index })?;
        cursor = pair;

        if measure <= interpolate(cycle, pair, sample.date) {
            return Ok(group_from_index(rank_index + 1));
        }
    }

    Ok(group_from_index(percentiles.percentiles.len() + 1))
}

fn group_from_index(index: usize) -> u8 {
    index.min(GROUP_COUNT as usize) as u8
}

/// Index `i` such that `times[i] <= date <= times[i + 1]`, searching from `from`
fn find_bracket(cycle: &CycleData, date: NaiveDateTime, from: usize) -> Option<usize> {
    let points = cycle.times.len().min(cycle.concentrations.len());
    (from..points.saturating_sub(1)).find(|&i| {
        match (cycle.time_at(i), cycle.time_at(i + 1)) {
            (Some(t1), Some(t2)) => t1 <= date && date <= t2,
            _ => false,
        }
    })
}

fn interpolate(cycle: &CycleData, pair: usize, date: NaiveDateTime) -> f64 {
    let (c1, c2) = (cycle.concentrations[pair], cycle.concentrations[pair + 1]);
    let (Some(t1), Some(t2)) = (cycle.time_at(pair), cycle.time_at(pair + 1)) else {
        return c1;
    };
    let span = (t2 - t1).num_milliseconds();
    if span == 0 {
        return c1;
    }
    let position = (date - t1).num_milliseconds() as f64 / span as f64;
    c1 + position * (c2 - c1)
}

/// Warning text of a group, empty when the sample is unremarkable
pub fn warning_text(group: u8, language: Language, thresholds: &SampleThresholds) -> String {
    if group > thresholds.warning_low && group <= thresholds.warning_high {
        return String::new();
    }
    if group <= GROUP_COUNT / 2 {
        let percentage = GROUP_COUNT - group;
        translate(TextKey::PopulationAbove, language, &percentage.to_string())
    } else {
        let percentage = group - 1;
        translate(TextKey::PopulationBelow, language, &percentage.to_string())
    }
}

pub fn warning_level(group: u8, thresholds: &SampleThresholds) -> WarningLevel {
    if group <= thresholds.critical_low || group > thresholds.critical_high {
        WarningLevel::Critical
    } else {
        WarningLevel::Normal
    }
}
