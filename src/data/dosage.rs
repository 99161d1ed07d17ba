//! Dosage history and intake extraction
//!
//! A [`DosageHistory`] is a list of [`DosageTimeRange`]s, each holding a tree of
//! [`Dosage`] nodes. Extraction walks the tree and expands it into the concrete
//! [`IntakeEvent`]s that fall within a time interval.

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::units::{hours, Unit};

/// Route of administration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdministrationRoute {
    Intravenous,
    Intramuscular,
    Subcutaneous,
    Oral,
    Rectal,
    Nasal,
}

/// Absorption model used by the PK engine for an administration route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AbsorptionModel {
    Intravascular,
    Infusion,
    Extravascular,
    ExtravascularLag,
}

/// Formulation of a drug together with the way it is administered
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulationAndRoute {
    pub formulation: String,
    #[serde(default)]
    pub administration_name: String,
    pub administration_route: AdministrationRoute,
    pub absorption_model: AbsorptionModel,
}

impl FormulationAndRoute {
    pub fn new(
        formulation: impl Into<String>,
        administration_route: AdministrationRoute,
        absorption_model: AbsorptionModel,
    ) -> Self {
        FormulationAndRoute {
            formulation: formulation.into(),
            administration_name: String::new(),
            administration_route,
            absorption_model,
        }
    }

    /// Two formulations and routes are compatible when they only differ by the
    /// free-text administration name
    pub fn is_compatible(&self, other: &FormulationAndRoute) -> bool {
        self.formulation == other.formulation
            && self.administration_route == other.administration_route
            && self.absorption_model == other.absorption_model
    }
}

impl fmt::Display for FormulationAndRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:?}, {:?})",
            self.formulation, self.administration_route, self.absorption_model
        )
    }
}

/// The amount given at a single intake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleDose {
    pub dose: f64,
    pub unit: Unit,
    pub formulation_and_route: FormulationAndRoute,
    /// Infusion time in minutes, 0 for non-infused administrations
    #[serde(default)]
    pub infusion_time: f64,
}

impl SingleDose {
    pub fn new(dose: f64, unit: impl Into<Unit>, formulation_and_route: FormulationAndRoute) -> Self {
        SingleDose {
            dose,
            unit: unit.into(),
            formulation_and_route,
            infusion_time: 0.0,
        }
    }
}

/// A node of a dosage tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Dosage {
    /// One intake, the next dosage starts `interval` hours later
    Lasting {
        #[serde(flatten)]
        dose: SingleDose,
        interval: f64,
    },
    /// One intake at the next occurrence of `time`, spanning a day
    Daily {
        #[serde(flatten)]
        dose: SingleDose,
        time: NaiveTime,
    },
    /// One intake at the next `day` at `time`, spanning a week
    Weekly {
        #[serde(flatten)]
        dose: SingleDose,
        day: Weekday,
        time: NaiveTime,
    },
    Repeat { dosage: Box<Dosage>, times: u32 },
    /// Repeats until the end of the enclosing time range
    Loop { dosage: Box<Dosage> },
    Sequence { dosages: Vec<Dosage> },
}

impl Dosage {
    pub fn lasting(dose: SingleDose, interval: f64) -> Self {
        Dosage::Lasting { dose, interval }
    }

    pub fn daily(dose: SingleDose, time: NaiveTime) -> Self {
        Dosage::Daily { dose, time }
    }

    pub fn repeat(dosage: Dosage, times: u32) -> Self {
        Dosage::Repeat {
            dosage: Box::new(dosage),
            times,
        }
    }

    pub fn looped(dosage: Dosage) -> Self {
        Dosage::Loop {
            dosage: Box::new(dosage),
        }
    }

    /// All single doses of the tree, in order
    pub fn single_doses(&self) -> Vec<&SingleDose> {
        let mut doses = Vec::new();
        self.collect_doses(&mut doses);
        doses
    }

    fn collect_doses<'a>(&'a self, doses: &mut Vec<&'a SingleDose>) {
        match self {
            Dosage::Lasting { dose, .. }
            | Dosage::Daily { dose, .. }
            | Dosage::Weekly { dose, .. } => doses.push(dose),
            Dosage::Repeat { dosage, .. } | Dosage::Loop { dosage } => dosage.collect_doses(doses),
            Dosage::Sequence { dosages } => dosages.iter().for_each(|d| d.collect_doses(doses)),
        }
    }

    /// Expand the tree from `from`, keeping intakes strictly before `until`
    ///
    /// Returns the time at which the dosage following this one would start.
    fn extract(
        &self,
        from: NaiveDateTime,
        until: NaiveDateTime,
        intakes: &mut Vec<IntakeEvent>,
    ) -> NaiveDateTime {
        match self {
            Dosage::Lasting { dose, interval } => {
                let interval = hours(*interval);
                if from < until {
                    intakes.push(IntakeEvent::new(from, dose, interval));
                }
                advance(from, interval)
            }
            Dosage::Daily { dose, time } => {
                let mut first = from.date().and_time(*time);
                if first < from {
                    first = advance(first, Duration::days(1));
                }
                if first < until {
                    intakes.push(IntakeEvent::new(first, dose, Duration::days(1)));
                }
                advance(first, Duration::days(1))
            }
            Dosage::Weekly { dose, day, time } => {
                let mut first = from.date().and_time(*time);
                let offset = (day.num_days_from_monday() as i64
                    - first.weekday().num_days_from_monday() as i64)
                    .rem_euclid(7);
                first = advance(first, Duration::days(offset));
                if first < from {
                    first = advance(first, Duration::days(7));
                }
                if first < until {
                    intakes.push(IntakeEvent::new(first, dose, Duration::days(7)));
                }
                advance(first, Duration::days(7))
            }
            Dosage::Repeat { dosage, times } => {
                let mut cursor = from;
                for _ in 0..*times {
                    cursor = dosage.extract(cursor, until, intakes);
                }
                cursor
            }
            Dosage::Loop { dosage } => {
                let mut cursor = from;
                while cursor < until {
                    let next = dosage.extract(cursor, until, intakes);
                    if next <= cursor {
                        // No progress, the loop would never end
                        break;
                    }
                    cursor = next;
                }
                cursor
            }
            Dosage::Sequence { dosages } => dosages
                .iter()
                .fold(from, |cursor, dosage| dosage.extract(cursor, until, intakes)),
        }
    }
}

/// `time + delta`, clamped to the representable range
///
/// A clamped cursor is past any extraction bound, which ends the expansion.
fn advance(time: NaiveDateTime, delta: Duration) -> NaiveDateTime {
    time.checked_add_signed(delta).unwrap_or(if delta < Duration::zero() {
        NaiveDateTime::MIN
    } else {
        NaiveDateTime::MAX
    })
}

/// A dosage applied over a period of time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DosageTimeRange {
    pub start: NaiveDateTime,
    /// Open-ended when `None`
    #[serde(default)]
    pub end: Option<NaiveDateTime>,
    pub dosage: Dosage,
}

impl DosageTimeRange {
    pub fn new(start: NaiveDateTime, end: Option<NaiveDateTime>, dosage: Dosage) -> Self {
        DosageTimeRange { start, end, dosage }
    }
}

/// A concrete drug intake produced by extraction
#[derive(Debug, Clone, PartialEq)]
pub struct IntakeEvent {
    pub time: NaiveDateTime,
    pub dose: f64,
    pub unit: Unit,
    pub formulation_and_route: FormulationAndRoute,
    pub interval: Duration,
}

impl IntakeEvent {
    fn new(time: NaiveDateTime, dose: &SingleDose, interval: Duration) -> Self {
        IntakeEvent {
            time,
            dose: dose.dose,
            unit: dose.unit.clone(),
            formulation_and_route: dose.formulation_and_route.clone(),
            interval,
        }
    }
}

/// The dosages a patient followed, or follows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DosageHistory {
    time_ranges: Vec<DosageTimeRange>,
}

impl DosageHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_time_range(&mut self, time_range: DosageTimeRange) {
        self.time_ranges.push(time_range);
    }

    pub fn with_time_range(mut self, time_range: DosageTimeRange) -> Self {
        self.add_time_range(time_range);
        self
    }

    pub fn time_ranges(&self) -> &[DosageTimeRange] {
        &self.time_ranges
    }

    pub fn is_empty(&self) -> bool {
        self.time_ranges.is_empty()
    }

    /// Distinct formulations and routes used across the history
    pub fn formulation_and_routes(&self) -> Vec<&FormulationAndRoute> {
        let mut result: Vec<&FormulationAndRoute> = Vec::new();
        for range in &self.time_ranges {
            for dose in range.dosage.single_doses() {
                if !result.contains(&&dose.formulation_and_route) {
                    result.push(&dose.formulation_and_route);
                }
            }
        }
        result
    }

    /// Formulation and route of the most recent time range
    pub fn last_formulation_and_route(&self) -> Option<&FormulationAndRoute> {
        self.time_ranges
            .iter()
            .max_by_key(|range| range.start)
            .and_then(|range| range.dosage.single_doses().into_iter().next())
            .map(|dose| &dose.formulation_and_route)
    }

    pub fn earliest_start(&self) -> Option<NaiveDateTime> {
        self.time_ranges.iter().map(|range| range.start).min()
    }

    /// Start of the latest time range that started at or before `now`
    pub fn latest_start_before(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        self.time_ranges
            .iter()
            .map(|range| range.start)
            .filter(|start| *start <= now)
            .max()
    }

    /// Intakes with a time in `[from, to)`, sorted by time
    pub fn extract_intakes(&self, from: NaiveDateTime, to: NaiveDateTime) -> Vec<IntakeEvent> {
        let mut intakes = Vec::new();
        for range in &self.time_ranges {
            let until = range.end.map_or(to, |end| end.min(to));
            if range.start >= until {
                continue;
            }
            range.dosage.extract(range.start, until, &mut intakes);
        }
        intakes.retain(|intake| intake.time >= from);
        intakes.sort_by_key(|intake| intake.time);
        intakes
    }
}
