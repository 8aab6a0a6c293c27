// Trip-planning wizard state.
//
// The seven wizard steps share one `TripPlanDraft` value, passed from step to
// step and rebuilt with the consuming `with_*` methods. The final step turns it
// into the body of `POST /api/itineraries/match`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::car_rate::CarType;
use crate::model::TripParameters;
use crate::records::lenient_car_type;
use crate::trip_days::calculate_days;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WizardError {
    #[error("Please select a circuit before generating an itinerary")]
    MissingCircuit,

    #[error("Trip dates are required")]
    MissingDates,

    #[error("End date {end} is before start date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
pub enum WizardStep {
    BasicInfo = 1,
    PlaceTags = 2,
    Circuit = 3,
    Experiences = 4,
    TravelStyle = 5,
    CarOption = 6,
    Review = 7,
}

impl Default for WizardStep {
    fn default() -> Self {
        WizardStep::BasicInfo
    }
}

impl WizardStep {
    const ORDER: [WizardStep; 7] = [
        WizardStep::BasicInfo,
        WizardStep::PlaceTags,
        WizardStep::Circuit,
        WizardStep::Experiences,
        WizardStep::TravelStyle,
        WizardStep::CarOption,
        WizardStep::Review,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn next(self) -> Self {
        let index = (self.number() as usize).min(Self::ORDER.len() - 1);
        Self::ORDER[index]
    }

    pub fn prev(self) -> Self {
        let index = (self.number() as usize).saturating_sub(2);
        Self::ORDER[index]
    }

    pub fn progress_percent(self) -> u8 {
        (u32::from(self.number()) * 100 / Self::ORDER.len() as u32) as u8
    }
}

// Slider labels on the review step, cheapest first
pub const BUDGET_RANGES: [&str; 16] = [
    "₹1–10k",
    "₹10k–20k",
    "₹20k–30k",
    "₹30k–40k",
    "₹40k–50k",
    "₹50k–60k",
    "₹60k–70k",
    "₹70k–80k",
    "₹80k–90k",
    "₹90k–1L",
    "₹1L–1.2L",
    "₹1.2L–1.4L",
    "₹1.4L–1.6L",
    "₹1.6L–1.8L",
    "₹1.8L–2L",
    "₹2L+",
];

pub const DEFAULT_BUDGET_INDEX: usize = 4;

/// Lower bound of a budget label in rupees. Unknown labels map to 0.
pub fn parse_budget(label: &str) -> u64 {
    let label = label.trim();
    if label.is_empty() {
        return 0;
    }
    if label.contains('+') {
        return 200_000;
    }

    let cleaned: String = label.chars().filter(|c| *c != '₹' && *c != ',').collect();
    let lower = cleaned.split('–').next().unwrap_or_default().trim();
    let numeric: String = lower
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let Ok(value) = numeric.parse::<f64>() else {
        return 0;
    };

    let multiplier = if lower.contains('L') { 100_000.0 } else { 1_000.0 };
    (value * multiplier).round() as u64
}

/// Category tag as the circuit matcher expects it: `Tea Garden` -> `tea_garden`.
pub fn normalize_category(tag: &str) -> String {
    tag.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedCircuit {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TripPlanDraft {
    pub step: WizardStep,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub pax: u32,
    pub no_of_rooms: Option<u32>,
    pub place_tags: Vec<String>,
    pub circuit: Option<SelectedCircuit>,
    pub experiences: Vec<String>,
    pub travel_style: Option<String>,
    pub with_car: bool,
    #[serde(deserialize_with = "lenient_car_type")]
    pub car_type: Option<CarType>,
    pub budget_range: Option<String>,
}

impl Default for TripPlanDraft {
    fn default() -> Self {
        Self {
            step: WizardStep::BasicInfo,
            start_date: None,
            end_date: None,
            pax: 1,
            no_of_rooms: None,
            place_tags: Vec::new(),
            circuit: None,
            experiences: Vec::new(),
            travel_style: None,
            with_car: false,
            car_type: None,
            budget_range: None,
        }
    }
}

// Body of POST /api/itineraries/match
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchQuery {
    pub circuit_id: String,
    pub circuit_name: String,
    pub pax: u32,
    pub days: u32,
    pub tags: Vec<String>,
    pub experiences: Vec<String>,
    pub theme: String,
    pub with_car: bool,
    pub car_type: CarType,
    pub budget: u64,
}

impl TripPlanDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_step(mut self) -> Self {
        self.step = self.step.next();
        self
    }

    pub fn prev_step(mut self) -> Self {
        self.step = self.step.prev();
        self
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn with_pax(mut self, pax: u32) -> Self {
        self.pax = pax.max(1);
        self
    }

    pub fn with_rooms(mut self, rooms: u32) -> Self {
        self.no_of_rooms = Some(rooms);
        self
    }

    pub fn with_place_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.place_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_circuit(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.circuit = Some(SelectedCircuit {
            id: id.into(),
            name: name.into(),
        });
        self
    }

    pub fn without_circuit(mut self) -> Self {
        self.circuit = None;
        self
    }

    pub fn with_experiences<I, S>(mut self, experiences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.experiences = experiences.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_travel_style(mut self, style: impl Into<String>) -> Self {
        self.travel_style = Some(style.into());
        self
    }

    pub fn with_car(mut self, with_car: bool, car_type: Option<CarType>) -> Self {
        self.with_car = with_car;
        self.car_type = car_type;
        self
    }

    pub fn with_budget_range(mut self, label: impl Into<String>) -> Self {
        self.budget_range = Some(label.into());
        self
    }

    // Categories to send to POST /api/circuits/match
    pub fn circuit_categories(&self) -> Vec<String> {
        self.place_tags
            .iter()
            .map(|t| normalize_category(t))
            .collect()
    }

    pub fn budget_label(&self) -> &str {
        self.budget_range
            .as_deref()
            .filter(|label| BUDGET_RANGES.contains(label))
            .unwrap_or(BUDGET_RANGES[DEFAULT_BUDGET_INDEX])
    }

    pub fn trip_days(&self) -> Result<u32, WizardError> {
        let (start, end) = self
            .start_date
            .zip(self.end_date)
            .ok_or(WizardError::MissingDates)?;
        if end < start {
            return Err(WizardError::InvalidDateRange { start, end });
        }
        Ok(calculate_days(start, end))
    }

    pub fn to_match_query(&self) -> Result<MatchQuery, WizardError> {
        let circuit = self
            .circuit
            .as_ref()
            .filter(|c| !c.id.trim().is_empty() || !c.name.trim().is_empty())
            .ok_or(WizardError::MissingCircuit)?;
        let days = self.trip_days()?;

        Ok(MatchQuery {
            circuit_id: circuit.id.clone(),
            circuit_name: circuit.name.clone(),
            pax: self.pax.max(1),
            days,
            tags: self.place_tags.clone(),
            experiences: self.experiences.clone(),
            theme: self.travel_style.clone().unwrap_or_default(),
            with_car: self.with_car,
            car_type: self.car_type.unwrap_or(CarType::Hatchback),
            budget: parse_budget(self.budget_label()),
        })
    }

    /// Estimator input carried over from the wizard.
    pub fn trip_parameters(&self) -> TripParameters {
        TripParameters {
            pax: Some(self.pax.max(1)),
            start_date: self.start_date,
            end_date: self.end_date,
            with_car: Some(self.with_car),
            car_type: if self.with_car { self.car_type } else { None },
        }
    }
}
