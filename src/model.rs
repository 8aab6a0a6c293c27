// Normalized catalog records and trip parameters.
//
// Every defaulting rule for the lenient API shapes lives in the `From<Raw*>`
// conversions below, so the estimator only ever sees finite numbers, owned
// lists and concrete (possibly empty) records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::car_rate::{CarRates, CarType};
use crate::records::{
    lenient_car_type, RawCircuit, RawDayPlanEntry, RawHomestay, RawItinerary, RawLocalGuide,
    RawReview, Ref,
};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Circuit {
    pub id: String,
    pub name: String,
    pub description: String,
    pub categories: Vec<String>,
    pub best_seasons: Vec<String>,
    pub entry_points: Vec<String>,
    pub transport_options: Vec<String>,
    pub experiences: Vec<String>,
    pub car_rates: CarRates,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Homestay {
    pub id: String,
    pub name: String,
    pub place_name: String,
    // per person per night, 0 when unknown
    pub price: f64,
    pub distance_km: f64,
    pub addons: Vec<String>,
    pub experiences: Vec<String>,
    pub images: Vec<String>,
}

impl Homestay {
    pub fn has_price(&self) -> bool {
        self.price > 0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DayPlanEntry {
    pub day: u32,
    pub title: String,
    pub description: String,
    pub stay: Option<Homestay>,
    pub activities: Vec<String>,
    pub travel_distance_km: f64,
    pub travel_time: Option<String>,
    // only ever set by plan adjustment
    pub addon: bool,
}

impl DayPlanEntry {
    /// Nightly per-person price of the linked homestay, 0 when unlinked or unpriced.
    pub fn stay_price(&self) -> f64 {
        self.stay.as_ref().map_or(0.0, |hs| hs.price)
    }

    pub fn is_return_day(&self) -> bool {
        self.title.to_lowercase().contains("return")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TransportDefaults {
    pub car_type: Option<CarType>,
    pub with_car: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LocalGuide {
    pub id: String,
    pub name: String,
    pub contact: String,
    pub location: String,
    pub bio: String,
    pub image: Option<String>,
    // clamped to 0..=5, absent for new guides
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Review {
    pub name: String,
    // clamped to 0..=5
    pub rating: f64,
    pub comment: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Itinerary {
    pub id: String,
    pub title: String,
    pub circuit: Circuit,
    pub theme: Option<String>,
    pub category_tags: Vec<String>,
    pub experience_tags: Vec<String>,
    pub duration_days: Option<u32>,
    // explicit override of duration_days, rarely present
    pub days: Option<u32>,
    pub guest_type: Option<String>,
    pub pax: Option<u32>,
    pub pax_min: Option<u32>,
    pub pax_max: Option<u32>,
    pub budget_min: f64,
    pub budget_max: f64,
    pub transport_included: bool,
    pub car_types: Vec<CarType>,
    pub car_type: Option<CarType>,
    pub with_car: Option<bool>,
    pub transport: TransportDefaults,
    pub is_featured: bool,
    pub day_wise_plan: Vec<DayPlanEntry>,
    pub addon_suggestions: Vec<DayPlanEntry>,
    pub homestay: Option<Homestay>,
    pub local_guide: Option<LocalGuide>,
    pub reviews: Vec<Review>,
    pub image: Option<String>,
    pub avg_price_last_month: f64,
}

impl Itinerary {
    /// Declared trip length, at least one day.
    pub fn declared_days(&self) -> u32 {
        self.days.or(self.duration_days).unwrap_or(1).max(1)
    }

    pub fn nights(&self) -> u32 {
        self.declared_days().saturating_sub(1)
    }

    // Party size the template was built for, before any traveller input
    pub fn default_pax(&self) -> Option<u32> {
        self.pax.or(self.pax_min).or(self.pax_max)
    }

    // Stay used when the plan has no priced per-day homestays
    pub fn fallback_homestay(&self) -> Option<&Homestay> {
        self.homestay
            .as_ref()
            .or_else(|| self.day_wise_plan.first().and_then(|d| d.stay.as_ref()))
    }

    // Car class hint for list and suggestion cards: transport block first
    pub fn preferred_car_type(&self) -> Option<CarType> {
        self.transport.car_type.or(self.car_type)
    }

    // Car class hint at checkout: the itinerary's own field wins over transport
    pub fn booking_car_type(&self) -> Option<CarType> {
        self.car_type.or(self.transport.car_type)
    }

    pub fn wants_car_by_default(&self) -> Option<bool> {
        self.with_car.or(self.transport.with_car)
    }

    pub fn average_rating(&self) -> f64 {
        if self.reviews.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.reviews.iter().map(|r| r.rating).sum();
        sum / self.reviews.len() as f64
    }

    pub fn display_title(&self) -> &str {
        if !self.title.is_empty() {
            &self.title
        } else if !self.circuit.name.is_empty() {
            &self.circuit.name
        } else {
            "Trip Itinerary"
        }
    }
}

/// Traveller-supplied filters for one estimation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TripParameters {
    pub pax: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub with_car: Option<bool>,
    #[serde(deserialize_with = "lenient_car_type")]
    pub car_type: Option<CarType>,
}

impl TripParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pax(mut self, pax: u32) -> Self {
        self.pax = Some(pax);
        self
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn with_car(mut self, car_type: Option<CarType>) -> Self {
        self.with_car = Some(true);
        self.car_type = car_type;
        self
    }

    pub fn without_car(mut self) -> Self {
        self.with_car = Some(false);
        self
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.start_date.zip(self.end_date)
    }
}

/// Parse a traveller count typed into a form. Zero, negative or unparsable
/// input becomes 1.
pub fn parse_pax(input: &str) -> u32 {
    match input.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 1.0 => value.min(u32::MAX as f64) as u32,
        _ => {
            tracing::warn!(input, "unusable traveller count, defaulting to 1");
            1
        }
    }
}

// Counts below 1 are unusable and read as absent
fn count(value: Option<f64>) -> Option<u32> {
    value
        .filter(|v| *v >= 1.0)
        .map(|v| v.min(u32::MAX as f64) as u32)
}

fn amount(value: Option<f64>) -> f64 {
    value.filter(|v| *v > 0.0).unwrap_or(0.0)
}

fn car_type(value: Option<&str>) -> Option<CarType> {
    value.and_then(CarType::parse)
}

impl From<RawCircuit> for Circuit {
    fn from(raw: RawCircuit) -> Self {
        Circuit {
            id: raw.id.unwrap_or_default(),
            name: raw.name.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            categories: raw.categories,
            best_seasons: raw.best_seasons,
            entry_points: raw.entry_points,
            transport_options: raw.transport,
            experiences: raw.experiences,
            car_rates: CarRates {
                hatchback: amount(raw.car_price_hatchback),
                sedan: amount(raw.car_price_sedan),
                suv: amount(raw.car_price_suv),
            },
        }
    }
}

impl From<Ref<RawCircuit>> for Circuit {
    fn from(item: Ref<RawCircuit>) -> Self {
        match item {
            Ref::Embedded(raw) => raw.into(),
            Ref::Id(id) => Circuit {
                id,
                ..Default::default()
            },
        }
    }
}

impl From<RawHomestay> for Homestay {
    fn from(raw: RawHomestay) -> Self {
        Homestay {
            id: raw.id.unwrap_or_default(),
            name: raw.homestay_name.or(raw.name).unwrap_or_default(),
            place_name: raw.place_name.or(raw.location).unwrap_or_default(),
            price: amount(raw.price),
            distance_km: amount(raw.distance),
            addons: raw.addons,
            experiences: raw.experiences,
            images: raw.images,
        }
    }
}

fn linked_homestay(item: Ref<RawHomestay>) -> Option<Homestay> {
    match item {
        Ref::Embedded(raw) => Some(raw.into()),
        // unpopulated link: the stay exists but its price is unknown here
        Ref::Id(id) if !id.trim().is_empty() => Some(Homestay {
            id,
            ..Default::default()
        }),
        Ref::Id(_) => None,
    }
}

impl From<RawDayPlanEntry> for DayPlanEntry {
    fn from(raw: RawDayPlanEntry) -> Self {
        let activities = if raw.activities.is_empty() {
            raw.experiences
        } else {
            raw.activities
        };
        DayPlanEntry {
            day: count(raw.day).unwrap_or(0),
            title: raw.title.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            stay: raw.stay_at_homestay_id.and_then(linked_homestay),
            activities,
            travel_distance_km: amount(raw.travel_distance_km),
            travel_time: raw.travel_time,
            addon: false,
        }
    }
}

impl From<RawLocalGuide> for LocalGuide {
    fn from(raw: RawLocalGuide) -> Self {
        LocalGuide {
            id: raw.id.unwrap_or_default(),
            name: raw.name.unwrap_or_default(),
            contact: raw.contact.unwrap_or_default(),
            location: raw.location.unwrap_or_default(),
            bio: raw.bio.unwrap_or_default(),
            image: raw.image,
            rating: raw.rating.map(|r| r.clamp(0.0, 5.0)),
        }
    }
}

fn linked_guide(item: Ref<RawLocalGuide>) -> Option<LocalGuide> {
    match item {
        Ref::Embedded(raw) => Some(raw.into()),
        Ref::Id(id) if !id.trim().is_empty() => Some(LocalGuide {
            id,
            ..Default::default()
        }),
        Ref::Id(_) => None,
    }
}

impl From<RawReview> for Review {
    fn from(raw: RawReview) -> Self {
        let created_at = raw
            .created_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&Utc));
        Review {
            name: raw.name.unwrap_or_else(|| "Guest".to_string()),
            rating: raw.rating.unwrap_or(0.0).clamp(0.0, 5.0),
            comment: raw.comment.unwrap_or_default(),
            created_at,
        }
    }
}

impl From<RawItinerary> for Itinerary {
    fn from(raw: RawItinerary) -> Self {
        let transport = raw.transport.unwrap_or_default();
        Itinerary {
            id: raw.id.unwrap_or_default(),
            title: raw.title.unwrap_or_default(),
            circuit: raw.circuit_id.map(Circuit::from).unwrap_or_default(),
            theme: raw.theme,
            category_tags: raw.category_tags,
            experience_tags: raw.experience_tags,
            duration_days: count(raw.duration_days),
            days: count(raw.days),
            guest_type: raw.guest_type,
            pax: count(raw.pax),
            pax_min: count(raw.pax_min),
            pax_max: count(raw.pax_max),
            budget_min: amount(raw.budget_min),
            budget_max: amount(raw.budget_max),
            transport_included: raw.transport_included.unwrap_or(false),
            car_types: raw
                .car_types
                .iter()
                .filter_map(|t| CarType::parse(t))
                .collect(),
            car_type: car_type(raw.car_type.as_deref()),
            with_car: raw.with_car,
            transport: TransportDefaults {
                car_type: car_type(transport.car_type.as_deref()),
                with_car: transport.with_car,
            },
            is_featured: raw.is_featured.unwrap_or(false),
            day_wise_plan: raw.day_wise_plan.into_iter().map(Into::into).collect(),
            addon_suggestions: raw.addon_suggestions.into_iter().map(Into::into).collect(),
            homestay: raw.homestay.and_then(linked_homestay),
            local_guide: raw.local_guide.and_then(linked_guide),
            reviews: raw.reviews.into_iter().map(Into::into).collect(),
            image: raw.image,
            avg_price_last_month: amount(raw.avg_price_last_month),
        }
    }
}
