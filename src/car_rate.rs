// Car classes offered on a circuit and per-km rate selection.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::Circuit;

// The only car classes a circuit can price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum CarType {
    Hatchback,
    Sedan,
    #[serde(rename = "SUV")]
    Suv,
}

impl CarType {
    // Fixed order, also the tie-break order for auto selection
    pub const ALL: [CarType; 3] = [CarType::Hatchback, CarType::Sedan, CarType::Suv];

    /// Exact, case-sensitive match. Any other text is "unset", never an error.
    pub fn parse(value: &str) -> Option<CarType> {
        match value {
            "Hatchback" => Some(CarType::Hatchback),
            "Sedan" => Some(CarType::Sedan),
            "SUV" => Some(CarType::Suv),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CarType::Hatchback => "Hatchback",
            CarType::Sedan => "Sedan",
            CarType::Suv => "SUV",
        }
    }
}

impl fmt::Display for CarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Per-km rates keyed by car class. Zero means the class is not offered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct CarRates {
    pub hatchback: f64,
    pub sedan: f64,
    pub suv: f64,
}

impl CarRates {
    pub fn rate(&self, car_type: CarType) -> f64 {
        match car_type {
            CarType::Hatchback => self.hatchback,
            CarType::Sedan => self.sedan,
            CarType::Suv => self.suv,
        }
    }

    pub fn is_available(&self, car_type: CarType) -> bool {
        self.rate(car_type) > 0.0
    }

    pub fn available(&self) -> Vec<CarType> {
        CarType::ALL
            .into_iter()
            .filter(|t| self.is_available(*t))
            .collect()
    }
}

// How a rate is picked when the requested class is unset or not offered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateSelection {
    /// Checkout/confirmation: never substitute a class other than the one asked for.
    Strict,
    /// Suggestion cards: fall back to the cheapest offered class.
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarRate {
    pub car_type: Option<CarType>,
    pub rate: f64,
    // true when auto selection substituted the cheapest class
    pub auto: bool,
}

impl CarRate {
    pub const NONE: CarRate = CarRate {
        car_type: None,
        rate: 0.0,
        auto: false,
    };

    pub fn label(&self) -> String {
        self.car_type
            .map(|t| t.to_string())
            .unwrap_or_else(|| "—".to_string())
    }
}

pub fn select_car_rate(
    circuit: &Circuit,
    requested: Option<CarType>,
    mode: RateSelection,
) -> CarRate {
    let rates = &circuit.car_rates;
    match mode {
        RateSelection::Strict => match requested {
            Some(car_type) => CarRate {
                car_type: Some(car_type),
                rate: rates.rate(car_type),
                auto: false,
            },
            None => CarRate::NONE,
        },
        RateSelection::Auto => {
            if let Some(car_type) = requested.filter(|t| rates.is_available(*t)) {
                return CarRate {
                    car_type: Some(car_type),
                    rate: rates.rate(car_type),
                    auto: false,
                };
            }
            cheapest_available(rates)
        }
    }
}

fn cheapest_available(rates: &CarRates) -> CarRate {
    let mut best: Option<(CarType, f64)> = None;
    for car_type in CarType::ALL {
        let rate = rates.rate(car_type);
        if rate <= 0.0 {
            continue;
        }
        // strict < keeps the earlier class on ties
        if best.map_or(true, |(_, current)| rate < current) {
            best = Some((car_type, rate));
        }
    }

    match best {
        Some((car_type, rate)) => CarRate {
            car_type: Some(car_type),
            rate,
            auto: true,
        },
        None => CarRate::NONE,
    }
}
