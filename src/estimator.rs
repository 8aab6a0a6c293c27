// Price estimation for an itinerary.
//
// Pure functions over the normalized model: no clock, no I/O, nothing cached.
// Callers recompute whenever a trip parameter changes.

use serde::Serialize;

use crate::car_rate::{select_car_rate, CarRate, CarType, RateSelection};
use crate::model::{DayPlanEntry, Itinerary, TripParameters};
use crate::trip_days::requested_days;

/// Full cost breakdown shown on the confirmation page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub pax: u32,
    pub days: u32,
    pub car_type: Option<CarType>,
    pub base_stay: f64,
    pub addon_stay: f64,
    pub stay_total: f64,
    pub base_car: f64,
    pub addon_car: f64,
    pub car_total: f64,
    pub base_km: f64,
    pub addon_km: f64,
    pub total_km: f64,
    pub total: f64,
    pub per_person: f64,
    pub want_car: bool,
    pub extra_days: usize,
}

impl PriceBreakdown {
    pub fn car_label(&self) -> String {
        if !self.want_car {
            return "—".to_string();
        }
        self.car_type
            .map(|t| t.to_string())
            .unwrap_or_else(|| "—".to_string())
    }
}

// Result-list card: preset plan only, strict car selection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InclusivePrice {
    pub pax: u32,
    pub days: u32,
    pub total_km: f64,
    pub car_type: Option<CarType>,
    pub total: f64,
    pub per_person: f64,
    pub want_car: bool,
}

// Suggestion card: preset plan only, auto car selection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionEstimate {
    pub pax: u32,
    pub days: u32,
    pub nights: u32,
    pub stay_total: f64,
    pub total_km: f64,
    pub car: CarRate,
    pub car_total: f64,
    pub total: f64,
    pub per_person: f64,
    pub below_last_month_average: bool,
}

/// Traveller count: trip parameter, then the itinerary's own pax hints, never 0.
pub fn resolve_pax(itinerary: &Itinerary, params: &TripParameters) -> u32 {
    let pax = params.pax.or_else(|| itinerary.default_pax()).unwrap_or(1);
    if pax == 0 {
        tracing::warn!(itinerary = %itinerary.id, "traveller count of 0, using 1");
        return 1;
    }
    pax
}

pub fn resolve_want_car(itinerary: &Itinerary, params: &TripParameters) -> bool {
    params
        .with_car
        .or_else(|| itinerary.wants_car_by_default())
        .unwrap_or(false)
}

/// Car class for list cards: trip parameter, then transport block, then the
/// itinerary's own field.
pub fn resolve_car_type(itinerary: &Itinerary, params: &TripParameters) -> Option<CarType> {
    params.car_type.or_else(|| itinerary.preferred_car_type())
}

/// Car class at checkout: trip parameter, then the itinerary's own field,
/// then its transport block.
pub fn resolve_booking_car_type(itinerary: &Itinerary, params: &TripParameters) -> Option<CarType> {
    params.car_type.or_else(|| itinerary.booking_car_type())
}

// Sum of priced stays across the plan, per traveller
pub fn stay_cost(plan: &[DayPlanEntry], pax: u32) -> f64 {
    plan.iter()
        .map(DayPlanEntry::stay_price)
        .filter(|price| *price > 0.0)
        .map(|price| price * f64::from(pax))
        .sum()
}

pub fn plan_distance(plan: &[DayPlanEntry]) -> f64 {
    plan.iter().map(|d| d.travel_distance_km).sum()
}

// Covers templates whose day plan does not link a priced stay per day
fn fallback_stay_cost(itinerary: &Itinerary, pax: u32, days: u32) -> f64 {
    let unit = itinerary.fallback_homestay().map_or(0.0, |hs| hs.price);
    unit * f64::from(pax) * f64::from(days)
}

fn per_person(total: f64, pax: u32) -> f64 {
    total / f64::from(pax.max(1))
}

/// Detailed breakdown for the confirmation/checkout context.
///
/// `selected_addons` are the add-on days the traveller picked; they are priced
/// separately from the itinerary's own `day_wise_plan`. Car rates are looked up
/// strictly: an unpriced requested class costs 0, it is never swapped.
pub fn compute_price(
    itinerary: &Itinerary,
    params: &TripParameters,
    selected_addons: &[DayPlanEntry],
) -> PriceBreakdown {
    let pax = resolve_pax(itinerary, params);
    let days = requested_days(itinerary, params);

    let base_plan = itinerary.day_wise_plan.as_slice();
    let addon_plan = selected_addons;

    let mut base_stay = stay_cost(base_plan, pax);
    let addon_stay = stay_cost(addon_plan, pax);
    if base_stay == 0.0 && addon_stay == 0.0 {
        base_stay = fallback_stay_cost(itinerary, pax, days);
    }
    let stay_total = base_stay + addon_stay;

    let base_km = plan_distance(base_plan);
    let addon_km = plan_distance(addon_plan);
    let total_km = base_km + addon_km;

    let want_car = resolve_want_car(itinerary, params);
    let car = if want_car {
        select_car_rate(
            &itinerary.circuit,
            resolve_booking_car_type(itinerary, params),
            RateSelection::Strict,
        )
    } else {
        CarRate::NONE
    };
    let base_car = car.rate * base_km;
    let addon_car = car.rate * addon_km;
    let car_total = base_car + addon_car;

    let total = stay_total + base_car + addon_car;
    let breakdown = PriceBreakdown {
        pax,
        days,
        car_type: car.car_type,
        base_stay,
        addon_stay,
        stay_total,
        base_car,
        addon_car,
        car_total,
        base_km,
        addon_km,
        total_km,
        total,
        per_person: per_person(total, pax),
        want_car,
        extra_days: addon_plan.len(),
    };

    tracing::debug!(
        itinerary = %itinerary.id,
        pax,
        days,
        car = %breakdown.car_label(),
        total,
        "computed price breakdown"
    );
    breakdown
}

/// Price for a result-list card: the preset plan at the itinerary's own pax and
/// duration, transport priced strictly when a car is wanted.
pub fn compute_inclusive_price(itinerary: &Itinerary, params: &TripParameters) -> InclusivePrice {
    let pax = itinerary.default_pax().unwrap_or(1).max(1);
    let days = itinerary.declared_days();
    let plan = itinerary.day_wise_plan.as_slice();

    let mut stay_total = stay_cost(plan, pax);
    if stay_total == 0.0 {
        stay_total = fallback_stay_cost(itinerary, pax, days);
    }
    let total_km = plan_distance(plan);

    let want_car = resolve_want_car(itinerary, params);
    let car = if want_car {
        select_car_rate(
            &itinerary.circuit,
            resolve_car_type(itinerary, params),
            RateSelection::Strict,
        )
    } else {
        CarRate::NONE
    };

    let total = stay_total + car.rate * total_km;
    InclusivePrice {
        pax,
        days,
        total_km,
        car_type: car.car_type,
        total,
        per_person: per_person(total, pax),
        want_car,
    }
}

/// Headline estimate for a suggestion card. The car class comes from the
/// itinerary's own hint and falls back to the cheapest offered class.
pub fn estimate_suggestion(itinerary: &Itinerary) -> SuggestionEstimate {
    let pax = itinerary.default_pax().unwrap_or(1).max(1);
    let days = itinerary.declared_days();
    let plan = itinerary.day_wise_plan.as_slice();

    let mut stay_total = stay_cost(plan, pax);
    if stay_total == 0.0 {
        stay_total = fallback_stay_cost(itinerary, pax, days);
    }

    let total_km = plan_distance(plan);
    let car = select_car_rate(
        &itinerary.circuit,
        itinerary.preferred_car_type(),
        RateSelection::Auto,
    );
    let car_total = car.rate * total_km;
    let total = stay_total + car_total;

    SuggestionEstimate {
        pax,
        days,
        nights: itinerary.nights(),
        stay_total,
        total_km,
        car,
        car_total,
        total,
        per_person: per_person(total, pax),
        below_last_month_average: total < itinerary.avg_price_last_month,
    }
}

/// Rupee amount with Indian digit grouping, e.g. `₹12,34,567.5`.
pub fn format_inr(amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let paise = (amount.abs() * 100.0).round() as u64;
    let rupees = paise / 100;
    let fraction = paise % 100;

    let digits = rupees.to_string();
    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 2 {
            groups.push(&head[end - 2..end]);
            end -= 2;
        }
        groups.push(&head[..end]);
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };

    let sign = if amount < 0.0 && paise > 0 { "-" } else { "" };
    if fraction == 0 {
        format!("{}₹{}", sign, grouped)
    } else {
        let fraction = format!("{:02}", fraction);
        format!("{}₹{}.{}", sign, grouped, fraction.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::car_rate::CarRates;
    use crate::model::{Circuit, Homestay};
    use chrono::NaiveDate;
    use test_case::test_case;

    fn stay(price: f64) -> Option<Homestay> {
        Some(Homestay {
            price,
            ..Default::default()
        })
    }

    fn day(title: &str, price: f64, km: f64) -> DayPlanEntry {
        DayPlanEntry {
            title: title.to_string(),
            stay: if price > 0.0 { stay(price) } else { None },
            travel_distance_km: km,
            ..Default::default()
        }
    }

    fn circuit(hatchback: f64, sedan: f64, suv: f64) -> Circuit {
        Circuit {
            id: "c-1".to_string(),
            car_rates: CarRates {
                hatchback,
                sedan,
                suv,
            },
            ..Default::default()
        }
    }

    fn itinerary(plan: Vec<DayPlanEntry>) -> Itinerary {
        Itinerary {
            id: "it-1".to_string(),
            duration_days: Some(plan.len() as u32),
            day_wise_plan: plan,
            ..Default::default()
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_single_priced_day_without_car() {
        let it = itinerary(vec![day("Day 1", 1000.0, 0.0)]);
        let params = TripParameters::new().with_pax(2).without_car();

        let price = compute_price(&it, &params, &[]);

        assert_eq!(price.pax, 2);
        assert_eq!(price.days, 1);
        assert_eq!(price.base_stay, 2000.0);
        assert_eq!(price.addon_stay, 0.0);
        assert_eq!(price.stay_total, 2000.0);
        assert_eq!(price.total, 2000.0);
        assert_eq!(price.per_person, 1000.0);
        assert!(!price.want_car);
        assert_eq!(price.car_label(), "—");
        assert_eq!(price.extra_days, 0);
    }

    #[test]
    fn test_suv_transport_cost() {
        let mut it = itinerary(vec![day("Day 1", 0.0, 60.0), day("Day 2", 0.0, 40.0)]);
        it.circuit = circuit(10.0, 14.0, 20.0);
        let params = TripParameters::new().with_pax(1).with_car(Some(CarType::Suv));

        let price = compute_price(&it, &params, &[]);

        assert_eq!(price.base_km, 100.0);
        assert_eq!(price.base_car, 2000.0);
        assert_eq!(price.car_type, Some(CarType::Suv));
        assert_eq!(price.car_label(), "SUV");
        assert_eq!(price.total, 2000.0);
    }

    #[test]
    fn test_unpriced_requested_car_is_not_substituted() {
        let mut it = itinerary(vec![day("Day 1", 0.0, 100.0)]);
        it.circuit = circuit(10.0, 14.0, 0.0);
        let params = TripParameters::new().with_car(Some(CarType::Suv));

        let price = compute_price(&it, &params, &[]);

        assert_eq!(price.base_car, 0.0);
        assert_eq!(price.car_total, 0.0);
        assert_eq!(price.car_type, Some(CarType::Suv));
    }

    #[test]
    fn test_addon_days_priced_separately() {
        let mut it = itinerary(vec![day("Day 1", 1000.0, 50.0), day("Day 2: Return", 1200.0, 70.0)]);
        it.circuit = circuit(12.0, 0.0, 0.0);
        let addons = vec![day("Extra: Mirik", 800.0, 30.0), day("Extra: Kurseong", 0.0, 20.0)];
        let params = TripParameters::new()
            .with_pax(3)
            .with_car(Some(CarType::Hatchback));

        let price = compute_price(&it, &params, &addons);

        assert_eq!(price.base_stay, 6600.0);
        assert_eq!(price.addon_stay, 2400.0);
        assert_eq!(price.stay_total, 9000.0);
        assert_eq!(price.base_km, 120.0);
        assert_eq!(price.addon_km, 50.0);
        assert_eq!(price.total_km, 170.0);
        assert_eq!(price.base_car, 1440.0);
        assert_eq!(price.addon_car, 600.0);
        assert_eq!(price.car_total, 2040.0);
        assert_eq!(price.total, 11040.0);
        assert_eq!(price.per_person, 3680.0);
        assert_eq!(price.extra_days, 2);
    }

    #[test]
    fn test_stay_fallback_uses_first_homestay_for_every_day() {
        let mut plan = vec![day("Day 1", 0.0, 0.0), day("Day 2", 0.0, 0.0)];
        plan[0].stay = Some(Homestay::default());
        let mut it = itinerary(plan);
        it.homestay = stay(1500.0).map(|mut h| {
            h.name = "Riverside".to_string();
            h
        });
        let params = TripParameters::new()
            .with_pax(2)
            .with_dates(date("2025-06-11"), date("2025-06-13"));

        let price = compute_price(&it, &params, &[]);

        assert_eq!(price.days, 3);
        assert_eq!(price.base_stay, 9000.0);
        assert_eq!(price.stay_total, 9000.0);
    }

    #[test]
    fn test_nothing_priced_degrades_to_zero() {
        let it = Itinerary::default();
        let price = compute_price(&it, &TripParameters::default(), &[]);
        assert_eq!(price.pax, 1);
        assert_eq!(price.days, 1);
        assert_eq!(price.total, 0.0);
        assert_eq!(price.per_person, 0.0);
        assert!(!price.want_car);
    }

    #[test]
    fn test_pax_resolution_order() {
        let mut it = itinerary(vec![day("Day 1", 100.0, 0.0)]);
        it.pax_min = Some(4);
        it.pax_max = Some(8);
        assert_eq!(resolve_pax(&it, &TripParameters::default()), 4);
        assert_eq!(resolve_pax(&it, &TripParameters::new().with_pax(2)), 2);
        assert_eq!(resolve_pax(&it, &TripParameters::new().with_pax(0)), 1);

        it.pax_min = Some(0);
        assert_eq!(resolve_pax(&it, &TripParameters::default()), 1);
    }

    #[test]
    fn test_car_defaults_come_from_itinerary() {
        let mut it = itinerary(vec![day("Day 1", 0.0, 10.0)]);
        it.circuit = circuit(5.0, 7.0, 9.0);
        it.transport.with_car = Some(true);
        it.transport.car_type = Some(CarType::Sedan);
        it.car_type = Some(CarType::Suv);

        // checkout prefers the itinerary's own car class
        let price = compute_price(&it, &TripParameters::default(), &[]);
        assert!(price.want_car);
        assert_eq!(price.car_type, Some(CarType::Suv));
        assert_eq!(price.base_car, 90.0);

        // list cards prefer the transport block
        let card = compute_inclusive_price(&it, &TripParameters::default());
        assert_eq!(card.car_type, Some(CarType::Sedan));
        assert_eq!(card.total, 70.0);

        it.car_type = None;
        let price = compute_price(&it, &TripParameters::default(), &[]);
        assert_eq!(price.car_type, Some(CarType::Sedan));
        assert_eq!(price.base_car, 70.0);
        it.car_type = Some(CarType::Suv);

        // explicit parameter wins over itinerary hints
        let params = TripParameters::new().with_car(Some(CarType::Hatchback));
        let price = compute_price(&it, &params, &[]);
        assert_eq!(price.car_type, Some(CarType::Hatchback));

        let price = compute_price(&it, &TripParameters::new().without_car(), &[]);
        assert!(!price.want_car);
        assert_eq!(price.car_total, 0.0);
        assert_eq!(price.car_type, None);
    }

    #[test_case(1, 0.0; "#1 single traveller")]
    #[test_case(3, 0.0; "#2 odd split")]
    #[test_case(7, 12.5; "#3 with transport")]
    fn test_total_and_per_person_reconcile(pax: u32, rate: f64) {
        let mut it = itinerary(vec![
            day("Day 1", 1333.33, 47.0),
            day("Day 2", 999.99, 13.0),
            day("Day 3: Return", 0.0, 81.0),
        ]);
        it.circuit = circuit(rate, 0.0, 0.0);
        let addons = vec![day("Extra", 1111.11, 9.0)];
        let params = TripParameters::new()
            .with_pax(pax)
            .with_car(Some(CarType::Hatchback));

        let price = compute_price(&it, &params, &addons);

        assert_eq!(price.total, price.stay_total + price.base_car + price.addon_car);
        assert!((price.per_person * f64::from(price.pax) - price.total).abs() < 1e-6);
    }

    #[test]
    fn test_is_deterministic() {
        let mut it = itinerary(vec![day("Day 1", 900.0, 30.0)]);
        it.circuit = circuit(11.0, 0.0, 0.0);
        let params = TripParameters::new().with_car(Some(CarType::Hatchback));
        assert_eq!(
            compute_price(&it, &params, &[]),
            compute_price(&it, &params, &[])
        );
    }

    #[test]
    fn test_inclusive_price_ignores_trip_dates_and_pax() {
        let mut it = itinerary(vec![day("Day 1", 1000.0, 50.0), day("Day 2", 0.0, 50.0)]);
        it.pax = Some(2);
        it.circuit = circuit(0.0, 15.0, 0.0);
        let params = TripParameters::new()
            .with_pax(9)
            .with_dates(date("2025-06-11"), date("2025-06-20"))
            .with_car(Some(CarType::Sedan));

        let price = compute_inclusive_price(&it, &params);

        assert_eq!(price.pax, 2);
        assert_eq!(price.days, 2);
        assert_eq!(price.total_km, 100.0);
        assert_eq!(price.total, 2000.0 + 1500.0);
        assert_eq!(price.per_person, 1750.0);
        assert_eq!(price.car_type, Some(CarType::Sedan));
    }

    #[test]
    fn test_suggestion_substitutes_cheapest_car() {
        let mut it = itinerary(vec![day("Day 1", 0.0, 100.0)]);
        it.duration_days = Some(3);
        it.pax = Some(2);
        it.homestay = stay(500.0);
        it.car_type = Some(CarType::Suv);
        it.circuit = circuit(9.0, 8.0, 0.0);
        it.avg_price_last_month = 5000.0;

        let estimate = estimate_suggestion(&it);

        assert_eq!(estimate.car.car_type, Some(CarType::Sedan));
        assert!(estimate.car.auto);
        assert_eq!(estimate.car_total, 800.0);
        assert_eq!(estimate.stay_total, 3000.0);
        assert_eq!(estimate.total, 3800.0);
        assert_eq!(estimate.per_person, 1900.0);
        assert_eq!(estimate.nights, 2);
        assert!(estimate.below_last_month_average);
    }

    #[test]
    fn test_suggestion_without_any_rates() {
        let it = itinerary(vec![day("Day 1", 700.0, 40.0)]);
        let estimate = estimate_suggestion(&it);
        assert_eq!(estimate.car, CarRate::NONE);
        assert_eq!(estimate.car_total, 0.0);
        assert_eq!(estimate.total, 700.0);
        assert!(!estimate.below_last_month_average);
    }

    #[test_case(0.0, "₹0"; "#1 zero")]
    #[test_case(999.0, "₹999"; "#2 under a thousand")]
    #[test_case(1000.0, "₹1,000"; "#3 thousand")]
    #[test_case(123456.0, "₹1,23,456"; "#4 lakh grouping")]
    #[test_case(12345678.0, "₹1,23,45,678"; "#5 crore grouping")]
    #[test_case(1234.5, "₹1,234.5"; "#6 trims trailing zero")]
    #[test_case(3333.333, "₹3,333.33"; "#7 two fraction digits")]
    #[test_case(-1500.0, "-₹1,500"; "#8 negative")]
    #[test_case(f64::NAN, "₹0"; "#9 not a number")]
    fn test_format_inr(amount: f64, expected: &str) {
        assert_eq!(format_inr(amount), expected);
    }
}
