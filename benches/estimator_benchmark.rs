use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{thread_rng, Rng};
use trip_estimator::car_rate::{CarRates, CarType};
use trip_estimator::day_plan::adjust_plan;
use trip_estimator::estimator::{compute_price, estimate_suggestion};
use trip_estimator::model::{Circuit, DayPlanEntry, Homestay, Itinerary, TripParameters};

fn random_plan(days: u32, return_last: bool) -> Vec<DayPlanEntry> {
    let mut rng = thread_rng();
    (1..=days)
        .map(|day| DayPlanEntry {
            day,
            title: if return_last && day == days {
                format!("Day {}: Return", day)
            } else {
                format!("Day {}: Sightseeing", day)
            },
            travel_distance_km: rng.gen_range(20.0..180.0),
            stay: rng.gen_bool(0.8).then(|| Homestay {
                id: format!("h-{}", day),
                price: rng.gen_range(800.0..3500.0),
                ..Default::default()
            }),
            ..Default::default()
        })
        .collect()
}

fn sample_itinerary(days: u32) -> Itinerary {
    Itinerary {
        id: format!("it-{}", days),
        circuit: Circuit {
            car_rates: CarRates {
                hatchback: 12.0,
                sedan: 15.0,
                suv: 22.0,
            },
            ..Default::default()
        },
        duration_days: Some(days),
        day_wise_plan: random_plan(days, true),
        addon_suggestions: random_plan(days, false),
        ..Default::default()
    }
}

// Estimation runs on every filter change, so it has to stay cheap for long plans
pub fn estimator_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_price");
    let start = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();

    for days in [3u32, 14, 60].iter() {
        let itinerary = sample_itinerary(*days);
        let addons = random_plan(*days / 2 + 1, false);
        let end = start + chrono::Duration::days(i64::from(*days + *days / 2));
        let params = TripParameters::new()
            .with_pax(4)
            .with_dates(start, end)
            .with_car(Some(CarType::Sedan));

        group.bench_with_input(BenchmarkId::from_parameter(days), days, |b, _| {
            b.iter(|| compute_price(black_box(&itinerary), black_box(&params), black_box(&addons)))
        });
    }
    group.finish();

    let mut group = c.benchmark_group("adjust_plan");
    for days in [3u32, 14, 60].iter() {
        let itinerary = sample_itinerary(*days);
        group.bench_with_input(BenchmarkId::from_parameter(days), days, |b, &days| {
            b.iter(|| {
                adjust_plan(
                    black_box(&itinerary.day_wise_plan),
                    black_box(&itinerary.addon_suggestions),
                    black_box(days * 2),
                )
                .len()
            })
        });
    }
    group.finish();

    let itinerary = sample_itinerary(7);
    c.bench_function("estimate_suggestion", |b| {
        b.iter(|| estimate_suggestion(black_box(&itinerary)))
    });
}

criterion_group!(benches, estimator_benchmark);
criterion_main!(benches);
