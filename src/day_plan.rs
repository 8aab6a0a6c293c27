// Day-plan adjustment: when the traveller asks for more days than the
// template covers, suggested add-on days are slotted in before the return day.

use std::borrow::Cow;

use crate::model::{DayPlanEntry, Itinerary, TripParameters};
use crate::trip_days::requested_days;

/// Derive the plan to show for `requested_days`.
///
/// Returns the base plan untouched (borrowed) unless more days were requested
/// and the last base day is a return day. In that case the return day moves to
/// the end, preceded by as many add-on suggestions as are needed and available.
pub fn adjust_plan<'a>(
    base_plan: &'a [DayPlanEntry],
    addon_suggestions: &[DayPlanEntry],
    requested_days: u32,
) -> Cow<'a, [DayPlanEntry]> {
    let Some((return_day, leading)) = base_plan.split_last() else {
        return Cow::Borrowed(base_plan);
    };

    let preset_days = base_plan.len();
    let requested = requested_days as usize;
    if requested <= preset_days || !return_day.is_return_day() {
        return Cow::Borrowed(base_plan);
    }

    let needed = requested - preset_days;
    let mut adjusted = Vec::with_capacity(leading.len() + needed + 1);
    adjusted.extend_from_slice(leading);
    adjusted.extend(addon_suggestions.iter().take(needed).map(|entry| DayPlanEntry {
        addon: true,
        ..entry.clone()
    }));
    adjusted.push(DayPlanEntry {
        title: format!("Day {}: Return", requested_days),
        ..return_day.clone()
    });

    tracing::debug!(
        preset_days,
        requested_days,
        addons = adjusted.len() - preset_days,
        "moved return day after add-on days"
    );
    Cow::Owned(adjusted)
}

pub fn adjusted_plan<'a>(
    itinerary: &'a Itinerary,
    params: &TripParameters,
) -> Cow<'a, [DayPlanEntry]> {
    adjust_plan(
        &itinerary.day_wise_plan,
        &itinerary.addon_suggestions,
        requested_days(itinerary, params),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use test_case::test_case;

    fn day(n: u32, title: &str) -> DayPlanEntry {
        DayPlanEntry {
            day: n,
            title: title.to_string(),
            travel_distance_km: 10.0 * n as f64,
            ..Default::default()
        }
    }

    fn base_plan() -> Vec<DayPlanEntry> {
        vec![
            day(1, "Day 1: Arrival"),
            day(2, "Day 2: Tea estates"),
            day(3, "Day 3: Return"),
        ]
    }

    fn suggestions(count: u32) -> Vec<DayPlanEntry> {
        (1..=count)
            .map(|n| day(100 + n, &format!("Optional excursion {}", n)))
            .collect()
    }

    #[test]
    fn test_inserts_addons_before_return_day() {
        let base = base_plan();
        let addons = suggestions(5);

        let adjusted = adjust_plan(&base, &addons, 5);

        assert!(matches!(adjusted, Cow::Owned(_)));
        assert_eq!(adjusted.len(), 5);
        assert_eq!(adjusted[0], base[0]);
        assert_eq!(adjusted[1], base[1]);
        for (i, entry) in adjusted[2..4].iter().enumerate() {
            assert!(entry.addon);
            assert_eq!(entry.title, addons[i].title);
            assert_eq!(entry.travel_distance_km, addons[i].travel_distance_km);
        }
        assert_eq!(adjusted[4].title, "Day 5: Return");
        assert_eq!(adjusted[4].day, base[2].day);
        assert!(!adjusted[4].addon);
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let base = base_plan();
        let addons = suggestions(2);
        let _ = adjust_plan(&base, &addons, 5);
        assert_eq!(base[2].title, "Day 3: Return");
        assert!(addons.iter().all(|d| !d.addon));
    }

    #[test]
    fn test_takes_fewer_addons_when_not_enough() {
        let base = base_plan();
        let adjusted = adjust_plan(&base, &suggestions(1), 6);
        assert_eq!(adjusted.len(), 4);
        assert!(adjusted[2].addon);
        assert_eq!(adjusted[3].title, "Day 6: Return");
    }

    #[test]
    fn test_no_suggestions_still_retitles_return_day() {
        let base = base_plan();
        let adjusted = adjust_plan(&base, &[], 4);
        assert_eq!(adjusted.len(), 3);
        assert_eq!(adjusted[2].title, "Day 4: Return");
    }

    #[test_case(3; "#1 exact length")]
    #[test_case(2; "#2 shorter")]
    #[test_case(0; "#3 zero")]
    fn test_noop_when_not_more_days(requested: u32) {
        let base = base_plan();
        let adjusted = adjust_plan(&base, &suggestions(5), requested);
        assert!(matches!(adjusted, Cow::Borrowed(_)));
        assert_eq!(adjusted.as_ptr(), base.as_ptr());
    }

    #[test]
    fn test_noop_without_return_day() {
        let base = vec![day(1, "Arrival"), day(2, "Sightseeing")];
        let adjusted = adjust_plan(&base, &suggestions(5), 6);
        assert!(matches!(adjusted, Cow::Borrowed(_)));
        assert_eq!(&*adjusted, base.as_slice());
    }

    #[test]
    fn test_empty_plan_stays_empty() {
        let adjusted = adjust_plan(&[], &suggestions(3), 5);
        assert!(adjusted.is_empty());
    }

    #[test]
    fn test_is_idempotent_for_same_inputs() {
        let base = base_plan();
        let addons = suggestions(5);
        let first = adjust_plan(&base, &addons, 5).into_owned();
        let second = adjust_plan(&base, &addons, 5).into_owned();
        assert_eq!(first, second);
    }

    #[test]
    fn test_adjusted_plan_uses_requested_dates() {
        let itinerary = Itinerary {
            duration_days: Some(3),
            day_wise_plan: base_plan(),
            addon_suggestions: suggestions(3),
            ..Default::default()
        };
        let start = NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();

        let params = TripParameters::new().with_dates(start, end);
        let adjusted = adjusted_plan(&itinerary, &params);
        assert_eq!(adjusted.len(), 4);
        assert_eq!(adjusted[3].title, "Day 4: Return");

        let adjusted = adjusted_plan(&itinerary, &TripParameters::new());
        assert_eq!(adjusted.len(), 3);
    }
}
