// Trip price estimator for homestay circuit itineraries

pub mod api_client;
pub mod car_rate;
pub mod day_plan;
pub mod estimator;
pub mod model;
pub mod record_cache;
pub mod records;
pub mod trip_days;
pub mod wizard;

// Re-export key types for convenience
pub use api_client::{
    ApiError, CatalogApi, CatalogClient, ClientConfig, ClientError, ClientStats, HomeCatalog,
    RetryConfig,
};
pub use car_rate::{select_car_rate, CarRate, CarRates, CarType, RateSelection};
pub use day_plan::{adjust_plan, adjusted_plan};
pub use estimator::{
    compute_inclusive_price, compute_price, estimate_suggestion, format_inr, InclusivePrice,
    PriceBreakdown, SuggestionEstimate,
};
pub use model::{Circuit, DayPlanEntry, Homestay, Itinerary, TripParameters};
pub use record_cache::{CacheConfig, RecordCache};
pub use trip_days::{calculate_days, BookingError, DateParseError};
pub use wizard::{MatchQuery, TripPlanDraft, WizardError, WizardStep};
