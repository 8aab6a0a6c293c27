// Wire shapes returned by the travel catalog REST API.
// Fields are lenient because the upstream admin forms are: numbers may arrive as
// strings, lists as comma separated text, and nested records either populated
// or as a bare id. Nothing here is used by the estimator directly; see
// `model` for the normalized records.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::car_rate::CarType;

// A nested record that the API may or may not have populated
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Ref<T> {
    Embedded(T),
    Id(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawCircuit {
    #[serde(rename = "_id", deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub categories: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub best_seasons: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub entry_points: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub transport: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub experiences: Vec<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub car_price_hatchback: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub car_price_sedan: Option<f64>,
    #[serde(rename = "carPriceSUV", deserialize_with = "lenient_f64")]
    pub car_price_suv: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawHomestay {
    #[serde(rename = "_id", deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub homestay_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub place_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub distance: Option<f64>,
    #[serde(deserialize_with = "lenient_strings")]
    pub addons: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub experiences: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawDayPlanEntry {
    #[serde(deserialize_with = "lenient_f64")]
    pub day: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub description: Option<String>,
    pub stay_at_homestay_id: Option<Ref<RawHomestay>>,
    #[serde(deserialize_with = "lenient_strings")]
    pub activities: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub experiences: Vec<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub travel_distance_km: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub travel_time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawTransport {
    #[serde(deserialize_with = "lenient_string")]
    pub car_type: Option<String>,
    #[serde(deserialize_with = "lenient_bool")]
    pub with_car: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawLocalGuide {
    #[serde(rename = "_id", deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub contact: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub bio: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub image: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawReview {
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub rating: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub comment: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawItinerary {
    #[serde(rename = "_id", deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    pub circuit_id: Option<Ref<RawCircuit>>,
    #[serde(deserialize_with = "lenient_string")]
    pub theme: Option<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub category_tags: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub experience_tags: Vec<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub duration_days: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub days: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub guest_type: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub pax: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub pax_min: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub pax_max: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub budget_min: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub budget_max: Option<f64>,
    #[serde(deserialize_with = "lenient_bool")]
    pub transport_included: Option<bool>,
    #[serde(deserialize_with = "lenient_strings")]
    pub car_types: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub car_type: Option<String>,
    #[serde(deserialize_with = "lenient_bool")]
    pub with_car: Option<bool>,
    pub transport: Option<RawTransport>,
    #[serde(deserialize_with = "lenient_bool")]
    pub is_featured: Option<bool>,
    #[serde(deserialize_with = "lenient_vec")]
    pub day_wise_plan: Vec<RawDayPlanEntry>,
    #[serde(deserialize_with = "lenient_vec")]
    pub addon_suggestions: Vec<RawDayPlanEntry>,
    pub homestay: Option<Ref<RawHomestay>>,
    pub local_guide: Option<Ref<RawLocalGuide>>,
    #[serde(deserialize_with = "lenient_vec")]
    pub reviews: Vec<RawReview>,
    #[serde(deserialize_with = "lenient_string")]
    pub image: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub avg_price_last_month: Option<f64>,
}

// Numbers: JSON numbers or numeric strings. Anything else, including
// non-finite values, is treated as absent.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

pub fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0),
        _ => None,
    })
}

// Plain strings only; empty strings count as absent
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// Nested record lists: `null` or a non-array is empty, and entries that do
// not decode are dropped instead of failing the whole record.
pub fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

// Car class picked by a traveller. Anything outside the fixed set is unset.
pub fn lenient_car_type<'de, D>(deserializer: D) -> Result<Option<CarType>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => CarType::parse(&s),
        _ => None,
    })
}

// Arrays of scalars, a JSON encoded array inside a string, or a comma
// separated string (admin forms submit all three).
pub fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(strings_from_value).unwrap_or_default())
}

fn number_from_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

fn strings_from_value(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.starts_with('[') {
                if let Ok(inner @ Value::Array(_)) = serde_json::from_str::<Value>(trimmed) {
                    return strings_from_value(inner);
                }
            }
            trimmed
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        }
        _ => Vec::new(),
    }
}
