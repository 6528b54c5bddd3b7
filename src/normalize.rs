// Normalization of raw supplier JSON into canonical records. The upstream
// schema is not controlled by us: the same logical value shows up under
// different paths depending on which endpoint (and which API revision)
// produced the payload. Each field therefore has an explicit ordered
// resolution chain of alternative paths; the first path holding a defined
// value wins. Keeping the chains in one place beats scattering optional
// lookups through the codebase.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::NormalizeError;
use crate::model::{Airline, Airport, Endpoint, FlightOffer, Price, UNAVAILABLE};

// Resolution chains. Order is priority order; first non-null wins.
//
// Paths are dot-separated; numeric segments index into arrays. The entries
// reflect the payload shapes the flights-sky endpoints have been observed to
// return: flat offers, `legs`-wrapped itineraries, and the older bare-field
// variant.

const ID: &[&str] = &["id", "legs.0.id"];
const PRICE: &[&str] = &["price.raw", "price.amount", "price"];
const CURRENCY: &[&str] = &["price.currency", "currency"];
const AIRLINE_NAME: &[&str] = &[
    "airline.name",
    "airline",
    "carrier.name",
    "legs.0.carriers.marketing.0.name",
];
const AIRLINE_CODE: &[&str] = &[
    "airline.code",
    "carrierCode",
    "legs.0.carriers.marketing.0.alternateId",
];
const FLIGHT_NUMBER: &[&str] = &["flightNumber", "legs.0.segments.0.flightNumber"];
const DEPART_TIME: &[&str] = &["departure.time", "departure", "legs.0.departure"];
const DEPART_AIRPORT: &[&str] = &[
    "departure.airportCode",
    "departure.airport",
    "origin.displayCode",
    "legs.0.origin.displayCode",
    "from",
];
const DEPART_CITY: &[&str] = &[
    "departure.cityName",
    "departure.city",
    "origin.city",
    "legs.0.origin.city",
];
const ARRIVE_TIME: &[&str] = &["arrival.time", "arrival", "legs.0.arrival"];
const ARRIVE_AIRPORT: &[&str] = &[
    "arrival.airportCode",
    "arrival.airport",
    "destination.displayCode",
    "legs.0.destination.displayCode",
    "to",
];
const ARRIVE_CITY: &[&str] = &[
    "arrival.cityName",
    "arrival.city",
    "destination.city",
    "legs.0.destination.city",
];
const DURATION_MINUTES: &[&str] = &["durationInMinutes", "duration", "legs.0.durationInMinutes"];
const STOP_COUNT: &[&str] = &["stops", "stopCount", "legs.0.stopCount"];
const RATING: &[&str] = &["rating", "score"];
const AMENITIES: &[&str] = &["amenities", "tags"];

// Where the offer array itself hides inside a search response.
const OFFER_CONTAINERS: &[&str] = &["data.data", "data.legs", "data.itineraries", "data"];
// Same for airport auto-complete responses.
const AIRPORT_CONTAINERS: &[&str] = &["data", "places", "airports"];

/// Outcome of normalizing one search response: the offers that could be
/// identified plus a count of raw objects that could not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub offers: Vec<FlightOffer>,
    pub skipped: usize,
}

fn lookup<'a>(raw: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = raw;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

fn resolve<'a>(raw: &'a Value, chain: &[&str]) -> Option<&'a Value> {
    chain.iter().find_map(|path| lookup(raw, path))
}

fn resolve_string(raw: &Value, chain: &[&str]) -> Option<String> {
    resolve(raw, chain).and_then(|v| match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

// Numbers may arrive as JSON numbers or as numeric strings.
fn resolve_f64(raw: &Value, chain: &[&str]) -> Option<f64> {
    resolve(raw, chain).and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

fn resolve_u32(raw: &Value, chain: &[&str]) -> Option<u32> {
    resolve_f64(raw, chain).and_then(|n| {
        if n.is_finite() && n >= 0.0 {
            Some(n as u32)
        } else {
            None
        }
    })
}

/// Timestamps arrive either as RFC 3339 or as a naive `YYYY-MM-DDTHH:MM:SS`
/// local string (treated as UTC; the API does not disclose the zone).
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

fn resolve_time(raw: &Value, chain: &[&str]) -> Option<DateTime<Utc>> {
    resolve(raw, chain)
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
}

// Amenities come as an array of tags or as an object of boolean flags
// (`{"wifi": true, "meals": false}`); both collapse into a tag set.
fn resolve_amenities(raw: &Value) -> BTreeSet<String> {
    match resolve(raw, AMENITIES) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::Object(flags)) => flags
            .iter()
            .filter(|(_, enabled)| enabled.as_bool().unwrap_or(false))
            .map(|(tag, _)| tag.clone())
            .collect(),
        _ => BTreeSet::new(),
    }
}

fn string_or_unavailable(raw: &Value, chain: &[&str]) -> String {
    resolve_string(raw, chain).unwrap_or_else(|| UNAVAILABLE.to_string())
}

/// Convert one raw supplier object into a `FlightOffer`.
///
/// Pure, never panics. Missing or malformed optional fields fall back to
/// documented defaults (`"N/A"` strings, `0` numbers, empty amenity set).
/// The only error case is an object with no resolvable price and no
/// resolvable route information at any known path, which cannot be an offer.
pub fn normalize_offer(raw: &Value) -> Result<FlightOffer, NormalizeError> {
    if !raw.is_object() {
        return Err(NormalizeError::NotAnObject(json_kind(raw)));
    }

    let price_amount = resolve_f64(raw, PRICE).filter(|amount| *amount >= 0.0);
    let departure_time = resolve_time(raw, DEPART_TIME);
    let arrival_time = resolve_time(raw, ARRIVE_TIME);
    let has_route = departure_time.is_some()
        || arrival_time.is_some()
        || resolve_string(raw, DEPART_AIRPORT).is_some()
        || resolve_string(raw, ARRIVE_AIRPORT).is_some();

    if price_amount.is_none() && !has_route {
        return Err(NormalizeError::Unrecognized);
    }

    let departure = Endpoint {
        time: departure_time,
        airport_code: string_or_unavailable(raw, DEPART_AIRPORT),
        city_name: string_or_unavailable(raw, DEPART_CITY),
    };
    let arrival = Endpoint {
        time: arrival_time,
        airport_code: string_or_unavailable(raw, ARRIVE_AIRPORT),
        city_name: string_or_unavailable(raw, ARRIVE_CITY),
    };

    // Timestamps are the source of truth for duration; the duration field
    // chain only fills in when one of them is missing. A negative span means
    // inconsistent upstream data and collapses to zero.
    let duration_minutes = match (departure.time, arrival.time) {
        (Some(dep), Some(arr)) => {
            let span = arr.signed_duration_since(dep).num_minutes();
            if span < 0 {
                debug!(%dep, %arr, "arrival precedes departure, duration set to 0");
                0
            } else {
                span as u32
            }
        }
        _ => resolve_u32(raw, DURATION_MINUTES).unwrap_or(0),
    };

    let flight_number = string_or_unavailable(raw, FLIGHT_NUMBER);
    let id = resolve_string(raw, ID).unwrap_or_else(|| synthesize_id(&flight_number, &departure));

    Ok(FlightOffer {
        id,
        airline: Airline {
            name: string_or_unavailable(raw, AIRLINE_NAME),
            code: string_or_unavailable(raw, AIRLINE_CODE),
        },
        flight_number,
        departure,
        arrival,
        duration_minutes,
        stop_count: resolve_u32(raw, STOP_COUNT).unwrap_or(0),
        price: Price {
            amount: price_amount.unwrap_or(0.0),
            currency: string_or_unavailable(raw, CURRENCY),
        },
        rating: resolve_f64(raw, RATING).map(|r| r.clamp(0.0, 5.0)),
        amenities: resolve_amenities(raw),
    })
}

fn synthesize_id(flight_number: &str, departure: &Endpoint) -> String {
    let when = departure
        .time
        .map(|t| t.timestamp().to_string())
        .unwrap_or_else(|| UNAVAILABLE.to_string());
    format!("{}-{}-{}", flight_number, departure.airport_code, when)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Normalize a whole search response body. Locates the offer array inside
/// the known container paths, normalizes each element and drops the ones
/// that cannot be identified as offers, counting them for diagnostics.
pub fn normalize_response(body: &Value) -> Batch {
    let raw_offers = OFFER_CONTAINERS
        .iter()
        .find_map(|path| lookup(body, path).and_then(Value::as_array))
        .or_else(|| body.as_array());

    let Some(raw_offers) = raw_offers else {
        warn!("search response carried no offer array at any known path");
        return Batch::default();
    };

    let mut batch = Batch::default();
    for raw in raw_offers {
        match normalize_offer(raw) {
            Ok(offer) => batch.offers.push(offer),
            Err(err) => {
                debug!(%err, "skipping unrecognized offer object");
                batch.skipped += 1;
            }
        }
    }
    if batch.skipped > 0 {
        warn!(skipped = batch.skipped, kept = batch.offers.len(), "offers skipped during normalization");
    }
    batch
}

// Airport auto-complete payloads have their own set of alternative shapes.

const AIRPORT_ENTITY_ID: &[&str] = &["entityId", "skyId", "iata"];
const AIRPORT_SKY_ID: &[&str] = &["skyId", "entityId", "iata"];
const AIRPORT_NAME: &[&str] = &["name", "displayName", "presentation.suggestionTitle"];
const AIRPORT_CITY: &[&str] = &["city", "cityName", "presentation.cityName"];
const AIRPORT_COUNTRY: &[&str] = &["country", "countryName", "presentation.countryName"];
const AIRPORT_LAT: &[&str] = &["coordinates.lat", "latitude", "lat"];
const AIRPORT_LNG: &[&str] = &["coordinates.lng", "longitude", "lng", "lon"];

/// Normalize one raw airport object. Returns `None` when no identifier
/// exists at any known path; such entries are dropped, not surfaced.
pub fn normalize_airport(raw: &Value) -> Option<Airport> {
    let entity_id = resolve_string(raw, AIRPORT_ENTITY_ID)?;
    let sky_id = resolve_string(raw, AIRPORT_SKY_ID).unwrap_or_else(|| entity_id.clone());
    let iata = resolve_string(raw, &["iata"])
        .unwrap_or_else(|| sky_id.chars().take(3).collect::<String>());

    Some(Airport {
        entity_id,
        iata,
        name: string_or_unavailable(raw, AIRPORT_NAME),
        city: string_or_unavailable(raw, AIRPORT_CITY),
        country: string_or_unavailable(raw, AIRPORT_COUNTRY),
        kind: resolve_string(raw, &["type"]).unwrap_or_else(|| "AIRPORT".to_string()),
        latitude: resolve_f64(raw, AIRPORT_LAT),
        longitude: resolve_f64(raw, AIRPORT_LNG),
        sky_id,
    })
}

/// Normalize an auto-complete response body into airport references.
pub fn normalize_airports(body: &Value) -> Vec<Airport> {
    let raw_items = AIRPORT_CONTAINERS
        .iter()
        .find_map(|path| lookup(body, path).and_then(Value::as_array))
        .or_else(|| body.as_array());

    let Some(raw_items) = raw_items else {
        warn!("auto-complete response carried no airport array at any known path");
        return Vec::new();
    };

    raw_items.iter().filter_map(normalize_airport).collect()
}
