// Canonical data model shared by the normalizer, the result pipeline and the
// API client. Offers are created once per search response and never mutated
// afterwards.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Placeholder for display strings the upstream payload did not provide.
pub const UNAVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airline {
    pub name: String,
    pub code: String,
}

/// One side of an itinerary (departure or arrival).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Missing when the upstream payload carried no parseable timestamp.
    pub time: Option<DateTime<Utc>>,
    pub airport_code: String,
    pub city_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub amount: f64,
    /// ISO 4217 code, `"N/A"` when the supplier omitted it.
    pub currency: String,
}

/// Canonical flight offer, the single shape every supplier payload is
/// converted to before display logic runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightOffer {
    pub id: String,
    pub airline: Airline,
    pub flight_number: String,
    pub departure: Endpoint,
    pub arrival: Endpoint,
    pub duration_minutes: u32,
    pub stop_count: u32,
    pub price: Price,
    /// Supplier rating in [0, 5] when known.
    pub rating: Option<f64>,
    pub amenities: BTreeSet<String>,
}

/// Airport reference used as an opaque search-input token. Equality is by
/// `entity_id` only; the rest is display metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Airport {
    pub entity_id: String,
    pub sky_id: String,
    pub iata: String,
    pub name: String,
    pub city: String,
    pub country: String,
    pub kind: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl PartialEq for Airport {
    fn eq(&self, other: &Self) -> bool {
        self.entity_id == other.entity_id
    }
}

impl Eq for Airport {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripType {
    OneWay,
    RoundTrip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CabinClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    /// Wire value expected by the flights API query string.
    pub fn as_query_value(&self) -> &'static str {
        match self {
            CabinClass::Economy => "economy",
            CabinClass::PremiumEconomy => "premium_economy",
            CabinClass::Business => "business",
            CabinClass::First => "first",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passengers {
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

impl Default for Passengers {
    fn default() -> Self {
        Self {
            adults: 1,
            children: 0,
            infants: 0,
        }
    }
}

/// What the user asked for. Built by the search form, owned by the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub trip_type: TripType,
    pub origin: Airport,
    pub destination: Airport,
    pub depart_date: String,
    pub return_date: Option<String>,
    pub passengers: Passengers,
    pub cabin_class: CabinClass,
}

impl SearchCriteria {
    /// Round trip requires both the trip type and an actual return date.
    pub fn is_round_trip(&self) -> bool {
        self.trip_type == TripType::RoundTrip && self.return_date.is_some()
    }
}

/// Comparator selection for the result pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Price,
    Duration,
    DepartureTime,
    ArrivalTime,
    Rating,
    Stops,
}

/// Time-of-day bucket for the departure filter. Boundaries follow the
/// original product: morning 06-12, afternoon 12-18, evening 18-24,
/// night 00-06 (local hour of the departure timestamp).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepartureWindow {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl DepartureWindow {
    pub fn contains_hour(&self, hour: u32) -> bool {
        match self {
            DepartureWindow::Morning => (6..12).contains(&hour),
            DepartureWindow::Afternoon => (12..18).contains(&hour),
            DepartureWindow::Evening => (18..24).contains(&hour),
            DepartureWindow::Night => hour < 6,
        }
    }
}

/// Active filter criteria. Every field is optional; `None` or an empty set
/// means "no constraint". An offer must satisfy all active criteria.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    /// Inclusive [min, max]. A range with min > max matches nothing.
    pub price_range: Option<(f64, f64)>,
    /// Inclusive [min, max] in minutes.
    pub duration_range: Option<(u32, u32)>,
    /// Allowed stop counts (membership test).
    pub stops: Vec<u32>,
    /// Allowed airline codes (membership test).
    pub airlines: Vec<String>,
    /// Required amenity tags; the offer must carry every one of them.
    pub amenities: Vec<String>,
    pub min_rating: Option<f64>,
    pub departure_window: Option<DepartureWindow>,
}

impl FilterSet {
    /// True when no criterion is active, i.e. filtering is the identity.
    pub fn is_empty(&self) -> bool {
        self.price_range.is_none()
            && self.duration_range.is_none()
            && self.stops.is_empty()
            && self.airlines.is_empty()
            && self.amenities.is_empty()
            && self.min_rating.is_none()
            && self.departure_window.is_none()
    }
}
