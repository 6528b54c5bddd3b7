// Plausible offer generation for tests, benches and demos. Mirrors the mock
// results the product shows when the live API is unavailable.

use std::collections::BTreeSet;

use chrono::{Duration, TimeZone, Utc};
use rand::Rng;

use crate::model::{Airline, Endpoint, FlightOffer, Price};

const AIRLINES: &[(&str, &str)] = &[
    ("Delta", "DL"),
    ("American Airlines", "AA"),
    ("United", "UA"),
    ("Southwest", "WN"),
    ("JetBlue", "B6"),
    ("Alaska", "AS"),
];

const AMENITY_POOL: &[&str] = &["wifi", "meals", "entertainment", "power", "extra-legroom"];

/// A fixed, fully-populated offer for tests; `mutate` tweaks the fields a
/// given test cares about.
pub fn offer_with(id: &str, mutate: impl FnOnce(&mut FlightOffer)) -> FlightOffer {
    let departure_time = Utc.with_ymd_and_hms(2025, 6, 11, 8, 30, 0).unwrap();
    let mut offer = FlightOffer {
        id: id.to_string(),
        airline: Airline {
            name: "Delta".to_string(),
            code: "DL".to_string(),
        },
        flight_number: "DL1024".to_string(),
        departure: Endpoint {
            time: Some(departure_time),
            airport_code: "JFK".to_string(),
            city_name: "New York".to_string(),
        },
        arrival: Endpoint {
            time: Some(departure_time + Duration::minutes(360)),
            airport_code: "LAX".to_string(),
            city_name: "Los Angeles".to_string(),
        },
        duration_minutes: 360,
        stop_count: 0,
        price: Price {
            amount: 450.0,
            currency: "USD".to_string(),
        },
        rating: Some(4.2),
        amenities: BTreeSet::new(),
    };
    mutate(&mut offer);
    offer
}

/// Generate `n` randomized offers spanning the airlines, price points and
/// stop counts a real search would return.
pub fn sample_offers(n: usize) -> Vec<FlightOffer> {
    let mut rng = rand::thread_rng();
    let base_day = Utc.with_ymd_and_hms(2025, 6, 11, 0, 0, 0).unwrap();

    (0..n)
        .map(|i| {
            let (airline_name, airline_code) = AIRLINES[rng.gen_range(0..AIRLINES.len())];
            let depart = base_day + Duration::minutes(rng.gen_range(0..24 * 60));
            let duration = rng.gen_range(120..600);
            let stops = if rng.gen_bool(0.6) { 0 } else { rng.gen_range(1..=2) };

            let mut amenities = BTreeSet::new();
            for tag in AMENITY_POOL {
                if rng.gen_bool(0.4) {
                    amenities.insert(tag.to_string());
                }
            }

            FlightOffer {
                id: format!("flight-{i}"),
                airline: Airline {
                    name: airline_name.to_string(),
                    code: airline_code.to_string(),
                },
                flight_number: format!("{}{}", airline_code, rng.gen_range(1000..9999)),
                departure: Endpoint {
                    time: Some(depart),
                    airport_code: "JFK".to_string(),
                    city_name: "New York".to_string(),
                },
                arrival: Endpoint {
                    time: Some(depart + Duration::minutes(duration)),
                    airport_code: "LAX".to_string(),
                    city_name: "Los Angeles".to_string(),
                },
                duration_minutes: duration as u32,
                stop_count: stops,
                price: Price {
                    amount: rng.gen_range(150.0..750.0_f64).round(),
                    currency: "USD".to_string(),
                },
                rating: Some((rng.gen_range(2.0..5.0_f64) * 10.0).round() / 10.0),
                amenities,
            }
        })
        .collect()
}
