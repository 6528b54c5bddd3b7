// Flight search core: supplier-response normalization, the sort/filter/
// paginate result pipeline, and the session/cache plumbing around them.

pub mod airports;
pub mod client;
pub mod error;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod sample;
pub mod session;

// Re-export key types for convenience
pub use airports::{AirportCacheConfig, AirportCacheStats, AirportSearcher};
pub use client::{ClientConfig, FlightApi, FlightsSkyClient};
pub use error::{ApiError, NormalizeError};
pub use model::{
    Airline, Airport, CabinClass, DepartureWindow, Endpoint, FilterSet, FlightOffer, Passengers,
    Price, SearchCriteria, SortKey, TripType,
};
pub use normalize::{normalize_airports, normalize_offer, normalize_response, Batch};
pub use pipeline::{filter_offers, paginate, sort_offers, ResultPage, PAGE_SIZE};
pub use session::{SearchSession, SessionOwner, SessionStatus};
