// Result pipeline: sort, then filter, then paginate. Order matters because
// the page slice must come from the filtered+sorted set, never the raw one.
// Every operation here is a pure function of its inputs.

use std::cmp::Ordering;

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{FilterSet, FlightOffer, SortKey};

/// Default number of offers per page.
pub const PAGE_SIZE: usize = 20;

/// One on-screen slice of the filtered+sorted result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage {
    pub items: Vec<FlightOffer>,
    /// Offers surviving the filter, across all pages.
    pub total_count: usize,
    pub total_pages: usize,
    /// The 1-based page actually returned, after clamping.
    pub page: usize,
}

impl ResultPage {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            total_pages: 0,
            page: 1,
        }
    }
}

// Missing timestamps sort last in ascending order, like missing ratings
// sort last in descending order: offers the user cannot evaluate go to
// the bottom either way.
fn compare_times(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare(a: &FlightOffer, b: &FlightOffer, key: SortKey) -> Ordering {
    match key {
        SortKey::Price => a
            .price
            .amount
            .partial_cmp(&b.price.amount)
            .unwrap_or(Ordering::Equal),
        SortKey::Duration => a.duration_minutes.cmp(&b.duration_minutes),
        SortKey::Stops => a.stop_count.cmp(&b.stop_count),
        SortKey::DepartureTime => compare_times(a.departure.time, b.departure.time),
        SortKey::ArrivalTime => compare_times(a.arrival.time, b.arrival.time),
        // Best first; unrated counts as zero.
        SortKey::Rating => b
            .rating
            .unwrap_or(0.0)
            .partial_cmp(&a.rating.unwrap_or(0.0))
            .unwrap_or(Ordering::Equal),
    }
}

/// Stable sort by the selected key. Ties keep their prior relative order.
pub fn sort_offers(offers: &mut [FlightOffer], key: SortKey) {
    offers.sort_by(|a, b| compare(a, b, key));
}

fn matches(offer: &FlightOffer, filters: &FilterSet) -> bool {
    if let Some((min, max)) = filters.price_range {
        // min > max is unsatisfiable by construction, which is the wanted
        // "no offers match" behavior for inverted ranges.
        if offer.price.amount < min || offer.price.amount > max {
            return false;
        }
    }

    if let Some((min, max)) = filters.duration_range {
        if offer.duration_minutes < min || offer.duration_minutes > max {
            return false;
        }
    }

    if !filters.stops.is_empty() && !filters.stops.contains(&offer.stop_count) {
        return false;
    }

    if !filters.airlines.is_empty() && !filters.airlines.contains(&offer.airline.code) {
        return false;
    }

    if !filters
        .amenities
        .iter()
        .all(|tag| offer.amenities.contains(tag))
    {
        return false;
    }

    if let Some(min_rating) = filters.min_rating {
        if offer.rating.unwrap_or(0.0) < min_rating {
            return false;
        }
    }

    if let Some(window) = filters.departure_window {
        match offer.departure.time {
            Some(time) if window.contains_hour(time.hour()) => {}
            // No timestamp means the bucket cannot be established.
            _ => return false,
        }
    }

    true
}

/// Retain offers satisfying every active criterion, preserving order.
/// An empty `FilterSet` is the identity.
pub fn filter_offers(offers: Vec<FlightOffer>, filters: &FilterSet) -> Vec<FlightOffer> {
    if filters.is_empty() {
        return offers;
    }
    offers
        .into_iter()
        .filter(|offer| matches(offer, filters))
        .collect()
}

/// Slice out a 1-based page. Pages past the end clamp to the last valid
/// page; a zero offer list yields an empty page with `total_pages == 0`.
pub fn paginate(offers: Vec<FlightOffer>, page: usize, page_size: usize) -> ResultPage {
    if offers.is_empty() || page_size == 0 {
        return ResultPage::empty();
    }

    let total_count = offers.len();
    let total_pages = total_count.div_ceil(page_size);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total_count);

    ResultPage {
        items: offers[start..end].to_vec(),
        total_count,
        total_pages,
        page,
    }
}

/// The full pipeline: sort, filter, paginate, in that order.
pub fn run(
    mut offers: Vec<FlightOffer>,
    sort_key: SortKey,
    filters: &FilterSet,
    page: usize,
) -> ResultPage {
    sort_offers(&mut offers, sort_key);
    let filtered = filter_offers(offers, filters);
    paginate(filtered, page, PAGE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::offer_with;
    use test_case::test_case;

    fn priced(amounts: &[f64]) -> Vec<FlightOffer> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, &amount)| {
                offer_with(&format!("f{i}"), |o| {
                    o.price.amount = amount;
                })
            })
            .collect()
    }

    #[test]
    fn sorts_by_price_ascending() {
        let mut offers = priced(&[500.0, 100.0, 300.0]);
        sort_offers(&mut offers, SortKey::Price);
        let amounts: Vec<f64> = offers.iter().map(|o| o.price.amount).collect();
        assert_eq!(amounts, vec![100.0, 300.0, 500.0]);
    }

    #[test]
    fn sort_is_idempotent() {
        let mut offers = priced(&[500.0, 100.0, 300.0, 100.0]);
        sort_offers(&mut offers, SortKey::Price);
        let once = offers.clone();
        sort_offers(&mut offers, SortKey::Price);
        assert_eq!(offers, once);
    }

    #[test]
    fn rating_sorts_best_first_with_unrated_last() {
        let mut offers = vec![
            offer_with("a", |o| o.rating = Some(3.5)),
            offer_with("b", |o| o.rating = None),
            offer_with("c", |o| o.rating = Some(4.8)),
        ];
        sort_offers(&mut offers, SortKey::Rating);
        let ids: Vec<&str> = offers.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn price_ties_keep_prior_relative_order() {
        let mut offers = vec![
            offer_with("first", |o| o.price.amount = 200.0),
            offer_with("second", |o| o.price.amount = 200.0),
            offer_with("cheap", |o| o.price.amount = 50.0),
        ];
        sort_offers(&mut offers, SortKey::Price);
        let ids: Vec<&str> = offers.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["cheap", "first", "second"]);
    }

    #[test]
    fn empty_filter_set_is_identity() {
        let offers = priced(&[500.0, 100.0, 300.0]);
        let filtered = filter_offers(offers.clone(), &FilterSet::default());
        assert_eq!(filtered, offers);
    }

    #[test]
    fn stops_filter_keeps_matching_offers_in_order() {
        let offers: Vec<FlightOffer> = [0u32, 1, 0, 2, 1]
            .iter()
            .enumerate()
            .map(|(i, &stops)| {
                offer_with(&format!("f{i}"), |o| {
                    o.stop_count = stops;
                })
            })
            .collect();

        let filters = FilterSet {
            stops: vec![0],
            ..FilterSet::default()
        };
        let filtered = filter_offers(offers, &filters);
        let ids: Vec<&str> = filtered.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["f0", "f2"]);
    }

    #[test]
    fn inverted_price_range_matches_nothing() {
        let offers = priced(&[600.0, 700.0, 800.0]);
        let filters = FilterSet {
            price_range: Some((1000.0, 500.0)),
            ..FilterSet::default()
        };
        assert!(filter_offers(offers, &filters).is_empty());
    }

    #[test]
    fn amenities_require_every_tag() {
        let offers = vec![
            offer_with("both", |o| {
                o.amenities.insert("wifi".to_string());
                o.amenities.insert("meals".to_string());
            }),
            offer_with("wifi-only", |o| {
                o.amenities.insert("wifi".to_string());
            }),
        ];
        let filters = FilterSet {
            amenities: vec!["wifi".to_string(), "meals".to_string()],
            ..FilterSet::default()
        };
        let filtered = filter_offers(offers, &filters);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "both");
    }

    // Criteria combine with AND; each case lists the surviving offer ids.
    #[test_case(FilterSet { price_range: Some((0.0, 250.0)), ..FilterSet::default() }, vec!["cheap", "mid"]; "price range")]
    #[test_case(FilterSet { airlines: vec!["6E".to_string()], ..FilterSet::default() }, vec!["cheap"]; "airline membership")]
    #[test_case(FilterSet { min_rating: Some(4.0), ..FilterSet::default() }, vec!["pricey"]; "minimum rating")]
    #[test_case(FilterSet { duration_range: Some((100, 350)), ..FilterSet::default() }, vec!["cheap", "mid"]; "duration range")]
    #[test_case(FilterSet { price_range: Some((0.0, 250.0)), airlines: vec!["AI".to_string()], ..FilterSet::default() }, vec!["mid"]; "combined criteria")]
    fn filter_grid(filters: FilterSet, expected: Vec<&str>) {
        let offers = vec![
            offer_with("cheap", |o| {
                o.price.amount = 120.0;
                o.airline.code = "6E".to_string();
                o.rating = Some(3.2);
                o.duration_minutes = 130;
            }),
            offer_with("mid", |o| {
                o.price.amount = 240.0;
                o.airline.code = "AI".to_string();
                o.rating = Some(3.9);
                o.duration_minutes = 305;
            }),
            offer_with("pricey", |o| {
                o.price.amount = 610.0;
                o.airline.code = "UK".to_string();
                o.rating = Some(4.6);
                o.duration_minutes = 540;
            }),
        ];
        let ids: Vec<String> = filter_offers(offers, &filters)
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn departure_window_buckets_by_hour() {
        use crate::model::DepartureWindow;
        use chrono::TimeZone;

        // Base sample departure is 08:30, a morning slot.
        let offers = vec![
            offer_with("morning", |_| {}),
            offer_with("evening", |o| {
                o.departure.time = Some(Utc.with_ymd_and_hms(2025, 6, 11, 19, 0, 0).unwrap());
            }),
            offer_with("untimed", |o| o.departure.time = None),
        ];

        let evening = FilterSet {
            departure_window: Some(DepartureWindow::Evening),
            ..FilterSet::default()
        };
        let ids: Vec<String> = filter_offers(offers.clone(), &evening)
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec!["evening"]);

        // An offer without a departure timestamp has no bucket and is
        // excluded whenever a window filter is active.
        let morning = FilterSet {
            departure_window: Some(DepartureWindow::Morning),
            ..FilterSet::default()
        };
        let ids: Vec<String> = filter_offers(offers, &morning)
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec!["morning"]);
    }

    #[test]
    fn pagination_slices_the_second_page() {
        let offers = priced(&(0..25).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        let page = paginate(offers, 2, PAGE_SIZE);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total_count, 25);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.page, 2);
        assert_eq!(page.items[0].price.amount, 120.0);
    }

    #[test]
    fn out_of_range_pages_clamp() {
        let offers = priced(&[1.0, 2.0, 3.0]);
        let beyond = paginate(offers.clone(), 99, 2);
        assert_eq!(beyond.page, 2);
        assert_eq!(beyond.items.len(), 1);

        let zero = paginate(offers, 0, 2);
        assert_eq!(zero.page, 1);
        assert_eq!(zero.items.len(), 2);
    }

    #[test]
    fn empty_input_yields_empty_page_without_error() {
        let page = paginate(Vec::new(), 3, PAGE_SIZE);
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn full_pipeline_sorts_before_filtering_and_paging() {
        let mut offers = priced(&(0..30).map(|i| 1000.0 - i as f64 * 10.0).collect::<Vec<_>>());
        // Make a handful too expensive to survive the filter.
        for offer in offers.iter_mut().take(5) {
            offer.price.amount += 10_000.0;
        }

        let filters = FilterSet {
            price_range: Some((0.0, 2000.0)),
            ..FilterSet::default()
        };
        let page = run(offers, SortKey::Price, &filters, 2);

        assert_eq!(page.total_count, 25);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 5);
        // Page 2 holds the most expensive survivors, still sorted.
        assert!(page.items.windows(2).all(|w| w[0].price.amount <= w[1].price.amount));
    }
}
