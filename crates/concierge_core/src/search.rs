//! crates/concierge_core/src/search.rs
//!
//! Flight and hotel search over the read-only reference catalogs, plus
//! fare computation. Exact-date matches are offered as a group and
//! suppress the ±3-day fallback window entirely.

use crate::domain::{FlightRecord, HotelRecord, HotelSelection, PassengerCounts};
use chrono::NaiveDate;

/// The fallback window around the requested date, in days.
pub const DATE_WINDOW_DAYS: i64 = 3;

const CHILD_FARE_FACTOR: f64 = 0.7;
const INFANT_FARE_FACTOR: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct FlightQuery {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub passengers: u32,
}

/// Which group of candidates a search ended up offering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    ExactDate,
    NearbyDate,
    NoMatch,
}

/// The two candidate groups a flight search produces. Callers offer
/// `same_day` when it is non-empty, `diff_day` otherwise.
#[derive(Debug, Clone, Default)]
pub struct FlightSearch {
    pub same_day: Vec<FlightRecord>,
    pub diff_day: Vec<FlightRecord>,
}

impl FlightSearch {
    /// The group of flights actually offered to the user.
    pub fn offered(&self) -> (&[FlightRecord], MatchKind) {
        if !self.same_day.is_empty() {
            (&self.same_day, MatchKind::ExactDate)
        } else if !self.diff_day.is_empty() {
            (&self.diff_day, MatchKind::NearbyDate)
        } else {
            (&[], MatchKind::NoMatch)
        }
    }
}

fn within_window(requested: NaiveDate, candidate: NaiveDate) -> bool {
    (candidate - requested).num_days().abs() <= DATE_WINDOW_DAYS
}

/// Filters the catalog for the requested route. A candidate qualifies only
/// if its seat count covers the whole party; exact-date matches and
/// within-window matches are collected separately.
pub fn search_flights(catalog: &[FlightRecord], query: &FlightQuery) -> FlightSearch {
    let origin = query.origin.trim().to_lowercase();
    let destination = query.destination.trim().to_lowercase();

    let mut result = FlightSearch::default();
    for flight in catalog {
        if flight.origin.to_lowercase() != origin
            || flight.destination.to_lowercase() != destination
            || flight.available_seats < query.passengers
        {
            continue;
        }
        if flight.departure_date == query.departure_date {
            result.same_day.push(flight.clone());
        } else if within_window(query.departure_date, flight.departure_date) {
            result.diff_day.push(flight.clone());
        }
    }
    result
}

/// Total fare for a party: adults at full price, children at 70%, infants
/// at 10% of the adult fare.
pub fn trip_price(unit_price: f64, passengers: &PassengerCounts) -> f64 {
    unit_price * passengers.adults as f64
        + unit_price * CHILD_FARE_FACTOR * passengers.children as f64
        + unit_price * INFANT_FARE_FACTOR * passengers.infants as f64
}

#[derive(Debug, Clone)]
pub struct HotelQuery {
    pub city: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub passengers: PassengerCounts,
    pub rooms: u32,
}

/// Number of nights between check-in and check-out.
pub fn stay_nights(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    (check_out - check_in).num_days()
}

/// Filters the hotel catalog by city and prices each candidate for the
/// requested stay: rooms times nightly price times nights.
pub fn search_hotels(catalog: &[HotelRecord], query: &HotelQuery) -> Vec<HotelSelection> {
    let city = query.city.trim().to_lowercase();
    let nights = stay_nights(query.check_in, query.check_out);

    catalog
        .iter()
        .filter(|hotel| hotel.city.to_lowercase() == city)
        .map(|hotel| HotelSelection {
            hotel: hotel.clone(),
            passengers: query.passengers,
            rooms: query.rooms,
            check_in: query.check_in,
            check_out: query.check_out,
            total_price: query.rooms as f64 * hotel.price * nights as f64,
        })
        .collect()
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn flight(id: &str, origin: &str, dest: &str, dep: &str, seats: u32, price: f64) -> FlightRecord {
        FlightRecord {
            flight_id: id.to_string(),
            origin: origin.to_string(),
            destination: dest.to_string(),
            departure_date: date(dep),
            arrival_date: date(dep),
            departure_time: "09:00".to_string(),
            arrival_time: "11:30".to_string(),
            available_seats: seats,
            price,
        }
    }

    #[test]
    fn exact_date_match_suppresses_the_window() {
        let catalog = vec![
            flight("FL100", "Dallas", "Austin", "2024-06-01", 5, 100.0),
            flight("FL101", "Dallas", "Austin", "2024-06-02", 5, 90.0),
        ];
        let query = FlightQuery {
            origin: "dallas".to_string(),
            destination: "austin".to_string(),
            departure_date: date("2024-06-01"),
            passengers: 3,
        };
        let result = search_flights(&catalog, &query);
        assert_eq!(result.same_day.len(), 1);
        assert_eq!(result.same_day[0].flight_id, "FL100");
        let (offered, kind) = result.offered();
        assert_eq!(kind, MatchKind::ExactDate);
        assert_eq!(offered.len(), 1);
    }

    #[test]
    fn falls_back_to_nearby_dates_within_three_days_only() {
        let catalog = vec![
            flight("FL200", "Houston", "Fresno", "2024-06-03", 4, 150.0),
            flight("FL201", "Houston", "Fresno", "2024-06-04", 4, 150.0),
            flight("FL202", "Houston", "Fresno", "2024-06-05", 4, 150.0), // 4 days out
            flight("FL203", "Houston", "Fresno", "2024-05-29", 4, 150.0), // 3 days before
        ];
        let query = FlightQuery {
            origin: "houston".to_string(),
            destination: "fresno".to_string(),
            departure_date: date("2024-06-01"),
            passengers: 2,
        };
        let result = search_flights(&catalog, &query);
        assert!(result.same_day.is_empty());
        let ids: Vec<&str> = result.diff_day.iter().map(|f| f.flight_id.as_str()).collect();
        assert_eq!(ids, vec!["FL200", "FL201", "FL203"]);
        let (_, kind) = result.offered();
        assert_eq!(kind, MatchKind::NearbyDate);
    }

    #[test]
    fn insufficient_seats_disqualify_a_candidate() {
        let catalog = vec![flight("FL300", "Waco", "Oakland", "2024-06-01", 2, 80.0)];
        let query = FlightQuery {
            origin: "waco".to_string(),
            destination: "oakland".to_string(),
            departure_date: date("2024-06-01"),
            passengers: 3,
        };
        let result = search_flights(&catalog, &query);
        let (offered, kind) = result.offered();
        assert!(offered.is_empty());
        assert_eq!(kind, MatchKind::NoMatch);
    }

    #[test]
    fn route_matching_ignores_case() {
        let catalog = vec![flight("FL400", "El Paso", "San Jose", "2024-07-10", 6, 120.0)];
        let query = FlightQuery {
            origin: "  EL PASO ".to_string(),
            destination: "san jose".to_string(),
            departure_date: date("2024-07-10"),
            passengers: 1,
        };
        assert_eq!(search_flights(&catalog, &query).same_day.len(), 1);
    }

    #[test]
    fn fare_weights_children_and_infants() {
        let passengers = PassengerCounts { adults: 2, children: 1, infants: 1 };
        assert_eq!(trip_price(100.0, &passengers), 200.0 + 70.0 + 10.0);
    }

    #[test]
    fn spec_example_scenario() {
        // Dallas -> Austin on 2024-06-01, 2 adults + 1 child against one
        // matching flight with 5 seats at 100: total 270, exact match only.
        let catalog = vec![flight("FL500", "Dallas", "Austin", "2024-06-01", 5, 100.0)];
        let query = FlightQuery {
            origin: "dallas".to_string(),
            destination: "austin".to_string(),
            departure_date: date("2024-06-01"),
            passengers: 3,
        };
        let result = search_flights(&catalog, &query);
        assert_eq!(result.same_day.len(), 1);
        assert!(result.diff_day.is_empty());
        let passengers = PassengerCounts { adults: 2, children: 1, infants: 0 };
        assert_eq!(trip_price(result.same_day[0].price, &passengers), 270.0);
    }

    #[test]
    fn hotel_search_prices_the_whole_stay() {
        let catalog = vec![
            HotelRecord { hotel_id: 1, hotel_name: "Grand Lodge".to_string(), city: "Austin".to_string(), price: 120.0 },
            HotelRecord { hotel_id: 2, hotel_name: "Bay Inn".to_string(), city: "Monterey".to_string(), price: 95.0 },
        ];
        let query = HotelQuery {
            city: "austin".to_string(),
            check_in: date("2024-06-01"),
            check_out: date("2024-06-04"),
            passengers: PassengerCounts { adults: 2, children: 0, infants: 0 },
            rooms: 2,
        };
        let offers = search_hotels(&catalog, &query);
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].hotel.hotel_id, 1);
        // 2 rooms * 120 per night * 3 nights
        assert_eq!(offers[0].total_price, 720.0);
    }
}
