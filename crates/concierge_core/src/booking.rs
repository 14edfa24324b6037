//! crates/concierge_core/src/booking.rs
//!
//! Finalization helpers: booking references and the seat decrement applied
//! to the in-memory catalog copy that becomes the downloadable artifact.

use crate::domain::FlightRecord;

/// Builds a booking reference from a flight id and two random two-digit
/// groups, interleaved the same way the confirmation page formats them:
/// the first two id characters, a group, the next two, a group, the rest.
///
/// Distinct digit groups yield distinct references for the same flight, so
/// outbound and return legs on one flight never collide.
pub fn booking_reference(flight_id: &str, group_a: u8, group_b: u8) -> String {
    let chars: Vec<char> = flight_id.chars().collect();
    let head: String = chars.iter().take(2).collect();
    let mid: String = chars.iter().skip(2).take(2).collect();
    let tail: String = chars.iter().skip(4).collect();
    format!("{head}{group_a:02}{mid}{group_b:02}{tail}")
}

/// Decrements the seat count of the matching flight in a catalog copy,
/// saturating at zero. Records other than the booked one are untouched.
pub fn decrement_seats(catalog: &mut [FlightRecord], flight_id: &str, seats: u32) {
    if let Some(flight) = catalog.iter_mut().find(|f| f.flight_id == flight_id) {
        flight.available_seats = flight.available_seats.saturating_sub(seats);
    }
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn reference_interleaves_id_and_digit_groups() {
        assert_eq!(booking_reference("FL1234", 42, 7), "FL42120734");
    }

    #[test]
    fn distinct_digit_groups_never_collide() {
        let a = booking_reference("FL1234", 10, 11);
        let b = booking_reference("FL1234", 12, 13);
        assert_ne!(a, b);
    }

    #[test]
    fn short_ids_still_produce_a_reference() {
        assert_eq!(booking_reference("AB", 10, 20), "AB1020");
    }

    #[test]
    fn seat_decrement_targets_only_the_booked_flight() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut catalog = vec![
            FlightRecord {
                flight_id: "FL100".to_string(),
                origin: "Dallas".to_string(),
                destination: "Austin".to_string(),
                departure_date: date,
                arrival_date: date,
                departure_time: "09:00".to_string(),
                arrival_time: "10:00".to_string(),
                available_seats: 5,
                price: 100.0,
            },
            FlightRecord {
                flight_id: "FL200".to_string(),
                origin: "Austin".to_string(),
                destination: "Dallas".to_string(),
                departure_date: date,
                arrival_date: date,
                departure_time: "18:00".to_string(),
                arrival_time: "19:00".to_string(),
                available_seats: 5,
                price: 100.0,
            },
        ];
        decrement_seats(&mut catalog, "FL100", 3);
        assert_eq!(catalog[0].available_seats, 2);
        assert_eq!(catalog[1].available_seats, 5);

        decrement_seats(&mut catalog, "FL100", 9);
        assert_eq!(catalog[0].available_seats, 0, "decrement saturates at zero");
    }
}
