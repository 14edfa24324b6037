//! crates/concierge_core/src/validate.rs
//!
//! Search-form validation. Each violation is reported against the field it
//! belongs to so the caller can surface messages inline; any violation
//! blocks the search.

use chrono::NaiveDate;
use serde::Serialize;

/// Cities the demo serves: Texas and California only.
pub const ALLOWED_CITIES: &[&str] = &[
    "dallas",
    "houston",
    "austin",
    "san antonio",
    "el paso",
    "fort worth",
    "lubbock",
    "corpus christi",
    "midland",
    "amarillo",
    "brownsville",
    "mcallen",
    "harlingen",
    "killeen",
    "waco",
    "tyler",
    "college station",
    "laredo",
    "beaumont",
    "abilene",
    "los angeles",
    "san francisco",
    "san diego",
    "san jose",
    "sacramento",
    "oakland",
    "long beach",
    "fresno",
    "santa barbara",
    "burbank",
    "palm springs",
    "ontario",
    "monterey",
    "bakersfield",
    "stockton",
    "santa rosa",
    "eureka",
    "san luis obispo",
];

pub fn is_allowed_city(city: &str) -> bool {
    let city = city.trim().to_lowercase();
    ALLOWED_CITIES.contains(&city.as_str())
}

/// A single field-scoped validation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TripType {
    OneWay,
    RoundTrip,
}

#[derive(Debug, Clone)]
pub struct FlightSearchForm {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub trip: TripType,
    pub return_date: Option<NaiveDate>,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

pub fn validate_flight_form(form: &FlightSearchForm) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    let origin = form.origin.trim().to_lowercase();
    let destination = form.destination.trim().to_lowercase();

    if !is_allowed_city(&origin) {
        errors.push(FieldError::new("origin", "Origin must be a city in Texas or California."));
    }
    if !is_allowed_city(&destination) {
        errors.push(FieldError::new(
            "destination",
            "Destination must be a city in Texas or California.",
        ));
    }
    if origin == destination {
        errors.push(FieldError::new("origin", "Origin and Destination cannot be same."));
        errors.push(FieldError::new("destination", "Origin and Destination cannot be same."));
    }
    if form.adults + form.children + form.infants == 0 {
        errors.push(FieldError::new("adults", "At least one passenger is required."));
    }
    if form.trip == TripType::RoundTrip {
        match form.return_date {
            None => errors.push(FieldError::new("return_date", "This field is required")),
            Some(return_date) if return_date < form.departure_date => {
                errors.push(FieldError::new(
                    "return_date",
                    "Departure Date of the arriving flight should be after the Departure Date of departing flight.",
                ));
            }
            Some(_) => {}
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[derive(Debug, Clone)]
pub struct HotelSearchForm {
    pub city: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
    pub rooms: u32,
}

pub fn validate_hotel_form(form: &HotelSearchForm) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if !is_allowed_city(&form.city) {
        errors.push(FieldError::new("city", "City must be in Texas or California."));
    }
    if form.check_out <= form.check_in {
        errors.push(FieldError::new(
            "check_out",
            "Check Out Date should be after the Check In Date.",
        ));
    }
    if form.adults + form.children + form.infants == 0 {
        errors.push(FieldError::new("adults", "At least one guest is required."));
    }
    if form.rooms == 0 {
        errors.push(FieldError::new("rooms", "At least one room is required."));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
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

    fn valid_form() -> FlightSearchForm {
        FlightSearchForm {
            origin: "Dallas".to_string(),
            destination: "Austin".to_string(),
            departure_date: date("2024-06-01"),
            trip: TripType::OneWay,
            return_date: None,
            adults: 1,
            children: 0,
            infants: 0,
        }
    }

    #[test]
    fn accepts_a_valid_one_way_search() {
        assert!(validate_flight_form(&valid_form()).is_ok());
    }

    #[test]
    fn rejects_cities_outside_the_served_list() {
        let mut form = valid_form();
        form.origin = "Chicago".to_string();
        let errors = validate_flight_form(&form).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "origin");
    }

    #[test]
    fn rejects_identical_origin_and_destination_on_both_fields() {
        let mut form = valid_form();
        form.destination = " DALLAS ".to_string();
        let errors = validate_flight_form(&form).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["origin", "destination"]);
    }

    #[test]
    fn round_trip_requires_a_return_date_after_departure() {
        let mut form = valid_form();
        form.trip = TripType::RoundTrip;
        let errors = validate_flight_form(&form).unwrap_err();
        assert_eq!(errors[0].field, "return_date");

        form.return_date = Some(date("2024-05-30"));
        let errors = validate_flight_form(&form).unwrap_err();
        assert_eq!(errors[0].field, "return_date");

        form.return_date = Some(date("2024-06-01"));
        assert!(validate_flight_form(&form).is_ok(), "same-day return is allowed");
    }

    #[test]
    fn hotel_check_out_must_follow_check_in() {
        let form = HotelSearchForm {
            city: "Austin".to_string(),
            check_in: date("2024-06-04"),
            check_out: date("2024-06-04"),
            adults: 2,
            children: 0,
            infants: 0,
            rooms: 1,
        };
        let errors = validate_hotel_form(&form).unwrap_err();
        assert_eq!(errors[0].field, "check_out");
    }
}
