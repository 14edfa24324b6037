//! services/api/src/adapters/catalog.rs
//!
//! This module contains the file-backed catalog adapter. Flights live in an
//! XML document, hotels in a JSON file; both are re-read on every search so
//! edits to the files show up without a restart.

use async_trait::async_trait;
use chrono::NaiveDate;
use concierge_core::domain::{FlightRecord, HotelRecord};
use concierge_core::ports::{CatalogService, PortError, PortResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

//=========================================================================================
// XML document shape
//=========================================================================================

/// The `<Flights>` document root.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "Flights")]
struct FlightsDoc {
    #[serde(rename = "Flight", default)]
    flights: Vec<FlightXml>,
}

/// One `<Flight>` element. Dates are kept as strings here and validated
/// when converting into the domain record.
#[derive(Debug, Serialize, Deserialize)]
struct FlightXml {
    #[serde(rename = "FlightID")]
    flight_id: String,
    #[serde(rename = "Origin")]
    origin: String,
    #[serde(rename = "Destination")]
    destination: String,
    #[serde(rename = "DepartureDate")]
    departure_date: String,
    #[serde(rename = "ArrivalDate")]
    arrival_date: String,
    #[serde(rename = "DepartureTime")]
    departure_time: String,
    #[serde(rename = "ArrivalTime")]
    arrival_time: String,
    #[serde(rename = "AvailableSeats")]
    available_seats: u32,
    #[serde(rename = "Price")]
    price: f64,
}

impl FlightXml {
    fn to_domain(&self) -> PortResult<FlightRecord> {
        let departure_date = parse_date(&self.departure_date, &self.flight_id)?;
        let arrival_date = parse_date(&self.arrival_date, &self.flight_id)?;
        Ok(FlightRecord {
            flight_id: self.flight_id.clone(),
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            departure_date,
            arrival_date,
            departure_time: self.departure_time.clone(),
            arrival_time: self.arrival_time.clone(),
            available_seats: self.available_seats,
            price: self.price,
        })
    }

    fn from_domain(record: &FlightRecord) -> Self {
        Self {
            flight_id: record.flight_id.clone(),
            origin: record.origin.clone(),
            destination: record.destination.clone(),
            departure_date: record.departure_date.format("%Y-%m-%d").to_string(),
            arrival_date: record.arrival_date.format("%Y-%m-%d").to_string(),
            departure_time: record.departure_time.clone(),
            arrival_time: record.arrival_time.clone(),
            available_seats: record.available_seats,
            price: record.price,
        }
    }
}

fn parse_date(text: &str, flight_id: &str) -> PortResult<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|e| {
        PortError::Unexpected(format!("Bad date '{}' on flight {}: {}", text, flight_id, e))
    })
}

//=========================================================================================
// The File Adapter
//=========================================================================================

/// A catalog adapter that implements the `CatalogService` port over local files.
#[derive(Clone)]
pub struct FileCatalogAdapter {
    flights_path: PathBuf,
    hotels_path: PathBuf,
}

impl FileCatalogAdapter {
    /// Creates a new `FileCatalogAdapter`.
    pub fn new(flights_path: PathBuf, hotels_path: PathBuf) -> Self {
        Self {
            flights_path,
            hotels_path,
        }
    }

    fn parse_flights(xml: &str) -> PortResult<Vec<FlightRecord>> {
        let doc: FlightsDoc = quick_xml::de::from_str(xml)
            .map_err(|e| PortError::Unexpected(format!("Flight catalog parse error: {}", e)))?;
        doc.flights.iter().map(FlightXml::to_domain).collect()
    }
}

#[async_trait]
impl CatalogService for FileCatalogAdapter {
    async fn load_flights(&self) -> PortResult<Vec<FlightRecord>> {
        let xml = tokio::fs::read_to_string(&self.flights_path)
            .await
            .map_err(|e| {
                PortError::Unexpected(format!(
                    "Failed to read {}: {}",
                    self.flights_path.display(),
                    e
                ))
            })?;
        Self::parse_flights(&xml)
    }

    async fn load_hotels(&self) -> PortResult<Vec<HotelRecord>> {
        let json = tokio::fs::read_to_string(&self.hotels_path)
            .await
            .map_err(|e| {
                PortError::Unexpected(format!(
                    "Failed to read {}: {}",
                    self.hotels_path.display(),
                    e
                ))
            })?;
        serde_json::from_str(&json)
            .map_err(|e| PortError::Unexpected(format!("Hotel catalog parse error: {}", e)))
    }

    fn render_flight_catalog(&self, flights: &[FlightRecord]) -> PortResult<String> {
        let doc = FlightsDoc {
            flights: flights.iter().map(FlightXml::from_domain).collect(),
        };
        let body = quick_xml::se::to_string(&doc)
            .map_err(|e| PortError::Unexpected(format!("Flight catalog render error: {}", e)))?;
        Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", body))
    }
}

//=========================================================================================
// Unit Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Flights>
    <Flight>
        <FlightID>FL1234</FlightID>
        <Origin>Dallas</Origin>
        <Destination>Austin</Destination>
        <DepartureDate>2024-06-01</DepartureDate>
        <ArrivalDate>2024-06-01</ArrivalDate>
        <DepartureTime>08:00</DepartureTime>
        <ArrivalTime>09:05</ArrivalTime>
        <AvailableSeats>12</AvailableSeats>
        <Price>100</Price>
    </Flight>
    <Flight>
        <FlightID>FL5678</FlightID>
        <Origin>Houston</Origin>
        <Destination>El Paso</Destination>
        <DepartureDate>2024-06-03</DepartureDate>
        <ArrivalDate>2024-06-03</ArrivalDate>
        <DepartureTime>13:30</DepartureTime>
        <ArrivalTime>15:45</ArrivalTime>
        <AvailableSeats>4</AvailableSeats>
        <Price>180.5</Price>
    </Flight>
</Flights>"#;

    #[test]
    fn parses_all_flight_elements() {
        let flights = FileCatalogAdapter::parse_flights(SAMPLE_XML).unwrap();
        assert_eq!(flights.len(), 2);
        assert_eq!(flights[0].flight_id, "FL1234");
        assert_eq!(
            flights[0].departure_date,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
        assert_eq!(flights[1].available_seats, 4);
        assert_eq!(flights[1].price, 180.5);
    }

    #[test]
    fn rejects_malformed_dates() {
        let bad = SAMPLE_XML.replace("2024-06-01", "06/01/2024");
        let err = FileCatalogAdapter::parse_flights(&bad).unwrap_err();
        assert!(err.to_string().contains("FL1234"));
    }

    #[test]
    fn rendered_catalog_parses_back_with_updated_seats() {
        let adapter = FileCatalogAdapter::new(PathBuf::from("unused"), PathBuf::from("unused"));
        let mut flights = FileCatalogAdapter::parse_flights(SAMPLE_XML).unwrap();
        flights[0].available_seats = 9;

        let rendered = adapter.render_flight_catalog(&flights).unwrap();
        assert!(rendered.starts_with("<?xml version=\"1.0\""));

        let reparsed = FileCatalogAdapter::parse_flights(&rendered).unwrap();
        assert_eq!(reparsed[0].available_seats, 9);
        assert_eq!(reparsed[1], flights[1]);
    }

    #[test]
    fn hotel_catalog_uses_source_field_names() {
        let json = r#"[
            {"hotel_id": 1, "hotel_name": "Lone Star Inn", "city": "Austin", "price": 120.0},
            {"hotel_id": 2, "hotel_name": "Gulf Breeze", "city": "Houston", "price": 95.5}
        ]"#;
        let hotels: Vec<HotelRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(hotels[0].hotel_name, "Lone Star Inn");
        assert_eq!(hotels[1].price, 95.5);
    }
}
