//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::NaiveDate;
use concierge_core::booking::{booking_reference, decrement_seats};
use concierge_core::domain::{
    FlightRecord, FlightSelection, HotelSelection, LegKind, PassengerCounts,
};
use concierge_core::ports::PortError;
use concierge_core::search::{
    search_flights, search_hotels, trip_price, FlightQuery, FlightSearch, HotelQuery, MatchKind,
};
use concierge_core::validate::{
    validate_flight_form, validate_hotel_form, FieldError, FlightSearchForm, HotelSearchForm,
    TripType,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        create_session_handler,
        search_flights_handler,
        search_hotels_handler,
        get_cart_handler,
        put_outbound_handler,
        put_return_handler,
        put_hotel_handler,
        finalize_booking_handler,
    ),
    components(schemas(
        CreateSessionResponse,
        TripTypeDto,
        FlightSearchRequest,
        FlightSearchResponse,
        FlightLegOffers,
        FlightOfferDto,
        HotelSearchRequest,
        HotelSearchResponse,
        HotelOfferDto,
        SelectFlightRequest,
        SelectHotelRequest,
        CartResponse,
        FlightSelectionDto,
        HotelSelectionDto,
        PassengerCountsDto,
        PassengerDto,
        FinalizeBookingRequest,
        BookingResponse,
        BookingConfirmationDto,
        BookedLegDto,
        FieldErrorDto,
        ValidationFailure,
    )),
    tags(
        (name = "Travel Concierge API", description = "API endpoints for the travel booking demo.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Failure Type
//=========================================================================================

/// A single field-scoped validation message, as serialized to clients.
#[derive(Serialize, ToSchema)]
pub struct FieldErrorDto {
    field: String,
    message: String,
}

impl From<FieldError> for FieldErrorDto {
    fn from(e: FieldError) -> Self {
        Self {
            field: e.field.to_string(),
            message: e.message,
        }
    }
}

/// The body of a 422 response.
#[derive(Serialize, ToSchema)]
pub struct ValidationFailure {
    errors: Vec<FieldErrorDto>,
}

/// The ways a REST handler can fail.
pub enum ApiFailure {
    Validation(Vec<FieldError>),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl From<PortError> for ApiFailure {
    fn from(e: PortError) -> Self {
        match e {
            PortError::NotFound(msg) => ApiFailure::NotFound(msg),
            PortError::Unexpected(msg) => ApiFailure::Internal(msg),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        match self {
            ApiFailure::Validation(errors) => {
                let body = ValidationFailure {
                    errors: errors.into_iter().map(FieldErrorDto::from).collect(),
                };
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
            ApiFailure::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
            ApiFailure::Conflict(message) => (StatusCode::CONFLICT, message).into_response(),
            ApiFailure::Internal(message) => {
                error!("Internal error in REST handler: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred.".to_string(),
                )
                    .into_response()
            }
        }
    }
}

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The response payload sent after successfully creating a session.
#[derive(Serialize, ToSchema)]
pub struct CreateSessionResponse {
    session_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TripTypeDto {
    OneWay,
    RoundTrip,
}

impl From<TripTypeDto> for TripType {
    fn from(t: TripTypeDto) -> Self {
        match t {
            TripTypeDto::OneWay => TripType::OneWay,
            TripTypeDto::RoundTrip => TripType::RoundTrip,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct FlightSearchRequest {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub trip_type: TripTypeDto,
    pub return_date: Option<NaiveDate>,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PassengerCountsDto {
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

impl From<PassengerCountsDto> for PassengerCounts {
    fn from(p: PassengerCountsDto) -> Self {
        PassengerCounts {
            adults: p.adults,
            children: p.children,
            infants: p.infants,
        }
    }
}

impl From<PassengerCounts> for PassengerCountsDto {
    fn from(p: PassengerCounts) -> Self {
        PassengerCountsDto {
            adults: p.adults,
            children: p.children,
            infants: p.infants,
        }
    }
}

/// One offered flight, priced for the whole party.
#[derive(Serialize, ToSchema)]
pub struct FlightOfferDto {
    pub flight_id: String,
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub arrival_date: NaiveDate,
    pub departure_time: String,
    pub arrival_time: String,
    pub available_seats: u32,
    pub price: f64,
    pub total_price: f64,
}

impl FlightOfferDto {
    fn new(record: &FlightRecord, passengers: &PassengerCounts) -> Self {
        Self {
            flight_id: record.flight_id.clone(),
            origin: record.origin.clone(),
            destination: record.destination.clone(),
            departure_date: record.departure_date,
            arrival_date: record.arrival_date,
            departure_time: record.departure_time.clone(),
            arrival_time: record.arrival_time.clone(),
            available_seats: record.available_seats,
            price: record.price,
            total_price: trip_price(record.price, passengers),
        }
    }
}

/// The offers for one leg. `exact_date` is false when the ±3-day fallback
/// window produced the candidates; `notice` carries the no-availability
/// banner text when even the window came up empty.
#[derive(Serialize, ToSchema)]
pub struct FlightLegOffers {
    pub flights: Vec<FlightOfferDto>,
    pub exact_date: bool,
    pub notice: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct FlightSearchResponse {
    pub outbound: FlightLegOffers,
    pub return_leg: Option<FlightLegOffers>,
}

#[derive(Deserialize, ToSchema)]
pub struct HotelSearchRequest {
    pub city: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
    pub rooms: u32,
}

/// One offered hotel, priced for the whole stay.
#[derive(Serialize, ToSchema)]
pub struct HotelOfferDto {
    pub hotel_id: u32,
    pub hotel_name: String,
    pub city: String,
    pub price: f64,
    pub rooms: u32,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub total_price: f64,
}

#[derive(Serialize, ToSchema)]
pub struct HotelSearchResponse {
    pub hotels: Vec<HotelOfferDto>,
    pub notice: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct SelectFlightRequest {
    pub flight_id: String,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

#[derive(Deserialize, ToSchema)]
pub struct SelectHotelRequest {
    pub hotel_id: u32,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
    pub rooms: u32,
}

#[derive(Serialize, ToSchema)]
pub struct FlightSelectionDto {
    pub flight: FlightOfferDto,
    pub passengers: PassengerCountsDto,
}

impl From<&FlightSelection> for FlightSelectionDto {
    fn from(s: &FlightSelection) -> Self {
        Self {
            flight: FlightOfferDto::new(&s.flight, &s.passengers),
            passengers: s.passengers.into(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct HotelSelectionDto {
    pub hotel_id: u32,
    pub hotel_name: String,
    pub city: String,
    pub price: f64,
    pub passengers: PassengerCountsDto,
    pub rooms: u32,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub total_price: f64,
}

impl From<&HotelSelection> for HotelSelectionDto {
    fn from(s: &HotelSelection) -> Self {
        Self {
            hotel_id: s.hotel.hotel_id,
            hotel_name: s.hotel.hotel_name.clone(),
            city: s.hotel.city.clone(),
            price: s.hotel.price,
            passengers: s.passengers.into(),
            rooms: s.rooms,
            check_in: s.check_in,
            check_out: s.check_out,
            total_price: s.total_price,
        }
    }
}

/// The full current cart, with the grand total across every filled slot.
#[derive(Serialize, ToSchema)]
pub struct CartResponse {
    pub outbound: Option<FlightSelectionDto>,
    pub return_flight: Option<FlightSelectionDto>,
    pub hotel: Option<HotelSelectionDto>,
    pub total_price: f64,
}

#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct PassengerDto {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub ssn: String,
}

#[derive(Deserialize, ToSchema)]
pub struct FinalizeBookingRequest {
    pub passengers: Vec<PassengerDto>,
}

#[derive(Serialize, ToSchema)]
pub struct BookedLegDto {
    pub leg: String,
    pub booking_id: String,
    pub flight: FlightOfferDto,
    pub total_price: f64,
}

#[derive(Serialize, ToSchema)]
pub struct BookingConfirmationDto {
    pub legs: Vec<BookedLegDto>,
    pub hotel: Option<HotelSelectionDto>,
    pub passengers: Vec<PassengerDto>,
    pub total_price: f64,
}

/// The finalization artifact: the confirmation itself, plus a fresh copy of
/// the flight catalog with the booked seats subtracted, for the client to
/// save.
#[derive(Serialize, ToSchema)]
pub struct BookingResponse {
    pub booking: BookingConfirmationDto,
    pub updated_flight_catalog: String,
}

//=========================================================================================
// Pure Helpers
//=========================================================================================

fn leg_offers(search: &FlightSearch, passengers: &PassengerCounts, is_return: bool) -> FlightLegOffers {
    let (offered, kind) = search.offered();
    let notice = match kind {
        MatchKind::NoMatch if is_return => {
            Some("No Return Flights available within 3 days of the selected date!".to_string())
        }
        MatchKind::NoMatch => {
            Some("No Flights available within 3 days of the selected date!".to_string())
        }
        _ => None,
    };
    FlightLegOffers {
        flights: offered
            .iter()
            .map(|record| FlightOfferDto::new(record, passengers))
            .collect(),
        exact_date: kind == MatchKind::ExactDate,
        notice,
    }
}

fn validate_passengers(passengers: &[PassengerDto], expected: u32) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if passengers.len() as u32 != expected {
        errors.push(FieldError {
            field: "passengers",
            message: format!(
                "Expected details for {} passenger(s), got {}.",
                expected,
                passengers.len()
            ),
        });
        return errors;
    }
    for passenger in passengers {
        if passenger.first_name.trim().is_empty() {
            errors.push(FieldError {
                field: "first_name",
                message: "First name is required.".to_string(),
            });
        }
        if passenger.last_name.trim().is_empty() {
            errors.push(FieldError {
                field: "last_name",
                message: "Last name is required.".to_string(),
            });
        }
        let ssn = passenger.ssn.trim();
        if ssn.len() != 9 || !ssn.chars().all(|c| c.is_ascii_digit()) {
            errors.push(FieldError {
                field: "ssn",
                message: "SSN must be exactly 9 digits.".to_string(),
            });
        }
    }
    errors
}

async fn resolve_flight(
    app_state: &Arc<AppState>,
    flight_id: &str,
) -> Result<FlightRecord, ApiFailure> {
    let catalog = app_state.catalog.load_flights().await?;
    catalog
        .into_iter()
        .find(|f| f.flight_id == flight_id)
        .ok_or_else(|| ApiFailure::NotFound(format!("Flight {} not found", flight_id)))
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Create a new tour session.
#[utoipa::path(
    post,
    path = "/sessions",
    responses(
        (status = 201, description = "Session created successfully", body = CreateSessionResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_session_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiFailure> {
    let session = app_state.db.create_session().await?;
    let response = CreateSessionResponse {
        session_id: session.id,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Search the flight catalog.
///
/// Exact-date matches suppress the ±3-day fallback window. For a round trip
/// the return leg is searched with origin and destination swapped.
#[utoipa::path(
    post,
    path = "/flights/search",
    request_body = FlightSearchRequest,
    responses(
        (status = 200, description = "Search results (possibly empty, with a notice)", body = FlightSearchResponse),
        (status = 422, description = "Form validation failed", body = ValidationFailure),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn search_flights_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<FlightSearchRequest>,
) -> Result<Json<FlightSearchResponse>, ApiFailure> {
    let form = FlightSearchForm {
        origin: request.origin.clone(),
        destination: request.destination.clone(),
        departure_date: request.departure_date,
        trip: request.trip_type.into(),
        return_date: request.return_date,
        adults: request.adults,
        children: request.children,
        infants: request.infants,
    };
    validate_flight_form(&form).map_err(ApiFailure::Validation)?;

    let passengers = PassengerCounts {
        adults: request.adults,
        children: request.children,
        infants: request.infants,
    };
    let catalog = app_state.catalog.load_flights().await?;

    let outbound_search = search_flights(
        &catalog,
        &FlightQuery {
            origin: request.origin.clone(),
            destination: request.destination.clone(),
            departure_date: request.departure_date,
            passengers: passengers.total(),
        },
    );
    let outbound = leg_offers(&outbound_search, &passengers, false);

    let return_leg = match (request.trip_type, request.return_date) {
        (TripTypeDto::RoundTrip, Some(return_date)) => {
            let return_search = search_flights(
                &catalog,
                &FlightQuery {
                    origin: request.destination,
                    destination: request.origin,
                    departure_date: return_date,
                    passengers: passengers.total(),
                },
            );
            Some(leg_offers(&return_search, &passengers, true))
        }
        _ => None,
    };

    Ok(Json(FlightSearchResponse {
        outbound,
        return_leg,
    }))
}

/// Search the hotel catalog.
#[utoipa::path(
    post,
    path = "/hotels/search",
    request_body = HotelSearchRequest,
    responses(
        (status = 200, description = "Search results (possibly empty, with a notice)", body = HotelSearchResponse),
        (status = 422, description = "Form validation failed", body = ValidationFailure),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn search_hotels_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<HotelSearchRequest>,
) -> Result<Json<HotelSearchResponse>, ApiFailure> {
    let form = HotelSearchForm {
        city: request.city.clone(),
        check_in: request.check_in,
        check_out: request.check_out,
        adults: request.adults,
        children: request.children,
        infants: request.infants,
        rooms: request.rooms,
    };
    validate_hotel_form(&form).map_err(ApiFailure::Validation)?;

    let catalog = app_state.catalog.load_hotels().await?;
    let offers = search_hotels(
        &catalog,
        &HotelQuery {
            city: request.city,
            check_in: request.check_in,
            check_out: request.check_out,
            passengers: PassengerCounts {
                adults: request.adults,
                children: request.children,
                infants: request.infants,
            },
            rooms: request.rooms,
        },
    );

    let notice = if offers.is_empty() {
        Some("No hotels available in the selected city!".to_string())
    } else {
        None
    };
    let hotels = offers
        .iter()
        .map(|offer| HotelOfferDto {
            hotel_id: offer.hotel.hotel_id,
            hotel_name: offer.hotel.hotel_name.clone(),
            city: offer.hotel.city.clone(),
            price: offer.hotel.price,
            rooms: offer.rooms,
            check_in: offer.check_in,
            check_out: offer.check_out,
            total_price: offer.total_price,
        })
        .collect();

    Ok(Json(HotelSearchResponse { hotels, notice }))
}

/// Get the current cart.
#[utoipa::path(
    get,
    path = "/sessions/{session_id}/cart",
    params(("session_id" = Uuid, Path, description = "The tour session id")),
    responses(
        (status = 200, description = "The current cart", body = CartResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_cart_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<CartResponse>, ApiFailure> {
    let cart = app_state.db.get_cart(session_id).await?;

    let mut total_price = 0.0;
    if let Some(s) = &cart.outbound {
        total_price += trip_price(s.flight.price, &s.passengers);
    }
    if let Some(s) = &cart.return_flight {
        total_price += trip_price(s.flight.price, &s.passengers);
    }
    if let Some(s) = &cart.hotel {
        total_price += s.total_price;
    }

    Ok(Json(CartResponse {
        outbound: cart.outbound.as_ref().map(FlightSelectionDto::from),
        return_flight: cart.return_flight.as_ref().map(FlightSelectionDto::from),
        hotel: cart.hotel.as_ref().map(HotelSelectionDto::from),
        total_price,
    }))
}

/// Put a flight into the outbound cart slot, replacing any previous pick.
#[utoipa::path(
    put,
    path = "/sessions/{session_id}/cart/outbound",
    params(("session_id" = Uuid, Path, description = "The tour session id")),
    request_body = SelectFlightRequest,
    responses(
        (status = 204, description = "Selection stored"),
        (status = 404, description = "Unknown flight id"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn put_outbound_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SelectFlightRequest>,
) -> Result<StatusCode, ApiFailure> {
    let flight = resolve_flight(&app_state, &request.flight_id).await?;
    let selection = FlightSelection {
        flight,
        passengers: PassengerCounts {
            adults: request.adults,
            children: request.children,
            infants: request.infants,
        },
    };
    app_state.db.put_outbound_flight(session_id, &selection).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Put a flight into the return cart slot, replacing any previous pick.
#[utoipa::path(
    put,
    path = "/sessions/{session_id}/cart/return",
    params(("session_id" = Uuid, Path, description = "The tour session id")),
    request_body = SelectFlightRequest,
    responses(
        (status = 204, description = "Selection stored"),
        (status = 404, description = "Unknown flight id"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn put_return_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SelectFlightRequest>,
) -> Result<StatusCode, ApiFailure> {
    let flight = resolve_flight(&app_state, &request.flight_id).await?;
    let selection = FlightSelection {
        flight,
        passengers: PassengerCounts {
            adults: request.adults,
            children: request.children,
            infants: request.infants,
        },
    };
    app_state.db.put_return_flight(session_id, &selection).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Put a hotel stay into the cart, replacing any previous pick.
#[utoipa::path(
    put,
    path = "/sessions/{session_id}/cart/hotel",
    params(("session_id" = Uuid, Path, description = "The tour session id")),
    request_body = SelectHotelRequest,
    responses(
        (status = 204, description = "Selection stored"),
        (status = 404, description = "Unknown hotel id"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn put_hotel_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SelectHotelRequest>,
) -> Result<StatusCode, ApiFailure> {
    let catalog = app_state.catalog.load_hotels().await?;
    let hotel = catalog
        .into_iter()
        .find(|h| h.hotel_id == request.hotel_id)
        .ok_or_else(|| ApiFailure::NotFound(format!("Hotel {} not found", request.hotel_id)))?;

    let nights = concierge_core::search::stay_nights(request.check_in, request.check_out);
    let selection = HotelSelection {
        total_price: request.rooms as f64 * hotel.price * nights as f64,
        hotel,
        passengers: PassengerCounts {
            adults: request.adults,
            children: request.children,
            infants: request.infants,
        },
        rooms: request.rooms,
        check_in: request.check_in,
        check_out: request.check_out,
    };
    app_state.db.put_hotel(session_id, &selection).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Finalize the booking in the cart.
///
/// Each flight leg gets an independent booking reference. The response
/// carries a seat-decremented copy of the flight catalog; nothing on the
/// server is mutated, and the cart is emptied afterwards.
#[utoipa::path(
    post,
    path = "/sessions/{session_id}/bookings",
    params(("session_id" = Uuid, Path, description = "The tour session id")),
    request_body = FinalizeBookingRequest,
    responses(
        (status = 201, description = "Booking finalized", body = BookingResponse),
        (status = 409, description = "The cart has no outbound flight"),
        (status = 422, description = "Passenger details failed validation", body = ValidationFailure),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn finalize_booking_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<FinalizeBookingRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    let cart = app_state.db.get_cart(session_id).await?;
    let outbound = cart
        .outbound
        .as_ref()
        .ok_or_else(|| ApiFailure::Conflict("The cart has no outbound flight.".to_string()))?;

    let party = outbound.passengers;
    let errors = validate_passengers(&request.passengers, party.total());
    if !errors.is_empty() {
        return Err(ApiFailure::Validation(errors));
    }

    let mut catalog = app_state.catalog.load_flights().await?;
    let mut legs = Vec::new();
    let mut total_price = 0.0;

    // `ThreadRng` is not `Send`; keep it inside a block that ends before the
    // next `.await` so the handler future stays `Send`.
    {
        let mut rng = rand::thread_rng();

        let book_leg = |selection: &FlightSelection, kind: LegKind, rng: &mut rand::rngs::ThreadRng, catalog: &mut Vec<FlightRecord>| {
            let group_a: u8 = rng.gen_range(10..=99);
            let group_b: u8 = rng.gen_range(10..=99);
            let booking_id = booking_reference(&selection.flight.flight_id, group_a, group_b);
            let leg_total = trip_price(selection.flight.price, &selection.passengers);
            decrement_seats(catalog, &selection.flight.flight_id, selection.passengers.total());
            BookedLegDto {
                leg: match kind {
                    LegKind::Outbound => "outbound".to_string(),
                    LegKind::Return => "return".to_string(),
                },
                booking_id,
                flight: FlightOfferDto::new(&selection.flight, &selection.passengers),
                total_price: leg_total,
            }
        };

        let leg = book_leg(outbound, LegKind::Outbound, &mut rng, &mut catalog);
        total_price += leg.total_price;
        legs.push(leg);

        if let Some(return_flight) = &cart.return_flight {
            let leg = book_leg(return_flight, LegKind::Return, &mut rng, &mut catalog);
            total_price += leg.total_price;
            legs.push(leg);
        }
    }

    let hotel = cart.hotel.as_ref().map(HotelSelectionDto::from);
    if let Some(h) = &cart.hotel {
        total_price += h.total_price;
    }

    let updated_flight_catalog = app_state.catalog.render_flight_catalog(&catalog)?;
    app_state.db.clear_cart(session_id).await?;

    let response = BookingResponse {
        booking: BookingConfirmationDto {
            legs,
            hotel,
            passengers: request.passengers,
            total_price,
        },
        updated_flight_catalog,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

//=========================================================================================
// Unit Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn passengers() -> PassengerCounts {
        PassengerCounts {
            adults: 2,
            children: 1,
            infants: 0,
        }
    }

    #[test]
    fn empty_search_carries_the_no_availability_notice() {
        let search = FlightSearch::default();
        let offers = leg_offers(&search, &passengers(), false);
        assert!(offers.flights.is_empty());
        assert_eq!(
            offers.notice.as_deref(),
            Some("No Flights available within 3 days of the selected date!")
        );

        let offers = leg_offers(&search, &passengers(), true);
        assert_eq!(
            offers.notice.as_deref(),
            Some("No Return Flights available within 3 days of the selected date!")
        );
    }

    #[test]
    fn offers_are_priced_for_the_party() {
        let record = FlightRecord {
            flight_id: "FL1".to_string(),
            origin: "Dallas".to_string(),
            destination: "Austin".to_string(),
            departure_date: date("2024-06-01"),
            arrival_date: date("2024-06-01"),
            departure_time: "08:00".to_string(),
            arrival_time: "09:00".to_string(),
            available_seats: 5,
            price: 100.0,
        };
        let search = FlightSearch {
            same_day: vec![record],
            diff_day: Vec::new(),
        };
        let offers = leg_offers(&search, &passengers(), false);
        assert!(offers.exact_date);
        assert!(offers.notice.is_none());
        assert_eq!(offers.flights[0].total_price, 270.0);
    }

    #[test]
    fn passenger_count_mismatch_is_the_only_error_reported() {
        let list = vec![PassengerDto {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            date_of_birth: date("1990-01-01"),
            ssn: "123456789".to_string(),
        }];
        let errors = validate_passengers(&list, 3);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "passengers");
    }

    #[test]
    fn passenger_fields_are_each_validated() {
        let list = vec![PassengerDto {
            first_name: " ".to_string(),
            last_name: "".to_string(),
            date_of_birth: date("1990-01-01"),
            ssn: "12-34-567".to_string(),
        }];
        let errors = validate_passengers(&list, 1);
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["first_name", "last_name", "ssn"]);
    }
}
