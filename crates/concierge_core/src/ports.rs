//! crates/concierge_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use crate::domain::{
    CartSelection, FlightRecord, FlightSelection, HotelRecord, HotelSelection, Session, TourStep,
};
use async_trait::async_trait;
use uuid::Uuid;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Tour Sessions ---
    async fn create_session(&self) -> PortResult<Session>;

    async fn get_session_by_id(&self, session_id: Uuid) -> PortResult<Session>;

    /// Persists the sequencer's durable state so a reconnecting client
    /// resumes instead of restarting.
    async fn update_tour_state(
        &self,
        session_id: Uuid,
        current_step: TourStep,
        paused: bool,
        declined: bool,
        thanks_shown: bool,
    ) -> PortResult<()>;

    // --- Cart (single-slot, last write wins) ---
    async fn put_outbound_flight(
        &self,
        session_id: Uuid,
        selection: &FlightSelection,
    ) -> PortResult<()>;

    async fn put_return_flight(
        &self,
        session_id: Uuid,
        selection: &FlightSelection,
    ) -> PortResult<()>;

    async fn put_hotel(&self, session_id: Uuid, selection: &HotelSelection) -> PortResult<()>;

    async fn get_cart(&self, session_id: Uuid) -> PortResult<CartSelection>;

    /// Empties every cart slot. Called after a booking is finalized.
    async fn clear_cart(&self, session_id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait TextToSpeechService: Send + Sync {
    /// Generates audio data from a string of text. An empty result means
    /// speech output is unavailable and should be skipped silently.
    async fn generate_audio(&self, text: &str) -> PortResult<Vec<u8>>;
}

#[async_trait]
pub trait QuestionAnsweringService: Send + Sync {
    /// Answers a free-text question, constrained to the fixed resume summary.
    async fn answer_question(&self, question: &str) -> PortResult<String>;
}

#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Loads the read-only flight catalog. Fetched per search.
    async fn load_flights(&self) -> PortResult<Vec<FlightRecord>>;

    /// Loads the read-only hotel catalog. Fetched per search.
    async fn load_hotels(&self) -> PortResult<Vec<HotelRecord>>;

    /// Serializes a (typically seat-decremented) copy of the flight catalog
    /// into the same document format it was loaded from.
    fn render_flight_catalog(&self, flights: &[FlightRecord]) -> PortResult<String>;
}
