//! crates/concierge_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or transport format.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Tour / chat types
//=========================================================================================

/// One discrete stage of the scripted portfolio walkthrough.
///
/// Exactly one step is current at a time. Pausing and the one-shot
/// "thanks for browsing" message are sequencer state, not steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TourStep {
    Greeting,
    SummaryIntro,
    SkillsIntro,
    ExperienceIntro,
    ProjectsListIntro,
    ProjectsDetail,
    EducationIntro,
    CertificationsIntro,
    PublicationIntro,
    AdditionalInfoIntro,
    EndTourPrompt,
    Ended,
}

impl TourStep {
    /// The stable name used when persisting the current step.
    pub fn as_str(self) -> &'static str {
        match self {
            TourStep::Greeting => "greeting",
            TourStep::SummaryIntro => "summary_intro",
            TourStep::SkillsIntro => "skills_intro",
            TourStep::ExperienceIntro => "experience_intro",
            TourStep::ProjectsListIntro => "projects_list_intro",
            TourStep::ProjectsDetail => "projects_detail",
            TourStep::EducationIntro => "education_intro",
            TourStep::CertificationsIntro => "certifications_intro",
            TourStep::PublicationIntro => "publication_intro",
            TourStep::AdditionalInfoIntro => "additional_info_intro",
            TourStep::EndTourPrompt => "end_tour_prompt",
            TourStep::Ended => "ended",
        }
    }

    pub fn from_str(name: &str) -> Option<TourStep> {
        Some(match name {
            "greeting" => TourStep::Greeting,
            "summary_intro" => TourStep::SummaryIntro,
            "skills_intro" => TourStep::SkillsIntro,
            "experience_intro" => TourStep::ExperienceIntro,
            "projects_list_intro" => TourStep::ProjectsListIntro,
            "projects_detail" => TourStep::ProjectsDetail,
            "education_intro" => TourStep::EducationIntro,
            "certifications_intro" => TourStep::CertificationsIntro,
            "publication_intro" => TourStep::PublicationIntro,
            "additional_info_intro" => TourStep::AdditionalInfoIntro,
            "end_tour_prompt" => TourStep::EndTourPrompt,
            "ended" => TourStep::Ended,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatSender {
    User,
    Assistant,
}

/// One entry of the append-only chat transcript.
///
/// `id` is unique and monotonic within a session. `speakable` overrides
/// the text sent to speech synthesis when the rendered content is not
/// suitable for reading aloud (e.g. a bulleted project list).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub sender: ChatSender,
    pub content: String,
    pub speakable: Option<String>,
}

impl ChatMessage {
    /// The text that should be spoken for this message.
    pub fn spoken_text(&self) -> &str {
        self.speakable.as_deref().unwrap_or(&self.content)
    }
}

/// A fixed action a quick-reply button maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TourAction {
    StartTour,
    DeclineTour,
    GoTo { step: TourStep },
    ShowProject { index: usize },
    AskQuestion,
    DownloadResume,
    EndChat,
}

/// A button offered in lieu of free-text input. The set is fully replaced
/// on every step transition, never merged with prior options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickReply {
    pub label: String,
    pub action: TourAction,
}

/// A tour session as persisted between connections.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub current_step: TourStep,
    pub paused: bool,
    pub declined: bool,
    pub thanks_shown: bool,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
}

//=========================================================================================
// Travel reference data
//=========================================================================================

/// One row of the read-only flight catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub flight_id: String,
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub arrival_date: NaiveDate,
    pub departure_time: String,
    pub arrival_time: String,
    pub available_seats: u32,
    pub price: f64,
}

/// One row of the read-only hotel catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelRecord {
    pub hotel_id: u32,
    pub hotel_name: String,
    pub city: String,
    pub price: f64,
}

//=========================================================================================
// Cart and booking
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerCounts {
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

impl PassengerCounts {
    pub fn total(&self) -> u32 {
        self.adults + self.children + self.infants
    }
}

/// A flight leg stashed in the cart, together with the party it was
/// selected for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightSelection {
    pub flight: FlightRecord,
    pub passengers: PassengerCounts,
}

/// A hotel stay stashed in the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelSelection {
    pub hotel: HotelRecord,
    pub passengers: PassengerCounts,
    pub rooms: u32,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub total_price: f64,
}

/// The single-slot holding area for the current selections. Each slot is
/// overwritten, not merged, on every new search-and-select cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartSelection {
    pub outbound: Option<FlightSelection>,
    pub return_flight: Option<FlightSelection>,
    pub hotel: Option<HotelSelection>,
}

impl CartSelection {
    pub fn is_empty(&self) -> bool {
        self.outbound.is_none() && self.return_flight.is_none() && self.hotel.is_none()
    }
}

/// Per-passenger identity fields collected at finalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passenger {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub ssn: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegKind {
    Outbound,
    Return,
}

/// One finalized flight leg with its independently generated reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookedLeg {
    pub leg: LegKind,
    pub booking_id: String,
    pub selection: FlightSelection,
    pub total_price: f64,
}

/// The client-side booking artifact. Nothing is written back anywhere;
/// this is the whole outcome of "booking".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub legs: Vec<BookedLeg>,
    pub hotel: Option<HotelSelection>,
    pub passengers: Vec<Passenger>,
    pub total_price: f64,
}
