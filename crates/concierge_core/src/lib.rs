pub mod booking;
pub mod domain;
pub mod ports;
pub mod search;
pub mod tour;
pub mod validate;

pub use domain::{
    BookedLeg, BookingConfirmation, CartSelection, ChatMessage, ChatSender, FlightRecord,
    FlightSelection, HotelRecord, HotelSelection, LegKind, Passenger, PassengerCounts, QuickReply,
    Session, TourAction, TourStep,
};
pub use ports::{
    CatalogService, DatabaseService, PortError, PortResult, QuestionAnsweringService,
    TextToSpeechService,
};
