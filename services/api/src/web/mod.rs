pub mod protocol;
pub mod qa_task;
pub mod rest;
pub mod speech;
pub mod state;
pub mod tour_task;
pub mod ws_handler;

// Re-export the main WebSocket handler to make it easily accessible
// to the binary that will build the web server router.
pub use rest::{
    create_session_handler, finalize_booking_handler, get_cart_handler, put_hotel_handler,
    put_outbound_handler, put_return_handler, search_flights_handler, search_hotels_handler,
};
pub use ws_handler::ws_handler;
