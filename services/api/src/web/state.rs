//! services/api/src/web/state.rs
//!
//! Defines the application's shared and session-specific states.

use crate::config::Config;
use concierge_core::ports::{
    CatalogService, DatabaseService, PortResult, QuestionAnsweringService, TextToSpeechService,
};
use concierge_core::tour::TourSequencer;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub tts_adapter: Arc<dyn TextToSpeechService>,
    pub qa_adapter: Arc<dyn QuestionAnsweringService>,
    pub catalog: Arc<dyn CatalogService>,
}

//=========================================================================================
// SessionState (Specific to One WebSocket Connection)
//=========================================================================================

/// The state for a single, active WebSocket connection. The sequencer is the
/// sole owner of conversation state; this struct adds the plumbing that only
/// matters while a socket is open.
pub struct SessionState {
    pub session_id: Uuid,
    pub sequencer: TourSequencer,
    /// Cancels the pending auto-advance task, if one is running.
    pub cancellation_token: CancellationToken,
}

impl SessionState {
    /// Creates a new `SessionState` by fetching the persisted session from
    /// the database and rebuilding the sequencer from it.
    pub async fn new(app_state: Arc<AppState>, session_id: Uuid) -> PortResult<Self> {
        let session = app_state.db.get_session_by_id(session_id).await?;
        Ok(Self {
            session_id,
            sequencer: TourSequencer::restore(&session),
            cancellation_token: CancellationToken::new(),
        })
    }

    /// Writes the sequencer's durable state back to the database.
    pub async fn persist(&self, db: &Arc<dyn DatabaseService>) -> PortResult<()> {
        db.update_tour_state(
            self.session_id,
            self.sequencer.current_step(),
            self.sequencer.is_paused(),
            self.sequencer.declined(),
            self.sequencer.thanks_shown(),
        )
        .await
    }
}
