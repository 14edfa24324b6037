//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the
//! API server for the guided portfolio tour.

use concierge_core::domain::{ChatSender, QuickReply, TourAction, TourStep};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Initializes a session. This must be the first message sent on the connection.
    Init { session_id: Uuid },

    /// The user clicked one of the offered quick-reply buttons.
    QuickReply { action: TourAction },

    /// A free-text question typed into the chat.
    Question { text: String },

    /// The chat panel was closed. An auto-advancing tour pauses.
    ChatClosed,

    /// The chat panel was reopened. A paused tour resumes.
    ChatOpened,

    /// A page section scrolled into the viewport.
    SectionVisible { section: String },
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================
// NOTE: Narration audio is sent as raw Binary frames, not as part of this
// enum. These messages provide context for that audio.
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirms successful session initialization.
    SessionInitialized { session_id: Uuid },

    /// Reports a fatal error to the client, which should display an error message.
    Error { message: String },

    /// The tour moved to a new step. `scroll_target` names the page section
    /// the client should scroll into view, if any.
    StepEntered {
        step: TourStep,
        scroll_target: Option<String>,
    },

    /// One chat transcript entry to render.
    Message {
        id: u64,
        sender: ChatSender,
        content: String,
    },

    /// The full replacement set of quick-reply buttons. An empty list clears
    /// the buttons.
    QuickReplies { options: Vec<QuickReply> },

    /// The tour was paused because the chat panel closed mid-presentation.
    TourPaused,

    /// A paused tour picked up where it left off.
    TourResumed,

    /// The server is generating an answer to a free-text question.
    AnsweringStarted,

    /// The answer has been delivered (and spoken, when speech is available).
    AnsweringEnded,

    /// The client should start downloading the resume from this URL.
    ResumeDownload { url: String },
}
