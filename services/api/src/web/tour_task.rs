//! services/api/src/web/tour_task.rs
//!
//! This module contains the asynchronous "worker" function that drives the
//! presentation phase of the tour: it waits out each step's delay, advances
//! the sequencer, and delivers the result, until it reaches an interactive
//! step or is cancelled.

use crate::web::{
    protocol::ServerMessage,
    speech::SpeechChannel,
    state::{AppState, SessionState},
};
use axum::extract::ws::{Message, WebSocket};
use concierge_core::ports::PortResult;
use concierge_core::tour::StepOutput;
use futures::{stream::SplitSink, SinkExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// The write half of the socket, shared between the handler and the workers.
pub type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// Serializes and sends one server message. Returns `false` if the client
/// is gone.
pub async fn send_server_message(ws_sender: &WsSender, msg: &ServerMessage) -> bool {
    let json = serde_json::to_string(msg).unwrap();
    ws_sender
        .lock()
        .await
        .send(Message::Text(json.into()))
        .await
        .is_ok()
}

/// Renders one step transition to the client: the step marker, its new
/// transcript entries, the replacement quick replies, and the narration
/// audio for the last entry.
pub async fn deliver_step_output(
    ws_sender: &WsSender,
    speech: &Arc<SpeechChannel>,
    output: &StepOutput,
) -> bool {
    let entered = ServerMessage::StepEntered {
        step: output.step,
        scroll_target: output.scroll_target.map(str::to_string),
    };
    if !send_server_message(ws_sender, &entered).await {
        return false;
    }
    for message in &output.messages {
        let msg = ServerMessage::Message {
            id: message.id,
            sender: message.sender,
            content: message.content.clone(),
        };
        if !send_server_message(ws_sender, &msg).await {
            return false;
        }
    }
    let replies = ServerMessage::QuickReplies {
        options: output.quick_replies.clone(),
    };
    if !send_server_message(ws_sender, &replies).await {
        return false;
    }

    if let Some(last) = output.messages.last() {
        speech.speak(last.spoken_text().to_string(), None).await;
    }
    true
}

/// The main asynchronous task for the presentation phase.
///
/// It is designed to be gracefully cancelled via a `CancellationToken`;
/// the chat closing or a quick-reply click tears it down before anything
/// else happens.
pub async fn presentation_loop(
    app_state: Arc<AppState>,
    session_state_lock: Arc<Mutex<SessionState>>,
    ws_sender: WsSender,
    speech: Arc<SpeechChannel>,
    first: (concierge_core::domain::TourStep, Duration),
    token: CancellationToken,
) -> PortResult<()> {
    let (mut next_step, mut delay) = first;
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                info!("Auto-advance cancelled.");
                return Ok(());
            }
            _ = tokio::time::sleep(delay) => {}
        }

        let output = {
            let mut session = session_state_lock.lock().await;
            // The token may have been cancelled while we waited for the lock.
            if token.is_cancelled() {
                return Ok(());
            }
            let output = session.sequencer.enter(next_step);
            session.persist(&app_state.db).await?;
            output
        };

        if !deliver_step_output(&ws_sender, &speech, &output).await {
            info!("Client disconnected mid-presentation.");
            return Ok(());
        }

        match output.auto_advance {
            Some((step, next_delay)) => {
                next_step = step;
                delay = next_delay;
            }
            None => break,
        }
    }

    info!("Presentation phase reached an interactive step.");
    Ok(())
}

/// Spawns the presentation loop on a fresh task, logging failures.
pub fn spawn_presentation(
    app_state: Arc<AppState>,
    session_state_lock: Arc<Mutex<SessionState>>,
    ws_sender: WsSender,
    speech: Arc<SpeechChannel>,
    first: (concierge_core::domain::TourStep, Duration),
    token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) =
            presentation_loop(app_state, session_state_lock, ws_sender, speech, first, token).await
        {
            error!("Presentation loop failed: {:?}", e);
        }
    })
}
