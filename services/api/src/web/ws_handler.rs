//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a WebSocket connection.
//! It manages the session's state machine and delegates tasks.

use crate::web::{
    protocol::{ClientMessage, ServerMessage},
    qa_task::qa_process,
    speech::SpeechChannel,
    state::{AppState, SessionState},
    tour_task::{deliver_step_output, send_server_message, spawn_presentation, WsSender},
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use concierge_core::domain::TourAction;
use concierge_core::tour::{ResumeOutput, StepOutput};
use futures::{stream::StreamExt, SinkExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Where the resume download points. Served as a static asset by the
/// portfolio frontend, not by this service.
const RESUME_URL: &str = "/chakradhar_resume.pdf";

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

/// What the connection should do right after initialization (or when the
/// chat panel reopens).
enum Directive {
    Deliver(StepOutput),
    Resume(ResumeOutput),
    Replies(Vec<concierge_core::domain::QuickReply>),
    Nothing,
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("New WebSocket connection established.");

    // The sender is wrapped in an Arc<Mutex<>> to allow for shared mutable access across tasks.
    let (sender, mut receiver) = socket.split();
    let ws_sender: WsSender = Arc::new(Mutex::new(sender));

    // Narration audio flows through one channel so text frames and binary
    // frames never interleave badly, and so speech has a single owner.
    let (audio_tx, mut audio_rx) = mpsc::unbounded_channel::<Vec<u8>>();
    let audio_forwarder = {
        let ws_sender = ws_sender.clone();
        tokio::spawn(async move {
            while let Some(audio) = audio_rx.recv().await {
                if ws_sender
                    .lock()
                    .await
                    .send(Message::Binary(audio.into()))
                    .await
                    .is_err()
                {
                    break;
                }
            }
        })
    };
    let speech = Arc::new(SpeechChannel::new(app_state.tts_adapter.clone(), audio_tx));

    // --- 1. Initialization Phase ---
    let session_state_lock: Arc<Mutex<SessionState>>;
    if let Some(Ok(Message::Text(init_json))) = receiver.next().await {
        match serde_json::from_str::<ClientMessage>(&init_json) {
            Ok(ClientMessage::Init { session_id }) => {
                info!("Initializing session with ID: {}", session_id);
                match SessionState::new(app_state.clone(), session_id).await {
                    Ok(state) => {
                        session_state_lock = Arc::new(Mutex::new(state));
                        let init_msg = ServerMessage::SessionInitialized { session_id };
                        if !send_server_message(&ws_sender, &init_msg).await {
                            error!("Failed to send session initialized message.");
                            audio_forwarder.abort();
                            return;
                        }
                    }
                    Err(e) => {
                        error!("Failed to initialize session state: {:?}", e);
                        let err_msg = ServerMessage::Error {
                            message: "Failed to load session data.".to_string(),
                        };
                        let _ = send_server_message(&ws_sender, &err_msg).await;
                        audio_forwarder.abort();
                        return;
                    }
                }
            }
            _ => {
                error!("First message was not a valid Init message.");
                audio_forwarder.abort();
                return;
            }
        }
    } else {
        error!("Client disconnected before sending Init message.");
        audio_forwarder.abort();
        return;
    }

    // --- 2. Opening Move ---
    // A fresh session greets; a paused one resumes; an ended one is
    // welcomed back; anything else just gets its buttons again.
    let mut tour_task_handle: Option<JoinHandle<()>> = None;
    let directive = {
        let mut session = session_state_lock.lock().await;
        if let Some(output) = session.sequencer.greet() {
            persist(&app_state, &session).await;
            Directive::Deliver(output)
        } else if let Some(resume) = session.sequencer.resume() {
            persist(&app_state, &session).await;
            Directive::Resume(resume)
        } else if let Some(output) = session.sequencer.reopen() {
            Directive::Deliver(output)
        } else {
            Directive::Replies(session.sequencer.quick_replies().to_vec())
        }
    };
    act_on_directive(
        directive,
        &app_state,
        &session_state_lock,
        &ws_sender,
        &speech,
        &mut tour_task_handle,
    )
    .await;

    // --- 3. Main Message Loop ---
    loop {
        if let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    handle_text_message(
                        text.to_string(),
                        &app_state,
                        &session_state_lock,
                        &ws_sender,
                        &speech,
                        &mut tour_task_handle,
                    )
                    .await;
                }
                Message::Close(_) => {
                    info!("Client sent close message.");
                    break;
                }
                _ => {}
            }
        } else {
            info!("Client disconnected.");
            break;
        }
    }

    // --- 4. Cleanup ---
    cancel_pending(&session_state_lock, &speech).await;
    if let Some(handle) = tour_task_handle {
        handle.abort();
    }
    audio_forwarder.abort();
    {
        let session = session_state_lock.lock().await;
        persist(&app_state, &session).await;
    }
    info!("WebSocket connection closed.");
}

/// Helper function to handle the logic for different `ClientMessage` variants.
async fn handle_text_message(
    text: String,
    app_state: &Arc<AppState>,
    session_state_lock: &Arc<Mutex<SessionState>>,
    ws_sender: &WsSender,
    speech: &Arc<SpeechChannel>,
    tour_task_handle: &mut Option<JoinHandle<()>>,
) {
    match serde_json::from_str::<ClientMessage>(&text) {
        Ok(client_msg) => match client_msg {
            ClientMessage::QuickReply { action } => {
                info!("Quick reply received: {:?}", action);
                // Whatever was pending belongs to the step we are leaving.
                cancel_pending(session_state_lock, speech).await;

                let output = {
                    let mut session = session_state_lock.lock().await;
                    let output = session.sequencer.apply(action);
                    persist(app_state, &session).await;
                    output
                };
                deliver_step_output(ws_sender, speech, &output).await;
                if action == TourAction::DownloadResume {
                    let download = ServerMessage::ResumeDownload {
                        url: RESUME_URL.to_string(),
                    };
                    let _ = send_server_message(ws_sender, &download).await;
                }
                if let Some(first) = output.auto_advance {
                    restart_presentation(
                        app_state,
                        session_state_lock,
                        ws_sender,
                        speech,
                        tour_task_handle,
                        first,
                    )
                    .await;
                }
            }
            ClientMessage::Question { text } => {
                info!("Question received.");
                if let Err(e) = qa_process(
                    app_state.clone(),
                    session_state_lock.clone(),
                    ws_sender.clone(),
                    speech.clone(),
                    text,
                )
                .await
                {
                    error!("Error in QA process: {:?}", e);
                    let err_msg = ServerMessage::Error {
                        message: "Sorry, something went wrong answering that.".to_string(),
                    };
                    let _ = send_server_message(ws_sender, &err_msg).await;
                }
            }
            ClientMessage::ChatClosed => {
                info!("Chat panel closed.");
                cancel_pending(session_state_lock, speech).await;
                let paused = {
                    let mut session = session_state_lock.lock().await;
                    let paused = session.sequencer.pause();
                    if paused {
                        persist(app_state, &session).await;
                    }
                    paused
                };
                if paused {
                    let _ = send_server_message(ws_sender, &ServerMessage::TourPaused).await;
                }
            }
            ClientMessage::ChatOpened => {
                info!("Chat panel opened.");
                let directive = {
                    let mut session = session_state_lock.lock().await;
                    if let Some(resume) = session.sequencer.resume() {
                        persist(app_state, &session).await;
                        Directive::Resume(resume)
                    } else if let Some(output) = session.sequencer.reopen() {
                        Directive::Deliver(output)
                    } else {
                        Directive::Nothing
                    }
                };
                act_on_directive(
                    directive,
                    app_state,
                    session_state_lock,
                    ws_sender,
                    speech,
                    tour_task_handle,
                )
                .await;
            }
            ClientMessage::SectionVisible { section } => {
                let thanks = {
                    let mut session = session_state_lock.lock().await;
                    let thanks = session.sequencer.section_visible(&section);
                    if thanks.is_some() {
                        persist(app_state, &session).await;
                    }
                    thanks
                };
                if let Some(message) = thanks {
                    let msg = ServerMessage::Message {
                        id: message.id,
                        sender: message.sender,
                        content: message.content.clone(),
                    };
                    let _ = send_server_message(ws_sender, &msg).await;
                    speech.speak(message.content, None).await;
                }
            }
            ClientMessage::Init { .. } => {
                warn!("Received subsequent Init message, which is ignored.");
            }
        },
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
        }
    }
}

/// Acts on the post-initialization (or panel-reopen) directive.
async fn act_on_directive(
    directive: Directive,
    app_state: &Arc<AppState>,
    session_state_lock: &Arc<Mutex<SessionState>>,
    ws_sender: &WsSender,
    speech: &Arc<SpeechChannel>,
    tour_task_handle: &mut Option<JoinHandle<()>>,
) {
    match directive {
        Directive::Deliver(output) => {
            deliver_step_output(ws_sender, speech, &output).await;
            if let Some(first) = output.auto_advance {
                restart_presentation(
                    app_state,
                    session_state_lock,
                    ws_sender,
                    speech,
                    tour_task_handle,
                    first,
                )
                .await;
            }
        }
        Directive::Resume(resume) => {
            let _ = send_server_message(ws_sender, &ServerMessage::TourResumed).await;
            let replies = ServerMessage::QuickReplies {
                options: resume.quick_replies,
            };
            let _ = send_server_message(ws_sender, &replies).await;
            if let Some(first) = resume.auto_advance {
                restart_presentation(
                    app_state,
                    session_state_lock,
                    ws_sender,
                    speech,
                    tour_task_handle,
                    first,
                )
                .await;
            }
        }
        Directive::Replies(options) => {
            let _ = send_server_message(ws_sender, &ServerMessage::QuickReplies { options }).await;
        }
        Directive::Nothing => {}
    }
}

/// Cancels the pending auto-advance and any in-flight speech.
async fn cancel_pending(session_state_lock: &Arc<Mutex<SessionState>>, speech: &Arc<SpeechChannel>) {
    session_state_lock.lock().await.cancellation_token.cancel();
    speech.cancel().await;
}

/// Re-arms the cancellation token and spawns a fresh presentation loop.
async fn restart_presentation(
    app_state: &Arc<AppState>,
    session_state_lock: &Arc<Mutex<SessionState>>,
    ws_sender: &WsSender,
    speech: &Arc<SpeechChannel>,
    tour_task_handle: &mut Option<JoinHandle<()>>,
    first: (concierge_core::domain::TourStep, Duration),
) {
    let token = {
        let mut session = session_state_lock.lock().await;
        session.cancellation_token = CancellationToken::new();
        session.cancellation_token.clone()
    };
    *tour_task_handle = Some(spawn_presentation(
        app_state.clone(),
        session_state_lock.clone(),
        ws_sender.clone(),
        speech.clone(),
        first,
        token,
    ));
}

/// Persists the sequencer's durable state, logging (not propagating) failures.
async fn persist(app_state: &Arc<AppState>, session: &SessionState) {
    if let Err(e) = session.persist(&app_state.db).await {
        error!("Failed to persist tour state: {:?}", e);
    }
}
