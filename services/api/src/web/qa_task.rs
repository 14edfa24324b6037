//! services/api/src/web/qa_task.rs
//!
//! This module contains the asynchronous "worker" function responsible for
//! handling a single question-and-answer cycle.

use crate::web::{
    protocol::ServerMessage,
    speech::SpeechChannel,
    state::{AppState, SessionState},
    tour_task::{send_server_message, WsSender},
};
use concierge_core::ports::{PortError, PortResult};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{oneshot, Mutex};
use tracing::{info, warn};

/// The main asynchronous task for answering a single free-text question.
///
/// The question and answer are appended to the transcript, the answer is
/// spoken, and `AnsweringEnded` is only sent once the utterance finishes
/// (or is superseded by newer speech).
pub async fn qa_process(
    app_state: Arc<AppState>,
    session_state_lock: Arc<Mutex<SessionState>>,
    ws_sender: WsSender,
    speech: Arc<SpeechChannel>,
    question: String,
) -> PortResult<()> {
    let start_time = Instant::now();
    info!("QA process started.");

    let echo = {
        let mut session = session_state_lock.lock().await;
        session.sequencer.record_question(&question)
    };
    let echo_msg = ServerMessage::Message {
        id: echo.id,
        sender: echo.sender,
        content: echo.content,
    };
    if !send_server_message(&ws_sender, &echo_msg).await {
        return Err(PortError::Unexpected(
            "Failed to echo the question to the client.".to_string(),
        ));
    }
    if !send_server_message(&ws_sender, &ServerMessage::AnsweringStarted).await {
        return Err(PortError::Unexpected(
            "Failed to send AnsweringStarted message.".to_string(),
        ));
    }

    let answer_text = app_state.qa_adapter.answer_question(&question).await?;
    info!("Generated answer in {:?}.", start_time.elapsed());

    let answer = {
        let mut session = session_state_lock.lock().await;
        session.sequencer.record_answer(&answer_text)
    };
    let answer_msg = ServerMessage::Message {
        id: answer.id,
        sender: answer.sender,
        content: answer.content.clone(),
    };
    if !send_server_message(&ws_sender, &answer_msg).await {
        return Err(PortError::Unexpected(
            "Failed to send the answer to the client.".to_string(),
        ));
    }

    // Wait for the spoken answer before closing out the cycle. If the
    // utterance is superseded the sender is dropped, which also resolves
    // the await.
    let (done_tx, done_rx) = oneshot::channel::<()>();
    speech
        .speak(
            answer.content,
            Some(Box::new(move || {
                let _ = done_tx.send(());
            })),
        )
        .await;
    let _ = done_rx.await;

    if !send_server_message(&ws_sender, &ServerMessage::AnsweringEnded).await {
        warn!("Failed to send AnsweringEnded message. Client may have disconnected.");
    }

    info!("QA process finished in {:?}.", start_time.elapsed());
    Ok(())
}
