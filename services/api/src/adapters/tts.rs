//! services/api/src/adapters/tts.rs
//!
//! This module contains the adapters for speech output. The OpenAI adapter
//! implements the `TextToSpeechService` port from the `core` crate; the null
//! adapter stands in when no API key is configured, so the tour still runs
//! with speech silently disabled.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{CreateSpeechRequest, SpeechModel, Voice},
    Client,
};
use async_trait::async_trait;
use concierge_core::ports::{PortError, PortResult, TextToSpeechService};

//=========================================================================================
// The OpenAI Adapter
//=========================================================================================

/// An adapter that implements the `TextToSpeechService` port using the OpenAI TTS API.
#[derive(Clone)]
pub struct OpenAiTtsAdapter {
    client: Client<OpenAIConfig>,
    model: SpeechModel,
    voice: Voice,
}

impl OpenAiTtsAdapter {
    /// Creates a new `OpenAiTtsAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: SpeechModel, voice: Voice) -> Self {
        Self {
            client,
            model,
            voice,
        }
    }
}

#[async_trait]
impl TextToSpeechService for OpenAiTtsAdapter {
    /// Generates a vector of audio data (`Vec<u8>`) from the given text.
    async fn generate_audio(&self, text: &str) -> PortResult<Vec<u8>> {
        let request = CreateSpeechRequest {
            model: self.model.clone(),
            input: text.to_string(),
            voice: self.voice.clone(),
            ..Default::default()
        };

        // Call the API and manually map the error, which respects the orphan rule.
        let response = self
            .client
            .audio()
            .speech(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        Ok(response.bytes.to_vec())
    }
}

//=========================================================================================
// The Null Adapter
//=========================================================================================

/// A no-op speech adapter used when speech output is unavailable. Returns
/// empty audio, which the speech channel skips without blocking the tour.
#[derive(Clone, Default)]
pub struct NullTtsAdapter;

#[async_trait]
impl TextToSpeechService for NullTtsAdapter {
    async fn generate_audio(&self, _text: &str) -> PortResult<Vec<u8>> {
        Ok(Vec::new())
    }
}
