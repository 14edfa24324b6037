//! services/api/src/web/speech.rs
//!
//! A single-owner channel for narration audio. Every spoken line goes
//! through one `SpeechChannel`, which enforces two invariants: a new call
//! always cancels the previous utterance (last call wins), and the
//! completion callback of any one call fires at most once, never after the
//! call has been superseded.

use concierge_core::ports::TextToSpeechService;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Invoked exactly once when an utterance finishes (or fails); dropped
/// without being invoked when the utterance is superseded.
pub type OnDone = Box<dyn FnOnce() + Send>;

pub struct SpeechChannel {
    tts: Arc<dyn TextToSpeechService>,
    audio_tx: mpsc::UnboundedSender<Vec<u8>>,
    current: Mutex<Option<CancellationToken>>,
}

impl SpeechChannel {
    /// Creates a channel that forwards finished audio to `audio_tx`.
    pub fn new(tts: Arc<dyn TextToSpeechService>, audio_tx: mpsc::UnboundedSender<Vec<u8>>) -> Self {
        Self {
            tts,
            audio_tx,
            current: Mutex::new(None),
        }
    }

    /// Cancels the in-flight utterance, if any. Its `on_done` will never fire.
    pub async fn cancel(&self) {
        if let Some(token) = self.current.lock().await.take() {
            token.cancel();
        }
    }

    /// Starts speaking `text`, cancelling whatever was speaking before.
    ///
    /// Empty audio from the adapter means speech is unavailable; the audio
    /// frame is skipped but `on_done` still fires so the tour keeps moving.
    /// Synthesis errors are logged and treated the same way.
    pub async fn speak(&self, text: String, on_done: Option<OnDone>) {
        let token = CancellationToken::new();
        {
            let mut current = self.current.lock().await;
            if let Some(previous) = current.take() {
                previous.cancel();
            }
            *current = Some(token.clone());
        }

        let tts = self.tts.clone();
        let audio_tx = self.audio_tx.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => return,
                result = tts.generate_audio(&text) => result,
            };

            match result {
                Ok(audio) => {
                    if !audio.is_empty() && !token.is_cancelled() {
                        let _ = audio_tx.send(audio);
                    }
                }
                Err(e) => {
                    warn!("Speech synthesis failed, continuing without audio: {}", e);
                }
            }

            if !token.is_cancelled() {
                if let Some(on_done) = on_done {
                    on_done();
                }
            }
        });
    }
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use concierge_core::ports::PortResult;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// A fake adapter that takes a fixed amount of (virtual) time per call.
    struct SlowTts {
        delay: Duration,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextToSpeechService for SlowTts {
        async fn generate_audio(&self, text: &str) -> PortResult<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(text.as_bytes().to_vec())
        }
    }

    struct EmptyTts;

    #[async_trait]
    impl TextToSpeechService for EmptyTts {
        async fn generate_audio(&self, _text: &str) -> PortResult<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    fn channel_with(
        tts: Arc<dyn TextToSpeechService>,
    ) -> (Arc<SpeechChannel>, mpsc::UnboundedReceiver<Vec<u8>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(SpeechChannel::new(tts, tx)), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn a_new_call_supersedes_the_previous_one() {
        let tts = Arc::new(SlowTts {
            delay: Duration::from_millis(100),
            calls: AtomicUsize::new(0),
        });
        let (channel, mut rx) = channel_with(tts);

        let first_done = Arc::new(AtomicUsize::new(0));
        let second_done = Arc::new(AtomicUsize::new(0));

        let counter = first_done.clone();
        channel
            .speak(
                "first".to_string(),
                Some(Box::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                })),
            )
            .await;

        let counter = second_done.clone();
        channel
            .speak(
                "second".to_string(),
                Some(Box::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                })),
            )
            .await;

        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(first_done.load(Ordering::SeqCst), 0, "superseded call must not complete");
        assert_eq!(second_done.load(Ordering::SeqCst), 1);
        assert_eq!(rx.recv().await.unwrap(), b"second".to_vec());
        assert!(rx.try_recv().is_err(), "only the winning utterance sends audio");
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_the_pending_callback() {
        let tts = Arc::new(SlowTts {
            delay: Duration::from_millis(100),
            calls: AtomicUsize::new(0),
        });
        let (channel, mut rx) = channel_with(tts);

        let done = Arc::new(AtomicUsize::new(0));
        let counter = done.clone();
        channel
            .speak(
                "doomed".to_string(),
                Some(Box::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                })),
            )
            .await;
        channel.cancel().await;

        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(done.load(Ordering::SeqCst), 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_audio_is_skipped_but_still_completes() {
        let (channel, mut rx) = channel_with(Arc::new(EmptyTts));

        let done = Arc::new(AtomicUsize::new(0));
        let counter = done.clone();
        channel
            .speak(
                "silent".to_string(),
                Some(Box::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                })),
            )
            .await;

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(done.load(Ordering::SeqCst), 1, "tour must keep moving without audio");
        assert!(rx.try_recv().is_err(), "no empty frames are forwarded");
    }
}
