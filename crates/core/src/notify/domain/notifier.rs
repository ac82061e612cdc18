use std::path::PathBuf;

use crate::shared::constants::greeting_for;

/// What to send when the first face of the loop's lifetime is seen.
#[derive(Clone, Debug)]
pub struct Greeting {
    pub text: String,
    /// Optional pre-recorded clip forwarded to the audio endpoint after
    /// the text message.
    pub audio_clip: Option<PathBuf>,
}

impl Greeting {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            audio_clip: None,
        }
    }

    /// Greeting text from the mood catalogue (neutral fallback).
    pub fn for_mood(mood: &str) -> Self {
        Self::new(greeting_for(mood))
    }

    pub fn with_audio_clip(mut self, clip: PathBuf) -> Self {
        self.audio_clip = Some(clip);
        self
    }
}

/// Domain interface for the one-shot outbound side channel.
///
/// Both operations are fire-and-forget from the loop's perspective: the
/// response body is returned only so the caller can log it. Failures are
/// never retried and never affect loop state.
pub trait Notifier: Send {
    fn send_text(&self, text: &str) -> Result<String, Box<dyn std::error::Error>>;

    fn send_audio_clip(
        &self,
        clip: &std::path::Path,
    ) -> Result<String, Box<dyn std::error::Error>>;
}
