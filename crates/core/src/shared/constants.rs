pub const BLAZEFACE_MODEL_NAME: &str = "blazeface_short_range.onnx";
pub const BLAZEFACE_MODEL_URL: &str =
    "https://github.com/facewatch/facewatch/releases/download/v0.1.0/blazeface_short_range.onnx";

pub const FACEMESH_MODEL_NAME: &str = "facemesh_468.onnx";
pub const FACEMESH_MODEL_URL: &str =
    "https://github.com/facewatch/facewatch/releases/download/v0.1.0/facemesh_468.onnx";

/// Default endpoint for the one-shot greeting message.
pub const GREETING_TEXT_URL: &str = "https://espectroapi.scanmee.io/ws-message";

/// Default endpoint for the optional audio clip upload.
pub const GREETING_AUDIO_URL: &str = "https://espectroapi.scanmee.io/ws-audio";

/// Greeting catalogue keyed by mood. Neutral is the default.
pub const GREETING_MESSAGES: &[(&str, &str)] = &[
    ("happy", "Great to see you happy! Ready to make something cool?"),
    ("sad", "Even cloudy days can end with a great sunset."),
    ("neutral", "Hello! How are you?"),
];

/// Greeting text for a mood key, falling back to the neutral message.
pub fn greeting_for(mood: &str) -> &'static str {
    GREETING_MESSAGES
        .iter()
        .find(|(key, _)| *key == mood)
        .or_else(|| GREETING_MESSAGES.iter().find(|(key, _)| *key == "neutral"))
        .map(|(_, text)| *text)
        .unwrap_or("Hello!")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_for_known_mood() {
        assert!(greeting_for("sad").contains("sunset"));
    }

    #[test]
    fn test_greeting_for_unknown_mood_falls_back_to_neutral() {
        assert_eq!(greeting_for("confused"), greeting_for("neutral"));
    }
}
