use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::notify::domain::notifier::Notifier;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("notification request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("notification endpoint {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("could not read audio clip {path}: {source}")]
    AudioClip {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no audio endpoint configured")]
    NoAudioEndpoint,
}

/// Posts the greeting as JSON and the optional audio clip as multipart.
pub struct HttpNotifier {
    client: reqwest::blocking::Client,
    text_url: String,
    audio_url: Option<String>,
}

impl HttpNotifier {
    pub fn new(text_url: impl Into<String>, audio_url: Option<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::blocking::Client::new()),
            text_url: text_url.into(),
            audio_url,
        }
    }

    fn read_body(
        response: reqwest::blocking::Response,
        url: &str,
    ) -> Result<String, NotifyError> {
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().map_err(|e| NotifyError::Request {
            url: url.to_string(),
            source: e,
        })
    }
}

/// JSON body for the greeting message.
pub(crate) fn text_payload(text: &str) -> serde_json::Value {
    serde_json::json!({ "text": text })
}

impl Notifier for HttpNotifier {
    fn send_text(&self, text: &str) -> Result<String, Box<dyn std::error::Error>> {
        let response = self
            .client
            .post(&self.text_url)
            .json(&text_payload(text))
            .send()
            .map_err(|e| NotifyError::Request {
                url: self.text_url.clone(),
                source: e,
            })?;
        Ok(Self::read_body(response, &self.text_url)?)
    }

    fn send_audio_clip(&self, clip: &Path) -> Result<String, Box<dyn std::error::Error>> {
        let url = self
            .audio_url
            .as_deref()
            .ok_or(NotifyError::NoAudioEndpoint)?;

        let form = reqwest::blocking::multipart::Form::new()
            .file("audio", clip)
            .map_err(|e| NotifyError::AudioClip {
                path: clip.to_path_buf(),
                source: e,
            })?;

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .map_err(|e| NotifyError::Request {
                url: url.to_string(),
                source: e,
            })?;
        Ok(Self::read_body(response, url)?)
    }
}
