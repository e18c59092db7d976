//! Wire shapes of the TTS endpoints.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use readaloud_core::{Caption, Narration, NarrationAudio};
use serde::{Deserialize, Serialize};

use crate::error::{RemoteError, RemoteResult};

/// MIME type assumed when the endpoint does not say.
pub const DEFAULT_CONTENT_TYPE: &str = "audio/mpeg";

/// Narration request body.
#[derive(Debug, Serialize)]
pub struct NarrationRequest<'a> {
    pub text: &'a str,
    pub voice: &'a str,
}

/// Narration response body.
///
/// Extra fields (the server also echoes a `sentences` split) are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrationResponse {
    /// Base64-encoded audio.
    pub audio: String,
    #[serde(default)]
    pub subtitles: Option<Vec<Caption>>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl NarrationResponse {
    /// Decode the audio and assemble a [`Narration`].
    ///
    /// Missing captions are not an error: playback works without them.
    pub fn into_narration(self) -> RemoteResult<Narration> {
        if self.audio.is_empty() {
            return Err(RemoteError::InvalidResponse {
                message: "response carries no audio".to_string(),
            });
        }
        let bytes = STANDARD.decode(self.audio.trim())?;
        let captions = self.subtitles.unwrap_or_default();
        if captions.is_empty() {
            tracing::warn!("Narration arrived without captions; highlighting disabled");
        }
        let duration = self.duration.filter(|d| d.is_finite() && *d > 0.0);
        Ok(Narration::new(
            NarrationAudio {
                bytes,
                content_type: self
                    .content_type
                    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            },
            captions,
            duration,
        ))
    }
}

/// Pronunciation clip request body.
#[derive(Debug, Serialize)]
pub struct ClipRequest<'a> {
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
}

/// Error body every endpoint uses for non-success responses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_decodes_audio_and_captions() {
        let body = r#"{
            "audio": "SUQz",
            "subtitles": [{"start": 0.0, "end": 1.5, "text": "안녕하세요"}],
            "sentences": ["안녕하세요"],
            "duration": 1.5
        }"#;
        let response: NarrationResponse = serde_json::from_str(body).unwrap();
        let narration = response.into_narration().unwrap();
        assert_eq!(narration.audio.bytes, b"ID3");
        assert_eq!(narration.audio.content_type, "audio/mpeg");
        assert_eq!(narration.captions.len(), 1);
        assert_eq!(narration.duration_hint, Some(1.5));
    }

    #[test]
    fn test_missing_subtitles_is_empty_caption_list() {
        let response: NarrationResponse = serde_json::from_str(r#"{"audio": "SUQz"}"#).unwrap();
        let narration = response.into_narration().unwrap();
        assert!(narration.captions.is_empty());
        assert!(narration.duration_hint.is_none());
    }

    #[test]
    fn test_zero_duration_falls_back_to_captions() {
        let body = r#"{"audio":"SUQz","subtitles":[{"start":0,"end":2.5,"text":"문장"}],"duration":0}"#;
        let response: NarrationResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.into_narration().unwrap().duration_hint, Some(2.5));
    }

    #[test]
    fn test_empty_audio_is_invalid() {
        let response: NarrationResponse = serde_json::from_str(r#"{"audio": ""}"#).unwrap();
        assert!(matches!(
            response.into_narration(),
            Err(RemoteError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_bad_base64_is_rejected() {
        let response: NarrationResponse = serde_json::from_str(r#"{"audio": "%%%"}"#).unwrap();
        assert!(matches!(response.into_narration(), Err(RemoteError::Base64(_))));
    }

    #[test]
    fn test_clip_request_omits_missing_speed() {
        let json = serde_json::to_string(&ClipRequest {
            text: "사랑",
            speed: None,
        })
        .unwrap();
        assert_eq!(json, r#"{"text":"사랑"}"#);
    }
}
