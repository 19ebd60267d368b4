//! Client for the Gemini generateContent API.
//!
//! Sends the scheduling brief together with a structured-output response
//! schema and decodes the returned JSON timetable. Shape validation happens
//! here so the editor is never reachable with a malformed timetable.

use serde::Deserialize;
use serde_json::Value;

use crate::params::ScheduleParameters;
use crate::timetable::Timetable;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Why a generation request produced no timetable.
///
/// Transport and provider failures are one user-visible kind; content
/// failures (the response exists but is not a valid timetable) are another.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Request to the generation service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Generation service returned status {status}: {body}")]
    Provider { status: u16, body: String },
    #[error("Generated timetable did not match the requested shape: {0}")]
    Content(String),
}

impl GenerationError {
    pub fn is_content(&self) -> bool {
        matches!(self, GenerationError::Content(_))
    }
}

/// Gemini client for timetable generation
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: String,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }

    /// Reads the client configuration from the environment.
    ///
    /// A missing GEMINI_API_KEY is a fatal configuration error; callers abort
    /// startup rather than limping along without a usable collaborator.
    pub fn from_env() -> Result<Self, String> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| "GEMINI_API_KEY environment variable is not set".to_string())?;
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let base_url =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Ok(Self::new(&base_url, api_key, model))
    }

    /// Requests a timetable for the given brief and response schema.
    ///
    /// Returns a fully parsed timetable or a single terminal error; there are
    /// no retries and nothing is cached.
    pub async fn generate_timetable(
        &self,
        brief: &str,
        schema: &Value,
        params: &ScheduleParameters,
    ) -> Result<Timetable, GenerationError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": brief }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
            }
        });

        log::info!(
            "Requesting timetable from {} ({} rooms, {} days)",
            self.model,
            params.room_count,
            params.active_days().len()
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Provider { status, body });
        }

        let decoded: GenerateContentResponse = response.json().await?;
        let text = decoded
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| GenerationError::Content("no candidates in response".to_string()))?;

        decode_timetable(text, params)
    }
}

/// Decodes and shape-validates the JSON text returned by the model
pub fn decode_timetable(
    text: &str,
    params: &ScheduleParameters,
) -> Result<Timetable, GenerationError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| GenerationError::Content(format!("response is not valid JSON: {}", e)))?;
    validate_response_shape(&value, params.room_count as usize)?;
    Timetable::from_response(&value).map_err(GenerationError::Content)
}

/// Rejects any response whose top-level key count does not equal the
/// declared room count
pub fn validate_response_shape(
    value: &Value,
    expected_rooms: usize,
) -> Result<(), GenerationError> {
    let rooms = value
        .as_object()
        .ok_or_else(|| GenerationError::Content("response is not an object".to_string()))?;
    if rooms.len() != expected_rooms {
        return Err(GenerationError::Content(format!(
            "expected {} rooms, got {}",
            expected_rooms,
            rooms.len()
        )));
    }
    Ok(())
}
