use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::Config;
use crate::error::ProviderError;
use crate::generator::prompt::build_prompt;
use crate::generator::{PuzzleProvider, PuzzleRequest};
use crate::session::puzzle::GeneratedPuzzle;

/// Structured-output client for the Gemini `generateContent` endpoint.
pub struct GeminiProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    temperature: f32,
}

impl GeminiProvider {
    pub fn new(api_key: String, config: &Config) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.api_base_url.trim_end_matches('/'),
            config.model
        );
        Ok(Self {
            client,
            endpoint,
            api_key,
            temperature: config.temperature,
        })
    }

    fn request_body(&self, request: &PuzzleRequest) -> Value {
        json!({
            "contents": [{ "parts": [{ "text": build_prompt(request.topic) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
                "temperature": self.temperature,
            },
        })
    }
}

impl PuzzleProvider for GeminiProvider {
    async fn generate(&self, request: &PuzzleRequest) -> Result<GeneratedPuzzle, ProviderError> {
        debug!(endpoint = %self.endpoint, topic = request.topic, "calling puzzle provider");
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        parse_response(&body)
    }
}

/// Schema the model is constrained to. Mirrors `GeneratedPuzzle`.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING", "description": "Title of the mystery or legend." },
            "lunarDate": {
                "type": "STRING",
                "description": "The date in Chinese Lunar format (e.g., Year of the Snake, 4th Month, 12th Day)."
            },
            "story": {
                "type": "STRING",
                "description": "A captivating 300-400 word story about the specific Eastern mystery provided."
            },
            "questions": {
                "type": "ARRAY",
                "description": "Exactly 3 progressive questions based on the story.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING" },
                        "difficulty": { "type": "INTEGER", "description": "1 for Easy, 2 for Medium, 3 for Hard" },
                        "text": { "type": "STRING", "description": "The question text." },
                        "options": {
                            "type": "ARRAY",
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "id": { "type": "STRING", "description": "Unique ID for option (A, B, C, D)" },
                                    "text": { "type": "STRING" }
                                },
                                "required": ["id", "text"]
                            }
                        },
                        "correctOptionId": { "type": "STRING", "description": "The ID of the correct option." }
                    },
                    "required": ["id", "difficulty", "text", "options", "correctOptionId"]
                }
            }
        },
        "required": ["title", "lunarDate", "story", "questions"]
    })
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

/// Pulls the first candidate's text out of the response envelope and parses
/// it as a puzzle payload.
pub fn parse_response(body: &str) -> Result<GeneratedPuzzle, ProviderError> {
    let envelope: GenerateContentResponse = serde_json::from_str(body)?;
    let text = envelope
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
        .filter(|t| !t.trim().is_empty())
        .ok_or(ProviderError::EmptyResponse)?;
    Ok(serde_json::from_str(strip_code_fence(&text))?)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::fallback::fallback_puzzle;
    use chrono::NaiveDate;

    fn payload() -> String {
        let puzzle = fallback_puzzle(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        let mut value = serde_json::to_value(puzzle).unwrap();
        value.as_object_mut().unwrap().remove("id");
        value.to_string()
    }

    fn envelope(text: &str) -> String {
        json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })
        .to_string()
    }

    #[test]
    fn parses_candidate_text() {
        let puzzle = parse_response(&envelope(&payload())).unwrap();
        assert_eq!(puzzle.title, "The Legend of the Nian Monster");
        assert_eq!(puzzle.questions[2].correct_option_id, "C");
    }

    #[test]
    fn tolerates_fenced_json() {
        let fenced = format!("```json\n{}\n```", payload());
        assert!(parse_response(&envelope(&fenced)).is_ok());
    }

    #[test]
    fn empty_candidates_is_empty_response() {
        assert!(matches!(
            parse_response(r#"{"candidates": []}"#),
            Err(ProviderError::EmptyResponse)
        ));
        assert!(matches!(
            parse_response(&envelope("  ")),
            Err(ProviderError::EmptyResponse)
        ));
    }

    #[test]
    fn four_questions_is_malformed() {
        let mut value: Value = serde_json::from_str(&payload()).unwrap();
        let extra = value["questions"][0].clone();
        value["questions"].as_array_mut().unwrap().push(extra);
        assert!(matches!(
            parse_response(&envelope(&value.to_string())),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[test]
    fn request_body_carries_schema_and_topic() {
        let provider = GeminiProvider::new("key".to_string(), &Config::default()).unwrap();
        let request = PuzzleRequest {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            topic: "The Mogao Caves of Dunhuang",
        };
        let body = provider.request_body(&request);
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(
            body["generationConfig"]["responseSchema"]["required"][3],
            "questions"
        );
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.contains("The Mogao Caves of Dunhuang"));
        assert!(provider.endpoint.ends_with("/v1beta/models/gemini-2.5-flash:generateContent"));
    }
}
