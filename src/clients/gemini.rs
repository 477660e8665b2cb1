//! Gemini generateContent client, shared by the chat proxy and the
//! diagnostic teaser.

use serde::{Deserialize, Serialize};

use super::UpstreamError;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const MODEL: &str = "gemini-1.5-flash";

/// Safety categories relaxed to BLOCK_NONE on every call; moderation
/// happens through the persona prompt, not the API filter.
const SAFETY_CATEGORIES: &[&str] = &[
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
}

/// One conversation turn as the model sees it. Roles are the Gemini
/// wire roles, "user" or "model".
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub role: &'static str,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user",
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: "model",
            text: text.into(),
        }
    }
}

/// Outcome of a generation call. A model-side safety refusal is a
/// normal outcome here, not an error; callers decide what to answer.
#[derive(Debug)]
pub enum GeminiReply {
    Text(String),
    SafetyBlocked,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self { http, api_key }
    }

    /// Submit `turns` (full history, newest last) with an optional
    /// system persona and a fixed sampling temperature.
    pub async fn generate(
        &self,
        system_instruction: Option<&str>,
        turns: &[Turn],
        temperature: f32,
    ) -> Result<GeminiReply, UpstreamError> {
        let request = GenerateContentRequest {
            system_instruction: system_instruction.map(|text| Content {
                role: None,
                parts: vec![Part {
                    text: text.to_string(),
                }],
            }),
            contents: turns
                .iter()
                .map(|t| Content {
                    role: Some(t.role.to_string()),
                    parts: vec![Part {
                        text: t.text.clone(),
                    }],
                })
                .collect(),
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|category| SafetySetting {
                    category: category.to_string(),
                    threshold: "BLOCK_NONE".to_string(),
                })
                .collect(),
            generation_config: GenerationConfig { temperature },
        };

        let url = format!("{}/{}:generateContent", BASE_URL, MODEL);
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status {
                status: response.status(),
            });
        }

        let body: GenerateContentResponse = response.json().await?;
        Ok(interpret_response(body))
    }
}

fn interpret_response(body: GenerateContentResponse) -> GeminiReply {
    if let Some(feedback) = &body.prompt_feedback {
        if feedback.block_reason.is_some() {
            return GeminiReply::SafetyBlocked;
        }
    }

    let Some(candidate) = body.candidates.into_iter().next() else {
        return GeminiReply::SafetyBlocked;
    };

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return GeminiReply::SafetyBlocked;
    }

    let text: String = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        GeminiReply::SafetyBlocked
    } else {
        GeminiReply::Text(text)
    }
}

// Wire types, request side.

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(rename = "safetySettings")]
    safety_settings: Vec<SafetySetting>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: String,
    threshold: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

// Wire types, response side.

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_text_reply_joined_from_parts() {
        let body = parse(
            r#"{"candidates":[{"content":{"role":"model",
                "parts":[{"text":"Olá"},{"text":", tudo bem?"}]},
                "finishReason":"STOP"}]}"#,
        );
        match interpret_response(body) {
            GeminiReply::Text(t) => assert_eq!(t, "Olá, tudo bem?"),
            GeminiReply::SafetyBlocked => panic!("expected text"),
        }
    }

    #[test]
    fn test_safety_finish_reason_is_blocked() {
        let body = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":"x"}]},
                "finishReason":"SAFETY"}]}"#,
        );
        assert!(matches!(
            interpret_response(body),
            GeminiReply::SafetyBlocked
        ));
    }

    #[test]
    fn test_prompt_block_reason_is_blocked() {
        let body = parse(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#);
        assert!(matches!(
            interpret_response(body),
            GeminiReply::SafetyBlocked
        ));
    }

    #[test]
    fn test_empty_candidates_is_blocked() {
        let body = parse("{}");
        assert!(matches!(
            interpret_response(body),
            GeminiReply::SafetyBlocked
        ));
    }

    #[test]
    fn test_request_serializes_gemini_field_names() {
        let request = GenerateContentRequest {
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part {
                    text: "persona".into(),
                }],
            }),
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part { text: "oi".into() }],
            }],
            safety_settings: vec![SafetySetting {
                category: "HARM_CATEGORY_HARASSMENT".into(),
                threshold: "BLOCK_NONE".into(),
            }],
            generation_config: GenerationConfig {
                temperature: DEFAULT_TEMPERATURE,
            },
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("systemInstruction"));
        assert!(json.contains("safetySettings"));
        assert!(json.contains("generationConfig"));
        assert!(json.contains("BLOCK_NONE"));
    }
}
