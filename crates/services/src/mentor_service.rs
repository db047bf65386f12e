use std::env;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::MentorError;

/// Shown when the model answers with no text.
pub const NO_ANSWER_REPLY: &str =
    "I'm sorry, I couldn't find an answer to that right now. Please ask your AY leader!";
/// Shown when the request fails for any reason, including a missing API key.
pub const RESTING_REPLY: &str = "The AI mentor is currently resting. Please try again later.";
/// First bot line of every conversation.
pub const GREETING: &str = "Hello! I'm your Adventist Heritage Mentor. Feel free to ask me anything about church history, our pioneers, or doctrines.";

const SYSTEM_INSTRUCTION: &str = "You are a friendly, knowledgeable Seventh-day Adventist heritage mentor. Use simple language suitable for youth, cite historical facts accurately (Millerite movement, pioneers, church organization), and always maintain a respectful, faith-filled tone.";
const TEMPERATURE: f32 = 0.7;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

#[derive(Clone, Debug)]
pub struct MentorConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl MentorConfig {
    /// Reads `AY_MENTOR_API_KEY`, `AY_MENTOR_BASE_URL` and `AY_MENTOR_MODEL`.
    /// A missing or blank key disables the mentor.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("AY_MENTOR_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("AY_MENTOR_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let model = env::var("AY_MENTOR_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

/// Heritage Q&A backed by a hosted text-generation model.
#[derive(Clone)]
pub struct MentorService {
    client: Client,
    config: Option<MentorConfig>,
}

impl MentorService {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(MentorConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<MentorConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Ask a question and always get something displayable back.
    ///
    /// Returns `None` for blank input, which is not sent.
    pub async fn ask(&self, question: &str) -> Option<String> {
        match self.try_ask(question).await {
            Ok(answer) => Some(answer),
            Err(MentorError::EmptyQuestion) => None,
            Err(MentorError::EmptyResponse) => Some(NO_ANSWER_REPLY.to_owned()),
            Err(err) => {
                tracing::warn!(error = %err, "mentor request failed");
                Some(RESTING_REPLY.to_owned())
            }
        }
    }

    /// One request per call, no retry.
    ///
    /// # Errors
    ///
    /// Returns `MentorError` when the question is blank, the mentor is
    /// disabled, the request fails, or the answer has no text.
    pub async fn try_ask(&self, question: &str) -> Result<String, MentorError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(MentorError::EmptyQuestion);
        }
        let config = self.config.as_ref().ok_or(MentorError::Disabled)?;

        tracing::debug!(model = %config.model, "asking mentor");
        let response = self
            .client
            .post(config.endpoint())
            .header("x-goog-api-key", &config.api_key)
            .json(&GenerateRequest::for_question(question))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MentorError::HttpStatus(response.status()));
        }

        let body: GenerateResponse = response.json().await?;
        body.into_text().ok_or(MentorError::EmptyResponse)
    }
}

fn user_prompt(question: &str) -> String {
    format!(
        "You are an expert Adventist Church Historian. Provide an accurate, encouraging, and brief answer for a youth member. Question: {question}"
    )
}

/// Who said a line in a `Conversation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    Member,
    Mentor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub speaker: Speaker,
    pub text: String,
}

/// In-memory chat transcript, opened with the mentor's greeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    lines: Vec<ChatLine>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self {
            lines: vec![ChatLine {
                speaker: Speaker::Mentor,
                text: GREETING.to_owned(),
            }],
        }
    }
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> &[ChatLine] {
        &self.lines
    }

    /// Append the question and the mentor's reply. Blank input is ignored.
    ///
    /// Returns the reply that was appended.
    pub async fn ask(&mut self, mentor: &MentorService, question: &str) -> Option<&str> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }
        self.lines.push(ChatLine {
            speaker: Speaker::Member,
            text: question.to_owned(),
        });
        let answer = mentor.ask(question).await?;
        self.lines.push(ChatLine {
            speaker: Speaker::Mentor,
            text: answer,
        });
        self.lines.last().map(|line| line.text.as_str())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

impl GenerateRequest {
    fn for_question(question: &str) -> Self {
        Self {
            system_instruction: Content::text(None, SYSTEM_INSTRUCTION.to_owned()),
            contents: vec![Content::text(Some("user"), user_prompt(question))],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: String) -> Self {
        Self {
            role: role.map(str::to_owned),
            parts: vec![Part { text: Some(text) }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate, if any are non-blank.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_fixed_prompts() {
        let json = serde_json::to_value(GenerateRequest::for_question("Who was Joseph Bates?"))
            .unwrap();
        assert_eq!(
            json["systemInstruction"]["parts"][0]["text"],
            SYSTEM_INSTRUCTION
        );
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"][0]["role"], "user");
        let prompt = json["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.starts_with("You are an expert Adventist Church Historian."));
        assert!(prompt.ends_with("Question: Who was Joseph Bates?"));
        let temp = json["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temp - 0.7).abs() < 1e-6);
    }

    #[test]
    fn endpoint_joins_base_and_model() {
        let config = MentorConfig {
            base_url: "https://example.test/v1beta/".into(),
            api_key: "k".into(),
            model: "m".into(),
        };
        assert_eq!(config.endpoint(), "https://example.test/v1beta/models/m:generateContent");
    }

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let body: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"The church "},{"text":"organized in 1863."}]}},{"content":{"parts":[{"text":"ignored"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(body.into_text().as_deref(), Some("The church organized in 1863."));
    }

    #[test]
    fn blank_or_missing_text_is_empty() {
        let none: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(none.into_text().is_none());
        let blank: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#)
                .unwrap();
        assert!(blank.into_text().is_none());
        let no_content: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(no_content.into_text().is_none());
    }

    #[tokio::test]
    async fn disabled_mentor_is_resting() {
        let mentor = MentorService::new(None);
        assert!(!mentor.enabled());
        assert_eq!(mentor.ask("Who was William Miller?").await.as_deref(), Some(RESTING_REPLY));
        assert!(mentor.ask("   ").await.is_none());
        assert!(matches!(
            mentor.try_ask("Who?").await.unwrap_err(),
            MentorError::Disabled
        ));
    }

    #[tokio::test]
    async fn conversation_records_both_sides() {
        let mentor = MentorService::new(None);
        let mut chat = Conversation::new();
        assert_eq!(chat.lines()[0].text, GREETING);

        assert!(chat.ask(&mentor, "  ").await.is_none());
        assert_eq!(chat.lines().len(), 1);

        let reply = chat.ask(&mentor, "What happened in 1844?").await.map(str::to_owned);
        assert_eq!(reply.as_deref(), Some(RESTING_REPLY));
        let speakers: Vec<Speaker> = chat.lines().iter().map(|l| l.speaker).collect();
        assert_eq!(speakers, vec![Speaker::Mentor, Speaker::Member, Speaker::Mentor]);
    }
}
