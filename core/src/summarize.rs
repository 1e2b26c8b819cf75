use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

pub const UNAVAILABLE: &str = "AI summarization not available";
pub const NOTHING_TO_SUMMARIZE: &str = "No commits to summarize";
pub const SUMMARY_FAILED: &str = "Error generating summary";

pub const DEFAULT_MODEL: &str = "gpt-4o";
const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const INSTRUCTIONS: &str = "Please summarize these git commits, focusing on the main themes \
    and important changes. Be concise but informative. Commits might not be very wordy.";

/// Turns one day's commit messages into prose.
///
/// Implementations must not fail: problems are reported through the returned text.
pub trait Summarizer {
    fn summarize(&self, messages: &[String]) -> String;
}

pub struct OpenAiSummarizer {
    agent: ureq::Agent,
    api_key: String,
    model: String,
    endpoint: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl OpenAiSummarizer {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            api_key: api_key.into(),
            model: model.into(),
            endpoint: OPENAI_CHAT_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn request(&self, messages: &[String]) -> Result<String> {
        let joined = messages.join(" ");
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: INSTRUCTIONS,
                },
                ChatMessage {
                    role: "user",
                    content: &joined,
                },
            ],
        };

        let response: ChatResponse = self
            .agent
            .post(&self.endpoint)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(&body)
            .context("chat completion request failed")?
            .into_json()
            .context("invalid chat completion response")?;

        response
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| anyhow!("chat completion returned no text"))
    }
}

impl Summarizer for OpenAiSummarizer {
    fn summarize(&self, messages: &[String]) -> String {
        if messages.is_empty() {
            return NOTHING_TO_SUMMARIZE.to_string();
        }
        debug!("summarizing {} commit messages with {}", messages.len(), self.model);
        match self.request(messages) {
            Ok(summary) => summary,
            Err(err) => {
                warn!("Error generating AI summary: {err:#}");
                SUMMARY_FAILED.to_string()
            }
        }
    }
}
