//! Multi-turn assistant chat with incremental (SSE) replies.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use futures::stream::{BoxStream, Stream, StreamExt};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::AiError;
use crate::gemini::GeminiClient;
use crate::prompt::{COMMAND_CENTER_INSTRUCTION, DASHBOARD_INSTRUCTION};
use crate::wire::{
    Content, GenerateRequest, SseDecoder, SystemInstruction, TextPart, parse_chunk,
};

/// Which assistant the session talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persona {
    /// Compact helper on the dashboard.
    Dashboard,
    /// Strategic analyst view for senior officers.
    CommandCenter,
}

impl Persona {
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Dashboard => DASHBOARD_INSTRUCTION,
            Self::CommandCenter => COMMAND_CENTER_INSTRUCTION,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Dashboard => "FineForce AI Assistant",
            Self::CommandCenter => "AI Command Center",
        }
    }

    /// Opening assistant line shown before the first exchange.
    pub fn greeting(&self) -> Option<&'static str> {
        match self {
            Self::Dashboard => None,
            Self::CommandCenter => Some(
                "Welcome to the FineForce AI Command Center. I'm here to provide deep analysis \
                 and strategic insights into your traffic data. How can I assist you today?",
            ),
        }
    }

    fn generation_config(&self) -> Option<Value> {
        match self {
            Self::Dashboard => Some(json!({ "thinkingConfig": { "thinkingBudget": 0 } })),
            Self::CommandCenter => None,
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dashboard => "dashboard",
            Self::CommandCenter => "command-center",
        })
    }
}

impl FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dashboard" | "assistant" => Ok(Self::Dashboard),
            "command-center" | "command_center" | "commandcenter" => Ok(Self::CommandCenter),
            other => Err(format!("unknown persona: {other}")),
        }
    }
}

/// Conversation state. Turns are committed to the history only after the
/// model's reply has streamed to completion.
pub struct ChatSession {
    client: GeminiClient,
    persona: Persona,
    history: Vec<Content>,
}

impl ChatSession {
    pub fn new(client: GeminiClient, persona: Persona) -> Self {
        Self {
            client,
            persona,
            history: Vec::new(),
        }
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    /// Number of completed exchanges.
    pub fn turns(&self) -> usize {
        self.history.len() / 2
    }

    fn request<'a>(&'a self, contents: &'a [Content]) -> GenerateRequest<'a> {
        GenerateRequest {
            system_instruction: Some(SystemInstruction {
                parts: [TextPart {
                    text: self.persona.instruction(),
                }],
            }),
            contents,
            generation_config: self.persona.generation_config(),
        }
    }

    fn commit(&mut self, user: Content, reply: String) {
        self.history.push(user);
        self.history.push(Content::text("model", reply));
    }

    /// Send a message and stream the reply text as it arrives.
    ///
    /// Blank messages and a missing API key fail before any request is made.
    pub async fn send_stream(
        &mut self,
        text: &str,
    ) -> Result<impl Stream<Item = Result<String, AiError>> + '_, AiError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AiError::EmptyMessage);
        }
        let key = self.client.key()?.to_string();
        let user = Content::text("user", text);

        let mut contents = self.history.clone();
        contents.push(user.clone());
        let url = format!("{}?alt=sse", self.client.endpoint("streamGenerateContent"));
        info!(persona = %self.persona, turns = self.turns(), "sending chat message");

        let resp = self
            .client
            .post(&url, &key)
            .json(&self.request(&contents))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AiError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let state = Reply {
            session: self,
            user,
            bytes: resp.bytes_stream().map(|r| r.map(|b| b.to_vec())).boxed(),
            decoder: SseDecoder::default(),
            pending: VecDeque::new(),
            text: String::new(),
            exhausted: false,
            done: false,
        };
        Ok(futures::stream::unfold(state, Reply::next))
    }

    /// Send a message and wait for the whole reply.
    pub async fn send(&mut self, text: &str) -> Result<String, AiError> {
        let stream = self.send_stream(text).await?;
        let mut stream = std::pin::pin!(stream);
        let mut reply = String::new();
        while let Some(chunk) = stream.next().await {
            reply.push_str(&chunk?);
        }
        Ok(reply)
    }
}

struct Reply<'a> {
    session: &'a mut ChatSession,
    user: Content,
    bytes: BoxStream<'static, Result<Vec<u8>, reqwest::Error>>,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    text: String,
    exhausted: bool,
    done: bool,
}

impl<'a> Reply<'a> {
    async fn next(mut self) -> Option<(Result<String, AiError>, Self)> {
        loop {
            if self.done {
                return None;
            }
            if let Some(payload) = self.pending.pop_front() {
                match parse_chunk(&payload) {
                    Ok(Some(chunk)) => {
                        self.text.push_str(&chunk);
                        return Some((Ok(chunk), self));
                    }
                    Ok(None) => continue,
                    Err(e) => {
                        self.done = true;
                        return Some((Err(e), self));
                    }
                }
            }
            if self.exhausted {
                self.done = true;
                let reply = std::mem::take(&mut self.text);
                debug!(chars = reply.len(), "chat reply complete");
                self.session.commit(self.user.clone(), reply);
                return None;
            }
            match self.bytes.next().await {
                Some(Ok(chunk)) => self.pending.extend(self.decoder.push(&chunk)),
                Some(Err(e)) => {
                    self.done = true;
                    return Some((Err(e.into()), self));
                }
                None => {
                    self.exhausted = true;
                    self.pending.extend(self.decoder.finish());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(persona: Persona) -> ChatSession {
        ChatSession::new(GeminiClient::new(Some("k".into())), persona)
    }

    #[test]
    fn dashboard_request_disables_thinking() {
        let s = session(Persona::Dashboard);
        let contents = [Content::text("user", "Top hotspots?")];
        let v = serde_json::to_value(s.request(&contents)).unwrap();
        assert_eq!(v["systemInstruction"]["parts"][0]["text"], DASHBOARD_INSTRUCTION);
        assert_eq!(v["generationConfig"]["thinkingConfig"]["thinkingBudget"], 0);
        assert_eq!(v["contents"][0]["role"], "user");
        assert_eq!(v["contents"][0]["parts"][0]["text"], "Top hotspots?");
    }

    #[test]
    fn command_center_uses_default_config() {
        let s = session(Persona::CommandCenter);
        let v = serde_json::to_value(s.request(&[])).unwrap();
        assert!(v.get("generationConfig").is_none());
        assert_eq!(v["systemInstruction"]["parts"][0]["text"], COMMAND_CENTER_INSTRUCTION);
    }

    #[test]
    fn commit_records_both_turns() {
        let mut s = session(Persona::Dashboard);
        s.commit(Content::text("user", "hi"), "Hello officer.".into());
        assert_eq!(s.turns(), 1);
        assert_eq!(s.history[1].role, "model");
        assert_eq!(s.history[1].parts[0].text.as_deref(), Some("Hello officer."));
    }

    #[tokio::test]
    async fn blank_message_is_rejected() {
        let mut s = session(Persona::Dashboard);
        assert!(matches!(s.send("   ").await, Err(AiError::EmptyMessage)));
        assert_eq!(s.turns(), 0);
    }

    #[tokio::test]
    async fn missing_key_is_reported_for_chat() {
        let mut s = ChatSession::new(GeminiClient::new(None), Persona::CommandCenter);
        let err = s.send("Forecast revenue").await.unwrap_err();
        assert!(err.is_key_problem());
        assert_eq!(
            err.chat_reply(),
            "AI Assistant is not available. The API key is missing or invalid."
        );
    }

    #[test]
    fn persona_parses() {
        assert_eq!("command-center".parse::<Persona>().unwrap(), Persona::CommandCenter);
        assert_eq!("Dashboard".parse::<Persona>().unwrap(), Persona::Dashboard);
        assert!("pilot".parse::<Persona>().is_err());
    }
}
