//! The chat facade shared by the REPL and the HTTP gateway.
//!
//! A turn goes: built-in commands (`help`, `my impact`) → persona routing →
//! either a scripted reply or a model call whose text gets the footer.

use crate::config::Config;
use crate::error::Result;
use crate::lang::Lang;
use crate::metrics;
use crate::personality::{Persona, Processed};
use crate::sessions::{SessionStore, DEFAULT_MAX_SESSIONS};
use crate::vendors::TextModel;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Commands listed by `help`
pub const HELP_COMMANDS: &[(&str, &str)] = &[
    ("Forest knowledge", "Get ecological facts from Bear"),
    ("Patrol forest", "Start forest adventure mini-game"),
    ("Bear story", "Hear a forest protection story"),
    ("Bear quiz", "Take an ecology quiz"),
    ("Bear hungry", "Get eco-friendly food suggestions"),
    ("My impact", "Check your CO₂ reduction progress"),
];

pub fn help_text() -> String {
    let mut text = String::from("🐻 I can help you with:\n");
    for (command, description) in HELP_COMMANDS {
        text.push_str(&format!("- {}: {}\n", command, description));
    }
    text.push_str("\n🌲 Try 'Bear story' or 'Patrol forest' to start playing!");
    text
}

/// How a reply was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Help,
    Impact,
    Command,
    QuizAnswer,
    Model,
    Error,
}

impl ReplyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyKind::Help => "help",
            ReplyKind::Impact => "impact",
            ReplyKind::Command => "command",
            ReplyKind::QuizAnswer => "quiz_answer",
            ReplyKind::Model => "model",
            ReplyKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BotReply {
    pub text: String,
    pub kind: ReplyKind,
    pub lang: Lang,
    /// Session's accumulated offset after this turn
    pub total_offset: f64,
    /// Synthetic footprint of `text`
    pub footprint: f64,
}

/// What a turn does when the model call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnModelError {
    Propagate,
    Reply,
}

pub struct ForestBot {
    model: Arc<dyn TextModel>,
    sessions: SessionStore,
}

impl ForestBot {
    pub fn new(config: Arc<Config>, model: Arc<dyn TextModel>) -> Self {
        Self::with_sessions(SessionStore::new(config, DEFAULT_MAX_SESSIONS), model)
    }

    pub fn with_sessions(sessions: SessionStore, model: Arc<dyn TextModel>) -> Self {
        Self { model, sessions }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Run one turn; model failures are returned as errors
    pub async fn respond(&self, session_id: &str, input: &str) -> Result<BotReply> {
        let persona = self.sessions.get_or_create(session_id)?;
        let mut persona = persona.lock().await;
        self.turn(&mut persona, input, OnModelError::Propagate).await
    }

    /// Run one turn; a model failure becomes a friendly reply that still
    /// carries any achievement earned on this turn. Only session admission
    /// errors are returned.
    pub async fn process_query(&self, session_id: &str, input: &str) -> Result<BotReply> {
        let persona = self.sessions.get_or_create(session_id)?;
        let mut persona = persona.lock().await;
        self.turn(&mut persona, input, OnModelError::Reply).await
    }

    async fn turn(
        &self,
        persona: &mut Persona,
        input: &str,
        on_error: OnModelError,
    ) -> Result<BotReply> {
        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("help") {
            return Ok(Self::reply(persona, help_text(), ReplyKind::Help));
        }
        if trimmed.eq_ignore_ascii_case("my impact") {
            let summary = persona.impact_summary();
            return Ok(Self::reply(persona, summary, ReplyKind::Impact));
        }

        let turn = persona.process_input(input);
        if turn.achievement.is_some() {
            metrics::record_achievement(persona.current_lang().as_str());
        }
        let achievement = turn.achievement.as_deref();

        let (text, kind) = match turn.processed {
            Processed::Command { text, .. } => {
                (persona.finish_direct(&text, achievement), ReplyKind::Command)
            }
            Processed::QuizAnswer { text, .. } => {
                (persona.finish_direct(&text, achievement), ReplyKind::QuizAnswer)
            }
            Processed::Prompt { text, .. } => {
                let prompt = persona.build_prompt(&text);
                match self.generate(&prompt).await {
                    Ok(answer) => (persona.format_response(&answer, achievement), ReplyKind::Model),
                    Err(e) if on_error == OnModelError::Reply => {
                        let friendly = e.friendly_message();
                        (persona.finish_direct(&friendly, achievement), ReplyKind::Error)
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        Ok(Self::reply(persona, text, kind))
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let model = self.model.name();
        let start = Instant::now();
        let result = self.model.generate(prompt).await;
        let elapsed = start.elapsed();
        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

        match &result {
            Ok(text) => {
                info!(model, duration_ms, reply_chars = text.chars().count(), "model replied");
                metrics::record_model_success(model, elapsed);
            }
            Err(e) => {
                warn!(model, duration_ms, error = %e, "model request failed");
                metrics::record_model_failure(model, elapsed);
            }
        }
        result
    }

    fn reply(persona: &Persona, text: String, kind: ReplyKind) -> BotReply {
        metrics::record_reply(kind.as_str());
        BotReply {
            footprint: persona.carbon_footprint(&text),
            total_offset: persona.carbon_offset(),
            lang: persona.current_lang(),
            kind,
            text,
        }
    }
}
