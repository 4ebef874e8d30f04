//! Forest Guardian Bear personality.
//!
//! The persona owns everything that changes while chatting:
//! - interaction counter and the achievement rule keyed off it
//! - the cosmetic carbon-offset counter
//! - the language detected from the latest input
//! - the quiz toggle (idle / awaiting an A/B/C answer)
//!
//! Input is routed to a quiz answer, a scripted command, or turned into a
//! model prompt in the bear's voice.

pub mod games;
pub mod voice;

use crate::config::{Choice, Config};
use crate::lang::Lang;
use crate::template::{format_kg, render};
use games::Command;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::debug;
use voice::Mood;

/// Quiz progress
#[derive(Debug, Clone, Default, PartialEq)]
pub enum QuizState {
    #[default]
    Idle,
    Awaiting {
        answer: Choice,
        tip: String,
        lang: Lang,
    },
}

impl QuizState {
    pub fn is_awaiting(&self) -> bool {
        matches!(self, QuizState::Awaiting { .. })
    }
}

/// What the persona made of one input
#[derive(Debug, Clone, PartialEq)]
pub enum Processed {
    /// A scripted command produced the full reply
    Command { command: Command, text: String },
    /// A pending quiz was graded
    QuizAnswer { correct: bool, text: String },
    /// Text to hand to the model
    Prompt { text: String, original: String },
}

/// Result of [`Persona::process_input`]
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub processed: Processed,
    /// Set on every `interval`-th interaction
    pub achievement: Option<String>,
}

pub struct Persona {
    config: Arc<Config>,
    rng: StdRng,
    interaction_count: u64,
    carbon_offset: f64,
    current_lang: Lang,
    quiz: QuizState,
}

impl Persona {
    pub fn new(config: Arc<Config>) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic persona for reproducible runs
    pub fn with_seed(config: Arc<Config>, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: Arc<Config>, rng: StdRng) -> Self {
        Self {
            config,
            rng,
            interaction_count: 0,
            carbon_offset: 0.0,
            current_lang: Lang::En,
            quiz: QuizState::Idle,
        }
    }

    pub fn interaction_count(&self) -> u64 {
        self.interaction_count
    }

    pub fn carbon_offset(&self) -> f64 {
        self.carbon_offset
    }

    pub fn current_lang(&self) -> Lang {
        self.current_lang
    }

    pub fn quiz_state(&self) -> &QuizState {
        &self.quiz
    }

    /// Route one user input and advance the counters.
    pub fn process_input(&mut self, input: &str) -> Turn {
        self.current_lang = Lang::detect(input);
        self.interaction_count += 1;

        let processed = self.dispatch(input);
        let achievement = self.check_achievement();

        Turn {
            processed,
            achievement,
        }
    }

    fn dispatch(&mut self, input: &str) -> Processed {
        if let Some(choice) = Choice::parse(input) {
            // Taking an idle state leaves it idle
            if let QuizState::Awaiting { answer, tip, lang } = std::mem::take(&mut self.quiz) {
                return self.grade_quiz(choice, answer, &tip, lang);
            }
        }

        if let Some(command) = Command::find(input) {
            debug!(command = command.as_str(), lang = %self.current_lang, "scripted command");
            let text = self.run_command(command);
            return Processed::Command { command, text };
        }

        let text = self.ecological_alert(input);
        let text = voice::bear_speak(&mut self.rng, &text, self.current_lang);
        Processed::Prompt {
            text,
            original: input.to_string(),
        }
    }

    fn run_command(&mut self, command: Command) -> String {
        let lang = self.current_lang;
        match command {
            Command::Story => games::story(&self.config, &mut self.rng, lang),
            Command::Patrol => games::patrol(&self.config, &mut self.rng, lang),
            Command::Kitchen => games::kitchen(&self.config, &mut self.rng, lang),
            Command::Forest => {
                let status = games::forest_status(self.carbon_offset, lang);
                voice::decorate(&mut self.rng, &status, Mood::Bear)
            }
            Command::Quiz => self.start_quiz(),
        }
    }

    fn start_quiz(&mut self) -> String {
        let lang = self.current_lang;
        match games::pick_quiz(&self.config, &mut self.rng, lang) {
            Some(quiz) => {
                self.quiz = QuizState::Awaiting {
                    answer: quiz.answer,
                    tip: quiz.tip.clone(),
                    lang,
                };
                games::format_quiz(quiz)
            }
            None => self
                .config
                .core_personality
                .default_states
                .happy_mode
                .response
                .get(lang)
                .clone(),
        }
    }

    // The answer letter carries no language, so the reply follows the quiz.
    fn grade_quiz(&mut self, choice: Choice, answer: Choice, tip: &str, lang: Lang) -> Processed {
        self.current_lang = lang;
        let correct = choice == answer;

        let (text, mood) = if correct {
            self.carbon_offset += self.config.game_settings.quiz.tree_reward_kg;
            let planted = match lang {
                Lang::Zh => "🌱 通过知识守护了1棵树！",
                Lang::En => "🌱 Protected 1 tree with knowledge!",
            };
            (format!("{} {}", planted, tip), Mood::Positive)
        } else {
            let text = match lang {
                Lang::Zh => format!("错啦！{}", tip),
                Lang::En => format!("Wrong! {}", tip),
            };
            (text, Mood::Negative)
        };

        debug!(choice = choice.as_str(), correct, "quiz graded");
        Processed::QuizAnswer {
            correct,
            text: voice::decorate(&mut self.rng, &text, mood),
        }
    }

    /// Angry-mode reply when the text mentions harming the forest
    fn ecological_alert(&mut self, text: &str) -> String {
        let angry = &self.config.core_personality.default_states.angry_mode;
        let lowered = text.to_lowercase();
        let triggered = angry
            .trigger
            .iter()
            .any(|t| !t.is_empty() && lowered.contains(&t.to_lowercase()));

        if triggered {
            debug!("ecological alert triggered");
            let response = angry.response.get(self.current_lang);
            let response = if angry.visual_effect.is_empty() {
                response.clone()
            } else {
                format!("{} {}", angry.visual_effect, response)
            };
            voice::decorate(&mut self.rng, &response, Mood::Alert)
        } else {
            voice::decorate(&mut self.rng, text, Mood::Nature)
        }
    }

    fn check_achievement(&mut self) -> Option<String> {
        let settings = &self.config.game_settings.carbon_achievement;
        if settings.interval == 0 || self.interaction_count % settings.interval != 0 {
            return None;
        }

        self.carbon_offset += settings.reward_kg;
        let message = settings
            .messages
            .get(self.current_lang)
            .choose(&mut self.rng)?;
        Some(render(message, &[("count", &format_kg(self.carbon_offset))]))
    }

    /// Wrap the model's text in the bear's voice
    pub fn build_prompt(&self, text: &str) -> String {
        let template = self.config.core_personality.prompt_template.get(self.current_lang);
        render(template, &[("text", text)])
    }

    /// Model reply with the tip/offset footer and any achievement line
    pub fn format_response(&mut self, ai_text: &str, achievement: Option<&str>) -> String {
        let lang = self.current_lang;
        let text_cfg = &self.config.interaction_behaviors.text_response;
        let tip = text_cfg
            .random_tips
            .get(lang)
            .choose(&mut self.rng)
            .map(String::as_str)
            .unwrap_or("");
        let offset = format_kg(self.carbon_offset);
        let footer = render(
            text_cfg.footer_template.get(lang),
            &[
                ("random_tip", tip),
                ("carbon_offset", &offset),
                ("equivalent", self.equivalent(self.carbon_offset)),
            ],
        );

        let mut response = format!("{}\n\n{}", ai_text, footer);
        if let Some(line) = achievement {
            response.push('\n');
            response.push_str(line);
        }
        response
    }

    /// Scripted reply with any achievement line
    pub fn finish_direct(&self, text: &str, achievement: Option<&str>) -> String {
        match achievement {
            Some(line) => format!("{}\n{}", text, line),
            None => text.to_string(),
        }
    }

    /// Relatable comparison for an amount of CO₂, one step per 0.5 kg
    pub fn equivalent(&self, kg: f64) -> &str {
        let list = self
            .config
            .interaction_behaviors
            .text_response
            .equivalents
            .get(self.current_lang);
        if list.is_empty() {
            return "";
        }
        let index = ((kg / 0.5).max(0.0) as usize).min(list.len() - 1);
        &list[index]
    }

    /// Synthetic footprint of a reply: its length times the base factor
    pub fn carbon_footprint(&self, text: &str) -> f64 {
        let base = self.config.interaction_behaviors.text_response.base_carbon;
        let raw = text.chars().count() as f64 * base;
        (raw * 10_000.0).round() / 10_000.0
    }

    pub fn impact_summary(&self) -> String {
        format!(
            "🌍 You've reduced {}kg CO₂! ({})",
            format_kg(self.carbon_offset),
            self.equivalent(self.carbon_offset)
        )
    }
}
