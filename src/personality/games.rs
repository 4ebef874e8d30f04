//! Scripted mini-games and canned handlers.

use super::voice::{decorate, Mood};
use crate::config::{Config, QuizQuestion};
use crate::lang::Lang;
use crate::template::format_kg;
use rand::seq::SliceRandom;
use rand::Rng;

/// Commands recognised anywhere in the user's text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Story,
    Patrol,
    Quiz,
    Kitchen,
    Forest,
}

const TRIGGERS: &[(&str, Command)] = &[
    ("熊大讲故事", Command::Story),
    ("巡逻森林", Command::Patrol),
    ("熊大考考你", Command::Quiz),
    ("熊大饿了", Command::Kitchen),
    ("我的森林", Command::Forest),
    ("Bear story", Command::Story),
    ("Patrol forest", Command::Patrol),
    ("Bear quiz", Command::Quiz),
    ("Bear hungry", Command::Kitchen),
    ("My forest", Command::Forest),
];

impl Command {
    /// First command whose trigger phrase occurs in `input`
    pub fn find(input: &str) -> Option<Self> {
        TRIGGERS
            .iter()
            .find(|(trigger, _)| input.contains(trigger))
            .map(|(_, command)| *command)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Story => "story",
            Command::Patrol => "patrol",
            Command::Quiz => "quiz",
            Command::Kitchen => "kitchen",
            Command::Forest => "forest",
        }
    }
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &'a [String]) -> &'a str {
    items.choose(rng).map(String::as_str).unwrap_or("")
}

pub fn story<R: Rng + ?Sized>(config: &Config, rng: &mut R, lang: Lang) -> String {
    let stories = config.interaction_behaviors.forest_game.stories.get(lang);
    let line = format!("📖 {}", pick(rng, stories));
    decorate(rng, &line, Mood::Positive)
}

pub fn patrol<R: Rng + ?Sized>(config: &Config, rng: &mut R, lang: Lang) -> String {
    let events = &config.interaction_behaviors.forest_game.patrol_events;
    let Some(event) = events.choose(rng) else {
        return String::new();
    };
    let direction = event.direction.resolve(lang);
    let result = event.result.resolve(lang);
    let line = match lang {
        Lang::Zh => format!("【{}】{}", direction, result),
        Lang::En => format!("[{}] {}", direction, result),
    };
    decorate(rng, &line, Mood::Positive)
}

pub fn kitchen<R: Rng + ?Sized>(config: &Config, rng: &mut R, lang: Lang) -> String {
    let menus = config.interaction_behaviors.forest_game.kitchen_menus.get(lang);
    let line = pick(rng, menus).to_string();
    decorate(rng, &line, Mood::Nature)
}

pub fn pick_quiz<'a, R: Rng + ?Sized>(
    config: &'a Config,
    rng: &mut R,
    lang: Lang,
) -> Option<&'a QuizQuestion> {
    config.game_settings.quiz.questions.get(lang).choose(rng)
}

pub fn format_quiz(quiz: &QuizQuestion) -> String {
    format!("❓ {}\n{}\n(A/B/C)", quiz.question, quiz.options.join("\n"))
}

/// Protected trees are the whole kilograms of the offset
pub fn forest_status(carbon_offset: f64, lang: Lang) -> String {
    let trees = carbon_offset.max(0.0).floor() as u64;
    let art = match trees {
        10.. => "🏞️",
        5..=9 => "🌳",
        _ => "🌱",
    }
    .repeat(3);
    let co2 = format_kg(carbon_offset);

    match lang {
        Lang::Zh => format!(
            "🌲 你的知识森林 🌲\n守护树木: {}棵\n减少二氧化碳: {}kg\n{}",
            trees, co2, art
        ),
        Lang::En => format!(
            "🌲 Knowledge Forest 🌲\nProtected Trees: {}\nCO₂ Reduced: {}kg\n{}",
            trees, co2, art
        ),
    }
}
