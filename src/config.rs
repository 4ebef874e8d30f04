use crate::error::{BotError, Result};
use crate::lang::{Lang, Localized};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// File name of the character override, searched in the working directory
/// and in `~/.ecobear/`.
pub const CHARACTER_FILE: &str = "eco_ai_character.json";

/// Every quiz offers A, B and C
pub const QUIZ_OPTIONS: usize = 3;

/// Answer letter of a quiz question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Choice {
    A,
    B,
    C,
}

impl Choice {
    /// Parse a single answer letter, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        }
    }
}

/// A phrase that is either shared by all languages or given per language
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Phrase {
    Plain(String),
    PerLang {
        #[serde(default)]
        zh: Option<String>,
        #[serde(default)]
        en: Option<String>,
    },
}

impl Phrase {
    /// Resolve for `lang`, falling back to English, then to an empty string
    pub fn resolve(&self, lang: Lang) -> &str {
        match self {
            Phrase::Plain(s) => s,
            Phrase::PerLang { zh, en } => {
                let picked = match lang {
                    Lang::Zh => zh.as_ref().or(en.as_ref()),
                    Lang::En => en.as_ref(),
                };
                picked.map(String::as_str).unwrap_or("")
            }
        }
    }

    fn localized(zh: &str, en: &str) -> Self {
        Phrase::PerLang {
            zh: Some(zh.to_string()),
            en: Some(en.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HappyMode {
    pub response: Localized<String>,
    #[serde(default)]
    pub emoticon: Vec<String>,
}

impl HappyMode {
    /// The happy response with the configured emoticons appended
    pub fn replies(&self) -> Localized<String> {
        if self.emoticon.is_empty() {
            return self.response.clone();
        }
        let tail = self.emoticon.concat();
        Localized::new(
            format!("{} {}", self.response.zh, tail),
            format!("{} {}", self.response.en, tail),
        )
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AngryMode {
    #[serde(default)]
    pub trigger: Vec<String>,
    pub response: Localized<String>,
    #[serde(default)]
    pub visual_effect: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DefaultStates {
    pub happy_mode: HappyMode,
    pub angry_mode: AngryMode,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorePersonality {
    pub base: String,
    pub default_states: DefaultStates,
    #[serde(default = "default_prompt_template")]
    pub prompt_template: Localized<String>,
}

fn default_prompt_template() -> Localized<String> {
    Localized::text(
        "请用熊大的口吻用中文回答（用'俺'自称，带🌲🐻表情）: {text}",
        "Respond as Bear Guardian in English (use 'I' and forest emojis): {text}",
    )
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TextResponse {
    pub footer_template: Localized<String>,
    pub random_tips: Localized<Vec<String>>,
    pub equivalents: Localized<Vec<String>>,
    pub base_carbon: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PatrolEvent {
    pub direction: Phrase,
    pub result: Phrase,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForestGame {
    pub patrol_events: Vec<PatrolEvent>,
    #[serde(default = "default_stories")]
    pub stories: Localized<Vec<String>>,
    #[serde(default = "default_kitchen_menus")]
    pub kitchen_menus: Localized<Vec<String>>,
}

fn default_stories() -> Localized<Vec<String>> {
    Localized::phrases(
        &[
            "昨天追光头强时，发现他扔的塑料瓶卡住小鹿的腿了(；′⌒`) 以后垃圾要分类！♻️",
            "蜜蜂兄弟说：'熊大，农药让俺们找不到花蜜！' 🐝...现在俺只用天然驱虫法！🌿",
        ],
        &[
            "Found a deer with its leg stuck in a plastic bottle Logger left (；′⌒`) Always recycle! ♻️",
            "Bees told me: 'Bear, pesticides ruin our honey!' 🐝...now I only use natural pest control! 🌿",
        ],
    )
}

fn default_kitchen_menus() -> Localized<Vec<String>> {
    Localized::phrases(
        &[
            "🐝 今天吃野莓蜂蜜沙拉！选本地蜂农的蜜，帮蜜蜂保家园~",
            "🌽 来根玉米吧！比牛肉少用90%水呢！(๑•̀ㅂ•́)و✧",
        ],
        &[
            "🐝 Try wild berry honey salad! Local honey helps bees!",
            "🌽 Have some corn! Uses 90% less water than beef! (๑•̀ㅂ•́)و✧",
        ],
    )
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InteractionBehaviors {
    pub text_response: TextResponse,
    pub forest_game: ForestGame,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CarbonAchievement {
    pub interval: u64,
    pub messages: Localized<Vec<String>>,
    #[serde(default = "default_achievement_reward")]
    pub reward_kg: f64,
}

fn default_achievement_reward() -> f64 {
    0.5
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: Choice,
    pub tip: String,
}

impl QuizQuestion {
    fn new(question: &str, options: [&str; QUIZ_OPTIONS], answer: Choice, tip: &str) -> Self {
        Self {
            question: question.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            answer,
            tip: tip.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuizSettings {
    pub questions: Localized<Vec<QuizQuestion>>,
    #[serde(default = "default_tree_reward")]
    pub tree_reward_kg: f64,
}

fn default_tree_reward() -> f64 {
    1.0
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            questions: Localized::new(
                vec![
                    QuizQuestion::new(
                        "森林里枯木应该清理吗？",
                        ["A. 必须清理", "B. 适当保留", "C. 全烧掉"],
                        Choice::B,
                        "🐻 枯木是昆虫的家，适当保留更生态！",
                    ),
                    QuizQuestion::new(
                        "哪种行为最伤害森林？",
                        ["A. 捡蘑菇", "B. 挖野生兰花", "C. 拍鸟巢照片"],
                        Choice::B,
                        "🐻💢 破坏原生植物会让小动物饿肚子！",
                    ),
                ],
                vec![
                    QuizQuestion::new(
                        "Should dead wood be cleared from forests?",
                        ["A. Clear completely", "B. Leave some", "C. Burn it all"],
                        Choice::B,
                        "🐻 Dead wood is home to insects! Leave some for ecosystem!",
                    ),
                    QuizQuestion::new(
                        "Which action harms forests most?",
                        ["A. Picking mushrooms", "B. Digging wild orchids", "C. Taking nest photos"],
                        Choice::B,
                        "🐻💢 Removing native plants starves animals!",
                    ),
                ],
            ),
            tree_reward_kg: default_tree_reward(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GameSettings {
    pub carbon_achievement: CarbonAchievement,
    #[serde(default)]
    pub quiz: QuizSettings,
}

/// The bear's character: templates, canned phrases and game constants
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub core_personality: CorePersonality,
    pub interaction_behaviors: InteractionBehaviors,
    pub game_settings: GameSettings,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            core_personality: CorePersonality {
                base: "Forest Guardian Bear".to_string(),
                default_states: DefaultStates {
                    happy_mode: HappyMode {
                        response: Localized::text(
                            "保护森林，熊熊有责！俺们一起行动 (•̀ᴗ•́)و",
                            "Protecting forests is my duty! Let's work together (•̀ᴗ•́)و",
                        ),
                        emoticon: vec!["🌲".into(), "🐻".into(), "💪".into()],
                    },
                    angry_mode: AngryMode {
                        trigger: ["砍树", "偷猎", "污染", "光头强", "logging", "poaching", "pollution"]
                            .iter()
                            .map(|s| s.to_string())
                            .collect(),
                        response: Localized::text(
                            "住手！破坏森林可不行！(╬ Ò﹏Ó)",
                            "Stop! No destroying forests! (╬ Ò﹏Ó)",
                        ),
                        visual_effect: "🐻🔥".to_string(),
                    },
                },
                prompt_template: default_prompt_template(),
            },
            interaction_behaviors: InteractionBehaviors {
                text_response: TextResponse {
                    footer_template: Localized::text(
                        "🐻 记住: {random_tip} | 减少碳排放: {carbon_offset}kg (相当于{equivalent})",
                        "🐻 Tip: {random_tip} | CO₂ reduced: {carbon_offset}kg (Like {equivalent})",
                    ),
                    random_tips: Localized::phrases(
                        &["晚上关灯省电，猫头鹰睡觉不被打扰 🦉", "节约用纸就是少砍树🌲"],
                        &[
                            "Turn off lights at night to save energy! 🦉",
                            "Walking instead of driving saves 0.2kg CO2 per km 🚶",
                        ],
                    ),
                    equivalents: Localized::phrases(
                        &["充电10部手机 📱", "少洗1次热水澡 🚿"],
                        &["charging 10 phones 📱", "1 less hot shower 🚿"],
                    ),
                    base_carbon: 0.0007,
                },
                forest_game: ForestGame {
                    patrol_events: vec![
                        PatrolEvent {
                            direction: Phrase::localized("左", "left"),
                            result: Phrase::localized(
                                "发现光头强在偷蜂蜜！用蜂巢赶跑他！(╯‵□′)╯🐝",
                                "Caught Logger stealing honey! Used beehive to chase him! (╯‵□′)╯🐝",
                            ),
                        },
                        PatrolEvent {
                            direction: Phrase::localized("右", "right"),
                            result: Phrase::localized(
                                "帮小松鼠种下橡果，明年会长出新大树！🌰➡️🌳",
                                "Helped squirrel plant an acorn! New tree coming soon! 🌰➡️🌳",
                            ),
                        },
                    ],
                    stories: default_stories(),
                    kitchen_menus: default_kitchen_menus(),
                },
            },
            game_settings: GameSettings {
                carbon_achievement: CarbonAchievement {
                    interval: 5,
                    messages: Localized::phrases(
                        &["🎉 你减少了{count}kg碳排放！继续努力~", "🌍 减少{count}kg碳足迹！地球感谢你！"],
                        &[
                            "🎉 You've reduced {count}kg CO₂! Keep it up!",
                            "🌍 {count}kg less carbon footprint! Earth thanks you!",
                        ],
                    ),
                    reward_kg: default_achievement_reward(),
                },
                quiz: QuizSettings::default(),
            },
        }
    }
}

impl Config {
    /// Load the character, falling back to the built-in one when the override
    /// is absent or unreadable.
    /// Priority: explicit path > ./eco_ai_character.json > ~/.ecobear/eco_ai_character.json
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let candidate = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_paths().into_iter().find(|p| p.exists()),
        };

        let config = match candidate {
            Some(p) => match Self::load_from(&p) {
                Ok(config) => {
                    info!(path = %p.display(), "loaded character override");
                    config
                }
                Err(e) => {
                    warn!(path = %p.display(), error = %e, "character load failed, using defaults");
                    Self::default()
                }
            },
            None => {
                debug!("no character override found, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Candidate override locations, in priority order
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CHARACTER_FILE)];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".ecobear").join(CHARACTER_FILE));
        }
        paths
    }

    /// Load an override file and merge it over the built-in character
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        let mut config = Self::default();
        config.merge_json(user)?;
        Ok(config)
    }

    /// Shallow merge: every top-level key of `other` replaces the whole section
    pub fn merge_json(&mut self, other: Value) -> Result<()> {
        let Value::Object(user) = other else {
            return Err(BotError::Config(
                "character file must contain a JSON object".to_string(),
            ));
        };

        let mut merged = serde_json::to_value(&*self)?;
        if let Value::Object(base) = &mut merged {
            for (key, value) in user {
                base.insert(key, value);
            }
        }

        *self = serde_json::from_value(merged)?;
        Ok(())
    }

    /// Check the invariants the persona relies on
    pub fn validate(&self) -> Result<()> {
        let text = &self.interaction_behaviors.text_response;
        if !text.base_carbon.is_finite() || text.base_carbon < 0.0 {
            return Err(BotError::Config(
                "interaction_behaviors.text_response.base_carbon must be a non-negative number"
                    .to_string(),
            ));
        }

        let achievement = &self.game_settings.carbon_achievement;
        if achievement.interval == 0 {
            return Err(BotError::Config(
                "game_settings.carbon_achievement.interval must be greater than 0".to_string(),
            ));
        }
        if achievement.reward_kg < 0.0 || self.game_settings.quiz.tree_reward_kg < 0.0 {
            return Err(BotError::Config("rewards must not be negative".to_string()));
        }

        if self.interaction_behaviors.forest_game.patrol_events.is_empty() {
            return Err(BotError::Config(
                "interaction_behaviors.forest_game.patrol_events must not be empty".to_string(),
            ));
        }

        let game = &self.interaction_behaviors.forest_game;
        for lang in [Lang::Zh, Lang::En] {
            let lists = [
                ("random_tips", text.random_tips.get(lang)),
                ("equivalents", text.equivalents.get(lang)),
                ("carbon_achievement.messages", achievement.messages.get(lang)),
                ("stories", game.stories.get(lang)),
                ("kitchen_menus", game.kitchen_menus.get(lang)),
            ];
            for (name, list) in lists {
                if list.is_empty() {
                    return Err(BotError::Config(format!("{} ({}) must not be empty", name, lang)));
                }
            }

            let questions = self.game_settings.quiz.questions.get(lang);
            if questions.is_empty() {
                return Err(BotError::Config(format!("quiz.questions ({}) must not be empty", lang)));
            }
            if let Some(q) = questions.iter().find(|q| q.options.len() != QUIZ_OPTIONS) {
                return Err(BotError::Config(format!(
                    "quiz question needs exactly {} options (A/B/C), got {}: {}",
                    QUIZ_OPTIONS,
                    q.options.len(),
                    q.question
                )));
            }
        }

        Ok(())
    }
}

/// Connection settings for the generative model backend
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model: String,
    pub base_url: String,
    pub api_key_env: String,
    pub env_file: PathBuf,
    pub timeout: Duration,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: crate::vendors::gemini::DEFAULT_MODEL.to_string(),
            base_url: crate::vendors::gemini::DEFAULT_BASE_URL.to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            env_file: PathBuf::from("API.env"),
            timeout: Duration::from_secs(60),
        }
    }
}

impl ModelSettings {
    /// Resolve the API key from the env file, `.env`, or the process environment
    pub fn resolve_api_key(&self) -> Result<SecretString> {
        if self.env_file.exists() {
            dotenvy::from_path(&self.env_file).map_err(|e| {
                BotError::Config(format!("failed to read {}: {}", self.env_file.display(), e))
            })?;
            debug!(path = %self.env_file.display(), "loaded environment file");
        } else {
            warn!(path = %self.env_file.display(), "environment file not found");
        }
        // Conventional .env is optional
        let _ = dotenvy::dotenv();

        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(SecretString::from(key.trim().to_string())),
            _ => Err(BotError::MissingApiKey(self.api_key_env.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.game_settings.carbon_achievement.interval, 5);
        assert_eq!(config.interaction_behaviors.text_response.base_carbon, 0.0007);
    }

    #[test]
    fn test_choice_parse() {
        assert_eq!(Choice::parse("a"), Some(Choice::A));
        assert_eq!(Choice::parse(" B "), Some(Choice::B));
        assert_eq!(Choice::parse("C"), Some(Choice::C));
        assert_eq!(Choice::parse("D"), None);
        assert_eq!(Choice::parse("AB"), None);
    }

    #[test]
    fn test_phrase_resolution() {
        let plain = Phrase::Plain("north".to_string());
        assert_eq!(plain.resolve(Lang::Zh), "north");

        let en_only: Phrase = serde_json::from_value(json!({"en": "left"})).unwrap();
        assert_eq!(en_only.resolve(Lang::Zh), "left");
        assert_eq!(en_only.resolve(Lang::En), "left");

        let zh_only: Phrase = serde_json::from_value(json!({"zh": "左"})).unwrap();
        assert_eq!(zh_only.resolve(Lang::En), "");
    }

    #[test]
    fn test_merge_replaces_whole_section() {
        let mut config = Config::default();
        config
            .merge_json(json!({
                "game_settings": {
                    "carbon_achievement": {
                        "interval": 3,
                        "messages": {"zh": ["好 {count}"], "en": ["nice {count}"]}
                    }
                }
            }))
            .unwrap();

        assert_eq!(config.game_settings.carbon_achievement.interval, 3);
        assert_eq!(config.game_settings.carbon_achievement.reward_kg, 0.5);
        // Sections not mentioned keep their defaults
        assert_eq!(config.core_personality.base, "Forest Guardian Bear");
        // Optional fields inside the replaced section fall back to defaults
        assert_eq!(config.game_settings.quiz.questions.en.len(), 2);
    }

    #[test]
    fn test_merge_rejects_non_object() {
        let mut config = Config::default();
        assert!(config.merge_json(json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn test_merge_rejects_incomplete_section() {
        let mut config = Config::default();
        let result = config.merge_json(json!({"game_settings": {"carbon_achievement": {}}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            json!({
                "interaction_behaviors": {
                    "text_response": {
                        "footer_template": {"zh": "{random_tip}", "en": "{random_tip}"},
                        "random_tips": {"zh": ["关灯"], "en": ["lights off"]},
                        "equivalents": {"zh": ["一杯水"], "en": ["a glass of water"]},
                        "base_carbon": 0.001
                    },
                    "forest_game": {
                        "patrol_events": [{"direction": "north", "result": "all quiet"}]
                    }
                }
            })
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        let text = &config.interaction_behaviors.text_response;
        assert_eq!(text.base_carbon, 0.001);
        assert_eq!(text.random_tips.en, vec!["lights off".to_string()]);
        assert_eq!(config.interaction_behaviors.forest_game.patrol_events.len(), 1);
        assert!(!config.interaction_behaviors.forest_game.stories.zh.is_empty());
    }

    #[test]
    fn test_load_sample_character() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(CHARACTER_FILE);
        let config = Config::load(Some(&path)).unwrap();

        let achievement = &config.game_settings.carbon_achievement;
        assert_eq!(achievement.interval, 3);
        assert_eq!(achievement.reward_kg, 0.25);
        assert_eq!(config.game_settings.quiz.tree_reward_kg, 2.0);
        assert_eq!(config.game_settings.quiz.questions.zh[0].answer, Choice::B);
        assert_eq!(config.interaction_behaviors.text_response.base_carbon, 0.0007);
    }

    #[test]
    fn test_load_falls_back_on_bad_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.game_settings.carbon_achievement.interval, 5);
    }

    #[test]
    fn test_load_falls_back_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("missing.json"))).unwrap();
        assert_eq!(config.core_personality.base, "Forest Guardian Bear");
    }

    #[test]
    fn test_load_rejects_zero_interval() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            json!({
                "game_settings": {
                    "carbon_achievement": {
                        "interval": 0,
                        "messages": {"zh": ["x"], "en": ["x"]}
                    }
                }
            })
        )
        .unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("interval"));
    }

    #[test]
    fn test_validate_rejects_empty_tips() {
        let mut config = Config::default();
        config.interaction_behaviors.text_response.random_tips.zh.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_requires_three_quiz_options() {
        let mut config = Config::default();
        config
            .merge_json(json!({
                "game_settings": {
                    "carbon_achievement": {
                        "interval": 5,
                        "messages": {"zh": ["好 {count}"], "en": ["nice {count}"]}
                    },
                    "quiz": {
                        "questions": {
                            "zh": [{"question": "q", "options": ["A. x", "B. y"], "answer": "C", "tip": "t"}],
                            "en": [{"question": "q", "options": ["A. x"], "answer": "C", "tip": "t"}]
                        }
                    }
                }
            }))
            .unwrap();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("exactly 3 options"), "{}", err);

        let mut too_many = Config::default();
        too_many.game_settings.quiz.questions.en[0]
            .options
            .push("D. extra".to_string());
        assert!(too_many.validate().is_err());
    }

    #[test]
    fn test_happy_replies_carry_emoticons() {
        let config = Config::default();
        let happy = &config.core_personality.default_states.happy_mode;
        let replies = happy.replies();
        assert!(replies.en.starts_with("Protecting forests is my duty!"));
        assert!(replies.en.ends_with(" 🌲🐻💪"));
        assert!(replies.zh.ends_with(" 🌲🐻💪"));

        let plain = HappyMode {
            emoticon: Vec::new(),
            ..happy.clone()
        };
        assert_eq!(plain.replies(), plain.response);
    }

    #[test]
    fn test_missing_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ModelSettings {
            api_key_env: "ECOBEAR_TEST_UNSET_KEY".to_string(),
            env_file: dir.path().join("API.env"),
            ..ModelSettings::default()
        };
        let err = settings.resolve_api_key().unwrap_err();
        assert!(matches!(err, BotError::MissingApiKey(ref name) if name == "ECOBEAR_TEST_UNSET_KEY"));
    }

    #[test]
    fn test_api_key_from_env_file() {
        use secrecy::ExposeSecret;

        let dir = tempfile::tempdir().unwrap();
        let env_file = dir.path().join("API.env");
        std::fs::write(&env_file, "ECOBEAR_TEST_FILE_KEY=AIzaTestKey\n").unwrap();

        let settings = ModelSettings {
            api_key_env: "ECOBEAR_TEST_FILE_KEY".to_string(),
            env_file,
            ..ModelSettings::default()
        };
        let key = settings.resolve_api_key().unwrap();
        assert_eq!(key.expose_secret(), "AIzaTestKey");
    }
}
