//! Language detection and per-language values.

use serde::{Deserialize, Serialize};

/// Conversation language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Zh,
    #[default]
    En,
}

impl Lang {
    /// Chinese when strictly more than half of the characters are CJK
    /// unified ideographs, English otherwise.
    pub fn detect(text: &str) -> Self {
        let total = text.chars().count();
        let cjk = text.chars().filter(|c| is_cjk(*c)).count();
        if cjk * 2 > total {
            Lang::Zh
        } else {
            Lang::En
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Lang::Zh => "zh",
            Lang::En => "en",
        }
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// A value that exists once per language
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Localized<T> {
    pub zh: T,
    pub en: T,
}

impl<T> Localized<T> {
    pub fn new(zh: T, en: T) -> Self {
        Self { zh, en }
    }

    pub fn get(&self, lang: Lang) -> &T {
        match lang {
            Lang::Zh => &self.zh,
            Lang::En => &self.en,
        }
    }
}

impl Localized<String> {
    pub fn text(zh: &str, en: &str) -> Self {
        Self::new(zh.to_string(), en.to_string())
    }
}

impl Localized<Vec<String>> {
    pub fn phrases(zh: &[&str], en: &[&str]) -> Self {
        Self::new(
            zh.iter().map(|s| s.to_string()).collect(),
            en.iter().map(|s| s.to_string()).collect(),
        )
    }
}
