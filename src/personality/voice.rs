//! The bear's speaking style: emoticons, word swaps and sentence endings.

use crate::lang::Lang;
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;

/// Probability that an emoticon is appended to a line
pub const EMOTICON_CHANCE: f64 = 0.8;
/// Probability that a bear-style ending is appended to converted text
pub const ENDING_CHANCE: f64 = 0.3;

/// Emoticon family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Positive,
    Negative,
    Alert,
    Nature,
    Bear,
}

impl Mood {
    pub fn emoticons(&self) -> &'static [&'static str] {
        match self {
            Mood::Positive => &["(｡♥‿♥｡)", "🐻👍", "🌳♡"],
            Mood::Negative => &["(╬ಠ益ಠ)", "🐻💢", "🪓❌"],
            Mood::Alert => &["🚨🐻", "🔥⚠️", "🌲🆘"],
            Mood::Nature => &["🐝", "🍯", "🐿️"],
            Mood::Bear => &["ʕ·͡ᴥ·ʔ", "ʕ￫ᴥ￩ʔ", "ᕙ(▀̿̿Ĺ̯̿̿▀̿ ̿)ᕗ"],
        }
    }
}

/// Maybe append an emoticon of the given mood
pub fn decorate<R: Rng + ?Sized>(rng: &mut R, text: &str, mood: Mood) -> String {
    if rng.gen_bool(EMOTICON_CHANCE) {
        if let Some(emoticon) = mood.emoticons().choose(rng) {
            return format!("{} {}", text, emoticon);
        }
    }
    text.to_string()
}

// Applied in order, so longer forms come first.
const ZH_SWAPS: &[(&str, &str)] = &[
    ("你们", "俺们"),
    ("你", "俺"),
    ("环保", "保护林子"),
    ("生态", "森林大家庭"),
    ("应该", "得"),
    ("知道", "晓得"),
    ("可以", "能行"),
];

const EN_SWAPS: &[(&str, &str)] = &[
    ("we", "bears"),
    ("I", "bear"),
    ("environment", "our forest home"),
    ("eco", "tree-hugging"),
    ("should", "gotta"),
    ("know", "know darn well"),
    ("people", "two-leggers"),
];

// English swaps only touch whole words.
static EN_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    EN_SWAPS
        .iter()
        .map(|(word, swap)| {
            let pattern = format!(r"\b{}\b", regex::escape(word));
            (Regex::new(&pattern).expect("static word pattern"), *swap)
        })
        .collect()
});

fn endings(lang: Lang) -> &'static [&'static str] {
    match lang {
        Lang::Zh => &["，晓得吧？", "，俺跟你说！", "，熊不骗你！"],
        Lang::En => &[", ya know?", ", I tell ya!", ", bear's honor!"],
    }
}

/// Swap words without the random ending
pub fn swap_words(text: &str, lang: Lang) -> String {
    match lang {
        Lang::Zh => ZH_SWAPS
            .iter()
            .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to)),
        Lang::En => EN_PATTERNS.iter().fold(text.to_string(), |acc, (re, to)| {
            re.replace_all(&acc, *to).into_owned()
        }),
    }
}

/// Convert text to the bear's way of talking
pub fn bear_speak<R: Rng + ?Sized>(rng: &mut R, text: &str, lang: Lang) -> String {
    let mut out = swap_words(text, lang);
    if rng.gen_bool(ENDING_CHANCE) {
        if let Some(ending) = endings(lang).choose(rng) {
            out.push_str(ending);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zh_swaps_longest_first() {
        assert_eq!(swap_words("你们应该知道环保", Lang::Zh), "俺们得晓得保护林子");
        assert_eq!(swap_words("你可以", Lang::Zh), "俺能行");
    }

    #[test]
    fn test_en_swaps_whole_words_only() {
        assert_eq!(
            swap_words("I think we should know people", Lang::En),
            "bear think bears gotta know darn well two-leggers"
        );
        // Words that merely contain a swap target are untouched
        assert_eq!(swap_words("It went well", Lang::En), "It went well");
        assert_eq!(swap_words("economy knowledge", Lang::En), "economy knowledge");
    }

    #[test]
    fn test_decorate_appends_known_emoticon() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let out = decorate(&mut rng, "hello", Mood::Nature);
            assert!(out.starts_with("hello"));
            if out != "hello" {
                let suffix = out.trim_start_matches("hello ");
                assert!(Mood::Nature.emoticons().contains(&suffix));
            }
        }
    }

    #[test]
    fn test_bear_speak_ending_is_known() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let out = bear_speak(&mut rng, "trees are great", Lang::En);
            assert!(out.starts_with("trees are great"));
            let rest = &out["trees are great".len()..];
            assert!(rest.is_empty() || endings(Lang::En).contains(&rest));
        }
    }
}
