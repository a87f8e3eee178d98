//! Maps a raw listing category plus an event title onto a canonical category.
//!
//! Rules live in [`RULES`] and are evaluated top to bottom; the first match wins.
//! The narrow, high-precision rules sit above the broad nightlife/concert
//! catch-alls so shared vocabulary (a comedian billed "live", a DJ on a comedy
//! bill) resolves to the narrower category.

use crate::types::Category;

pub const DEFAULT_CATEGORY: Category = Category::Concerts;

/// One entry of the cascade. `matches` receives the lower-cased raw category and title.
pub struct Rule {
    pub name: &'static str,
    pub category: Category,
    pub matches: fn(&str, &str) -> bool,
}

pub static RULES: &[Rule] = &[
    Rule { name: "comedy", category: Category::Comedy, matches: is_comedy },
    Rule { name: "cultural", category: Category::Cultural, matches: is_cultural },
    Rule { name: "sports", category: Category::Sports, matches: is_sports },
    Rule { name: "festivals", category: Category::Festivals, matches: is_festival },
    Rule { name: "family", category: Category::Family, matches: is_family },
    Rule { name: "nightlife", category: Category::Nightlife, matches: is_nightlife },
    Rule { name: "concerts", category: Category::Concerts, matches: is_concert },
];

const COMEDY_KEYWORDS: &[&str] = &["comedy", "stand-up", "standup", "stand up", "comedian"];

const KNOWN_COMEDIANS: &[&str] = &[
    "dave chappelle", "kevin hart", "russell peters", "trevor noah",
    "jimmy carr", "bassem youssef", "gabriel iglesias", "jo koy",
];

const CULTURAL_CATEGORIES: &[&str] = &["theatre", "theater", "cultural", "arts"];

// Titles only; generic "live"/"show" stay with concerts
const CULTURAL_TITLE_PHRASES: &[&str] = &[
    "les miserables", "les misérables", "phantom of the opera", "the lion king",
    "mamma mia", "wicked", "cats the musical", "chicago the musical",
    "ballet", "orchestra", "opera", "broadway",
];

const SPORTS_KEYWORDS: &[&str] = &[
    "formula 1", "grand prix", "motogp", "motorsport", "racing", "drag race",
    "football", "basketball", "tennis", "boxing", "cricket", "marathon", "golf",
];
const SPORTS_WORDS: &[&str] = &["f1", "ufc", "mma", "vs"];

const FAMILY_KEYWORDS: &[&str] = &["family", "kids", "children"];

const NIGHTLIFE_CATEGORIES: &[&str] = &["nightlife", "club"];
const NIGHTLIFE_KEYWORDS: &[&str] = &["nightclub", "club night", "party", "ladies night"];
const NIGHTLIFE_WORDS: &[&str] = &["dj", "djs", "rave"];

const KNOWN_NIGHTCLUBS: &[&str] = &[
    "coral bay", "sky bar", "block 338", "cafe del mar", "bushido", "ja'ja", "the den",
];

const CONCERT_CATEGORIES: &[&str] = &["concert", "music"];
const CONCERT_KEYWORDS: &[&str] = &["live at", "live in", "concert"];

const KNOWN_ARTISTS: &[&str] = &[
    "amr diab", "tamer hosny", "nancy ajram", "elissa", "mohammed abdu",
    "kadim al sahir", "assala", "wegz", "enrique iglesias", "andrea bocelli",
    "john legend", "dj khaled", "sting",
];

/// First-match-wins classification; falls back to [`DEFAULT_CATEGORY`].
pub fn classify(raw_category: &str, title: &str) -> Category {
    let category = raw_category.to_lowercase();
    let title = title.to_lowercase();
    RULES
        .iter()
        .find(|rule| (rule.matches)(&category, &title))
        .map(|rule| rule.category)
        .unwrap_or(DEFAULT_CATEGORY)
}

/// Every rule that would fire, in cascade order. Used to audit precedence.
pub fn matching_rules(raw_category: &str, title: &str) -> Vec<&'static str> {
    let category = raw_category.to_lowercase();
    let title = title.to_lowercase();
    RULES
        .iter()
        .filter(|rule| (rule.matches)(&category, &title))
        .map(|rule| rule.name)
        .collect()
}

fn is_comedy(category: &str, title: &str) -> bool {
    contains_any(category, COMEDY_KEYWORDS)
        || contains_any(title, COMEDY_KEYWORDS)
        || contains_any(title, KNOWN_COMEDIANS)
}

fn is_cultural(category: &str, title: &str) -> bool {
    contains_any(category, CULTURAL_CATEGORIES) || contains_any(title, CULTURAL_TITLE_PHRASES)
}

fn is_sports(category: &str, title: &str) -> bool {
    category.contains("sport")
        || contains_any(title, SPORTS_KEYWORDS)
        || has_any_word(title, SPORTS_WORDS)
}

fn is_festival(category: &str, title: &str) -> bool {
    category.contains("festival") || title.contains("festival")
}

fn is_family(category: &str, title: &str) -> bool {
    contains_any(category, FAMILY_KEYWORDS) || contains_any(title, FAMILY_KEYWORDS)
}

fn is_nightlife(category: &str, title: &str) -> bool {
    contains_any(category, NIGHTLIFE_CATEGORIES)
        || contains_any(title, NIGHTLIFE_KEYWORDS)
        || has_any_word(title, NIGHTLIFE_WORDS)
        || contains_any(title, KNOWN_NIGHTCLUBS)
}

fn is_concert(category: &str, title: &str) -> bool {
    contains_any(category, CONCERT_CATEGORIES)
        || contains_any(title, CONCERT_KEYWORDS)
        || contains_any(title, KNOWN_ARTISTS)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

// Whole-token match for short keywords that would otherwise hit inside words
fn has_any_word(haystack: &str, words: &[&str]) -> bool {
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| words.contains(&token))
}
