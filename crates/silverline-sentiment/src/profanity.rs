//! Word-level profanity censor for example text shown to clients.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

const MASK: &str = "****";

/// Stems that take verb and adjective inflections (`fucking`, `shitty`,
/// `pissed`) as well as the compound endings in [`COMPOUND_ENDINGS`].
const INFLECTED_STEMS: &[&str] = &[
    "apeshit",
    "bastard",
    "bitch",
    "bullshit",
    "chickenshit",
    "clusterfuck",
    "crap",
    "cunt",
    "dipshit",
    "dumbfuck",
    "fuck",
    "horseshit",
    "jackshit",
    "motherfuck",
    "piss",
    "shit",
    "slut",
    "twat",
    "wank",
    "whore",
];

/// Stems that only take plurals and compound endings.
const NOUN_STEMS: &[&str] = &[
    "arse", "ass", "cock", "dick", "douche", "dumbass", "fatass", "jackass", "lardass", "prick",
    "smartass",
];

const INFLECTIONS: &[&str] = &["s", "es", "ed", "er", "ers", "ing", "in", "y"];

/// Inflections that double a stem's final consonant (`shitty`, `bullshitting`).
const DOUBLED_INFLECTIONS: &[&str] = &["ed", "er", "ers", "ing", "in", "y"];

const PLURALS: &[&str] = &["s", "es"];

const COMPOUND_ENDINGS: &[&str] = &[
    "bag", "bags", "bucket", "face", "faces", "hat", "hats", "head", "heads", "hole", "holes",
    "licker", "lickers", "stain", "stains", "sucker", "suckers", "tard", "tards", "wad", "wads",
    "wipe", "wipes", "wit", "wits",
];

/// Words that do not follow a stem pattern.
const IRREGULAR: &[&str] = &[
    "bollock",
    "bollocks",
    "boobs",
    "chink",
    "cum",
    "cumshot",
    "dammit",
    "damn",
    "damned",
    "damnit",
    "dildo",
    "dildos",
    "fag",
    "faggot",
    "faggots",
    "fags",
    "goddammit",
    "goddamn",
    "goddamned",
    "goddamnit",
    "jizz",
    "kike",
    "nigga",
    "niggas",
    "nigger",
    "niggers",
    "pussies",
    "pussy",
    "retard",
    "retarded",
    "retards",
    "spic",
    "titties",
    "tits",
    "tranny",
];

/// Every matchable word, with inflected and compound forms expanded.
static WORD_SET: LazyLock<HashSet<String>> = LazyLock::new(|| {
    let mut words: HashSet<String> = IRREGULAR.iter().map(ToString::to_string).collect();

    for stem in INFLECTED_STEMS {
        words.insert((*stem).to_string());
        words.extend(INFLECTIONS.iter().map(|suffix| format!("{stem}{suffix}")));
        if let Some(last) = stem.chars().last() {
            words.extend(
                DOUBLED_INFLECTIONS
                    .iter()
                    .map(|suffix| format!("{stem}{last}{suffix}")),
            );
        }
        words.extend(COMPOUND_ENDINGS.iter().map(|ending| format!("{stem}{ending}")));
    }

    for stem in NOUN_STEMS {
        words.insert((*stem).to_string());
        words.extend(PLURALS.iter().map(|suffix| format!("{stem}{suffix}")));
        words.extend(COMPOUND_ENDINGS.iter().map(|ending| format!("{stem}{ending}")));
    }

    words
});

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}@$]+").expect("valid regex"));

/// Replace every profane word in `text` with `****`.
///
/// Whitespace, punctuation and non-profane words are left untouched.
#[must_use]
pub fn censor(text: &str) -> String {
    TOKEN_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let token = &caps[0];
            if is_profane(token) {
                MASK.to_string()
            } else {
                token.to_string()
            }
        })
        .into_owned()
}

fn is_profane(token: &str) -> bool {
    let normalized: String = token
        .chars()
        .map(|c| match c {
            '0' => 'o',
            '1' => 'i',
            '3' => 'e',
            '4' | '@' => 'a',
            '5' | '$' => 's',
            '7' => 't',
            other => other.to_ascii_lowercase(),
        })
        .collect();
    WORD_SET.contains(normalized.as_str())
}
