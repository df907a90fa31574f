//! Author name normalization.
//!
//! Raw author strings arrive in every imaginable shape: bylines with
//! prefixes, joined author lists, social handles, trailing dates and
//! publication names. The pipeline splits, scrubs and filters until only
//! plausible person names remain.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w.+-]+@[\w-]+\.[\w.]+$").expect("email regex")
});

/// `By `, `Written by `, `Von ` and friends.
static BYLINE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(written\s+by|words\s+by|by|von)\s*:?\s+").expect("byline prefix regex")
});

/// Trailing prepositional phrases: ` on Twitter`, ` for The Times`, ...
static TRAILING_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+(am|on|for|at|in|to|from|of|via|with|—|-|–)\s+.*$").expect("trailing phrase regex")
});

static TRAILING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\d,.:/\s]+$").expect("trailing digits regex"));

static HANDLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@[\w.]+").expect("handle regex"));

/// List separators between multiple authors.
static AUTHOR_SPLIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*(?:/|;|,|\||&|\s+and\s+|\s+und\s+)\s*").expect("author split regex")
});

fn strip_emoji(input: &str) -> String {
    input
        .chars()
        .filter(|c| {
            let cp = *c as u32;
            !((0x1F000..=0x1FAFF).contains(&cp)
                || (0x2600..=0x27BF).contains(&cp)
                || (0xFE00..=0xFE0F).contains(&cp))
        })
        .collect()
}

fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn clean_candidate(raw: &str) -> Option<String> {
    let candidate = raw.trim();
    if candidate.is_empty() || candidate.starts_with("http") || EMAIL.is_match(candidate) {
        return None;
    }

    let candidate = HANDLE.replace_all(candidate, "");
    let candidate = strip_emoji(&candidate);
    let candidate = BYLINE_PREFIX.replace(candidate.trim(), "");
    let candidate = TRAILING_PHRASE.replace(&candidate, "");
    let candidate = TRAILING_DIGITS.replace(&candidate, "");
    let candidate = candidate
        .trim()
        .trim_end_matches(|c: char| !c.is_alphanumeric())
        .trim()
        .to_string();

    if candidate.is_empty() {
        return None;
    }
    // A 50-char run without spaces or hyphens is a slug, not a name.
    if candidate.len() >= 50 && !candidate.contains(' ') && !candidate.contains('-') {
        return None;
    }

    // Lowercase-only bylines get title-cased.
    let has_internal_capital = candidate.chars().skip(1).any(char::is_uppercase)
        || candidate.chars().next().is_some_and(char::is_uppercase);
    let candidate = if has_internal_capital {
        candidate
    } else {
        title_case(&candidate)
    };

    Some(candidate)
}

/// Normalize a raw author string into a clean `; `-joined list of names.
///
/// Returns `None` when nothing plausible survives. Single-word values are
/// discarded: a name needs at least a first and a last part.
#[must_use]
pub fn normalize_author(raw: &str, blacklist: &HashSet<String>) -> Option<String> {
    let lowered_blacklist: HashSet<String> =
        blacklist.iter().map(|e| e.to_lowercase()).collect();

    let mut names: Vec<String> = Vec::new();
    for part in AUTHOR_SPLIT.split(raw) {
        let Some(name) = clean_candidate(part) else {
            continue;
        };
        if !name.contains(' ') {
            continue;
        }
        if lowered_blacklist.contains(&name.to_lowercase()) {
            continue;
        }
        if !names.iter().any(|n| n == &name) {
            names.push(name);
        }
    }

    (!names.is_empty()).then(|| names.join("; "))
}
