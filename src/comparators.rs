//! The comparator primitives: pure functions deciding whether an item's
//! attribute value satisfies a rule's test string.
//!
//! Each comparator is a named tag (`ComparatorTag`) rather than a trait
//! object — the full set is closed and known at compile time, so a plain
//! enum dispatch is both simpler and faster than dynamic dispatch.

use chrono::{Duration, Utc};
use regex::Regex;

use crate::error::ComparatorError;
use crate::item::CheckValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparatorTag {
    FullExact,
    Contains,
    Only,
    Includes,
    IncludesWord,
    EndsWith,
    StartsWith,
    FullText,
    Numeric,
    Time,
    Bool,
}

impl ComparatorTag {
    /// Resolve an option token to a comparator tag, if it names one.
    fn from_option(opt: &str) -> Option<Self> {
        match opt {
            "full-exact" => Some(ComparatorTag::FullExact),
            "contains" => Some(ComparatorTag::Contains),
            "only" => Some(ComparatorTag::Only),
            "includes" => Some(ComparatorTag::Includes),
            "includes-word" => Some(ComparatorTag::IncludesWord),
            "ends-with" => Some(ComparatorTag::EndsWith),
            "starts-with" => Some(ComparatorTag::StartsWith),
            "full-text" => Some(ComparatorTag::FullText),
            "numeric" => Some(ComparatorTag::Numeric),
            "time" => Some(ComparatorTag::Time),
            "bool" => Some(ComparatorTag::Bool),
            _ => None,
        }
    }
}

/// Pick the comparator to run for a check: start from its declared default,
/// then let any option that names a comparator override it. The *last*
/// matching option wins — not the first — matching the original engine's
/// decorator-resolution loop (see DESIGN.md).
pub fn resolve_tag(default: ComparatorTag, options: &[String]) -> ComparatorTag {
    options
        .iter()
        .filter_map(|opt| ComparatorTag::from_option(opt))
        .last()
        .unwrap_or(default)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ordering {
    Equal,
    GreaterThan,
    LessThan,
    GreaterThanEqual,
    LessThanEqual,
}

fn ordering_from_options(options: &[String]) -> Ordering {
    // Check the longer, more specific names before their prefixes.
    if options.iter().any(|o| o == "greater-than-equal") {
        Ordering::GreaterThanEqual
    } else if options.iter().any(|o| o == "less-than-equal") {
        Ordering::LessThanEqual
    } else if options.iter().any(|o| o == "greater-than") {
        Ordering::GreaterThan
    } else if options.iter().any(|o| o == "less-than") {
        Ordering::LessThan
    } else {
        Ordering::Equal
    }
}

/// Split a leading `>=`, `<=`, `>`, or `<` marker off a test string, if present.
fn strip_marker(test: &str) -> (Option<Ordering>, &str) {
    let trimmed = test.trim_start();
    if let Some(rest) = trimmed.strip_prefix(">=") {
        (Some(Ordering::GreaterThanEqual), rest.trim_start())
    } else if let Some(rest) = trimmed.strip_prefix("<=") {
        (Some(Ordering::LessThanEqual), rest.trim_start())
    } else if let Some(rest) = trimmed.strip_prefix('>') {
        (Some(Ordering::GreaterThan), rest.trim_start())
    } else if let Some(rest) = trimmed.strip_prefix('<') {
        (Some(Ordering::LessThan), rest.trim_start())
    } else {
        (None, trimmed)
    }
}

fn parse_number(test: &str) -> Result<(Ordering, f64), ComparatorError> {
    let (marker, rest) = strip_marker(test);
    let numeric_part: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    let n: f64 = numeric_part
        .parse()
        .map_err(|_| ComparatorError::NotNumeric(test.to_string()))?;
    Ok((marker.unwrap_or(Ordering::Equal), n))
}

const TIME_UNITS: &[(&str, i64)] = &[
    ("minutes", 60),
    ("minute", 60),
    ("hours", 3600),
    ("hour", 3600),
    ("days", 86_400),
    ("day", 86_400),
    ("weeks", 604_800),
    ("week", 604_800),
    ("months", 2_592_000),
    ("month", 2_592_000),
    ("years", 31_536_000),
    ("year", 31_536_000),
];

fn parse_time_delta(test: &str) -> Result<(Ordering, Duration), ComparatorError> {
    let (marker, rest) = strip_marker(test);
    let numeric_part: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    let n: f64 = numeric_part
        .parse()
        .map_err(|_| ComparatorError::NotTemporal(test.to_string()))?;
    let unit_word = rest[numeric_part.len()..].trim().to_lowercase();
    let seconds_per_unit = if unit_word.is_empty() {
        86_400 // default unit: days
    } else {
        TIME_UNITS
            .iter()
            .find(|(name, _)| *name == unit_word)
            .map(|(_, secs)| *secs)
            .ok_or_else(|| ComparatorError::NotTemporal(test.to_string()))?
    };
    let total_seconds = (n * seconds_per_unit as f64) as i64;
    Ok((marker.unwrap_or(Ordering::Equal), Duration::seconds(total_seconds)))
}

fn fold_case(s: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        s.to_string()
    } else {
        s.to_lowercase()
    }
}

fn text_candidates(value: &CheckValue) -> Vec<String> {
    value.as_text_candidates()
}

fn full_exact_one(candidate: &str, test: &str, case_sensitive: bool, use_regex: bool) -> Result<bool, ComparatorError> {
    if use_regex {
        let pattern = format!("^(?:{})$", test);
        let re = Regex::new(&pattern).map_err(|e| ComparatorError::InvalidRegex {
            pattern: test.to_string(),
            reason: e.to_string(),
        })?;
        Ok(re.is_match(candidate))
    } else {
        Ok(fold_case(candidate, case_sensitive) == fold_case(test, case_sensitive))
    }
}

fn includes_one(candidate: &str, test: &str, case_sensitive: bool, use_regex: bool) -> Result<bool, ComparatorError> {
    if use_regex {
        let re = Regex::new(test).map_err(|e| ComparatorError::InvalidRegex {
            pattern: test.to_string(),
            reason: e.to_string(),
        })?;
        Ok(re.is_match(candidate))
    } else {
        Ok(fold_case(candidate, case_sensitive).contains(&fold_case(test, case_sensitive)))
    }
}

fn includes_word_one(candidate: &str, test: &str, case_sensitive: bool) -> Result<bool, ComparatorError> {
    let word_re = Regex::new(r"\w+").expect("static pattern");
    for token in word_re.find_iter(candidate) {
        if full_exact_one(token.as_str(), test, case_sensitive, false)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn strip_non_alphanumeric(s: &str) -> &str {
    let start = s.find(|c: char| c.is_alphanumeric()).unwrap_or(s.len());
    let end = s
        .rfind(|c: char| c.is_alphanumeric())
        .map(|i| i + s[i..].chars().next().map(|c| c.len_utf8()).unwrap_or(1))
        .unwrap_or(start);
    if start >= end {
        ""
    } else {
        &s[start..end]
    }
}

/// Evaluate `tag` against a single getter-produced value and a rule test string.
pub fn compare(
    tag: ComparatorTag,
    value: &CheckValue,
    test: &str,
    options: &[String],
) -> Result<bool, ComparatorError> {
    let case_sensitive = options.iter().any(|o| o == "case-sensitive");
    let use_regex = options.iter().any(|o| o == "regex");

    match tag {
        ComparatorTag::FullExact => {
            for candidate in text_candidates(value) {
                if full_exact_one(&candidate, test, case_sensitive, use_regex)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        ComparatorTag::Includes => {
            for candidate in text_candidates(value) {
                if includes_one(&candidate, test, case_sensitive, use_regex)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        ComparatorTag::IncludesWord => {
            for candidate in text_candidates(value) {
                if includes_word_one(&candidate, test, case_sensitive)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        ComparatorTag::StartsWith => {
            if use_regex {
                return Err(ComparatorError::RegexIncompatible);
            }
            for candidate in text_candidates(value) {
                let (c, t) = if case_sensitive {
                    (candidate.clone(), test.to_string())
                } else {
                    (candidate.to_lowercase(), test.to_lowercase())
                };
                if c.starts_with(&t) {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        ComparatorTag::EndsWith => {
            if use_regex {
                return Err(ComparatorError::RegexIncompatible);
            }
            for candidate in text_candidates(value) {
                let (c, t) = if case_sensitive {
                    (candidate.clone(), test.to_string())
                } else {
                    (candidate.to_lowercase(), test.to_lowercase())
                };
                if c.ends_with(&t) {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        ComparatorTag::FullText => {
            for candidate in text_candidates(value) {
                let stripped = strip_non_alphanumeric(&candidate);
                if full_exact_one(stripped, test, case_sensitive, use_regex)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        ComparatorTag::Contains => match value {
            CheckValue::TextList(items) => {
                for candidate in items {
                    if full_exact_one(candidate, test, case_sensitive, use_regex)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            _ => Err(ComparatorError::ListNotAccepted("contains".to_string())),
        },
        ComparatorTag::Only => match value {
            CheckValue::TextList(items) => {
                if items.is_empty() {
                    return Ok(false);
                }
                for candidate in items {
                    if !full_exact_one(candidate, test, case_sensitive, use_regex)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            _ => Err(ComparatorError::ListNotAccepted("only".to_string())),
        },
        ComparatorTag::Numeric => {
            let n = match value {
                CheckValue::Number(n) => *n,
                _ => return Err(ComparatorError::NotNumeric("<non-numeric value>".to_string())),
            };
            let (marker, test_n) = parse_number(test)?;
            let ordering = if marker == Ordering::Equal {
                ordering_from_options(options)
            } else {
                marker
            };
            Ok(apply_ordering_f64(n, test_n, ordering))
        }
        ComparatorTag::Time => {
            let t = match value {
                CheckValue::Timestamp(t) => *t,
                _ => return Err(ComparatorError::NotTemporal("<non-temporal value>".to_string())),
            };
            let (marker, delta) = parse_time_delta(test)?;
            let ordering = if marker == Ordering::Equal {
                ordering_from_options(options)
            } else {
                marker
            };
            let shifted = t + delta;
            let now = Utc::now();
            Ok(match ordering {
                Ordering::Equal => shifted == now,
                Ordering::GreaterThan => shifted < now,
                Ordering::LessThan => shifted > now,
                Ordering::GreaterThanEqual => shifted <= now,
                Ordering::LessThanEqual => shifted >= now,
            })
        }
        ComparatorTag::Bool => {
            let b = match value {
                CheckValue::Bool(b) => *b,
                _ => return Ok(false),
            };
            let test_bool = test.trim().eq_ignore_ascii_case("true");
            Ok(b == test_bool)
        }
    }
}

fn apply_ordering_f64(value: f64, test: f64, ordering: Ordering) -> bool {
    match ordering {
        Ordering::Equal => (value - test).abs() < f64::EPSILON,
        Ordering::GreaterThan => value > test,
        Ordering::LessThan => value < test,
        Ordering::GreaterThanEqual => value >= test,
        Ordering::LessThanEqual => value <= test,
    }
}
