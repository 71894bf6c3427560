//! The evaluator: walks a rule's keys against an item, running checks and
//! threshold/negation/OR-group logic, per SPEC_FULL.md §4.3.

use serde_yaml::Value;

use crate::checks::{author_checks, crosspost_subreddit_checks, item_checks};
use crate::comparators::{compare, resolve_tag};
use crate::item::ItemFacade;
use crate::placeholders::{self, MatchRecord};
use crate::rule::{parse_key, Rule};

const THRESHOLD_CHECK_NAMES: &[&str] = &["comment_karma", "post_karma", "combined_karma", "account_age"];

const DEFAULT_EXEMPT_ACTIONS: &[&str] = &["remove", "report", "spam", "filter"];

const SCOPE_NAMES: &[&str] = &[
    "author",
    "parent_submission",
    "parent_comment",
    "crosspost_subreddit",
    "crosspost_author",
];

/// Rule-level result of walking one config's keys.
enum Walk {
    /// All applicable keys passed (or were satisfied via threshold-OR).
    Matched,
    /// At least one key failed outright.
    Failed,
    /// A getter returned its skip_if sentinel — abort the whole rule.
    Abort,
}

fn value_list(v: &Value) -> Vec<String> {
    match v {
        Value::Sequence(items) => items
            .iter()
            .filter_map(|i| i.as_str().map(str::to_string).or_else(|| scalar_to_string(i)))
            .collect(),
        other => scalar_to_string(other).into_iter().collect(),
    }
}

fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// True when the item's author is exempt from this rule, per the
/// `moderators_exempt` gate.
fn moderators_exempt_gate(rule: &Rule, item: &dyn ItemFacade) -> bool {
    if !item.author_is_moderator() {
        return false;
    }
    let explicit = rule
        .config
        .get("moderators_exempt")
        .and_then(Value::as_bool);
    let action = rule.config.get("action").and_then(Value::as_str);
    let default_exempt = action.map(|a| DEFAULT_EXEMPT_ACTIONS.contains(&a)).unwrap_or(false);
    explicit.unwrap_or(default_exempt)
}

/// Evaluate a full rule against a top-level item. This is the public entry
/// point the supervisor calls per (rule, item) pair.
pub fn evaluate(rule: &Rule, item: &dyn ItemFacade) -> bool {
    evaluate_with_record(rule, item).0
}

/// Like [`evaluate`], but also returns the [`MatchRecord`] accumulated during
/// the walk, so a caller (the supervisor's dispatch step) can resolve
/// `{{match}}`/`{{match-<name>}}` placeholders in action templates against
/// the same values the rule matched on.
pub fn evaluate_with_record(rule: &Rule, item: &dyn ItemFacade) -> (bool, MatchRecord) {
    let mut record = MatchRecord::new();
    if moderators_exempt_gate(rule, item) {
        return (false, record);
    }
    let matched = matches!(evaluate_item_scope(&rule.config, item, &mut record), Walk::Matched);
    (matched, record)
}

fn evaluate_item_scope(config: &serde_yaml::Mapping, item: &dyn ItemFacade, record: &mut MatchRecord) -> Walk {
    let checks = item_checks(item.kind());
    let threshold_mode = config
        .get("satisfy_any_threshold")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let mut any_threshold_passed = false;

    for (k, v) in config.iter() {
        let Some(raw_key) = k.as_str() else { continue };

        if SCOPE_NAMES.contains(&raw_key) {
            if let Value::Mapping(sub) = v {
                let sub_ok = match raw_key {
                    "author" => match evaluate_author_scope(sub, item.author(), item.subreddit_name(), record) {
                        Walk::Matched => true,
                        Walk::Failed => false,
                        Walk::Abort => return Walk::Abort,
                    },
                    "parent_submission" => match item.parent_submission() {
                        Ok(Some(parent)) => {
                            match evaluate_item_scope(sub, parent.as_ref(), record) {
                                Walk::Matched => true,
                                Walk::Failed => false,
                                Walk::Abort => return Walk::Abort,
                            }
                        }
                        _ => false,
                    },
                    "parent_comment" => match item.parent_comment() {
                        Ok(Some(parent)) => {
                            match evaluate_item_scope(sub, parent.as_ref(), record) {
                                Walk::Matched => true,
                                Walk::Failed => false,
                                Walk::Abort => return Walk::Abort,
                            }
                        }
                        _ => false,
                    },
                    "crosspost_subreddit" => match item.crosspost_subreddit() {
                        Some(sr) => match evaluate_subreddit_scope(sub, sr.as_ref(), record) {
                            Walk::Matched => true,
                            Walk::Failed => false,
                            Walk::Abort => return Walk::Abort,
                        },
                        None => false,
                    },
                    "crosspost_author" => match item.crosspost_parent() {
                        Ok(Some(parent)) => {
                            match evaluate_author_scope(sub, parent.author(), parent.subreddit_name(), record) {
                                Walk::Matched => true,
                                Walk::Failed => false,
                                Walk::Abort => return Walk::Abort,
                            }
                        }
                        _ => false,
                    },
                    _ => unreachable!(),
                };
                if !sub_ok {
                    return Walk::Failed;
                }
                continue;
            }
        }

        let Ok(parsed) = parse_key(raw_key) else { continue };
        let applicable: Vec<_> = parsed.names.iter().filter(|n| checks.contains_key(n.as_str())).collect();
        if applicable.is_empty() {
            continue;
        }

        let test_values = value_list(v);
        let mut passed = false;
        'outer: for name in &applicable {
            let def = &checks[name.as_str()];
            let result = (def.getter)(item);
            let got = match result {
                Ok(Some(value)) => {
                    if def.skip_if.as_ref() == Some(&value) {
                        return Walk::Abort;
                    }
                    value
                }
                Ok(None) => {
                    if def.skip_if.is_some() {
                        return Walk::Abort;
                    }
                    continue;
                }
                Err(e) => {
                    log::warn!("check `{name}` failed to fetch its value, skipping it: {e}");
                    continue;
                }
            };
            record.record(name.as_str(), got.clone());
            let mut options: Vec<&str> = Vec::new();
            options.extend(def.forced_options.iter().copied());
            options.extend(parsed.options.iter().map(|s| s.as_str()));
            let owned_opts = owned(&options);
            let tag = resolve_tag(def.default, &owned_opts);
            for test in &test_values {
                let substituted = placeholders::substitute(test, item, record);
                match compare(tag, &got, &substituted, &owned_opts) {
                    Ok(true) => {
                        passed = true;
                        break 'outer;
                    }
                    Ok(false) => {}
                    Err(e) => {
                        log::error!("comparator error on check `{name}`: {e}");
                    }
                }
            }
        }

        let key_passed = passed != parsed.negated;
        let is_threshold_key = applicable.iter().any(|n| THRESHOLD_CHECK_NAMES.contains(&n.as_str()));

        if threshold_mode && is_threshold_key {
            if key_passed {
                any_threshold_passed = true;
            }
            continue;
        }

        if !key_passed {
            return Walk::Failed;
        }
    }

    if threshold_mode && !any_threshold_passed {
        return Walk::Failed;
    }
    Walk::Matched
}

fn evaluate_author_scope(
    config: &serde_yaml::Mapping,
    author: &dyn crate::item::AuthorFacade,
    subreddit: &str,
    record: &mut MatchRecord,
) -> Walk {
    let checks = author_checks();
    let threshold_mode = config
        .get("satisfy_any_threshold")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let mut any_threshold_passed = false;

    for (k, v) in config.iter() {
        let Some(raw_key) = k.as_str() else { continue };
        let Ok(parsed) = parse_key(raw_key) else { continue };
        let applicable: Vec<_> = parsed.names.iter().filter(|n| checks.contains_key(n.as_str())).collect();
        if applicable.is_empty() {
            continue;
        }

        let test_values = value_list(v);
        let mut passed = false;
        'outer: for name in &applicable {
            let def = &checks[name.as_str()];
            let result = (def.getter)(author, subreddit);
            let got = match result {
                Ok(Some(value)) => {
                    if def.skip_if.as_ref() == Some(&value) {
                        return Walk::Abort;
                    }
                    value
                }
                Ok(None) => {
                    if def.skip_if.is_some() {
                        return Walk::Abort;
                    }
                    continue;
                }
                Err(e) => {
                    log::warn!("author check `{name}` failed to fetch its value, skipping it: {e}");
                    continue;
                }
            };
            record.record(name.as_str(), got.clone());
            let mut options: Vec<&str> = Vec::new();
            options.extend(def.forced_options.iter().copied());
            options.extend(parsed.options.iter().map(|s| s.as_str()));
            let owned_opts = owned(&options);
            let tag = resolve_tag(def.default, &owned_opts);
            for test in &test_values {
                match compare(tag, &got, test, &owned_opts) {
                    Ok(true) => {
                        passed = true;
                        break 'outer;
                    }
                    Ok(false) => {}
                    Err(e) => log::error!("comparator error on author check `{name}`: {e}"),
                }
            }
        }

        let key_passed = passed != parsed.negated;
        let is_threshold_key = applicable.iter().any(|n| THRESHOLD_CHECK_NAMES.contains(&n.as_str()));

        if threshold_mode && is_threshold_key {
            if key_passed {
                any_threshold_passed = true;
            }
            continue;
        }

        if !key_passed {
            return Walk::Failed;
        }
    }

    if threshold_mode && !any_threshold_passed {
        return Walk::Failed;
    }
    Walk::Matched
}

fn evaluate_subreddit_scope(
    config: &serde_yaml::Mapping,
    subreddit: &dyn crate::item::SubredditFacade,
    record: &mut MatchRecord,
) -> Walk {
    let checks = crosspost_subreddit_checks();

    for (k, v) in config.iter() {
        let Some(raw_key) = k.as_str() else { continue };
        let Ok(parsed) = parse_key(raw_key) else { continue };
        let applicable: Vec<_> = parsed.names.iter().filter(|n| checks.contains_key(n.as_str())).collect();
        if applicable.is_empty() {
            continue;
        }

        let test_values = value_list(v);
        let mut passed = false;
        'outer: for name in &applicable {
            let def = &checks[name.as_str()];
            let got = match (def.getter)(subreddit) {
                Some(value) => {
                    if def.skip_if.as_ref() == Some(&value) {
                        return Walk::Abort;
                    }
                    value
                }
                None => {
                    if def.skip_if.is_some() {
                        return Walk::Abort;
                    }
                    continue;
                }
            };
            record.record(name.as_str(), got.clone());
            let mut options: Vec<&str> = Vec::new();
            options.extend(def.forced_options.iter().copied());
            options.extend(parsed.options.iter().map(|s| s.as_str()));
            let owned_opts = owned(&options);
            let tag = resolve_tag(def.default, &owned_opts);
            for test in &test_values {
                match compare(tag, &got, test, &owned_opts) {
                    Ok(true) => {
                        passed = true;
                        break 'outer;
                    }
                    Ok(false) => {}
                    Err(e) => log::error!("comparator error on crosspost_subreddit check `{name}`: {e}"),
                }
            }
        }

        if passed == parsed.negated {
            return Walk::Failed;
        }
    }

    Walk::Matched
}

fn owned(options: &[&str]) -> Vec<String> {
    options.iter().map(|s| s.to_string()).collect()
}
