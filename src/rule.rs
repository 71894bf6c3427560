//! Rule parsing: turns one decoded YAML mapping into a normalized [`Rule`],
//! expanding `standard:` shorthands and computing the `requires_bam` flag.

use regex::Regex;
use serde_yaml::Value;

use crate::error::RuleParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Submission,
    Comment,
    Modqueue,
    Modmail,
    Report,
    Any,
}

impl RuleKind {
    fn from_str(s: &str) -> Self {
        match s {
            "submission" => RuleKind::Submission,
            "comment" => RuleKind::Comment,
            "modqueue" => RuleKind::Modqueue,
            "modmail" => RuleKind::Modmail,
            "report" => RuleKind::Report,
            _ => RuleKind::Any,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Submission => "submission",
            RuleKind::Comment => "comment",
            RuleKind::Modqueue => "modqueue",
            RuleKind::Modmail => "modmail",
            RuleKind::Report => "report",
            RuleKind::Any => "any",
        }
    }
}

/// A parsed, normalized rule. Immutable once built.
#[derive(Debug, Clone)]
pub struct Rule {
    pub config: serde_yaml::Mapping,
    pub kind: RuleKind,
    pub priority: i64,
    pub requires_bam: bool,
}

impl Rule {
    /// True for rules whose action pre-empts AutoModerator's own queue
    /// ordering (`remove`/`spam`/`filter`).
    pub fn is_priority(&self) -> bool {
        matches!(
            self.config.get("action").and_then(Value::as_str),
            Some("remove") | Some("spam") | Some("filter")
        )
    }

    /// Render this rule back to the legacy AutoModerator YAML dialect.
    /// Only meaningful for rules that are not `requires_bam`.
    pub fn to_reddit_yaml(&self) -> Result<String, serde_yaml::Error> {
        let mut out = self.config.clone();
        out.insert(Value::from("type"), Value::from(self.kind.as_str()));
        out.insert(Value::from("priority"), Value::from(self.priority));
        serde_yaml::to_string(&Value::Mapping(out))
    }
}

/// A single rule key split into its negation flag, OR-group of check
/// names, and comparator/flag options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    pub negated: bool,
    pub names: Vec<String>,
    pub options: Vec<String>,
}

/// Parse a rule key of the form `[~]name[+name...] [(opt[, opt]...)]`.
pub fn parse_key(raw: &str) -> Result<ParsedKey, RuleParseError> {
    let re = Regex::new(r"^(~)?([A-Za-z0-9_]+(?:\+[A-Za-z0-9_]+)*)\s*(?:\(([^)]*)\))?$")
        .expect("static pattern");
    let caps = re
        .captures(raw.trim())
        .ok_or_else(|| RuleParseError::MalformedKey(raw.to_string()))?;
    let negated = caps.get(1).is_some();
    let names = caps[2].split('+').map(|s| s.to_string()).collect();
    let options = caps
        .get(3)
        .map(|m| {
            m.as_str()
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();
    Ok(ParsedKey {
        negated,
        names,
        options,
    })
}

const BAM_EXTENSION_NAMES: &[&str] = &[
    "is_banned",
    "parent_comment",
    "crosspost_subreddit",
    "crosspost_author",
    "combined_karma",
    "reports",
    "is_edited",
    "media_author",
    "media_author_url",
    "media_title",
    "media_description",
    "log",
    "comment",
    "reply",
    "message",
    "modmail",
    "set_flair",
    "set_sticky",
    "set_locked",
    "set_nsfw",
    "set_spoiler",
    "set_contest_mode",
    "set_original_content",
    "set_suggested_sort",
];

/// Known `standard:` shorthands and the canned checks they expand to.
/// Lists are a faithful-in-spirit recreation of the upstream shorthand
/// catalog (exact membership is not load-bearing; `imgur.com` inclusion is
/// the one behavior this crate's tests pin down).
fn expand_standard(name: &str, config: &mut serde_yaml::Mapping) -> Result<(), RuleParseError> {
    match name {
        "image hosting sites" => {
            set_domain_list(
                config,
                &[
                    "imgur.com", "flickr.com", "photobucket.com", "imageshack.us",
                    "tinypic.com", "postimage.org", "ibb.co",
                ],
            );
        }
        "direct image links" => {
            config.insert(
                Value::from("url (regex)"),
                Value::from(r"\.(jpe?g|png|gifv?|webp)(\?\S*)?$"),
            );
        }
        "streaming sites" => {
            set_domain_list(
                config,
                &[
                    "twitch.tv", "youtube.com", "youtu.be", "vimeo.com", "dailymotion.com",
                ],
            );
        }
        "video hosting sites" => {
            set_domain_list(
                config,
                &["youtube.com", "youtu.be", "vimeo.com", "dailymotion.com", "streamable.com"],
            );
        }
        "meme generator sites" => {
            set_domain_list(
                config,
                &["memegenerator.net", "imgflip.com", "makeameme.org"],
            );
        }
        "facebook links" => {
            config.insert(
                Value::from("url+body (regex)"),
                Value::from(r"facebook\.com"),
            );
        }
        "amazon affiliate links" => {
            config.insert(
                Value::from("url+body (regex)"),
                Value::from(r"amazon\.[a-z.]+/.*tag="),
            );
        }
        "crowdfunding sites" => {
            set_domain_list(
                config,
                &["kickstarter.com", "indiegogo.com", "gofundme.com", "patreon.com"],
            );
        }
        other => return Err(RuleParseError::UnknownStandard(other.to_string())),
    }
    Ok(())
}

fn set_domain_list(config: &mut serde_yaml::Mapping, domains: &[&str]) {
    let list: Vec<Value> = domains.iter().map(|d| Value::from(*d)).collect();
    config.insert(Value::from("domain"), Value::Sequence(list));
}

fn key_uses_bam_extension(raw_key: &str) -> bool {
    match parse_key(raw_key) {
        Ok(parsed) => parsed
            .names
            .iter()
            .any(|n| BAM_EXTENSION_NAMES.contains(&n.as_str())),
        Err(_) => false,
    }
}

/// Parse a decoded YAML mapping into a normalized [`Rule`].
pub fn parse_rule(doc: Value) -> Result<Rule, RuleParseError> {
    let mapping = match doc {
        Value::Mapping(m) => m,
        _ => return Err(RuleParseError::NotAMapping),
    };

    let mut config = serde_yaml::Mapping::new();
    let mut kind = RuleKind::Any;
    let mut priority: i64 = 0;
    let mut requires_bam = false;
    let mut explicit_bam: Option<bool> = None;

    for (k, v) in mapping.into_iter() {
        let key = match k.as_str() {
            Some(s) => s.to_string(),
            None => continue,
        };
        match key.as_str() {
            "type" => {
                let s = v.as_str().unwrap_or("any");
                kind = RuleKind::from_str(s);
                if matches!(kind, RuleKind::Modmail | RuleKind::Report) {
                    requires_bam = true;
                }
            }
            "priority" => {
                priority = v
                    .as_i64()
                    .ok_or_else(|| RuleParseError::InvalidPriority(format!("{v:?}")))?;
            }
            "bam" => {
                let flag = v.as_bool().unwrap_or(false);
                explicit_bam = Some(flag);
            }
            "ignore_reports" => {
                if v.as_bool().unwrap_or(false) {
                    requires_bam = true;
                }
                config.insert(Value::from(key), v);
            }
            "log" => {
                requires_bam = true;
                config.insert(Value::from(key), v);
            }
            _ => {
                // `report_reason` is left exactly as written: it's both a
                // check-registry alias for `report_reasons` (see checks.rs)
                // and the literal config key `action: report` reads for its
                // report text, and rewriting it here would destroy the
                // latter whenever a rule used both.
                if key_uses_bam_extension(&key) {
                    requires_bam = true;
                }
                config.insert(Value::from(key), v);
            }
        }
    }

    if let Some(standard) = config.get("standard").and_then(Value::as_str).map(str::to_string) {
        expand_standard(&standard, &mut config)?;
    }

    if let Some(flag) = explicit_bam {
        requires_bam = flag;
    }

    let rule = Rule {
        config,
        kind,
        priority,
        requires_bam,
    };

    if rule.requires_bam && rule.config.get("action").and_then(Value::as_str) == Some("filter") {
        return Err(RuleParseError::FilterRequiresBam);
    }

    Ok(rule)
}

/// Sort rules so that priority-action rules (remove/spam/filter) come
/// first, then by descending `priority` within each group.
pub fn sort_rules(mut rules: Vec<Rule>) -> Vec<Rule> {
    rules.sort_by(|a, b| {
        let a_key = (!a.is_priority(), std::cmp::Reverse(a.priority));
        let b_key = (!b.is_priority(), std::cmp::Reverse(b.priority));
        a_key.cmp(&b_key)
    });
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn parse_key_splits_negation_names_options() {
        let parsed = parse_key("~id+name (full-exact, case-sensitive)").unwrap();
        assert!(parsed.negated);
        assert_eq!(parsed.names, vec!["id", "name"]);
        assert_eq!(parsed.options, vec!["full-exact", "case-sensitive"]);
    }

    #[test]
    fn parse_key_without_options() {
        let parsed = parse_key("body").unwrap();
        assert!(!parsed.negated);
        assert_eq!(parsed.names, vec!["body"]);
        assert!(parsed.options.is_empty());
    }

    #[test]
    fn modmail_type_requires_bam() {
        let rule = parse_rule(yaml("type: modmail\naction: approve\n")).unwrap();
        assert!(rule.requires_bam);
        assert_eq!(rule.kind, RuleKind::Modmail);
    }

    #[test]
    fn filter_action_with_bam_rejected() {
        let err = parse_rule(yaml("type: modmail\naction: filter\n")).unwrap_err();
        assert_eq!(err, RuleParseError::FilterRequiresBam);
    }

    #[test]
    fn plain_automod_rule_does_not_require_bam() {
        let rule = parse_rule(yaml("body: spam\naction: remove\n")).unwrap();
        assert!(!rule.requires_bam);
    }

    #[test]
    fn log_action_requires_bam() {
        let rule = parse_rule(yaml("body: spam\nlog: \"matched\"\n")).unwrap();
        assert!(rule.requires_bam);
    }

    #[test]
    fn standard_expands_image_hosting_sites() {
        let rule = parse_rule(yaml("standard: image hosting sites\naction: remove\n")).unwrap();
        let domains = rule.config.get("domain").unwrap().as_sequence().unwrap();
        let has_imgur = domains.iter().any(|v| v.as_str() == Some("imgur.com"));
        assert!(has_imgur);
    }

    #[test]
    fn sort_rules_orders_priority_actions_first() {
        let low = parse_rule(yaml("action: approve\npriority: 10\n")).unwrap();
        let high_priority = parse_rule(yaml("action: remove\npriority: 0\n")).unwrap();
        let sorted = sort_rules(vec![low, high_priority]);
        assert_eq!(sorted[0].config.get("action").and_then(Value::as_str), Some("remove"));
    }

    #[test]
    fn report_reason_check_key_survives_parsing_unrewritten() {
        // `report_reason (contains)` is resolved as a check-registry alias
        // at evaluation time (see checks.rs), not by rewriting the key here.
        let rule = parse_rule(yaml("report_reason (contains): BAM\naction: approve\n")).unwrap();
        assert!(rule.config.get("report_reason (contains)").is_some());
        assert!(rule.config.get("report_reasons").is_none());
    }

    #[test]
    fn bare_report_reason_survives_for_action_report() {
        let rule = parse_rule(yaml(
            "body: spam\naction: report\nreport_reason: \"Potential spam\"\n",
        ))
        .unwrap();
        assert_eq!(
            rule.config.get("report_reason").and_then(Value::as_str),
            Some("Potential spam")
        );
    }
}
