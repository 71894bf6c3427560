//! The action dispatcher: runs after a rule matches, applying every
//! action-shaped key present in the rule against the item (and, via
//! sub-scopes, its author or parent).

use serde_yaml::Value;

use crate::error::DispatchError;
use crate::item::{AuthorFacade, ItemFacade};
use crate::placeholders::{self, MatchRecord};
use crate::rule::Rule;

const DEFAULT_MESSAGE_SUBJECT: &str = "A message from the moderators of r/{{subreddit}}";
const DEFAULT_MODMAIL_SUBJECT: &str = "Moderator bot notification";

/// Run every action key in `rule.config` against `item`. Returns whether
/// any action actually ran.
pub fn dispatch(rule: &Rule, item: &mut dyn ItemFacade, record: &MatchRecord) -> Result<bool, DispatchError> {
    dispatch_item_config(&rule.config, item, record)
}

fn dispatch_item_config(
    config: &serde_yaml::Mapping,
    item: &mut dyn ItemFacade,
    record: &MatchRecord,
) -> Result<bool, DispatchError> {
    let mut ran = false;

    for (k, v) in config.iter() {
        let Some(key) = k.as_str() else { continue };
        match key {
            "action" => {
                if let Some(name) = v.as_str() {
                    if dispatch_action_verb(name, config, item, record)? {
                        ran = true;
                    }
                    if name != "report" {
                        if let Some(reason) = config.get("action_reason").and_then(Value::as_str) {
                            log::info!(
                                "action_reason cannot be attached to rules enforced outside reports. Logging instead: {reason}"
                            );
                        }
                    }
                }
            }
            "ignore_reports" => {
                if v.as_bool() == Some(true) {
                    item.ignore_reports()?;
                    ran = true;
                }
            }
            "comment" | "reply" => {
                if let Some(template) = v.as_str() {
                    let body = placeholders::substitute(template, item, record);
                    let locked = config.get("comment_locked").and_then(Value::as_bool).unwrap_or(false);
                    let stickied = config
                        .get("comment_stickied")
                        .and_then(Value::as_bool)
                        .unwrap_or(false);
                    item.reply(&body, locked, stickied)?;
                    ran = true;
                }
            }
            "message" => {
                if let Some(template) = v.as_str() {
                    let subject_template = config
                        .get("message_subject")
                        .and_then(Value::as_str)
                        .unwrap_or(DEFAULT_MESSAGE_SUBJECT);
                    let subject = placeholders::substitute(subject_template, item, record);
                    let body = placeholders::substitute(template, item, record);
                    item.send_modmail_to_author(&subject, &body)?;
                    ran = true;
                }
            }
            "modmail" => {
                if let Some(template) = v.as_str() {
                    let subject_template = config
                        .get("modmail_subject")
                        .and_then(Value::as_str)
                        .unwrap_or(DEFAULT_MODMAIL_SUBJECT);
                    let subject = placeholders::substitute(subject_template, item, record);
                    let body = placeholders::substitute(template, item, record);
                    item.send_modmail_to_subreddit(&subject, &body)?;
                    ran = true;
                }
            }
            "set_sticky" => {
                if let Some(b) = v.as_bool() {
                    item.set_sticky(b)?;
                    ran = true;
                }
            }
            "set_locked" => {
                if let Some(b) = v.as_bool() {
                    item.set_locked(b)?;
                    ran = true;
                }
            }
            "set_nsfw" => {
                if let Some(b) = v.as_bool() {
                    item.set_nsfw(b)?;
                    ran = true;
                }
            }
            "set_spoiler" => {
                if let Some(b) = v.as_bool() {
                    item.set_spoiler(b)?;
                    ran = true;
                }
            }
            "set_contest_mode" => {
                if let Some(b) = v.as_bool() {
                    item.set_contest_mode(b)?;
                    ran = true;
                }
            }
            "set_original_content" => {
                if let Some(b) = v.as_bool() {
                    item.set_original_content(b)?;
                    ran = true;
                }
            }
            "set_suggested_sort" => {
                if let Some(s) = v.as_str() {
                    item.set_suggested_sort(s)?;
                    ran = true;
                }
            }
            "set_flair" => {
                let flair = parse_flair_value(v)?;
                let overwrite = config.get("overwrite_flair").and_then(Value::as_bool).unwrap_or(false);
                if overwrite || item.flair_text().map(|t| t.is_empty()).unwrap_or(true) {
                    item.set_item_flair(
                        flair.text.as_deref(),
                        flair.css_class.as_deref(),
                        flair.template_id.as_deref(),
                        overwrite,
                    )?;
                    ran = true;
                }
            }
            "author" => {
                if let Value::Mapping(sub) = v {
                    let subreddit = item.subreddit_name().to_string();
                    if dispatch_author_config(sub, item.author_mut(), &subreddit)? {
                        ran = true;
                    }
                }
            }
            "crosspost_author" => {
                if let Value::Mapping(sub) = v {
                    if let Some(mut parent) = item.crosspost_parent()? {
                        let subreddit = parent.subreddit_name().to_string();
                        if dispatch_author_config(sub, parent.author_mut(), &subreddit)? {
                            ran = true;
                        }
                    }
                }
            }
            "parent_submission" => {
                if let Value::Mapping(sub) = v {
                    if let Some(mut parent) = item.parent_submission()? {
                        if dispatch_item_config(sub, parent.as_mut(), record)? {
                            ran = true;
                        }
                    }
                }
            }
            "parent_comment" => {
                if let Value::Mapping(sub) = v {
                    if let Some(mut parent) = item.parent_comment()? {
                        if dispatch_item_config(sub, parent.as_mut(), record)? {
                            ran = true;
                        }
                    }
                }
            }
            _ => {}
        }
    }

    Ok(ran)
}

fn dispatch_author_config(
    config: &serde_yaml::Mapping,
    author: &mut dyn AuthorFacade,
    subreddit: &str,
) -> Result<bool, DispatchError> {
    let mut ran = false;
    for (k, v) in config.iter() {
        let Some(key) = k.as_str() else { continue };
        if key == "set_flair" {
            let flair = parse_flair_value(v)?;
            let overwrite = config.get("overwrite_flair").and_then(Value::as_bool).unwrap_or(false);
            let current = author.flair_text(subreddit)?;
            if overwrite || current.map(|t| t.is_empty()).unwrap_or(true) {
                author.set_flair(
                    subreddit,
                    flair.text.as_deref(),
                    flair.css_class.as_deref(),
                    flair.template_id.as_deref(),
                    overwrite,
                )?;
                ran = true;
            }
        }
    }
    Ok(ran)
}

fn dispatch_action_verb(
    name: &str,
    config: &serde_yaml::Mapping,
    item: &mut dyn ItemFacade,
    record: &MatchRecord,
) -> Result<bool, DispatchError> {
    match name {
        "approve" => {
            if item.is_removed() {
                return Ok(false);
            }
            if item.is_approved() && config.get("reports").is_none() {
                return Ok(false);
            }
            item.approve()?;
            Ok(true)
        }
        "remove" => {
            if item.is_approved() {
                return Ok(false);
            }
            item.remove(false)?;
            Ok(true)
        }
        "spam" => {
            item.remove(true)?;
            Ok(true)
        }
        "report" => {
            let reason_template = config
                .get("report_reason")
                .and_then(Value::as_str)
                .or_else(|| config.get("action_reason").and_then(Value::as_str));
            match reason_template {
                Some(template) => {
                    let reason = placeholders::substitute(template, item, record);
                    item.report(&reason)?;
                    Ok(true)
                }
                None => Ok(false),
            }
        }
        "filter" => {
            log::warn!("`filter` action requires legacy AutoModerator enforcement and was not applied here");
            Ok(false)
        }
        other => {
            log::warn!("unknown action verb `{other}`");
            Ok(false)
        }
    }
}

#[derive(Debug, Default)]
struct FlairValue {
    text: Option<String>,
    css_class: Option<String>,
    template_id: Option<String>,
}

fn parse_flair_value(v: &Value) -> Result<FlairValue, DispatchError> {
    match v {
        Value::String(s) => Ok(FlairValue {
            text: Some(s.clone()),
            css_class: None,
            template_id: None,
        }),
        Value::Sequence(items) if items.len() == 2 => Ok(FlairValue {
            text: items[0].as_str().map(str::to_string),
            css_class: items[1].as_str().map(str::to_string),
            template_id: None,
        }),
        Value::Mapping(m) => {
            let template_id = m
                .get("template_id")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    DispatchError::MalformedValue(
                        "set_flair".to_string(),
                        "mapping form requires `template_id`".to_string(),
                    )
                })?
                .to_string();
            Ok(FlairValue {
                text: m.get("text").and_then(Value::as_str).map(str::to_string),
                css_class: m.get("css_class").and_then(Value::as_str).map(str::to_string),
                template_id: Some(template_id),
            })
        }
        other => Err(DispatchError::MalformedValue(
            "set_flair".to_string(),
            format!("unsupported value shape: {other:?}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::fakes::FakeItem;
    use crate::rule::parse_rule;

    fn yaml_rule(s: &str) -> Rule {
        parse_rule(serde_yaml::from_str(s).unwrap()).unwrap()
    }

    #[test]
    fn remove_action_removes_item() {
        let rule = yaml_rule("id: abcde\naction: remove\n");
        let mut item = FakeItem::default();
        let record = MatchRecord::new();
        let ran = dispatch(&rule, &mut item, &record).unwrap();
        assert!(ran);
        assert!(item.is_removed());
    }

    #[test]
    fn remove_is_noop_when_already_approved() {
        let rule = yaml_rule("id: abcde\naction: remove\n");
        let mut item = FakeItem {
            is_approved: true,
            ..Default::default()
        };
        let record = MatchRecord::new();
        let ran = dispatch(&rule, &mut item, &record).unwrap();
        assert!(!ran);
    }

    #[test]
    fn approve_is_noop_when_removed() {
        let rule = yaml_rule("id: abcde\naction: approve\n");
        let mut item = FakeItem {
            is_removed: true,
            ..Default::default()
        };
        let record = MatchRecord::new();
        let ran = dispatch(&rule, &mut item, &record).unwrap();
        assert!(!ran);
    }

    #[test]
    fn set_flair_two_element_list() {
        let v: Value = serde_yaml::from_str("[\"Approved\", \"green\"]").unwrap();
        let flair = parse_flair_value(&v).unwrap();
        assert_eq!(flair.text.as_deref(), Some("Approved"));
        assert_eq!(flair.css_class.as_deref(), Some("green"));
    }

    #[test]
    fn set_flair_mapping_requires_template_id() {
        let v: Value = serde_yaml::from_str("text: Approved\n").unwrap();
        let err = parse_flair_value(&v).unwrap_err();
        assert!(matches!(err, DispatchError::MalformedValue(_, _)));
    }
}
