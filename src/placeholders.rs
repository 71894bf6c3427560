//! `{{token}}` substitution over check test-values and action arguments.
//!
//! Two kinds of token: `match`/`match-<name>`, resolved against the
//! per-evaluation [`MatchRecord`], and a small fixed set of item-derived
//! tokens (`author`, `body`, `subreddit`, ...). Unknown tokens, and tokens
//! that would resolve to nothing, are left untouched in the output.

use regex::Regex;

use crate::item::{CheckValue, ItemFacade};

/// Per-evaluation record of check-name -> raw getter value, in insertion
/// order. Backs `{{match}}` (first inserted) and `{{match-<name>}}`.
///
/// An ordinary `HashMap` cannot express "first inserted" without also
/// storing insertion order, so this is a small ordered association list
/// rather than a hash table — evaluations only ever touch a handful of
/// checks, so linear lookup is not a concern.
#[derive(Debug, Clone, Default)]
pub struct MatchRecord {
    entries: Vec<(String, CheckValue)>,
}

impl MatchRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a check's getter result. Only the first value recorded under
    /// a given name is kept, matching the original engine's single `matches`
    /// dict entry per check name.
    pub fn record(&mut self, name: &str, value: CheckValue) {
        if !self.entries.iter().any(|(n, _)| n == name) {
            self.entries.push((name.to_string(), value));
        }
    }

    pub fn first(&self) -> Option<&CheckValue> {
        self.entries.first().map(|(_, v)| v)
    }

    pub fn get(&self, name: &str) -> Option<&CheckValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

fn render(value: &CheckValue) -> String {
    value
        .as_text_candidates()
        .first()
        .cloned()
        .unwrap_or_default()
}

fn item_token(token: &str, item: &dyn ItemFacade) -> Option<String> {
    match token {
        "author" => Some(item.author().name().to_string()),
        "author_flair_text" => item.author().flair_text(item.subreddit_name()).ok().flatten(),
        "author_flair_css_class" => item
            .author()
            .flair_css_class(item.subreddit_name())
            .ok()
            .flatten(),
        "author_flair_template_id" => item
            .author()
            .flair_template_id(item.subreddit_name())
            .ok()
            .flatten(),
        "body" => item.body(),
        "permalink" => Some(item.permalink().to_string()),
        "subreddit" => Some(item.subreddit_name().to_string()),
        "kind" => Some(
            match item.kind() {
                crate::item::ItemKind::Submission => "submission",
                crate::item::ItemKind::Comment => "comment",
                crate::item::ItemKind::ModqueueEntry => "modqueue",
                crate::item::ItemKind::Modmail => "modmail",
            }
            .to_string(),
        ),
        "title" => item.title(),
        "domain" => item.domain().ok().flatten().or_else(|| Some(item.subreddit_name().to_string())),
        "url" => item.url(),
        "media_author" => item.media().and_then(|m| m.author_name),
        "media_author_url" => item.media().and_then(|m| m.author_url),
        "media_title" => item.media().and_then(|m| m.title),
        "media_description" => item.media().and_then(|m| m.description),
        _ => None,
    }
}

/// Replace every `{{token}}` occurrence in `text`. Unresolved tokens are
/// left verbatim.
pub fn substitute(text: &str, item: &dyn ItemFacade, record: &MatchRecord) -> String {
    let token_re = Regex::new(r"\{\{(.*?)\}\}").expect("static pattern");
    token_re
        .replace_all(text, |caps: &regex::Captures| {
            let group = caps[1].trim();
            let replacement = if group == "match" {
                record.first().map(render)
            } else if let Some(key) = group.strip_prefix("match-") {
                record.get(key).map(render)
            } else {
                item_token(group, item)
            };
            replacement.unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::fakes::FakeItem;

    #[test]
    fn match_with_no_key_takes_first_inserted() {
        let mut record = MatchRecord::new();
        record.record("body", CheckValue::Text("hello".to_string()));
        record.record("id", CheckValue::Text("abcde".to_string()));
        let item = FakeItem::default();
        assert_eq!(substitute("{{match}}", &item, &record), "hello");
    }

    #[test]
    fn match_with_key_looks_up_by_name() {
        let mut record = MatchRecord::new();
        record.record("body", CheckValue::Text("hello".to_string()));
        record.record("id", CheckValue::Text("abcde".to_string()));
        let item = FakeItem::default();
        assert_eq!(substitute("{{match-id}}", &item, &record), "abcde");
    }

    #[test]
    fn unknown_token_left_untouched() {
        let record = MatchRecord::new();
        let item = FakeItem::default();
        assert_eq!(substitute("{{nonsense}}", &item, &record), "{{nonsense}}");
    }

    #[test]
    fn author_token_resolves_from_item() {
        let record = MatchRecord::new();
        let mut item = FakeItem::default();
        item.author.name = "test_user".to_string();
        assert_eq!(
            substitute("Hello, {{author}}", &item, &record),
            "Hello, test_user"
        );
    }
}
