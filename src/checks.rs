//! Named check registries: for each item-kind scope, a table mapping a
//! check name to its getter, default comparator, and any comparator
//! options the check forces regardless of what the rule author wrote.
//!
//! This replaces the original engine's `getattr`-based dispatch across a
//! small class hierarchy with one explicit table per scope, built once and
//! looked up by string at evaluation time (see SPEC_FULL.md §9). The base
//! table (`ModeratorChecks` in the original) applies to every item kind;
//! `PostModeratorChecks` and `CommentModeratorChecks` only add their checks
//! on top of it for `Submission`/`Comment` items respectively, so e.g. a
//! `title:` or `is_top_level:` key on a modqueue-only rule is an unknown
//! name there, not a real check.

use std::collections::HashMap;

use crate::comparators::ComparatorTag;
use crate::error::FacadeError;
use crate::item::{AuthorFacade, CheckValue, ItemFacade, ItemKind, SubredditFacade};

pub struct ItemCheckDef {
    pub name: &'static str,
    pub default: ComparatorTag,
    pub forced_options: &'static [&'static str],
    pub getter: fn(&dyn ItemFacade) -> Result<Option<CheckValue>, FacadeError>,
    /// Configured sentinel, mirroring the original engine's `skip_if=`
    /// decorator argument. Only seven checks in the original ever set this
    /// (`id`, and the post-only `crosspost_id`/`crosspost_title`/
    /// `media_author`/`media_author_url`/`media_title`/`media_description`),
    /// all of them sentinel on the getter naturally having nothing to
    /// return. When configured, a getter result of `Ok(None)` aborts the
    /// whole rule; otherwise `Ok(None)` just drops this name from its
    /// OR-group and evaluation keeps trying the remaining names.
    pub skip_if: Option<CheckValue>,
}

pub struct AuthorCheckDef {
    pub name: &'static str,
    pub default: ComparatorTag,
    pub forced_options: &'static [&'static str],
    pub getter: fn(&dyn AuthorFacade, &str) -> Result<Option<CheckValue>, FacadeError>,
    pub skip_if: Option<CheckValue>,
}

pub struct SubredditCheckDef {
    pub name: &'static str,
    pub default: ComparatorTag,
    pub forced_options: &'static [&'static str],
    pub getter: fn(&dyn SubredditFacade) -> Option<CheckValue>,
    pub skip_if: Option<CheckValue>,
}

fn reasons(item: &dyn ItemFacade) -> CheckValue {
    let mut reasons: Vec<String> = item
        .user_reports()
        .iter()
        .chain(item.mod_reports().iter())
        .map(|r| r.reason.clone())
        .collect();
    reasons.sort();
    reasons.dedup();
    CheckValue::TextList(reasons)
}

/// Checks common to every item kind — `ModeratorChecks` in the original.
fn base_item_checks() -> Vec<ItemCheckDef> {
    vec![
        ItemCheckDef {
            name: "id",
            default: ComparatorTag::FullExact,
            forced_options: &[],
            getter: |item| Ok(Some(CheckValue::Text(item.id().to_string()))),
            // The original configures `skip_if=None` here, but `id` never
            // actually returns nothing, so this can never fire in practice.
            skip_if: Some(CheckValue::Bool(false)),
        },
        ItemCheckDef {
            name: "body",
            default: ComparatorTag::IncludesWord,
            forced_options: &[],
            getter: |item| Ok(item.body().map(CheckValue::Text)),
            skip_if: None,
        },
        ItemCheckDef {
            name: "body_longer_than",
            default: ComparatorTag::Numeric,
            forced_options: &["greater-than"],
            getter: |item| Ok(item.body().map(|b| CheckValue::Number(b.chars().count() as f64))),
            skip_if: None,
        },
        ItemCheckDef {
            name: "body_shorter_than",
            default: ComparatorTag::Numeric,
            forced_options: &["less-than"],
            getter: |item| Ok(item.body().map(|b| CheckValue::Number(b.chars().count() as f64))),
            skip_if: None,
        },
        ItemCheckDef {
            name: "url",
            default: ComparatorTag::Includes,
            forced_options: &[],
            getter: |item| Ok(item.url().map(CheckValue::Text)),
            skip_if: None,
        },
        ItemCheckDef {
            name: "is_edited",
            default: ComparatorTag::Bool,
            forced_options: &[],
            getter: |item| Ok(Some(CheckValue::Bool(item.is_edited()))),
            skip_if: None,
        },
        ItemCheckDef {
            name: "reports",
            default: ComparatorTag::Numeric,
            forced_options: &["greater-than-equal"],
            getter: |item| {
                let count: u32 = item.user_reports().iter().map(|r| r.count).sum::<u32>()
                    + item.mod_reports().iter().map(|r| r.count).sum::<u32>();
                Ok(Some(CheckValue::Number(count as f64)))
            },
            skip_if: None,
        },
        ItemCheckDef {
            name: "report_reasons",
            default: ComparatorTag::Contains,
            forced_options: &[],
            getter: |item| Ok(Some(reasons(item))),
            skip_if: None,
        },
        // `report_reason` (singular) is `ModqueueModeratorChecks`'s own name
        // for this same check in the original; kept as a registry alias
        // (rather than a rule.rs key rewrite) so the bare `report_reason`
        // config key used by `action: report` is never touched by parsing.
        ItemCheckDef {
            name: "report_reason",
            default: ComparatorTag::Contains,
            forced_options: &[],
            getter: |item| Ok(Some(reasons(item))),
            skip_if: None,
        },
    ]
}

/// Checks only `PostModeratorChecks` (submissions) adds in the original.
fn post_item_checks() -> Vec<ItemCheckDef> {
    vec![
        ItemCheckDef {
            name: "title",
            default: ComparatorTag::IncludesWord,
            forced_options: &[],
            getter: |item| Ok(item.title().map(CheckValue::Text)),
            skip_if: None,
        },
        ItemCheckDef {
            name: "domain",
            default: ComparatorTag::FullExact,
            forced_options: &[],
            getter: |item| item.domain().map(|d| d.map(CheckValue::Text)),
            skip_if: None,
        },
        ItemCheckDef {
            name: "flair_text",
            default: ComparatorTag::FullExact,
            forced_options: &[],
            getter: |item| Ok(item.flair_text().map(CheckValue::Text)),
            skip_if: None,
        },
        ItemCheckDef {
            name: "flair_css_class",
            default: ComparatorTag::FullExact,
            forced_options: &[],
            getter: |item| Ok(item.flair_css_class().map(CheckValue::Text)),
            skip_if: None,
        },
        ItemCheckDef {
            name: "flair_template_id",
            default: ComparatorTag::FullExact,
            forced_options: &[],
            getter: |item| Ok(item.flair_template_id().map(CheckValue::Text)),
            skip_if: None,
        },
        ItemCheckDef {
            name: "poll_option_text",
            default: ComparatorTag::IncludesWord,
            forced_options: &[],
            getter: |item| Ok(item.poll_option_text().map(CheckValue::TextList)),
            skip_if: None,
        },
        ItemCheckDef {
            name: "poll_option_count",
            default: ComparatorTag::Numeric,
            forced_options: &[],
            getter: |item| Ok(item.poll_option_count().map(|n| CheckValue::Number(n as f64))),
            skip_if: None,
        },
        // crosspost_id/title and the media_* checks below configure
        // `skip_if` for real: the getter returns nothing exactly when the
        // item isn't a crosspost (or has no media), and the original aborts
        // the whole rule rather than silently falling through. `skip_if`'s
        // stored value is never compared for equality here — its mere
        // presence marks "abort on absence" — so `Bool(false)` is just an
        // inert placeholder that can't collide with these text getters.
        ItemCheckDef {
            name: "crosspost_id",
            default: ComparatorTag::FullExact,
            forced_options: &[],
            getter: |item| Ok(item.crosspost_id().map(CheckValue::Text)),
            skip_if: Some(CheckValue::Bool(false)),
        },
        ItemCheckDef {
            name: "crosspost_title",
            default: ComparatorTag::IncludesWord,
            forced_options: &[],
            getter: |item| Ok(item.crosspost_title().map(CheckValue::Text)),
            skip_if: Some(CheckValue::Bool(false)),
        },
        ItemCheckDef {
            name: "media_author",
            default: ComparatorTag::FullExact,
            forced_options: &[],
            getter: |item| Ok(item.media().and_then(|m| m.author_name).map(CheckValue::Text)),
            skip_if: Some(CheckValue::Bool(false)),
        },
        ItemCheckDef {
            name: "media_author_url",
            default: ComparatorTag::Includes,
            forced_options: &[],
            getter: |item| Ok(item.media().and_then(|m| m.author_url).map(CheckValue::Text)),
            skip_if: Some(CheckValue::Bool(false)),
        },
        ItemCheckDef {
            name: "media_title",
            default: ComparatorTag::IncludesWord,
            forced_options: &[],
            getter: |item| Ok(item.media().and_then(|m| m.title).map(CheckValue::Text)),
            skip_if: Some(CheckValue::Bool(false)),
        },
        ItemCheckDef {
            name: "media_description",
            default: ComparatorTag::IncludesWord,
            forced_options: &[],
            getter: |item| Ok(item.media().and_then(|m| m.description).map(CheckValue::Text)),
            skip_if: Some(CheckValue::Bool(false)),
        },
        ItemCheckDef {
            name: "is_original_content",
            default: ComparatorTag::Bool,
            forced_options: &[],
            getter: |item| Ok(Some(CheckValue::Bool(item.is_original_content()))),
            skip_if: None,
        },
        ItemCheckDef {
            name: "is_poll",
            default: ComparatorTag::Bool,
            forced_options: &[],
            getter: |item| Ok(Some(CheckValue::Bool(item.is_poll()))),
            skip_if: None,
        },
        ItemCheckDef {
            name: "is_gallery",
            default: ComparatorTag::Bool,
            forced_options: &[],
            getter: |item| Ok(Some(CheckValue::Bool(item.is_gallery()))),
            skip_if: None,
        },
    ]
}

/// Checks only `CommentModeratorChecks` adds in the original.
fn comment_item_checks() -> Vec<ItemCheckDef> {
    vec![
        ItemCheckDef {
            name: "is_top_level",
            default: ComparatorTag::Bool,
            forced_options: &[],
            getter: |item| Ok(item.depth().map(|d| CheckValue::Bool(d == 0))),
            skip_if: None,
        },
        ItemCheckDef {
            name: "is_submitter",
            default: ComparatorTag::Bool,
            forced_options: &[],
            getter: |item| Ok(item.is_submitter().map(CheckValue::Bool)),
            skip_if: None,
        },
    ]
}

/// The check table for a given item kind: the base table every kind shares,
/// plus whatever that kind's own moderator-checks class adds in the
/// original. A name absent from the resulting table is simply unknown for
/// that kind, per SPEC_FULL.md's "any unknown check name in an OR-group is
/// ignored".
pub fn item_checks(kind: ItemKind) -> HashMap<&'static str, ItemCheckDef> {
    let mut table: HashMap<&'static str, ItemCheckDef> =
        base_item_checks().into_iter().map(|d| (d.name, d)).collect();
    let extra = match kind {
        ItemKind::Submission => post_item_checks(),
        ItemKind::Comment => comment_item_checks(),
        ItemKind::ModqueueEntry | ItemKind::Modmail => Vec::new(),
    };
    for def in extra {
        table.insert(def.name, def);
    }
    table
}

pub fn author_checks() -> HashMap<&'static str, AuthorCheckDef> {
    let defs: Vec<AuthorCheckDef> = vec![
        AuthorCheckDef {
            name: "comment_karma",
            default: ComparatorTag::Numeric,
            forced_options: &[],
            getter: |a, _sr| Ok(Some(CheckValue::Number(a.comment_karma() as f64))),
            skip_if: None,
        },
        AuthorCheckDef {
            name: "post_karma",
            default: ComparatorTag::Numeric,
            forced_options: &[],
            getter: |a, _sr| Ok(Some(CheckValue::Number(a.post_karma() as f64))),
            skip_if: None,
        },
        AuthorCheckDef {
            name: "combined_karma",
            default: ComparatorTag::Numeric,
            forced_options: &[],
            getter: |a, _sr| Ok(Some(CheckValue::Number(a.combined_karma() as f64))),
            skip_if: None,
        },
        AuthorCheckDef {
            name: "account_age",
            default: ComparatorTag::Time,
            forced_options: &[],
            getter: |a, _sr| Ok(Some(CheckValue::Timestamp(a.created_utc()))),
            skip_if: None,
        },
        AuthorCheckDef {
            name: "id",
            default: ComparatorTag::FullExact,
            forced_options: &[],
            getter: |a, _sr| Ok(Some(CheckValue::Text(a.fullname().to_string()))),
            skip_if: None,
        },
        AuthorCheckDef {
            name: "name",
            default: ComparatorTag::IncludesWord,
            forced_options: &[],
            getter: |a, _sr| Ok(Some(CheckValue::Text(a.name().to_string()))),
            skip_if: None,
        },
        AuthorCheckDef {
            name: "flair_template_id",
            default: ComparatorTag::FullExact,
            forced_options: &[],
            getter: |a, sr| a.flair_template_id(sr).map(|v| v.map(CheckValue::Text)),
            skip_if: None,
        },
        AuthorCheckDef {
            name: "flair_text",
            default: ComparatorTag::FullExact,
            forced_options: &[],
            getter: |a, sr| a.flair_text(sr).map(|v| v.map(CheckValue::Text)),
            skip_if: None,
        },
        AuthorCheckDef {
            name: "flair_css_class",
            default: ComparatorTag::FullExact,
            forced_options: &[],
            getter: |a, sr| a.flair_css_class(sr).map(|v| v.map(CheckValue::Text)),
            skip_if: None,
        },
        AuthorCheckDef {
            name: "is_gold",
            default: ComparatorTag::Bool,
            forced_options: &[],
            getter: |a, _sr| Ok(Some(CheckValue::Bool(a.is_gold()))),
            skip_if: None,
        },
        AuthorCheckDef {
            name: "is_contributor",
            default: ComparatorTag::Bool,
            forced_options: &[],
            getter: |a, sr| a.is_contributor(sr).map(|b| Some(CheckValue::Bool(b))),
            skip_if: None,
        },
        AuthorCheckDef {
            name: "is_moderator",
            default: ComparatorTag::Bool,
            forced_options: &[],
            getter: |a, sr| a.is_moderator(sr).map(|b| Some(CheckValue::Bool(b))),
            skip_if: None,
        },
        AuthorCheckDef {
            name: "is_banned",
            default: ComparatorTag::Bool,
            forced_options: &[],
            getter: |a, sr| a.is_banned(sr).map(|b| Some(CheckValue::Bool(b))),
            skip_if: None,
        },
    ];
    defs.into_iter().map(|d| (d.name, d)).collect()
}

pub fn crosspost_subreddit_checks() -> HashMap<&'static str, SubredditCheckDef> {
    let defs: Vec<SubredditCheckDef> = vec![
        SubredditCheckDef {
            name: "name",
            default: ComparatorTag::IncludesWord,
            forced_options: &[],
            getter: |sr| Some(CheckValue::Text(sr.name().to_string())),
            skip_if: None,
        },
        SubredditCheckDef {
            name: "is_nsfw",
            default: ComparatorTag::Bool,
            forced_options: &[],
            getter: |sr| Some(CheckValue::Bool(sr.is_nsfw())),
            skip_if: None,
        },
    ];
    defs.into_iter().map(|d| (d.name, d)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_checks_covers_expected_names_for_every_kind() {
        let base = item_checks(ItemKind::ModqueueEntry);
        for name in [
            "id",
            "body",
            "body_longer_than",
            "body_shorter_than",
            "url",
            "is_edited",
            "reports",
            "report_reasons",
            "report_reason",
        ] {
            assert!(base.contains_key(name), "missing base check {name}");
        }
        for post_only in ["title", "domain", "is_top_level"] {
            assert!(!base.contains_key(post_only), "{post_only} should not be applicable to modqueue entries");
        }

        let post = item_checks(ItemKind::Submission);
        for name in ["title", "domain", "is_original_content", "is_poll", "is_gallery", "crosspost_id"] {
            assert!(post.contains_key(name), "missing post check {name}");
        }
        assert!(!post.contains_key("is_top_level"));

        let comment = item_checks(ItemKind::Comment);
        assert!(comment.contains_key("is_top_level"));
        assert!(comment.contains_key("is_submitter"));
        assert!(!comment.contains_key("title"));
        assert!(!comment.contains_key("domain"));
    }

    #[test]
    fn report_reason_alias_shares_report_reasons_getter() {
        let checks = item_checks(ItemKind::ModqueueEntry);
        assert_eq!(
            checks.get("report_reason").unwrap().default,
            checks.get("report_reasons").unwrap().default
        );
    }

    #[test]
    fn only_the_grounded_seven_checks_configure_skip_if() {
        let checks = item_checks(ItemKind::Submission);
        for name in [
            "id",
            "crosspost_id",
            "crosspost_title",
            "media_author",
            "media_author_url",
            "media_title",
            "media_description",
        ] {
            assert!(checks.get(name).unwrap().skip_if.is_some(), "{name} should configure skip_if");
        }
        for name in ["body", "url", "title", "domain", "is_poll"] {
            assert!(checks.get(name).unwrap().skip_if.is_none(), "{name} should not configure skip_if");
        }
    }

    #[test]
    fn author_checks_split_id_and_name() {
        let checks = author_checks();
        assert_eq!(checks.get("id").unwrap().default, ComparatorTag::FullExact);
        assert_eq!(checks.get("name").unwrap().default, ComparatorTag::IncludesWord);
    }
}
