//! The item facade: a uniform attribute surface over heterogeneous site
//! content (submissions, comments, modqueue entries) that the check
//! registry and evaluator read from.
//!
//! The real implementation of these traits lives with the collaborator that
//! owns the site-API session; this crate only defines the contract and, for
//! its own tests, an in-memory double.

use chrono::{DateTime, Utc};

use crate::error::FacadeError;

/// What kind of content an item is. Drives which check registry applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Submission,
    Comment,
    ModqueueEntry,
    Modmail,
}

/// A single report entry (user report or moderator report) with its count.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub reason: String,
    pub count: u32,
}

/// The subset of a submission's `media.oembed` payload the checks/placeholders need.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaInfo {
    pub author_name: Option<String>,
    pub author_url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// A value produced by a check getter or a placeholder lookup.
///
/// Every getter returns `Option<CheckValue>`; `None` means the attribute had
/// nothing to report (a comment has no `url`, a non-crosspost has no
/// `crosspost_id`, ...). Most checks treat that as an ordinary non-match —
/// see `checks::ItemCheckDef::skip_if` for the handful that instead abort
/// the whole rule when their value is absent.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckValue {
    Text(String),
    TextList(Vec<String>),
    Number(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl CheckValue {
    pub fn as_text_candidates(&self) -> Vec<String> {
        match self {
            CheckValue::Text(s) => vec![s.clone()],
            CheckValue::TextList(v) => v.clone(),
            CheckValue::Number(n) => vec![n.to_string()],
            CheckValue::Bool(b) => vec![b.to_string()],
            CheckValue::Timestamp(t) => vec![t.to_rfc3339()],
        }
    }
}

/// Attribute surface for a post, comment, or modqueue entry.
///
/// Getters that round-trip to the site return `Result<_, FacadeError>`; the
/// evaluator treats `Err` the same as a skip (logs at `warn!`, fails the
/// check) rather than aborting the rule walk.
pub trait ItemFacade {
    fn kind(&self) -> ItemKind;
    fn id(&self) -> &str;
    fn fullname(&self) -> &str;
    fn permalink(&self) -> &str;
    fn subreddit_name(&self) -> &str;

    fn author(&self) -> &dyn AuthorFacade;
    fn author_mut(&mut self) -> &mut dyn AuthorFacade;
    /// True when the item's author currently moderates this subreddit —
    /// drives the `moderators_exempt` gate, independent of the `author`
    /// check scope.
    fn author_is_moderator(&self) -> bool;

    fn body(&self) -> Option<String>;
    fn url(&self) -> Option<String>;
    fn title(&self) -> Option<String>;
    fn domain(&self) -> Result<Option<String>, FacadeError>;

    fn flair_text(&self) -> Option<String>;
    fn flair_css_class(&self) -> Option<String>;
    fn flair_template_id(&self) -> Option<String>;

    fn is_edited(&self) -> bool;
    fn is_original_content(&self) -> bool;
    fn is_poll(&self) -> bool;
    fn poll_option_text(&self) -> Option<Vec<String>>;
    fn poll_option_count(&self) -> Option<u32>;
    fn is_gallery(&self) -> bool;

    /// `None` when the item is not a crosspost.
    fn crosspost_parent(&self) -> Result<Option<Box<dyn ItemFacade>>, FacadeError>;
    fn crosspost_id(&self) -> Option<String>;
    fn crosspost_title(&self) -> Option<String>;
    fn crosspost_subreddit(&self) -> Option<Box<dyn SubredditFacade>>;

    fn media(&self) -> Option<MediaInfo>;

    /// Comment nesting depth; `None` for non-comments.
    fn depth(&self) -> Option<u32>;
    /// True iff this comment's author is also the parent submission's author.
    fn is_submitter(&self) -> Option<bool>;
    /// Fullname of the parent comment, if this item is a reply to a comment.
    fn parent_comment(&self) -> Result<Option<Box<dyn ItemFacade>>, FacadeError>;
    /// The parent submission, when this item is a comment.
    fn parent_submission(&self) -> Result<Option<Box<dyn ItemFacade>>, FacadeError>;

    fn user_reports(&self) -> &[Report];
    fn mod_reports(&self) -> &[Report];

    fn is_approved(&self) -> bool;
    fn is_removed(&self) -> bool;

    // --- Actions (side-effecting; default no-op so tests can stub subsets) ---
    fn approve(&mut self) -> Result<(), FacadeError> {
        Ok(())
    }
    fn remove(&mut self, spam: bool) -> Result<(), FacadeError> {
        let _ = spam;
        Ok(())
    }
    fn report(&mut self, reason: &str) -> Result<(), FacadeError> {
        let _ = reason;
        Ok(())
    }
    fn ignore_reports(&mut self) -> Result<(), FacadeError> {
        Ok(())
    }
    fn reply(&mut self, body: &str, locked: bool, stickied: bool) -> Result<(), FacadeError> {
        let _ = (body, locked, stickied);
        Ok(())
    }
    fn send_modmail_to_author(&mut self, subject: &str, body: &str) -> Result<(), FacadeError> {
        let _ = (subject, body);
        Ok(())
    }
    fn send_modmail_to_subreddit(&mut self, subject: &str, body: &str) -> Result<(), FacadeError> {
        let _ = (subject, body);
        Ok(())
    }
    fn set_sticky(&mut self, value: bool) -> Result<(), FacadeError> {
        let _ = value;
        Ok(())
    }
    fn set_locked(&mut self, value: bool) -> Result<(), FacadeError> {
        let _ = value;
        Ok(())
    }
    fn set_nsfw(&mut self, value: bool) -> Result<(), FacadeError> {
        let _ = value;
        Ok(())
    }
    fn set_spoiler(&mut self, value: bool) -> Result<(), FacadeError> {
        let _ = value;
        Ok(())
    }
    fn set_contest_mode(&mut self, value: bool) -> Result<(), FacadeError> {
        let _ = value;
        Ok(())
    }
    fn set_original_content(&mut self, value: bool) -> Result<(), FacadeError> {
        let _ = value;
        Ok(())
    }
    fn set_suggested_sort(&mut self, value: &str) -> Result<(), FacadeError> {
        let _ = value;
        Ok(())
    }
    fn set_item_flair(
        &mut self,
        text: Option<&str>,
        css_class: Option<&str>,
        template_id: Option<&str>,
        overwrite: bool,
    ) -> Result<(), FacadeError> {
        let _ = (text, css_class, template_id, overwrite);
        Ok(())
    }
}

/// Attribute surface for an item's author, reused whether the author is
/// reached via `author:` or via a crosspost's `crosspost_author:`.
pub trait AuthorFacade {
    fn name(&self) -> &str;
    fn fullname(&self) -> &str;
    fn comment_karma(&self) -> i64;
    fn post_karma(&self) -> i64;
    fn combined_karma(&self) -> i64 {
        self.comment_karma() + self.post_karma()
    }
    fn created_utc(&self) -> DateTime<Utc>;
    fn flair_text(&self, subreddit: &str) -> Result<Option<String>, FacadeError>;
    fn flair_css_class(&self, subreddit: &str) -> Result<Option<String>, FacadeError>;
    fn flair_template_id(&self, subreddit: &str) -> Result<Option<String>, FacadeError>;
    fn is_gold(&self) -> bool;
    fn is_contributor(&self, subreddit: &str) -> Result<bool, FacadeError>;
    fn is_moderator(&self, subreddit: &str) -> Result<bool, FacadeError>;
    fn is_banned(&self, subreddit: &str) -> Result<bool, FacadeError>;

    fn set_flair(
        &mut self,
        subreddit: &str,
        text: Option<&str>,
        css_class: Option<&str>,
        template_id: Option<&str>,
        overwrite: bool,
    ) -> Result<(), FacadeError> {
        let _ = (subreddit, text, css_class, template_id, overwrite);
        Ok(())
    }
}

/// Attribute surface for a crosspost's origin subreddit.
pub trait SubredditFacade {
    fn name(&self) -> &str;
    fn is_nsfw(&self) -> bool;
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;

    #[derive(Debug, Clone, Default)]
    pub struct FakeAuthor {
        pub name: String,
        pub fullname: String,
        pub comment_karma: i64,
        pub post_karma: i64,
        pub created_utc: Option<DateTime<Utc>>,
        pub flair_text: Option<String>,
        pub flair_css_class: Option<String>,
        pub flair_template_id: Option<String>,
        pub is_gold: bool,
        pub is_contributor: bool,
        pub is_moderator: bool,
        pub is_banned: bool,
    }

    impl AuthorFacade for FakeAuthor {
        fn name(&self) -> &str {
            &self.name
        }
        fn fullname(&self) -> &str {
            &self.fullname
        }
        fn comment_karma(&self) -> i64 {
            self.comment_karma
        }
        fn post_karma(&self) -> i64 {
            self.post_karma
        }
        fn created_utc(&self) -> DateTime<Utc> {
            self.created_utc.unwrap_or_else(Utc::now)
        }
        fn flair_text(&self, _subreddit: &str) -> Result<Option<String>, FacadeError> {
            Ok(self.flair_text.clone())
        }
        fn flair_css_class(&self, _subreddit: &str) -> Result<Option<String>, FacadeError> {
            Ok(self.flair_css_class.clone())
        }
        fn flair_template_id(&self, _subreddit: &str) -> Result<Option<String>, FacadeError> {
            Ok(self.flair_template_id.clone())
        }
        fn is_gold(&self) -> bool {
            self.is_gold
        }
        fn is_contributor(&self, _subreddit: &str) -> Result<bool, FacadeError> {
            Ok(self.is_contributor)
        }
        fn is_moderator(&self, _subreddit: &str) -> Result<bool, FacadeError> {
            Ok(self.is_moderator)
        }
        fn is_banned(&self, _subreddit: &str) -> Result<bool, FacadeError> {
            Ok(self.is_banned)
        }
    }

    #[derive(Debug, Clone, Default)]
    pub struct FakeSubreddit {
        pub name: String,
        pub is_nsfw: bool,
    }

    impl SubredditFacade for FakeSubreddit {
        fn name(&self) -> &str {
            &self.name
        }
        fn is_nsfw(&self) -> bool {
            self.is_nsfw
        }
    }

    #[derive(Debug, Clone, Default)]
    pub struct FakeItem {
        pub kind: Option<ItemKind>,
        pub id: String,
        pub fullname: String,
        pub permalink: String,
        pub subreddit_name: String,
        pub author: FakeAuthor,
        pub author_is_moderator: bool,
        pub body: Option<String>,
        pub url: Option<String>,
        pub title: Option<String>,
        pub domain: Option<String>,
        pub flair_text: Option<String>,
        pub flair_css_class: Option<String>,
        pub flair_template_id: Option<String>,
        pub is_edited: bool,
        pub is_original_content: bool,
        pub is_poll: bool,
        pub poll_option_text: Option<Vec<String>>,
        pub poll_option_count: Option<u32>,
        pub is_gallery: bool,
        pub crosspost_parent: Option<Box<FakeItem>>,
        pub crosspost_subreddit: Option<FakeSubreddit>,
        pub media: Option<MediaInfo>,
        pub depth: Option<u32>,
        pub is_submitter: Option<bool>,
        pub parent_comment: Option<Box<FakeItem>>,
        pub parent_submission: Option<Box<FakeItem>>,
        pub user_reports: Vec<Report>,
        pub mod_reports: Vec<Report>,
        pub is_approved: bool,
        pub is_removed: bool,
    }

    impl ItemFacade for FakeItem {
        fn kind(&self) -> ItemKind {
            self.kind.unwrap_or(ItemKind::Submission)
        }
        fn id(&self) -> &str {
            &self.id
        }
        fn fullname(&self) -> &str {
            &self.fullname
        }
        fn permalink(&self) -> &str {
            &self.permalink
        }
        fn subreddit_name(&self) -> &str {
            &self.subreddit_name
        }
        fn author(&self) -> &dyn AuthorFacade {
            &self.author
        }
        fn author_mut(&mut self) -> &mut dyn AuthorFacade {
            &mut self.author
        }
        fn author_is_moderator(&self) -> bool {
            self.author_is_moderator
        }
        fn body(&self) -> Option<String> {
            self.body.clone()
        }
        fn url(&self) -> Option<String> {
            self.url.clone()
        }
        fn title(&self) -> Option<String> {
            self.title.clone()
        }
        fn domain(&self) -> Result<Option<String>, FacadeError> {
            Ok(self.domain.clone())
        }
        fn flair_text(&self) -> Option<String> {
            self.flair_text.clone()
        }
        fn flair_css_class(&self) -> Option<String> {
            self.flair_css_class.clone()
        }
        fn flair_template_id(&self) -> Option<String> {
            self.flair_template_id.clone()
        }
        fn is_edited(&self) -> bool {
            self.is_edited
        }
        fn is_original_content(&self) -> bool {
            self.is_original_content
        }
        fn is_poll(&self) -> bool {
            self.is_poll
        }
        fn poll_option_text(&self) -> Option<Vec<String>> {
            self.poll_option_text.clone()
        }
        fn poll_option_count(&self) -> Option<u32> {
            self.poll_option_count
        }
        fn is_gallery(&self) -> bool {
            self.is_gallery
        }
        fn crosspost_parent(&self) -> Result<Option<Box<dyn ItemFacade>>, FacadeError> {
            Ok(self
                .crosspost_parent
                .clone()
                .map(|b| Box::new(*b) as Box<dyn ItemFacade>))
        }
        fn crosspost_id(&self) -> Option<String> {
            self.crosspost_parent.as_ref().map(|p| p.id.clone())
        }
        fn crosspost_title(&self) -> Option<String> {
            self.crosspost_parent.as_ref().and_then(|p| p.title.clone())
        }
        fn crosspost_subreddit(&self) -> Option<Box<dyn SubredditFacade>> {
            self.crosspost_subreddit
                .clone()
                .map(|s| Box::new(s) as Box<dyn SubredditFacade>)
        }
        fn media(&self) -> Option<MediaInfo> {
            self.media.clone()
        }
        fn depth(&self) -> Option<u32> {
            self.depth
        }
        fn is_submitter(&self) -> Option<bool> {
            self.is_submitter
        }
        fn parent_comment(&self) -> Result<Option<Box<dyn ItemFacade>>, FacadeError> {
            Ok(self
                .parent_comment
                .clone()
                .map(|b| Box::new(*b) as Box<dyn ItemFacade>))
        }
        fn parent_submission(&self) -> Result<Option<Box<dyn ItemFacade>>, FacadeError> {
            Ok(self
                .parent_submission
                .clone()
                .map(|b| Box::new(*b) as Box<dyn ItemFacade>))
        }
        fn user_reports(&self) -> &[Report] {
            &self.user_reports
        }
        fn mod_reports(&self) -> &[Report] {
            &self.mod_reports
        }
        fn is_approved(&self) -> bool {
            self.is_approved
        }
        fn is_removed(&self) -> bool {
            self.is_removed
        }
        fn approve(&mut self) -> Result<(), FacadeError> {
            self.is_approved = true;
            self.is_removed = false;
            Ok(())
        }
        fn remove(&mut self, _spam: bool) -> Result<(), FacadeError> {
            self.is_removed = true;
            self.is_approved = false;
            Ok(())
        }
    }
}
