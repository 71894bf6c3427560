pub mod actions;
pub mod checks;
pub mod comparators;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod item;
pub mod placeholders;
pub mod rule;
pub mod supervisor;

pub use error::{ComparatorError, DispatchError, FacadeError, RuleParseError};

pub use item::{
    AuthorFacade,           // Author attribute surface
    CheckValue,             // Uniform getter return type
    ItemFacade,             // Item attribute surface
    ItemKind,                // Submission/comment/modqueue/modmail
    MediaInfo,              // oembed media subset
    Report,                 // One report entry (reason, count)
    SubredditFacade,        // Crosspost-origin subreddit surface
};

pub use comparators::{compare, resolve_tag, ComparatorTag};

pub use placeholders::{substitute, MatchRecord};

pub use checks::{
    author_checks,           // Author check registry
    crosspost_subreddit_checks, // Crosspost-subreddit check registry
    item_checks,             // Item check registry
    AuthorCheckDef,
    ItemCheckDef,
    SubredditCheckDef,
};

pub use rule::{parse_key, parse_rule, sort_rules, ParsedKey, Rule, RuleKind};

pub use evaluator::evaluate;

pub use actions::dispatch;

pub use supervisor::{PollingConfig, SiteApiClient, Supervisor, SupervisorConfig};

pub use config::strip_wiki_indent;
