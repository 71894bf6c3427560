use thiserror::Error;

/// Errors raised while turning a decoded YAML mapping into a [`crate::rule::Rule`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RuleParseError {
    #[error("rule document root is not a mapping")]
    NotAMapping,

    #[error("unknown standard: {0}")]
    UnknownStandard(String),

    #[error("rule requires BAM but declares action: filter, which BAM cannot enforce")]
    FilterRequiresBam,

    #[error("malformed rule key: {0}")]
    MalformedKey(String),

    #[error("invalid priority value: {0}")]
    InvalidPriority(String),
}

/// Errors raised while evaluating a single comparator.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ComparatorError {
    #[error("option `regex` is incompatible with starts-with/ends-with")]
    RegexIncompatible,

    #[error("invalid regular expression `{pattern}`: {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("comparator `{0}` does not accept a list value")]
    ListNotAccepted(String),

    #[error("could not parse a numeric test value from `{0}`")]
    NotNumeric(String),

    #[error("could not parse a time offset from `{0}`")]
    NotTemporal(String),
}

/// Errors surfaced by an [`crate::item::ItemFacade`] getter or an action effect.
///
/// These originate from the collaborating site-API client; the engine never
/// constructs them itself, only maps them onto "check skipped" / "action not run".
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FacadeError {
    #[error("attribute `{0}` is not applicable to this item kind")]
    NotApplicable(&'static str),

    #[error("collaborator request failed: {0}")]
    Collaborator(String),
}

/// Errors raised while dispatching an action.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DispatchError {
    #[error("action `{0}` value has the wrong shape: {1}")]
    MalformedValue(String, String),

    #[error(transparent)]
    Facade(#[from] FacadeError),
}
