//! The single table of recognized card options and their fallbacks.
//!
//! Every read site (query decoding, form collection, layout) resolves missing or malformed
//! values through this module instead of inlining literals.

/// Jobs count rendered when the input is absent, negative or unparsable.
pub const DEFAULT_JOBS: u32 = 69;

/// Upper bound on description length, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 100;

/// Upper bound on a single tag label, in characters.
pub const MAX_TAG_CHARS: usize = 32;

/// Delimiter joining tags in the query contract.
pub const TAG_DELIMITER: char = ',';

/// Recognized card options, in the order they appear in an encoded share query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Param {
    /// Company name.
    Company,
    /// Logo URL (`http(s)` or `data:`).
    Logo,
    /// Batch label.
    Batch,
    /// Open jobs count.
    Jobs,
    /// Company website.
    Url,
    /// Delimiter-joined tag list.
    Tags,
    /// Optional one-line description.
    Description,
}

impl Param {
    /// All parameters in encoding order.
    pub const ALL: [Param; 7] = [
        Param::Company,
        Param::Logo,
        Param::Batch,
        Param::Jobs,
        Param::Url,
        Param::Tags,
        Param::Description,
    ];

    /// Query-string key.
    pub fn key(self) -> &'static str {
        match self {
            Param::Company => "company",
            Param::Logo => "logo",
            Param::Batch => "batch",
            Param::Jobs => "jobs",
            Param::Url => "url",
            Param::Tags => "tags",
            Param::Description => "description",
        }
    }

    /// Raw fallback used when the parameter is absent. `None` means "leave empty".
    pub fn fallback(self) -> Option<&'static str> {
        match self {
            Param::Company => Some("Company Name"),
            Param::Logo => None,
            Param::Batch => Some("Winter 2030"),
            Param::Jobs => Some("69"),
            Param::Url => Some("https://yourcompany.com"),
            Param::Tags => Some("SOFTWARE,DATA,STARTUP"),
            Param::Description => None,
        }
    }

    /// Resolve a parameter key back to its option.
    pub fn from_key(key: &str) -> Option<Param> {
        Param::ALL.into_iter().find(|p| p.key() == key)
    }
}

/// Coerce a raw jobs value into a non-negative count.
///
/// Anything that is not a plain base-10 integer in `0..=u32::MAX` yields [`DEFAULT_JOBS`].
pub fn coerce_jobs(raw: Option<&str>) -> u32 {
    raw.map(str::trim)
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(DEFAULT_JOBS)
}

/// Truncate `s` to at most `max` characters (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
