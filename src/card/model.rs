use std::{fmt, str::FromStr, sync::Arc};

use crate::{
    card::defaults::{self, MAX_DESCRIPTION_CHARS, MAX_TAG_CHARS, Param},
    foundation::error::{CardError, CardResult},
};

/// Known cohort labels, newest first.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum Batch {
    /// Winter 2030.
    #[default]
    #[serde(rename = "Winter 2030")]
    Winter2030,
    /// Summer 2029.
    #[serde(rename = "Summer 2029")]
    Summer2029,
    /// Winter 2029.
    #[serde(rename = "Winter 2029")]
    Winter2029,
    /// Summer 2028.
    #[serde(rename = "Summer 2028")]
    Summer2028,
    /// Winter 2028.
    #[serde(rename = "Winter 2028")]
    Winter2028,
    /// Summer 2027.
    #[serde(rename = "Summer 2027")]
    Summer2027,
    /// Winter 2027.
    #[serde(rename = "Winter 2027")]
    Winter2027,
    /// Summer 2026.
    #[serde(rename = "Summer 2026")]
    Summer2026,
    /// Winter 2026.
    #[serde(rename = "Winter 2026")]
    Winter2026,
}

impl Batch {
    /// Every known batch in display order.
    pub const ALL: [Batch; 9] = [
        Batch::Winter2030,
        Batch::Summer2029,
        Batch::Winter2029,
        Batch::Summer2028,
        Batch::Winter2028,
        Batch::Summer2027,
        Batch::Winter2027,
        Batch::Summer2026,
        Batch::Winter2026,
    ];

    /// Display label, e.g. `"Summer 2027"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Batch::Winter2030 => "Winter 2030",
            Batch::Summer2029 => "Summer 2029",
            Batch::Winter2029 => "Winter 2029",
            Batch::Summer2028 => "Summer 2028",
            Batch::Winter2028 => "Winter 2028",
            Batch::Summer2027 => "Summer 2027",
            Batch::Winter2027 => "Winter 2027",
            Batch::Summer2026 => "Summer 2026",
            Batch::Winter2026 => "Winter 2026",
        }
    }

    /// Lenient lookup: case-insensitive, surrounding and repeated whitespace ignored.
    pub fn parse(raw: &str) -> Option<Batch> {
        let norm = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        Batch::ALL
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(&norm))
    }
}

impl fmt::Display for Batch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Batch {
    type Err = CardError;

    fn from_str(s: &str) -> CardResult<Self> {
        Batch::parse(s).ok_or_else(|| CardError::validation(format!("unknown batch '{s}'")))
    }
}

/// Status shown on the card. Not derived from user input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
pub enum CardStatus {
    /// The only status currently rendered.
    #[default]
    Active,
}

impl CardStatus {
    /// Badge text.
    pub fn label(self) -> &'static str {
        match self {
            CardStatus::Active => "ACTIVE",
        }
    }
}

/// Where the logo pixels come from.
#[derive(Clone, PartialEq, Eq)]
pub enum LogoRef {
    /// Remote (`http(s)`) or inline (`data:`) URL.
    Url(String),
    /// Encoded image bytes picked by the user.
    Bytes(Arc<Vec<u8>>),
}

impl fmt::Debug for LogoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogoRef::Url(u) => f.debug_tuple("Url").field(u).finish(),
            LogoRef::Bytes(b) => f.debug_struct("Bytes").field("len", &b.len()).finish(),
        }
    }
}

/// Ordered set of distinct tag labels.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct TagSet(Vec<String>);

impl TagSet {
    /// Empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a delimiter-joined list, inserting each label in order.
    pub fn from_delimited(raw: &str) -> Self {
        let mut out = Self::new();
        for part in raw.split(defaults::TAG_DELIMITER) {
            out.insert(part);
        }
        out
    }

    /// Insert a trimmed label. Returns `false` for empty labels and duplicates.
    pub fn insert(&mut self, raw: &str) -> bool {
        let tag = defaults::truncate_chars(raw.trim(), MAX_TAG_CHARS).trim_end();
        if tag.is_empty() || self.0.iter().any(|t| t == tag) {
            return false;
        }
        self.0.push(tag.to_string());
        true
    }

    /// Remove the tag at `idx`, preserving the order of the rest.
    pub fn remove(&mut self, idx: usize) -> Option<String> {
        (idx < self.0.len()).then(|| self.0.remove(idx))
    }

    /// Tags in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when no tags are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Delimiter-joined form used by the query contract.
    pub fn to_delimited(&self) -> String {
        self.0.join(&defaults::TAG_DELIMITER.to_string())
    }
}

impl<'a> FromIterator<&'a str> for TagSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut out = Self::new();
        for t in iter {
            out.insert(t);
        }
        out
    }
}

/// Canonical description of one company card, shared by both rendering paths.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CardModel {
    company: String,
    #[serde(skip)]
    logo: Option<LogoRef>,
    description: Option<String>,
    jobs: u32,
    url: String,
    batch: Batch,
    tags: TagSet,
    status: CardStatus,
}

impl CardModel {
    /// Model with the required fields set and everything optional left empty.
    pub fn new(company: impl Into<String>, url: impl Into<String>, batch: Batch) -> Self {
        Self {
            company: company.into(),
            logo: None,
            description: None,
            jobs: defaults::DEFAULT_JOBS,
            url: url.into(),
            batch,
            tags: TagSet::new(),
            status: CardStatus::Active,
        }
    }

    /// Placeholder card built purely from the defaults table.
    pub fn sample() -> Self {
        let fallback = |p: Param| p.fallback().unwrap_or_default();
        Self::new(
            fallback(Param::Company),
            fallback(Param::Url),
            Batch::parse(fallback(Param::Batch)).unwrap_or_default(),
        )
        .with_jobs(defaults::coerce_jobs(Param::Jobs.fallback()))
        .with_tags(TagSet::from_delimited(fallback(Param::Tags)))
    }

    /// Set the logo reference.
    pub fn with_logo(mut self, logo: LogoRef) -> Self {
        self.logo = Some(logo);
        self
    }

    /// Set the description, truncated to the allowed length. Blank input clears it.
    pub fn with_description(mut self, description: &str) -> Self {
        let d = defaults::truncate_chars(description.trim(), MAX_DESCRIPTION_CHARS).trim_end();
        self.description = (!d.is_empty()).then(|| d.to_string());
        self
    }

    /// Set the open jobs count.
    pub fn with_jobs(mut self, jobs: u32) -> Self {
        self.jobs = jobs;
        self
    }

    /// Replace the tag set.
    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    /// Company name.
    pub fn company(&self) -> &str {
        &self.company
    }

    /// Logo reference, if any.
    pub fn logo(&self) -> Option<&LogoRef> {
        self.logo.as_ref()
    }

    /// Description line, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Open jobs count.
    pub fn jobs(&self) -> u32 {
        self.jobs
    }

    /// Company website.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Batch label.
    pub fn batch(&self) -> Batch {
        self.batch
    }

    /// Tags in insertion order.
    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// Status badge value.
    pub fn status(&self) -> CardStatus {
        self.status
    }
}

#[cfg(test)]
#[path = "../../tests/unit/card/model.rs"]
mod tests;
