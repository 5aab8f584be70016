use regex::RegexBuilder;
use thiserror::Error;

use crate::record::DocumentRecord;

/// Error conditions raised when compiling a document filter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid filter pattern: {0}")]
    InvalidPattern(String),
}

/// Determines how the filter query is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterMode {
    Plain,
    Regex,
}

impl Default for FilterMode {
    fn default() -> Self {
        Self::Plain
    }
}

/// Client-side text filter applied over a fetched document list.
///
/// Matching covers file name, title, description, and each tag. A blank query
/// matches every record. Plain mode is a case-insensitive substring test;
/// regex mode compiles the query as a case-insensitive pattern.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentFilter {
    pub query: String,
    pub mode: FilterMode,
}

impl DocumentFilter {
    pub fn plain(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            mode: FilterMode::Plain,
        }
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            query: pattern.into(),
            mode: FilterMode::Regex,
        }
    }

    /// True when the query is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.query.trim().is_empty()
    }

    /// Compiles the filter for repeated matching. Plain filters never fail.
    pub fn compile(&self) -> Result<DocumentMatcher, FilterError> {
        if self.is_blank() {
            return Ok(DocumentMatcher::match_all());
        }
        match self.mode {
            FilterMode::Plain => Ok(DocumentMatcher {
                inner: MatcherKind::Substring(self.query.trim().to_lowercase()),
            }),
            FilterMode::Regex => {
                let regex = RegexBuilder::new(self.query.trim())
                    .case_insensitive(true)
                    .build()
                    .map_err(|err| FilterError::InvalidPattern(err.to_string()))?;
                Ok(DocumentMatcher {
                    inner: MatcherKind::Pattern(regex),
                })
            }
        }
    }
}

/// Compiled form of a [`DocumentFilter`].
#[derive(Clone, Debug)]
pub struct DocumentMatcher {
    inner: MatcherKind,
}

#[derive(Clone, Debug)]
enum MatcherKind {
    All,
    Substring(String),
    Pattern(regex::Regex),
}

impl DocumentMatcher {
    /// Matcher accepting every record, the state of an empty search box.
    pub fn match_all() -> Self {
        Self {
            inner: MatcherKind::All,
        }
    }

    pub fn is_match_all(&self) -> bool {
        matches!(self.inner, MatcherKind::All)
    }

    pub fn matches(&self, record: &DocumentRecord) -> bool {
        match &self.inner {
            MatcherKind::All => true,
            MatcherKind::Substring(needle) => {
                field_values(record).any(|value| value.to_lowercase().contains(needle))
            }
            MatcherKind::Pattern(regex) => field_values(record).any(|value| regex.is_match(value)),
        }
    }
}

impl Default for DocumentMatcher {
    fn default() -> Self {
        Self::match_all()
    }
}

fn field_values(record: &DocumentRecord) -> impl Iterator<Item = &str> {
    [
        record.file_name.as_str(),
        record.title.as_str(),
        record.description.as_str(),
    ]
    .into_iter()
    .chain(record.tags.iter().map(String::as_str))
}
