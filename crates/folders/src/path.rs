use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while constructing folder paths and names.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FolderPathError {
    #[error("folder path is blank")]
    Blank,
    #[error("invalid folder name {0:?}")]
    InvalidName(String),
}

/// Normalized `/`-separated folder path. The path is the identity of a folder
/// node; two folders are the same folder exactly when their paths are equal.
///
/// A `FolderPath` is never blank: "no folder selected" is `Option::None`, not
/// an empty path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderPath(String);

impl FolderPath {
    /// Parses and normalizes a path: segments are trimmed, empty segments
    /// (leading, trailing, or doubled slashes) are dropped. A path with no
    /// remaining segments is rejected.
    pub fn parse(value: impl AsRef<str>) -> Result<Self, FolderPathError> {
        let segments: Vec<&str> = value
            .as_ref()
            .split('/')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .collect();
        if segments.is_empty() {
            return Err(FolderPathError::Blank);
        }
        Ok(Self(segments.join("/")))
    }

    /// Like [`parse`](Self::parse) but maps a blank input to `None`, for call
    /// sites where "nothing" is a legal selection.
    pub fn parse_opt(value: impl AsRef<str>) -> Option<Self> {
        Self::parse(value).ok()
    }

    /// Builds a path from pre-validated segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, FolderPathError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut buffer = String::new();
        for segment in segments {
            validate_folder_name(segment.as_ref())?;
            if !buffer.is_empty() {
                buffer.push('/');
            }
            buffer.push_str(segment.as_ref().trim());
        }
        if buffer.is_empty() {
            return Err(FolderPathError::Blank);
        }
        Ok(Self(buffer))
    }

    /// Wraps a string already known to be in normalized form.
    pub(crate) fn from_normalized(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Final path segment, the folder's own name.
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Parent path, or `None` for a root-level folder.
    pub fn parent(&self) -> Option<FolderPath> {
        self.0
            .rsplit_once('/')
            .map(|(parent, _)| FolderPath(parent.to_string()))
    }

    /// Appends a validated child name.
    pub fn join(&self, name: &str) -> Result<FolderPath, FolderPathError> {
        validate_folder_name(name)?;
        Ok(FolderPath(format!("{}/{}", self.0, name.trim())))
    }

    /// True when `self` equals `other` or lies underneath it.
    pub fn starts_with(&self, other: &FolderPath) -> bool {
        self.0 == other.0 || self.0.starts_with(&format!("{}/", other.0))
    }

    /// Replaces the `from` prefix with `to`, used when a rename cascades to
    /// descendants. Returns `None` when `self` is not under `from`.
    pub fn reparent(&self, from: &FolderPath, to: &FolderPath) -> Option<FolderPath> {
        if self.0 == from.0 {
            return Some(to.clone());
        }
        self.0
            .strip_prefix(&format!("{}/", from.0))
            .map(|rest| FolderPath(format!("{}/{rest}", to.0)))
    }
}

impl fmt::Display for FolderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validates a single folder name: non-blank after trimming and free of `/`.
pub fn validate_folder_name(name: &str) -> Result<(), FolderPathError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FolderPathError::Blank);
    }
    if trimmed.contains('/') {
        return Err(FolderPathError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_slashes_and_whitespace() {
        let path = FolderPath::parse("/archive//2024 / q1/").unwrap();
        assert_eq!(path.as_str(), "archive/2024/q1");
        assert_eq!(path.depth(), 3);
        assert_eq!(path.name(), "q1");
    }

    #[test]
    fn blank_paths_are_rejected() {
        assert_eq!(FolderPath::parse(""), Err(FolderPathError::Blank));
        assert_eq!(FolderPath::parse("  //  "), Err(FolderPathError::Blank));
        assert!(FolderPath::parse_opt("   ").is_none());
    }

    #[test]
    fn parent_walks_up_to_root() {
        let path = FolderPath::parse("a/b/c").unwrap();
        let parent = path.parent().unwrap();
        assert_eq!(parent.as_str(), "a/b");
        assert_eq!(parent.parent().unwrap().as_str(), "a");
        assert!(parent.parent().unwrap().parent().is_none());
    }

    #[test]
    fn join_rejects_names_with_separators() {
        let path = FolderPath::parse("archive").unwrap();
        assert_eq!(path.join("2024").unwrap().as_str(), "archive/2024");
        assert!(matches!(
            path.join("a/b"),
            Err(FolderPathError::InvalidName(_))
        ));
        assert_eq!(path.join("  "), Err(FolderPathError::Blank));
    }

    #[test]
    fn starts_with_requires_segment_boundary() {
        let base = FolderPath::parse("arch").unwrap();
        let inside = FolderPath::parse("arch/2024").unwrap();
        let lookalike = FolderPath::parse("archive").unwrap();
        assert!(inside.starts_with(&base));
        assert!(base.starts_with(&base));
        assert!(!lookalike.starts_with(&base));
    }

    #[test]
    fn reparent_rewrites_descendants_only() {
        let from = FolderPath::parse("drafts").unwrap();
        let to = FolderPath::parse("archive").unwrap();
        let nested = FolderPath::parse("drafts/2024/q1").unwrap();
        assert_eq!(
            nested.reparent(&from, &to).unwrap().as_str(),
            "archive/2024/q1"
        );
        assert_eq!(from.reparent(&from, &to).unwrap().as_str(), "archive");
        let unrelated = FolderPath::parse("draftsman").unwrap();
        assert!(unrelated.reparent(&from, &to).is_none());
    }
}
