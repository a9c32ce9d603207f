//! Level selection rules for the fixed-depth descent
//!
//! Each level below the version directory picks exactly one child link to
//! descend into. Reifying the rules as data keeps the traversal loop uniform
//! and lets each rule be tested against a plain link list.

use crate::crawl::links::LinkEntry;

/// How to pick the single sub-directory link to descend into at one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelSelector {
    /// The first sub-directory link that is not the parent self-reference.
    FirstSubdirectory,
    /// The first sub-directory link whose text contains the token.
    TextContains(String),
}

impl LevelSelector {
    /// Apply the rule to the links of one page, in document order.
    pub fn select<'a>(&self, links: &'a [LinkEntry]) -> Option<&'a LinkEntry> {
        links
            .iter()
            .filter(|link| link.is_directory() && !link.is_parent())
            .find(|link| match self {
                Self::FirstSubdirectory => true,
                Self::TextContains(token) => link.text.contains(token.as_str()),
            })
    }

    /// Short label for log lines.
    pub fn describe(&self) -> String {
        match self {
            Self::FirstSubdirectory => "first sub-directory".to_string(),
            Self::TextContains(token) => format!("text contains {token:?}"),
        }
    }
}

/// Which terminal-level file links count as artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactPredicate {
    /// The link target ends with the suffix (e.g. `.exe.tar`).
    Suffix(String),
    /// The link target contains the fragment anywhere.
    Contains(String),
}

impl ArtifactPredicate {
    pub fn matches(&self, target: &str) -> bool {
        match self {
            Self::Suffix(suffix) => target.ends_with(suffix.as_str()),
            Self::Contains(fragment) => target.contains(fragment.as_str()),
        }
    }
}
