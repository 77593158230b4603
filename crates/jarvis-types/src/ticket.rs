use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Reporter name used when the identity lookup yields nothing
pub const UNKNOWN_USER: &str = "Unknown User";

/// Character budget for a ticket title
pub const TITLE_MAX_CHARS: usize = 50;

const UNTITLED: &str = "Untitled";

/// Deduplicated set of dashboard URLs harvested from a thread.
///
/// Entries are whitespace-trimmed and compared case-sensitively. Iteration
/// order is the set's own (lexicographic), not insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardLinks(BTreeSet<String>);

impl DashboardLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a link, trimming surrounding whitespace. Blank input is ignored.
    pub fn insert(&mut self, link: &str) -> bool {
        let trimmed = link.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.0.insert(trimmed.to_string())
    }

    pub fn contains(&self, link: &str) -> bool {
        self.0.contains(link)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for DashboardLinks {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut links = Self::new();
        for link in iter {
            links.insert(link.as_ref());
        }
        links
    }
}

/// The formatted thread text handed to the language model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadDocument(String);

impl ThreadDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ThreadDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-text ticket drafted by the language model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketDraft {
    text: String,
}

impl TicketDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// First line of the draft, cut to [`TITLE_MAX_CHARS`] characters.
    ///
    /// A blank first line yields `"Untitled"`.
    pub fn title(&self) -> String {
        let first_line = self.text.split('\n').next().unwrap_or("");
        let first_line = first_line.strip_suffix('\r').unwrap_or(first_line);
        if first_line.trim().is_empty() {
            return UNTITLED.to_string();
        }
        first_line.chars().take(TITLE_MAX_CHARS).collect()
    }

    /// The whole draft, first line included
    pub fn body(&self) -> &str {
        &self.text
    }
}

/// One run of rich text: plain text or a hyperlink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RichTextRun {
    Plain { content: String },
    Link { label: String, url: String },
}

impl RichTextRun {
    pub fn plain(content: impl Into<String>) -> Self {
        Self::Plain {
            content: content.into(),
        }
    }

    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Link {
            label: label.into(),
            url: url.into(),
        }
    }

    /// Visible text of the run: the content, or the label for links
    pub fn text(&self) -> &str {
        match self {
            Self::Plain { content } => content,
            Self::Link { label, .. } => label,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Plain { .. } => None,
            Self::Link { url, .. } => Some(url),
        }
    }
}
