//! This module defines the `Post` record which is the heart of masterblog.

use crate::{validate, BlogError, BlogResult};
use std::fmt::{Display, Formatter};
use textwrap::core::display_width;
use textwrap::{self, wrap};

/// One stored blog entry. The `id` is minted by the store and never
/// supplied by a client.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Post {
    id: u32,
    pub title: String,
    pub content: String,
    pub author: String,
    pub date: String,
}

/// The four user-supplied fields of a candidate post. Every member is
/// optional here so the validator can tell "absent" apart from other
/// malformed input and name the offending fields.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct PostDraft {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
}

/// A partial update. Absent or empty members leave the stored value
/// untouched.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
}

impl Post {
    /// Create a new post from a validated draft. The draft is checked
    /// here so no caller can mint a partial record.
    pub fn new(id: u32, draft: PostDraft) -> BlogResult<Self> {
        let missing = validate::validate_required(&draft);
        if !missing.is_empty() {
            return Err(BlogError::MissingFields {
                fields: missing.iter().map(|name| name.to_string()).collect(),
            }
            .into());
        }
        let date = draft.date.unwrap_or_default();
        if !validate::validate_date(&date) {
            return Err(BlogError::InvalidDate { given: date }.into());
        }
        Ok(Post {
            id,
            title: draft.title.unwrap_or_default(),
            content: draft.content.unwrap_or_default(),
            author: draft.author.unwrap_or_default(),
            date,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Overwrite the fields the patch actually carries. Empty values mean
    /// "leave unchanged"; date validity is checked by the store before the
    /// patch gets here.
    pub fn apply(&mut self, patch: PostPatch) {
        if let Some(title) = non_empty(patch.title) {
            self.title = title;
        }
        if let Some(content) = non_empty(patch.content) {
            self.content = content;
        }
        if let Some(author) = non_empty(patch.author) {
            self.author = author;
        }
        if let Some(date) = non_empty(patch.date) {
            self.date = date;
        }
    }
}

impl PostDraft {
    /// Field name/value pairs in canonical order, for the validator.
    pub fn fields(&self) -> [(&'static str, Option<&str>); 4] {
        [
            ("title", self.title.as_deref()),
            ("content", self.content.as_deref()),
            ("author", self.author.as_deref()),
            ("date", self.date.as_deref()),
        ]
    }
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.author.is_none()
            && self.date.is_none()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|inner| !inner.is_empty())
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let content_width = 50;
        writeln!(f, "{:=<54}", "")?;
        writeln!(f, "| {:^50} |", self.title)?;
        writeln!(f, "|{:-<52}|", "")?;
        let wrapping_config = textwrap::Options::new(content_width).break_words(true);
        for line in wrap(&self.content, wrapping_config) {
            let text_width = display_width(&line);
            let whitespace = if content_width >= text_width {
                content_width - text_width
            } else {
                0
            };
            writeln!(f, "| {}{} |", line, " ".repeat(whitespace))?;
        }
        writeln!(f, "|{:-<52}|", "")?;
        writeln!(f, "| {:>50} |", format!("{} on {}", self.author, self.date))?;
        write!(f, "{:=<54}", "")
    }
}
