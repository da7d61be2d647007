//! Read-side operations over a loaded collection: stable sorting and
//! whole-word search. Neither touches the backing document; the store
//! hands in the posts and keeps their persisted order untouched.

use crate::{post::Post, validate, BlogError, BlogResult};
use std::collections::HashSet;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    Content,
    Author,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl FromStr for SortField {
    type Err = BlogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "title" => Ok(Self::Title),
            "content" => Ok(Self::Content),
            "author" => Ok(Self::Author),
            "date" => Ok(Self::Date),
            _ => Err(BlogError::InvalidSortField {
                given: value.into(),
            }),
        }
    }
}

impl FromStr for SortDirection {
    type Err = BlogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(BlogError::InvalidSortDirection {
                given: value.into(),
            }),
        }
    }
}

/// Per-field search terms. A member that is absent or empty is not
/// searched.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SearchCriteria {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
}

impl SearchCriteria {
    pub fn is_empty(&self) -> bool {
        self.terms().next().is_none()
    }

    /// Supplied `(field, term)` pairs in canonical field order, with
    /// absent and empty members already filtered out.
    fn terms(&self) -> impl Iterator<Item = (SortField, &str)> {
        [
            (SortField::Title, self.title.as_deref()),
            (SortField::Content, self.content.as_deref()),
            (SortField::Author, self.author.as_deref()),
            (SortField::Date, self.date.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, term)| Some((field, term?)))
        .filter(|(_, term)| !term.is_empty())
    }
}

/// Reorder a collection by one field. The sort is stable and does not
/// mutate persisted order; callers get a new ordering of their copy.
/// Dates are compared as parsed calendar dates, and a malformed stored
/// date is reported instead of being silently mis-sorted.
pub fn sort_posts(
    posts: Vec<Post>,
    field: SortField,
    direction: SortDirection,
) -> BlogResult<Vec<Post>> {
    if field == SortField::Date {
        let mut keyed = Vec::with_capacity(posts.len());
        for post in posts {
            let parsed = validate::parse_date(&post.date).ok_or_else(|| BlogError::InvalidDate {
                given: post.date.clone(),
            })?;
            keyed.push((parsed, post));
        }
        keyed.sort_by(|a, b| match direction {
            SortDirection::Asc => a.0.cmp(&b.0),
            SortDirection::Desc => b.0.cmp(&a.0),
        });
        return Ok(keyed.into_iter().map(|(_, post)| post).collect());
    }

    let mut posts = posts;
    posts.sort_by(|a, b| {
        let (left, right) = (field_text(a, field), field_text(b, field));
        match direction {
            SortDirection::Asc => left.cmp(right),
            SortDirection::Desc => right.cmp(left),
        }
    });
    Ok(posts)
}

/// Union of the per-criterion matches, deduplicated by post id with the
/// order of first match preserved.
pub fn search_posts(posts: &[Post], criteria: &SearchCriteria) -> Vec<Post> {
    let mut seen: HashSet<u32> = HashSet::new();
    let mut matches = Vec::new();

    for (field, term) in criteria.terms() {
        let needle = term.to_lowercase();
        for post in posts {
            if contains_word(field_text(post, field), &needle) && seen.insert(post.id()) {
                matches.push(post.clone());
            }
        }
    }
    matches
}

fn field_text(post: &Post, field: SortField) -> &str {
    match field {
        SortField::Title => &post.title,
        SortField::Content => &post.content,
        SortField::Author => &post.author,
        SortField::Date => &post.date,
    }
}

/// Whole-word match: the case-folded text, with trailing periods
/// stripped, is tokenized on whitespace and one token must equal the
/// already case-folded needle.
fn contains_word(text: &str, needle: &str) -> bool {
    text.to_lowercase()
        .trim_end_matches('.')
        .split_whitespace()
        .any(|token| token == needle)
}
