//! Project identity derived from a free-form name.

use crate::error::{Error, Result};

/// Who a project is: the name as typed, its slug, and its display title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectIdentity {
    /// The typed name without surrounding whitespace.
    pub raw_name: String,
    /// Lowercase ASCII alphanumerics joined by single hyphens. Used as the
    /// directory name and the catalog key.
    pub slug: String,
    pub display_title: String,
}

impl ProjectIdentity {
    /// Derive an identity, rejecting names that are blank or have no
    /// alphanumeric characters to build a slug from.
    pub fn resolve(raw_name: &str) -> Result<Self> {
        let raw_name = raw_name.trim();
        if raw_name.is_empty() {
            return Err(Error::InvalidName {
                raw: raw_name.to_string(),
                reason: "name is required",
            });
        }

        let slug = slugify(raw_name);
        if slug.is_empty() {
            return Err(Error::InvalidName {
                raw: raw_name.to_string(),
                reason: "name must contain at least one letter or digit",
            });
        }

        Ok(Self {
            raw_name: raw_name.to_string(),
            display_title: display_title(raw_name),
            slug,
        })
    }
}

/// Lower-case, then collapse every run of characters outside `[a-z0-9]` to
/// one hyphen and strip hyphens from both ends.
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_hyphen = false;

    for c in raw.trim().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Hyphens and underscores become spaces, whitespace collapses, and each
/// word gets an upper-case first letter. The rest of each word is kept.
pub fn display_title(raw: &str) -> String {
    raw.replace(['-', '_'], " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
