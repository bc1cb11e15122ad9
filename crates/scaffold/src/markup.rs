//! A minimal structured view of an HTML document for idempotent edits.
//!
//! The document is scanned into a flat list of tags with their attributes.
//! Comments and the bodies of `<script>` and `<style>` are not markup and
//! are skipped.
//! Insertions name a [`Marker`], the element whose presence means the edit
//! has already happened, and an [`InsertionPoint`] relative to `<head>` or
//! `<body>`. The document tracks which markers are present, so applying the
//! same [`Injection`] twice leaves the text unchanged.

use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;

#[allow(clippy::expect_used)]
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9-]*)((?:[^>])*)>").expect("tag pattern compiles")
});

#[allow(clippy::expect_used)]
static ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("attribute pattern compiles")
});

#[allow(clippy::expect_used)]
static OPAQUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<!--.*?(?:-->|\z)|<script\b[^>]*>(.*?)(?:</script\s*>|\z)|<style\b[^>]*>(.*?)(?:</style\s*>|\z)",
    )
    .expect("opaque span pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq)]
struct Tag {
    name: String,
    closing: bool,
    attrs: Vec<(String, String)>,
    start: usize,
    end: usize,
}

impl Tag {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// How a marker attribute value is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrMatch {
    Exact(&'static str),
    /// Matches `./src/main.ts` and `/src/main.ts` alike.
    Suffix(&'static str),
}

/// The element whose presence means an injection is already applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub name: &'static str,
    pub tag: &'static str,
    pub attr: &'static str,
    pub value: AttrMatch,
}

impl Marker {
    fn matches(&self, tag: &Tag) -> bool {
        if tag.closing || !tag.name.eq_ignore_ascii_case(self.tag) {
            return false;
        }
        match (tag.attr(self.attr), self.value) {
            (Some(v), AttrMatch::Exact(want)) => v.eq_ignore_ascii_case(want),
            (Some(v), AttrMatch::Suffix(want)) => v.ends_with(want),
            (None, _) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionPoint {
    /// Right after the `<head>` open tag.
    HeadStart,
    /// Right before `</head>`.
    HeadEnd,
    BodyStart,
    BodyEnd,
}

/// One idempotent edit: insert `snippet` at `point` unless `marker` exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    pub marker: Marker,
    pub point: InsertionPoint,
    pub snippet: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Inserted,
    AlreadyPresent,
    /// The document has no such insertion point; nothing was changed.
    NoInsertionPoint,
}

#[derive(Debug, Clone)]
pub struct MarkupDocument {
    text: String,
    tags: Vec<Tag>,
    applied: BTreeSet<&'static str>,
}

impl MarkupDocument {
    pub fn parse(text: impl Into<String>) -> Self {
        let text = text.into();
        let tags = scan(&text);
        Self {
            text,
            tags,
            applied: BTreeSet::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether the marker element is in the document.
    pub fn contains(&self, marker: &Marker) -> bool {
        self.applied.contains(marker.name) || self.tags.iter().any(|t| marker.matches(t))
    }

    /// Markers seen present so far, by name.
    pub fn applied(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.applied.iter().copied()
    }

    pub fn apply(&mut self, injection: &Injection) -> Applied {
        if self.contains(&injection.marker) {
            self.applied.insert(injection.marker.name);
            return Applied::AlreadyPresent;
        }

        let Some(at) = self.offset(injection.point) else {
            return Applied::NoInsertionPoint;
        };

        let piece = match injection.point {
            InsertionPoint::HeadStart | InsertionPoint::BodyStart => {
                format!("\n  {}", injection.snippet)
            },
            InsertionPoint::HeadEnd | InsertionPoint::BodyEnd => {
                format!("  {}\n", injection.snippet)
            },
        };
        self.text.insert_str(at, &piece);
        self.tags = scan(&self.text);
        self.applied.insert(injection.marker.name);
        Applied::Inserted
    }

    pub fn apply_all<'a>(
        &mut self,
        injections: impl IntoIterator<Item = &'a Injection>,
    ) -> Vec<(&'static str, Applied)> {
        injections
            .into_iter()
            .map(|inj| (inj.marker.name, self.apply(inj)))
            .collect()
    }

    fn offset(&self, point: InsertionPoint) -> Option<usize> {
        let (name, closing) = match point {
            InsertionPoint::HeadStart => ("head", false),
            InsertionPoint::HeadEnd => ("head", true),
            InsertionPoint::BodyStart => ("body", false),
            InsertionPoint::BodyEnd => ("body", true),
        };
        let tag = self
            .tags
            .iter()
            .find(|t| t.closing == closing && t.name.eq_ignore_ascii_case(name))?;
        Some(if closing { line_start(&self.text, tag.start) } else { tag.end })
    }
}

/// Closing tags are usually indented; inserting at the start of their line
/// keeps the indentation attached to the tag.
fn line_start(text: &str, pos: usize) -> usize {
    let before = &text[..pos];
    match before.rfind('\n') {
        Some(nl) if before[nl + 1..].chars().all(|c| c == ' ' || c == '\t') => nl + 1,
        _ => pos,
    }
}

/// `text` with comments and script/style bodies blanked to spaces. Byte
/// offsets are unchanged, so tags found in the result index into `text`.
fn mask_opaque(text: &str) -> String {
    let mut masked = String::with_capacity(text.len());
    let mut last = 0;
    for caps in OPAQUE.captures_iter(text) {
        let Some(span) = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(0)) else {
            continue;
        };
        masked.push_str(&text[last..span.start()]);
        masked.extend(std::iter::repeat_n(' ', span.len()));
        last = span.end();
    }
    masked.push_str(&text[last..]);
    masked
}

fn scan(text: &str) -> Vec<Tag> {
    let masked = mask_opaque(text);
    TAG.captures_iter(&masked)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let attrs = caps
                .get(3)
                .map(|raw| parse_attrs(raw.as_str()))
                .unwrap_or_default();
            Some(Tag {
                name: caps.get(2)?.as_str().to_ascii_lowercase(),
                closing: !caps.get(1)?.as_str().is_empty(),
                attrs,
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

fn parse_attrs(raw: &str) -> Vec<(String, String)> {
    ATTR.captures_iter(raw)
        .filter_map(|caps| {
            let key = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            Some((key, value))
        })
        .collect()
}

/// Escape text for use inside a double-quoted attribute or element body.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
