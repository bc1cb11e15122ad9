//! Static index page for a catalog.

use askama::Template;

use crate::{entry::RegistryEntry, error::Result};

const PAGE_TITLE: &str = "Labs";

#[derive(Template)]
#[template(path = "index.html", escape = "html")]
struct IndexTemplate<'a> {
    title: &'a str,
    cards: &'a [CardView],
}

struct CardView {
    href: String,
    title: String,
    desc: String,
    slug: String,
    tags: String,
    date: String,
}

impl CardView {
    fn from_entry(entry: &RegistryEntry) -> Self {
        Self {
            href: entry.href().unwrap_or("#").to_string(),
            title: entry.display_title().to_string(),
            desc: entry.desc.clone().unwrap_or_default(),
            slug: entry.slug.clone(),
            tags: entry.tags.join(" · "),
            date: entry
                .updated
                .map(|ts| ts.format("%b %-d, %Y").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Render `entries` as a standalone HTML page, most recently updated first.
///
/// Entries without `updated` sort last; ties keep their catalog order.
pub fn render_index(entries: &[RegistryEntry]) -> Result<String> {
    let mut sorted: Vec<&RegistryEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.updated.cmp(&a.updated));

    let cards: Vec<CardView> = sorted.into_iter().map(CardView::from_entry).collect();
    let page = IndexTemplate {
        title: PAGE_TITLE,
        cards: &cards,
    };
    Ok(page.render()?)
}
