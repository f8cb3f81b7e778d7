use libsql::Connection;

use crate::db::fetch_i64;
use crate::error::AppResult;

const MAX_SLUG_LEN: usize = 80;

/// Lowercase ASCII words joined by single hyphens.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
        if slug.len() >= MAX_SLUG_LEN {
            break;
        }
    }

    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// Table whose `slug` column must stay unique.
#[derive(Debug, Clone, Copy)]
pub enum SlugTable {
    Artists,
    Artworks,
}

impl SlugTable {
    fn table(&self) -> &'static str {
        match self {
            SlugTable::Artists => "artist_profiles",
            SlugTable::Artworks => "artworks",
        }
    }

    /// Slugs that collide with static route segments next to `{slug}`.
    fn is_reserved(&self, slug: &str) -> bool {
        match self {
            SlugTable::Artists => false,
            SlugTable::Artworks => slug == "facets",
        }
    }
}

/// Slug for `text` not already taken in `table`, appending `-2`, `-3`, ... on collision.
pub async fn unique_slug(conn: &Connection, table: SlugTable, text: &str) -> AppResult<String> {
    let base = slugify(text);
    let sql = format!("SELECT COUNT(*) FROM {} WHERE slug = ?", table.table());

    let mut candidate = base.clone();
    let mut n = 2;
    while table.is_reserved(&candidate) || fetch_i64(conn, &sql, [candidate.clone()]).await? > 0 {
        candidate = format!("{base}-{n}");
        n += 1;
    }
    Ok(candidate)
}
