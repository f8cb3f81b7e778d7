//! Public catalogue filters.
//!
//! Query-string parameters become a parameterised `WHERE` clause over
//! `artworks w JOIN artist_profiles a`, plus an `ORDER BY` picked from a
//! fixed table. Only `available` artworks are ever listed.

use libsql::Value;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

pub const DEFAULT_PER_PAGE: u32 = 24;
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
    Popular,
    Title,
}

impl SortOrder {
    pub fn order_by(&self) -> &'static str {
        match self {
            SortOrder::Newest => "w.created_ts DESC, w.id ASC",
            SortOrder::Oldest => "w.created_ts ASC, w.id ASC",
            SortOrder::PriceAsc => "w.price_cents ASC, w.created_ts DESC",
            SortOrder::PriceDesc => "w.price_cents DESC, w.created_ts DESC",
            SortOrder::Popular => "w.view_count DESC, w.created_ts DESC",
            SortOrder::Title => "w.title COLLATE NOCASE ASC, w.id ASC",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogueFilter {
    pub q: Option<String>,
    pub category: Option<String>,
    pub medium: Option<String>,
    pub style: Option<String>,
    /// Artist slug.
    pub artist: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub featured: Option<bool>,
    pub sort: Option<SortOrder>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct CatalogueQuery {
    pub where_clause: String,
    pub params: Vec<Value>,
    pub order_by: &'static str,
    pub page: u32,
    pub per_page: u32,
}

impl CatalogueQuery {
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        let per_page = self.per_page as i64;
        (total + per_page - 1) / per_page
    }
}

/// `%text%` with LIKE wildcards escaped for `ESCAPE '\'`.
pub fn like_pattern(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl CatalogueFilter {
    pub fn build(&self) -> AppResult<CatalogueQuery> {
        let mut clauses = vec!["w.status = 'available'".to_string()];
        let mut params = Vec::new();

        if let Some(q) = non_empty(&self.q) {
            let pattern = like_pattern(q);
            clauses.push(
                "(w.title LIKE ? ESCAPE '\\' OR w.description LIKE ? ESCAPE '\\' OR a.display_name LIKE ? ESCAPE '\\')"
                    .to_string(),
            );
            for _ in 0..3 {
                params.push(Value::Text(pattern.clone()));
            }
        }

        for (column, value) in [
            ("w.category", &self.category),
            ("w.medium", &self.medium),
            ("w.style", &self.style),
        ] {
            if let Some(v) = non_empty(value) {
                clauses.push(format!("{column} = ? COLLATE NOCASE"));
                params.push(Value::Text(v.to_string()));
            }
        }

        if let Some(artist) = non_empty(&self.artist) {
            clauses.push("a.slug = ?".to_string());
            params.push(Value::Text(artist.to_string()));
        }

        if matches!(self.min_price, Some(p) if p < 0) || matches!(self.max_price, Some(p) if p < 0) {
            return Err(AppError::BadRequest("Price filters must not be negative".to_string()));
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(AppError::BadRequest(
                    "min_price must not exceed max_price".to_string(),
                ));
            }
        }
        if let Some(min) = self.min_price {
            clauses.push("w.price_cents >= ?".to_string());
            params.push(Value::Integer(min));
        }
        if let Some(max) = self.max_price {
            clauses.push("w.price_cents <= ?".to_string());
            params.push(Value::Integer(max));
        }

        if self.featured == Some(true) {
            clauses.push("w.is_featured = 1".to_string());
        }

        Ok(CatalogueQuery {
            where_clause: clauses.join(" AND "),
            params,
            order_by: self.sort.unwrap_or_default().order_by(),
            page: self.page.unwrap_or(1).max(1),
            per_page: self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_lists_available_newest_first() {
        let query = CatalogueFilter::default().build().unwrap();
        assert_eq!(query.where_clause, "w.status = 'available'");
        assert!(query.params.is_empty());
        assert_eq!(query.order_by, "w.created_ts DESC, w.id ASC");
        assert_eq!((query.page, query.per_page), (1, DEFAULT_PER_PAGE));
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn text_search_binds_the_pattern_three_times() {
        let filter = CatalogueFilter {
            q: Some("  blue  ".into()),
            ..Default::default()
        };
        let query = filter.build().unwrap();
        assert!(query.where_clause.contains("a.display_name LIKE ?"));
        assert_eq!(query.params.len(), 3);
        assert!(query
            .params
            .iter()
            .all(|p| matches!(p, Value::Text(t) if t == "%blue%")));
    }

    #[test]
    fn blank_parameters_are_ignored() {
        let filter = CatalogueFilter {
            q: Some("   ".into()),
            category: Some("".into()),
            ..Default::default()
        };
        let query = filter.build().unwrap();
        assert_eq!(query.where_clause, "w.status = 'available'");
    }

    #[test]
    fn clauses_and_params_stay_in_step() {
        let filter = CatalogueFilter {
            category: Some("Painting".into()),
            style: Some("abstract".into()),
            artist: Some("ada-lane".into()),
            min_price: Some(10_000),
            max_price: Some(50_000),
            featured: Some(true),
            sort: Some(SortOrder::PriceDesc),
            ..Default::default()
        };
        let query = filter.build().unwrap();
        assert_eq!(
            query.where_clause,
            "w.status = 'available' AND w.category = ? COLLATE NOCASE AND w.style = ? COLLATE NOCASE \
             AND a.slug = ? AND w.price_cents >= ? AND w.price_cents <= ? AND w.is_featured = 1"
        );
        assert_eq!(query.where_clause.matches('?').count(), query.params.len());
        assert!(matches!(query.params[3], Value::Integer(10_000)));
        assert_eq!(query.order_by, "w.price_cents DESC, w.created_ts DESC");
    }

    #[test]
    fn inverted_price_range_is_rejected() {
        let filter = CatalogueFilter {
            min_price: Some(500),
            max_price: Some(100),
            ..Default::default()
        };
        assert!(matches!(filter.build(), Err(AppError::BadRequest(_))));

        let negative = CatalogueFilter {
            min_price: Some(-1),
            ..Default::default()
        };
        assert!(matches!(negative.build(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn pagination_is_clamped() {
        let filter = CatalogueFilter {
            page: Some(0),
            per_page: Some(1000),
            ..Default::default()
        };
        let query = filter.build().unwrap();
        assert_eq!((query.page, query.per_page), (1, MAX_PER_PAGE));

        let filter = CatalogueFilter {
            page: Some(3),
            per_page: Some(10),
            ..Default::default()
        };
        let query = filter.build().unwrap();
        assert_eq!(query.offset(), 20);
        assert_eq!(query.total_pages(0), 0);
        assert_eq!(query.total_pages(21), 3);
        assert_eq!(query.total_pages(30), 3);
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b\\c"), "%a\\_b\\\\c%");
    }
}
