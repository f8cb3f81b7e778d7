//! Admin dashboard aggregates, shaped as `{label, value}` series for charts.

use chrono::{Datelike, NaiveDate};
use libsql::Connection;
use serde::Serialize;
use std::collections::HashMap;

use crate::db::fetch_all;
use crate::error::AppResult;
use crate::models::{ArtistProfile, Artwork, Order, User};

pub const REVENUE_MONTHS: u32 = 12;
pub const TOP_ARTISTS: i64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: i64,
}

#[derive(Debug, Serialize)]
pub struct Totals {
    pub users: i64,
    pub artists: i64,
    pub artworks: i64,
    pub orders: i64,
    pub revenue_cents: i64,
    pub revenue: f64,
}

#[derive(Debug, Serialize)]
pub struct TopArtist {
    pub artist_id: String,
    pub display_name: String,
    pub slug: String,
    pub sales_count: i64,
    pub revenue_cents: i64,
}

#[derive(Debug, Serialize)]
pub struct AdminStats {
    pub totals: Totals,
    pub orders_by_status: Vec<ChartPoint>,
    pub artworks_by_status: Vec<ChartPoint>,
    pub artworks_by_category: Vec<ChartPoint>,
    /// Cents per month, oldest first.
    pub revenue_by_month: Vec<ChartPoint>,
    pub top_artists: Vec<TopArtist>,
}

fn chart_point(row: &libsql::Row) -> Result<ChartPoint, libsql::Error> {
    Ok(ChartPoint {
        label: row.get(0)?,
        value: row.get(1)?,
    })
}

/// The `count` months ending with the month of `today`, as `YYYY-MM`, oldest first.
pub fn month_labels(today: NaiveDate, count: u32) -> Vec<String> {
    let (mut year, mut month) = (today.year(), today.month());
    let mut labels = Vec::with_capacity(count as usize);
    for _ in 0..count {
        labels.push(format!("{year:04}-{month:02}"));
        if month == 1 {
            year -= 1;
            month = 12;
        } else {
            month -= 1;
        }
    }
    labels.reverse();
    labels
}

/// One point per label, zero where the query returned nothing for that month.
pub fn fill_months(labels: &[String], rows: Vec<ChartPoint>) -> Vec<ChartPoint> {
    let by_month: HashMap<String, i64> = rows.into_iter().map(|p| (p.label, p.value)).collect();
    labels
        .iter()
        .map(|label| ChartPoint {
            label: label.clone(),
            value: by_month.get(label).copied().unwrap_or(0),
        })
        .collect()
}

pub async fn collect(conn: &Connection, today: NaiveDate) -> AppResult<AdminStats> {
    let revenue_cents = Order::total_revenue(conn).await?;
    let totals = Totals {
        users: User::count_all(conn).await?,
        artists: ArtistProfile::count_all(conn).await?,
        artworks: Artwork::count_all(conn).await?,
        orders: Order::count_all(conn).await?,
        revenue_cents,
        revenue: revenue_cents as f64 / 100.0,
    };

    let orders_by_status = fetch_all(
        conn,
        "SELECT status, COUNT(*) FROM orders GROUP BY status ORDER BY status",
        (),
        chart_point,
    )
    .await?;

    let artworks_by_status = fetch_all(
        conn,
        "SELECT status, COUNT(*) FROM artworks GROUP BY status ORDER BY status",
        (),
        chart_point,
    )
    .await?;

    let artworks_by_category = fetch_all(
        conn,
        "SELECT category, COUNT(*) AS n FROM artworks GROUP BY category ORDER BY n DESC, category ASC",
        (),
        chart_point,
    )
    .await?;

    let labels = month_labels(today, REVENUE_MONTHS);
    let first_month = labels.first().cloned().unwrap_or_default();
    let monthly = fetch_all(
        conn,
        r#"
        SELECT strftime('%Y-%m', created_ts, 'unixepoch') AS month, SUM(total_cents)
        FROM orders
        WHERE status IN ('paid', 'shipped', 'delivered')
          AND strftime('%Y-%m', created_ts, 'unixepoch') >= ?
        GROUP BY month
        "#,
        [first_month],
        chart_point,
    )
    .await?;
    let revenue_by_month = fill_months(&labels, monthly);

    let top_artists = fetch_all(
        conn,
        r#"
        SELECT a.id, a.display_name, a.slug, COUNT(i.id), SUM(i.price_cents) AS revenue
        FROM order_items i
        JOIN orders o ON o.id = i.order_id
        JOIN artist_profiles a ON a.id = i.artist_id
        WHERE o.status IN ('paid', 'shipped', 'delivered')
        GROUP BY a.id, a.display_name, a.slug
        ORDER BY revenue DESC, a.display_name ASC
        LIMIT ?
        "#,
        [TOP_ARTISTS],
        |row| {
            Ok(TopArtist {
                artist_id: row.get(0)?,
                display_name: row.get(1)?,
                slug: row.get(2)?,
                sales_count: row.get(3)?,
                revenue_cents: row.get(4)?,
            })
        },
    )
    .await?;

    Ok(AdminStats {
        totals,
        orders_by_status,
        artworks_by_status,
        artworks_by_category,
        revenue_by_month,
        top_artists,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_labels_cross_the_year_boundary() {
        let labels = month_labels(date(2026, 2, 17), 4);
        assert_eq!(labels, vec!["2025-11", "2025-12", "2026-01", "2026-02"]);
        assert_eq!(month_labels(date(2026, 10, 1), 12).len(), 12);
    }

    #[test]
    fn missing_months_are_zero_filled() {
        let labels = month_labels(date(2026, 3, 1), 3);
        let rows = vec![
            ChartPoint { label: "2026-03".into(), value: 900 },
            ChartPoint { label: "2026-01".into(), value: 150 },
            // Outside the window
            ChartPoint { label: "2025-06".into(), value: 5 },
        ];
        assert_eq!(
            fill_months(&labels, rows),
            vec![
                ChartPoint { label: "2026-01".into(), value: 150 },
                ChartPoint { label: "2026-02".into(), value: 0 },
                ChartPoint { label: "2026-03".into(), value: 900 },
            ]
        );
    }
}
